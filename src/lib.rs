// market-params: deterministic market parameter derivation and validation.
// every value is exact base-10 fixed point; the same inputs give the same
// market on every replica.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: MarketType, Price, Token, expiry helpers
//   2.x  error.rs: MarketError and its coarse ErrorKind
//   3.x  config.rs: usd targets, futures defaults, controlled params, presets
//   4.x  fees.rs: fee tiers, ladders and the fee schedule
//   5.x  collaborators.rs: token/oracle/sequence/clock contracts + in-memory impls
//   6.x  events.rs: market and fee events, event sinks
//   7.x  genesis.rs: genesis snapshot and validation
//   8.x  engine/: create/update/settle pipeline, uniqueness, fee management
//   fixed_point.rs: exact decimal shifts, rounding, significant figures
//   generator.rs: lot/tick/min quantity/impact size derivation
//   market.rs: market record and structural validation
//   store.rs: market store contract and MemStore
//   hooks.rs: ordered post-write listeners
//   telemetry.rs: tracing subscriber for binaries

// core derivation and validation
pub mod fixed_point;
pub mod generator;
pub mod market;
pub mod types;

// engine and its contracts
pub mod collaborators;
pub mod engine;
pub mod events;
pub mod fees;
pub mod hooks;
pub mod store;

// ambient
pub mod config;
pub mod error;
pub mod genesis;
pub mod telemetry;

// re exports for convenience
pub use collaborators::*;
pub use config::{ConfigError, ControlledParams, Environment, FuturesDefaults, MarketParams};
pub use engine::*;
pub use error::{ErrorKind, MarketError};
pub use events::*;
pub use fees::*;
pub use genesis::GenesisState;
pub use hooks::{HookSet, MarketHooks};
pub use market::*;
pub use store::{MarketStore, MemStore, StoreError};
pub use types::*;
