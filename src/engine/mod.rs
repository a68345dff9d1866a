// 8.0: market engine. creates, updates and settles markets, keeps the fee
// schedule and imports/exports genesis. deterministic; every external value
// arrives through Context.

mod config;
mod core;
mod create;
mod fees;
mod genesis;
mod requests;
mod uniqueness;
mod update;
mod validation;

pub use config::{EngineConfig, MARKET_NAME_SEQUENCE_KEY};
pub use core::{Context, Engine};
pub use requests::{CreateMarketRequest, MarketUpdate};
pub use uniqueness::{is_display_name_used, is_unique_market, MarketIndex, MarketKey};
pub use validation::{min_expiry_lead, validate_market};
