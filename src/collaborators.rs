// 5.0: external collaborators the engine reads from. each is resolved by the
// surrounding transition before the engine runs, so values never change
// mid-computation. the in-memory implementations back tests and the sim.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::types::Token;

pub trait TokenRegistry {
    fn lookup(&self, denom: &str) -> Option<Token>;
}

pub trait OracleRegistry {
    fn exists(&self, oracle_id: &str) -> bool;
}

/// Open interest owner. the engine only asks whether any position is open.
pub trait PositionRegistry {
    fn has_outstanding_positions(&self, market: &str) -> bool;
}

/// Monotonically increasing counters, persisted by the implementor.
pub trait SequenceGenerator {
    /// Hands out the current value of `key` and advances it.
    fn next(&mut self, key: &str) -> u64;

    /// Value the next call to `next(key)` will return.
    fn current(&self, key: &str) -> u64;

    /// Genesis import only.
    fn set(&mut self, key: &str, value: u64);
}

/// Agreed reference time of the current transition. not wall clock.
pub trait ClockSource {
    fn current_time(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTokens {
    tokens: HashMap<String, Token>,
}

impl InMemoryTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: Token) -> Self {
        self.insert(token);
        self
    }

    pub fn insert(&mut self, token: Token) {
        self.tokens.insert(token.denom.clone(), token);
    }
}

impl TokenRegistry for InMemoryTokens {
    fn lookup(&self, denom: &str) -> Option<Token> {
        self.tokens.get(denom).cloned()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryOracles {
    ids: BTreeSet<String>,
}

impl InMemoryOracles {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl OracleRegistry for InMemoryOracles {
    fn exists(&self, oracle_id: &str) -> bool {
        self.ids.contains(oracle_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryPositions {
    open: BTreeSet<String>,
}

impl InMemoryPositions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, market: &str) {
        self.open.insert(market.to_string());
    }

    pub fn close_all(&mut self, market: &str) {
        self.open.remove(market);
    }
}

impl PositionRegistry for InMemoryPositions {
    fn has_outstanding_positions(&self, market: &str) -> bool {
        self.open.contains(market)
    }
}

/// Counters start at `start`; each call hands out the current value and
/// advances it.
#[derive(Debug, Clone)]
pub struct InMemorySequence {
    start: u64,
    counters: BTreeMap<String, u64>,
}

impl InMemorySequence {
    pub fn new(start: u64) -> Self {
        Self {
            start,
            counters: BTreeMap::new(),
        }
    }
}

impl Default for InMemorySequence {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SequenceGenerator for InMemorySequence {
    fn next(&mut self, key: &str) -> u64 {
        let current = self.current(key);
        self.counters.insert(key.to_string(), current + 1);
        current
    }

    fn current(&self, key: &str) -> u64 {
        self.counters.get(key).copied().unwrap_or(self.start)
    }

    fn set(&mut self, key: &str, value: u64) {
        self.counters.insert(key.to_string(), value);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl ClockSource for FixedClock {
    fn current_time(&self) -> DateTime<Utc> {
        self.0
    }
}
