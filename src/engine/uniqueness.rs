// 8.3: uniqueness. a market is identified by (type, base, quote, expiry) and
// by its display name. the linear scans are the reference; MarketIndex keeps
// the same answers in hash maps and must always agree with them.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::market::Market;
use crate::types::MarketType;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarketKey {
    pub market_type: MarketType,
    pub base: String,
    pub quote: String,
    pub expiry_time: DateTime<Utc>,
}

impl MarketKey {
    pub fn of(market: &Market) -> Self {
        Self {
            market_type: market.market_type,
            base: market.base.clone(),
            quote: market.quote.clone(),
            expiry_time: market.expiry_time,
        }
    }
}

/// True when no other market (by name) shares the candidate's key.
pub fn is_unique_market(existing: &[Market], candidate: &Market) -> bool {
    let key = MarketKey::of(candidate);
    !existing
        .iter()
        .any(|m| m.name != candidate.name && MarketKey::of(m) == key)
}

/// True when a market other than `except` already uses `display_name`.
pub fn is_display_name_used(existing: &[Market], display_name: &str, except: Option<&str>) -> bool {
    existing
        .iter()
        .any(|m| m.display_name == display_name && Some(m.name.as_str()) != except)
}

/// Secondary index, both maps point at the owning market name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketIndex {
    keys: HashMap<MarketKey, String>,
    display_names: HashMap<String, String>,
}

impl MarketIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_markets<'a>(markets: impl IntoIterator<Item = &'a Market>) -> Self {
        let mut index = Self::new();
        for market in markets {
            index.insert(market);
        }
        index
    }

    pub fn insert(&mut self, market: &Market) {
        self.keys.insert(MarketKey::of(market), market.name.clone());
        self.display_names
            .insert(market.display_name.clone(), market.name.clone());
    }

    /// Drops the entries `previous` owns. stale entries owned by another
    /// market are left alone.
    pub fn remove(&mut self, previous: &Market) {
        let key = MarketKey::of(previous);
        if self.keys.get(&key) == Some(&previous.name) {
            self.keys.remove(&key);
        }
        if self.display_names.get(&previous.display_name) == Some(&previous.name) {
            self.display_names.remove(&previous.display_name);
        }
    }

    pub fn replace(&mut self, previous: Option<&Market>, next: &Market) {
        if let Some(previous) = previous {
            self.remove(previous);
        }
        self.insert(next);
    }

    pub fn is_unique_market(&self, candidate: &Market) -> bool {
        match self.keys.get(&MarketKey::of(candidate)) {
            Some(owner) => *owner == candidate.name,
            None => true,
        }
    }

    pub fn is_display_name_used(&self, display_name: &str, except: Option<&str>) -> bool {
        match self.display_names.get(display_name) {
            Some(owner) => Some(owner.as_str()) != except,
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
