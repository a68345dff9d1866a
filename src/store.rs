//! Market persistence contract.
//!
//! The core never owns storage mechanics; it reads and writes through
//! [`MarketStore`]. [`MemStore`] keeps encoded records in key order, which
//! is all the engine, the tests and the simulation need.

use std::collections::BTreeMap;

use crate::market::Market;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("cannot encode market {name}: {reason}")]
    Encode { name: String, reason: String },

    #[error("cannot decode market {name}: {reason}")]
    Decode { name: String, reason: String },
}

pub trait MarketStore {
    fn get(&self, name: &str) -> Result<Option<Market>, StoreError>;

    fn set(&mut self, market: &Market) -> Result<(), StoreError>;

    fn has(&self, name: &str) -> bool;

    fn delete(&mut self, name: &str);

    /// Every market whose name starts with `prefix`, in key order.
    fn iter_prefix(&self, prefix: &str) -> Result<Vec<Market>, StoreError>;
}

/// Ordered in-memory store holding json encoded markets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn decode(name: &str, bytes: &[u8]) -> Result<Market, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Decode {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}

impl MarketStore for MemStore {
    fn get(&self, name: &str) -> Result<Option<Market>, StoreError> {
        self.entries
            .get(name)
            .map(|bytes| Self::decode(name, bytes))
            .transpose()
    }

    fn set(&mut self, market: &Market) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(market).map_err(|e| StoreError::Encode {
            name: market.name.clone(),
            reason: e.to_string(),
        })?;
        self.entries.insert(market.name.clone(), bytes);
        Ok(())
    }

    fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn delete(&mut self, name: &str) {
        self.entries.remove(name);
    }

    fn iter_prefix(&self, prefix: &str) -> Result<Vec<Market>, StoreError> {
        self.entries
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(name, bytes)| Self::decode(name, bytes))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(name: &str) -> Market {
        Market::spot(name, &name.replace('/', "_").to_uppercase(), "eth", "usdc")
    }

    #[test]
    fn set_get_round_trip() {
        let mut store = MemStore::new();
        let m = market("mkt/1");
        store.set(&m).unwrap();
        assert!(store.has("mkt/1"));
        assert_eq!(store.get("mkt/1").unwrap(), Some(m));
        assert_eq!(store.get("mkt/2").unwrap(), None);
    }

    #[test]
    fn delete_removes() {
        let mut store = MemStore::new();
        store.set(&market("mkt/1")).unwrap();
        store.delete("mkt/1");
        assert!(!store.has("mkt/1"));
        assert!(store.is_empty());
    }

    #[test]
    fn prefix_iteration_is_ordered() {
        let mut store = MemStore::new();
        for name in ["mkt/3", "mkt/1", "other/1", "mkt/2"] {
            store.set(&market(name)).unwrap();
        }
        let names: Vec<String> = store
            .iter_prefix("mkt/")
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["mkt/1", "mkt/2", "mkt/3"]);
        assert_eq!(store.iter_prefix("").unwrap().len(), 4);
    }

    #[test]
    fn corrupt_entry_surfaces_decode_error() {
        let mut store = MemStore::new();
        store.entries.insert("mkt/1".into(), b"not json".to_vec());
        assert!(matches!(store.get("mkt/1"), Err(StoreError::Decode { .. })));
    }
}
