// 7.0: genesis snapshot. everything needed to rebuild the market module from
// scratch: params, controlled params, markets, fee ladders and the market
// name counter.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::{ControlledParams, MarketParams};
use crate::engine::MarketKey;
use crate::error::MarketError;
use crate::fees::FeeStructure;
use crate::market::Market;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: MarketParams,
    pub controlled_params: ControlledParams,
    #[serde(default)]
    pub markets: Vec<Market>,
    #[serde(default)]
    pub fee_structures: Vec<FeeStructure>,
    /// Next value handed out by the market name sequence
    pub market_name_sequence: u64,
}

impl Default for GenesisState {
    fn default() -> Self {
        Self {
            params: MarketParams::default(),
            controlled_params: ControlledParams::default(),
            markets: Vec::new(),
            fee_structures: Vec::new(),
            market_name_sequence: 1,
        }
    }
}

impl GenesisState {
    /// Test networks opt into the one minute funding interval here.
    pub fn with_shortened_funding_interval(mut self) -> Self {
        self.controlled_params = ControlledParams::new(true);
        self
    }

    pub fn validate(&self) -> Result<(), MarketError> {
        self.params.validate()?;
        if self.controlled_params.perpetuals_funding_interval.is_zero() {
            return Err(MarketError::InvalidInput(
                "perpetuals funding interval must be positive".to_string(),
            ));
        }
        if self.market_name_sequence == 0 {
            return Err(MarketError::InvalidInput(
                "market name sequence must start at 1 or above".to_string(),
            ));
        }

        let mut names = HashSet::new();
        let mut display_names = HashSet::new();
        let mut keys = HashSet::new();
        for market in &self.markets {
            market.validate_basic()?;
            if !names.insert(market.name.as_str()) {
                return Err(MarketError::DuplicateName(market.name.clone()));
            }
            if !display_names.insert(market.display_name.as_str()) {
                return Err(MarketError::DuplicateDisplayName(market.display_name.clone()));
            }
            if !keys.insert(MarketKey::of(market)) {
                return Err(MarketError::MarketNotUnique {
                    market_type: market.market_type,
                    base: market.base.clone(),
                    quote: market.quote.clone(),
                    expiry: market.expiry_time.to_rfc3339(),
                });
            }
        }

        let mut categories = HashSet::new();
        for structure in &self.fee_structures {
            structure.validate()?;
            if !categories.insert(&structure.category) {
                return Err(MarketError::InvalidFeeTier(format!(
                    "duplicate fee structure for {:?}",
                    structure.category
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
