// 4.0: stake based fee ladders. a ladder is keyed either by market type (the
// default for every market of that type) or by one market name (an override).
// 4.1: the effective tier for a stake is the highest tier it reaches.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::MarketError;
use crate::market::Market;
use crate::types::MarketType;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeCategory {
    MarketType(MarketType),
    Market(String),
}

// negative maker fee = rebate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTier {
    pub required_stake: u128,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
}

impl FeeTier {
    pub fn new(required_stake: u128, maker_fee: Decimal, taker_fee: Decimal) -> Self {
        Self {
            required_stake,
            maker_fee,
            taker_fee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStructure {
    pub category: FeeCategory,
    pub tiers: Vec<FeeTier>,
}

impl FeeStructure {
    pub fn new(category: FeeCategory, tiers: Vec<FeeTier>) -> Self {
        Self { category, tiers }
    }

    pub fn validate(&self) -> Result<(), MarketError> {
        if let FeeCategory::Market(name) = &self.category {
            if name.is_empty() {
                return Err(MarketError::InvalidFeeTier("market id must not be empty".to_string()));
            }
        }
        validate_fee_tiers(&self.tiers)
    }

    /// Highest tier whose required stake is covered by `stake`.
    pub fn tier_for_stake(&self, stake: u128) -> Option<&FeeTier> {
        self.tiers
            .iter()
            .take_while(|tier| tier.required_stake <= stake)
            .last()
    }
}

/// Ladder must be non-empty, start at zero stake and strictly ascend.
pub fn validate_fee_tiers(tiers: &[FeeTier]) -> Result<(), MarketError> {
    let first = tiers
        .first()
        .ok_or_else(|| MarketError::InvalidFeeTier("at least one fee tier is required".to_string()))?;
    if first.required_stake != 0 {
        return Err(MarketError::InvalidFeeTier(format!(
            "first fee tier must require zero stake, got {}",
            first.required_stake
        )));
    }
    for pair in tiers.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.required_stake == prev.required_stake {
            return Err(MarketError::InvalidFeeTier(format!(
                "duplicate required stake {}",
                next.required_stake
            )));
        }
        if next.required_stake < prev.required_stake {
            return Err(MarketError::InvalidFeeTier(format!(
                "required stake {} follows {}, tiers must be ascending",
                next.required_stake, prev.required_stake
            )));
        }
    }
    Ok(())
}

/// All fee structures, one per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeSchedule {
    structures: BTreeMap<FeeCategory, Vec<FeeTier>>,
}

impl FeeSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, structure: FeeStructure) -> Result<(), MarketError> {
        structure.validate()?;
        self.structures.insert(structure.category, structure.tiers);
        Ok(())
    }

    pub fn get(&self, category: &FeeCategory) -> Option<FeeStructure> {
        self.structures
            .get(category)
            .map(|tiers| FeeStructure::new(category.clone(), tiers.clone()))
    }

    pub fn structures(&self) -> Vec<FeeStructure> {
        self.structures
            .iter()
            .map(|(category, tiers)| FeeStructure::new(category.clone(), tiers.clone()))
            .collect()
    }

    /// Market specific ladder if one exists, else the market type default.
    pub fn structure_for(&self, market: &Market) -> Option<FeeStructure> {
        self.get(&FeeCategory::Market(market.name.clone()))
            .or_else(|| self.get(&FeeCategory::MarketType(market.market_type)))
    }

    pub fn effective_tier(&self, market: &Market, stake: u128) -> Option<FeeTier> {
        self.structure_for(market)
            .and_then(|s| s.tier_for_stake(stake).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ladder() -> Vec<FeeTier> {
        vec![
            FeeTier::new(0, dec!(0.001), dec!(0.003)),
            FeeTier::new(1_000, dec!(0.0005), dec!(0.002)),
            FeeTier::new(50_000, dec!(-0.00025), dec!(0.00075)),
        ]
    }

    #[test]
    fn valid_ladder() {
        assert!(validate_fee_tiers(&ladder()).is_ok());
    }

    #[test]
    fn empty_ladder_rejected() {
        assert!(matches!(validate_fee_tiers(&[]), Err(MarketError::InvalidFeeTier(_))));
    }

    #[test]
    fn first_tier_must_be_zero() {
        let mut tiers = ladder();
        tiers.remove(0);
        assert!(matches!(validate_fee_tiers(&tiers), Err(MarketError::InvalidFeeTier(_))));
    }

    #[test]
    fn duplicate_and_descending_rejected() {
        let mut tiers = ladder();
        tiers[2].required_stake = 1_000;
        let err = validate_fee_tiers(&tiers).unwrap_err();
        assert!(err.to_string().contains("duplicate"));

        let mut tiers = ladder();
        tiers.swap(1, 2);
        let err = validate_fee_tiers(&tiers).unwrap_err();
        assert!(err.to_string().contains("ascending"));
    }

    #[test]
    fn tier_lookup() {
        let s = FeeStructure::new(FeeCategory::MarketType(MarketType::Spot), ladder());
        assert_eq!(s.tier_for_stake(0).unwrap().required_stake, 0);
        assert_eq!(s.tier_for_stake(999).unwrap().required_stake, 0);
        assert_eq!(s.tier_for_stake(1_000).unwrap().required_stake, 1_000);
        assert_eq!(s.tier_for_stake(u128::MAX).unwrap().required_stake, 50_000);
    }

    #[test]
    fn market_override_takes_precedence() {
        let mut schedule = FeeSchedule::new();
        schedule
            .set(FeeStructure::new(FeeCategory::MarketType(MarketType::Spot), ladder()))
            .unwrap();

        let market = Market::spot("mkt/1", "ETH_USDC", "eth", "usdc");
        let other = Market::spot("mkt/2", "BTC_USDC", "btc", "usdc");
        assert_eq!(schedule.effective_tier(&market, 0).unwrap().taker_fee, dec!(0.003));

        schedule
            .set(FeeStructure::new(
                FeeCategory::Market("mkt/1".into()),
                vec![FeeTier::new(0, dec!(0), dec!(0.002))],
            ))
            .unwrap();
        assert_eq!(schedule.effective_tier(&market, 60_000).unwrap().taker_fee, dec!(0.002));
        assert_eq!(schedule.effective_tier(&other, 60_000).unwrap().taker_fee, dec!(0.00075));
    }

    #[test]
    fn no_structure_for_type() {
        let schedule = FeeSchedule::new();
        let market = Market::spot("mkt/1", "ETH_USDC", "eth", "usdc");
        assert!(schedule.effective_tier(&market, 10).is_none());
    }
}
