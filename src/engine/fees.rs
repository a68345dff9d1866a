//! Fee schedule management.

use tracing::{info, warn};

use super::core::{Context, Engine};
use crate::error::MarketError;
use crate::events::EventPayload;
use crate::fees::{FeeCategory, FeeStructure, FeeTier};
use crate::store::MarketStore;

impl<S: MarketStore> Engine<S> {
    /// Replaces the whole ladder of one category.
    pub fn set_fee_structure(
        &mut self,
        ctx: &mut Context<'_>,
        structure: FeeStructure,
    ) -> Result<(), MarketError> {
        if let FeeCategory::Market(name) = &structure.category {
            if !name.is_empty() && !self.has_market(name) {
                return Err(MarketError::MarketNotFound(name.clone()));
            }
        }
        let snapshot = self.fees.clone();
        if let Err(e) = self.fees.set(structure.clone()) {
            warn!(category = ?structure.category, error = %e, "Rejecting fee structure");
            return Err(e);
        }
        let tiers = structure.tiers.len();
        let category = structure.category.clone();
        if let Err(e) = self.emit_event(ctx, EventPayload::FeeStructureSet(structure)) {
            self.fees = snapshot;
            return Err(e);
        }
        info!(?category, tiers, "Set fee structure");
        Ok(())
    }

    /// Inserts a tier at its stake position, creating the ladder if needed.
    pub fn add_fee_tier(
        &mut self,
        ctx: &mut Context<'_>,
        category: FeeCategory,
        tier: FeeTier,
    ) -> Result<(), MarketError> {
        let mut tiers = self
            .fees
            .get(&category)
            .map(|s| s.tiers)
            .unwrap_or_default();
        let at = tiers.partition_point(|t| t.required_stake < tier.required_stake);
        tiers.insert(at, tier);
        self.set_fee_structure(ctx, FeeStructure::new(category, tiers))
    }

    /// Replaces the fees of the tier with the same required stake.
    pub fn update_fee_tier(
        &mut self,
        ctx: &mut Context<'_>,
        category: FeeCategory,
        tier: FeeTier,
    ) -> Result<(), MarketError> {
        let mut tiers = self.tiers_of(&category)?;
        let slot = tiers
            .iter_mut()
            .find(|t| t.required_stake == tier.required_stake)
            .ok_or_else(|| missing_tier(tier.required_stake))?;
        *slot = tier;
        self.set_fee_structure(ctx, FeeStructure::new(category, tiers))
    }

    /// The remaining ladder must still be valid, so the zero stake tier
    /// can only go if another zero stake tier takes its place first.
    pub fn remove_fee_tier(
        &mut self,
        ctx: &mut Context<'_>,
        category: FeeCategory,
        required_stake: u128,
    ) -> Result<(), MarketError> {
        let mut tiers = self.tiers_of(&category)?;
        let at = tiers
            .iter()
            .position(|t| t.required_stake == required_stake)
            .ok_or_else(|| missing_tier(required_stake))?;
        tiers.remove(at);
        self.set_fee_structure(ctx, FeeStructure::new(category, tiers))
    }

    pub fn fee_structure(&self, category: &FeeCategory) -> Option<FeeStructure> {
        self.fees.get(category)
    }

    /// Tier applied to an account staking `stake` on market `name`.
    pub fn effective_fee_tier(&self, name: &str, stake: u128) -> Result<Option<FeeTier>, MarketError> {
        let market = self.require_market(name)?;
        Ok(self.fees.effective_tier(&market, stake))
    }

    fn tiers_of(&self, category: &FeeCategory) -> Result<Vec<FeeTier>, MarketError> {
        self.fees
            .get(category)
            .map(|s| s.tiers)
            .ok_or_else(|| MarketError::InvalidFeeTier(format!("no fee structure for {category:?}")))
    }
}

fn missing_tier(required_stake: u128) -> MarketError {
    MarketError::InvalidFeeTier(format!("no fee tier with required stake {required_stake}"))
}
