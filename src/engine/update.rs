//! Market updates, settlement, spot disabling and controlled params.

use std::time::Duration;
use tracing::{info, instrument, warn};

use super::core::{Context, Engine};
use super::requests::MarketUpdate;
use super::validation::validate_market;
use crate::config::ControlledParams;
use crate::error::MarketError;
use crate::events::{EventPayload, TransitionKind};
use crate::market::Market;
use crate::store::MarketStore;

impl<S: MarketStore> Engine<S> {
    /// Replaces the mutable fields of `name`. identity is never touched.
    #[instrument(skip(self, ctx, update))]
    pub fn update_market(
        &mut self,
        ctx: &mut Context<'_>,
        name: &str,
        update: &MarketUpdate,
    ) -> Result<Market, MarketError> {
        let result = self.try_update_market(ctx, name, update);
        match &result {
            Ok(market) => info!(display_name = %market.display_name, "Updated market"),
            Err(e) => warn!(error = %e, "Rejecting market update"),
        }
        result
    }

    fn try_update_market(
        &mut self,
        ctx: &mut Context<'_>,
        name: &str,
        update: &MarketUpdate,
    ) -> Result<Market, MarketError> {
        if update.is_empty() {
            return Err(MarketError::InvalidInput("market update changes nothing".to_string()));
        }
        let previous = self.require_market(name)?;
        let mut market = previous.clone();
        update.apply(&mut market);
        market.validate_basic()?;

        // settlement and spot disabling are one-way
        if market.is_active && !previous.is_active && previous.closed_block_height != 0 {
            return Err(MarketError::invalid_market("closed markets cannot be reactivated"));
        }
        if market.is_active && market.is_settled {
            return Err(MarketError::invalid_market("settled markets cannot be active"));
        }
        if market.tick_size != previous.tick_size && ctx.positions.has_outstanding_positions(name) {
            return Err(MarketError::HasOutstandingPositions(name.to_string()));
        }

        if market.display_name != previous.display_name
            && self.is_display_name_used(&market.display_name, Some(name))?
        {
            return Err(MarketError::DuplicateDisplayName(market.display_name.clone()));
        }
        if market.expiry_time != previous.expiry_time && !self.is_unique_market(&market)? {
            return Err(MarketError::MarketNotUnique {
                market_type: market.market_type,
                base: market.base.clone(),
                quote: market.quote.clone(),
                expiry: market.expiry_time.to_rfc3339(),
            });
        }
        validate_market(&market, ctx.oracles, ctx.clock.current_time())?;

        self.commit_market(ctx, Some(previous), market, TransitionKind::Update)
    }

    /// Closes a futures market for good.
    #[instrument(skip(self, ctx))]
    pub fn settle_market(&mut self, ctx: &mut Context<'_>, name: &str) -> Result<Market, MarketError> {
        let previous = self.require_market(name)?;
        if !previous.is_futures() {
            return Err(MarketError::invalid_market("only futures markets can be settled"));
        }
        if previous.is_settled {
            return Err(MarketError::invalid_market("market is already settled"));
        }
        let mut market = previous.clone();
        market.is_settled = true;
        market.is_active = false;
        market.closed_block_height = ctx.block_height;

        let market = self.commit_market(ctx, Some(previous), market, TransitionKind::Settle)?;
        info!(height = ctx.block_height, "Settled market");
        Ok(market)
    }

    #[instrument(skip(self, ctx))]
    pub fn disable_spot_market(&mut self, ctx: &mut Context<'_>, name: &str) -> Result<Market, MarketError> {
        let previous = self.require_market(name)?;
        if !previous.is_spot() {
            return Err(MarketError::invalid_market("only spot markets can be disabled"));
        }
        if !previous.is_active {
            return Err(MarketError::invalid_market("market is already disabled"));
        }
        let mut market = previous.clone();
        market.is_active = false;
        market.closed_block_height = ctx.block_height;

        let market = self.commit_market(ctx, Some(previous), market, TransitionKind::Update)?;
        info!(height = ctx.block_height, "Disabled spot market");
        Ok(market)
    }

    pub fn update_perpetuals_funding_interval(
        &mut self,
        ctx: &mut Context<'_>,
        interval: Duration,
    ) -> Result<(), MarketError> {
        ControlledParams::validate_funding_interval(interval)?;
        let previous = self.config.controlled_params.clone();
        self.config.controlled_params.perpetuals_funding_interval = interval;

        let payload = EventPayload::ControlledParamsUpdated(self.config.controlled_params.clone());
        if let Err(e) = self.emit_event(ctx, payload) {
            self.config.controlled_params = previous;
            return Err(e);
        }
        info!(interval_secs = interval.as_secs(), "Updated perpetuals funding interval");
        Ok(())
    }
}
