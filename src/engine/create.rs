//! Market creation pipeline.
//!
//! request checks -> token lookups -> increments -> naming -> structural
//! validation -> uniqueness -> collaborator validation -> commit. The first
//! failing step wins and nothing is written before the commit.

use tracing::{debug, info, instrument, warn};

use super::config::MARKET_NAME_SEQUENCE_KEY;
use super::core::{Context, Engine};
use super::requests::{CreateMarketRequest, ValidatedRequest};
use super::validation::validate_market;
use crate::error::MarketError;
use crate::events::TransitionKind;
use crate::generator::{
    generate_description, generate_display_name, generate_impact_size, generate_lot_size,
    generate_min_quantity, generate_tick_size,
};
use crate::market::Market;
use crate::store::MarketStore;
use crate::types::{MarketType, Token};

impl<S: MarketStore> Engine<S> {
    #[instrument(skip_all, fields(market_type = %request.market_type, base = %request.base, quote = %request.quote))]
    pub fn create_market(
        &mut self,
        ctx: &mut Context<'_>,
        request: CreateMarketRequest,
    ) -> Result<Market, MarketError> {
        let result = self.try_create_market(ctx, &request);
        match &result {
            Ok(market) => info!(
                name = %market.name,
                display_name = %market.display_name,
                height = ctx.block_height,
                "Created market"
            ),
            Err(e) => warn!(error = %e, kind = ?e.kind(), "Rejecting market creation"),
        }
        result
    }

    fn try_create_market(
        &mut self,
        ctx: &mut Context<'_>,
        request: &CreateMarketRequest,
    ) -> Result<Market, MarketError> {
        let validated = request.validate()?;
        let (base, quote) = lookup_tokens(ctx, request)?;

        let mut market = self.generate_market(ctx, request, &validated, &base, &quote)?;
        market.validate_basic()?;

        if !self.is_unique_market(&market)? {
            return Err(MarketError::MarketNotUnique {
                market_type: market.market_type,
                base: market.base.clone(),
                quote: market.quote.clone(),
                expiry: market.expiry_time.to_rfc3339(),
            });
        }
        if self.has_market(&market.name) {
            return Err(MarketError::DuplicateName(market.name.clone()));
        }
        if self.is_display_name_used(&market.display_name, None)? {
            return Err(MarketError::DuplicateDisplayName(market.display_name.clone()));
        }
        validate_market(&market, ctx.oracles, ctx.clock.current_time())?;

        market.created_block_height = ctx.block_height;
        self.commit_market(ctx, None, market, TransitionKind::New)
    }

    fn generate_market(
        &self,
        ctx: &mut Context<'_>,
        request: &CreateMarketRequest,
        validated: &ValidatedRequest,
        base: &Token,
        quote: &Token,
    ) -> Result<Market, MarketError> {
        let params = &self.config.params;
        let lot_size = generate_lot_size(params, validated.base_price, base.decimals)?;
        let tick_size = generate_tick_size(
            params,
            validated.base_price,
            validated.quote_price,
            base.decimals,
            quote.decimals,
            lot_size,
        )?;
        let min_quantity = generate_min_quantity(params, validated.base_price, base.decimals, lot_size)?;
        let impact_size = match validated.market_type {
            MarketType::Futures => generate_impact_size(params, validated.base_price, base.decimals)?,
            MarketType::Spot => 0,
        };
        debug!(%lot_size, %tick_size, %min_quantity, %impact_size, "Derived trading increments");

        let seq = ctx.sequence.next(MARKET_NAME_SEQUENCE_KEY);
        let name = self.config.market_name(seq);
        let mut display_name = generate_display_name(
            validated.market_type,
            &base.symbol,
            &quote.symbol,
            &validated.expiry_time,
        );
        if self.is_display_name_used(&display_name, None)? {
            debug!(%display_name, seq, "Display name taken, appending sequence");
            display_name = format!("{display_name}.{seq}");
        }

        let mut market = Market::spot(&name, &display_name, &base.denom, &quote.denom);
        market.market_type = validated.market_type;
        market.description = generate_description(
            validated.market_type,
            &base.name,
            &base.symbol,
            &quote.symbol,
            &validated.expiry_time,
        );
        market.base_precision = base.decimals;
        market.quote_precision = quote.decimals;
        market.lot_size = lot_size;
        market.tick_size = tick_size;
        market.min_quantity = min_quantity;
        market.index_oracle_id = request.index_oracle_id.clone();
        market.expiry_time = validated.expiry_time;

        if validated.market_type == MarketType::Futures {
            let defaults = &params.futures;
            market.impact_size = impact_size;
            market.risk_step_size = defaults.risk_step_size;
            market.initial_margin_base = defaults.initial_margin_base;
            market.initial_margin_step = defaults.initial_margin_step;
            market.maintenance_margin_ratio = defaults.maintenance_margin_ratio;
            market.max_liquidation_order_duration = defaults.max_liquidation_order_duration;
            market.max_liquidation_order_ticket = min_quantity
                .checked_mul(defaults.liquidation_ticket_multiplier)
                .ok_or_else(|| {
                    MarketError::InvalidMinQuantity(format!(
                        "liquidation ticket for min quantity {min_quantity} overflows"
                    ))
                })?;
            market.mark_price_band = defaults.mark_price_band;
            market.last_price_protected_band = defaults.last_price_protected_band;
            market.trading_bandwidth = defaults.trading_bandwidth;
        }
        Ok(market)
    }
}

fn lookup_tokens(ctx: &Context<'_>, request: &CreateMarketRequest) -> Result<(Token, Token), MarketError> {
    let base = ctx
        .tokens
        .lookup(&request.base)
        .ok_or_else(|| MarketError::TokenNotFound(request.base.clone()))?;
    let quote = ctx
        .tokens
        .lookup(&request.quote)
        .ok_or_else(|| MarketError::TokenNotFound(request.quote.clone()))?;
    if !base.is_active {
        return Err(MarketError::TokenInactive(base.denom));
    }
    if !quote.is_active {
        return Err(MarketError::TokenInactive(quote.denom));
    }
    Ok((base, quote))
}
