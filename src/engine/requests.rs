// 8.0.2: request types accepted by the engine.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use std::time::Duration;

use crate::error::MarketError;
use crate::market::Market;
use crate::types::{perpetual_expiry, MarketType, Price};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMarketRequest {
    pub market_type: String,
    pub base: String,
    pub quote: String,
    pub current_base_price_usd: Decimal,
    pub current_quote_price_usd: Decimal,
    pub index_oracle_id: String,
    /// any offset; normalised to utc before use. epoch means perpetual
    pub expiry_time: DateTime<FixedOffset>,
}

/// Request fields after validation.
#[derive(Debug, Clone, Copy)]
pub(super) struct ValidatedRequest {
    pub market_type: MarketType,
    pub base_price: Price,
    pub quote_price: Price,
    pub expiry_time: DateTime<Utc>,
}

impl CreateMarketRequest {
    pub fn spot(base: &str, quote: &str, base_price: Decimal, quote_price: Decimal) -> Self {
        Self {
            market_type: MarketType::Spot.to_string(),
            base: base.to_string(),
            quote: quote.to_string(),
            current_base_price_usd: base_price,
            current_quote_price_usd: quote_price,
            index_oracle_id: String::new(),
            expiry_time: perpetual_expiry().into(),
        }
    }

    pub fn futures(
        base: &str,
        quote: &str,
        base_price: Decimal,
        quote_price: Decimal,
        index_oracle_id: &str,
        expiry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            market_type: MarketType::Futures.to_string(),
            index_oracle_id: index_oracle_id.to_string(),
            expiry_time: expiry_time.into(),
            ..Self::spot(base, quote, base_price, quote_price)
        }
    }

    pub fn perpetual(
        base: &str,
        quote: &str,
        base_price: Decimal,
        quote_price: Decimal,
        index_oracle_id: &str,
    ) -> Self {
        Self::futures(base, quote, base_price, quote_price, index_oracle_id, perpetual_expiry())
    }

    /// Argument checks only; nothing here touches a collaborator.
    pub(super) fn validate(&self) -> Result<ValidatedRequest, MarketError> {
        if self.base.is_empty() {
            return Err(MarketError::InvalidInput("base must not be empty".to_string()));
        }
        if self.quote.is_empty() {
            return Err(MarketError::InvalidInput("quote must not be empty".to_string()));
        }
        let base_price = Price::new(self.current_base_price_usd).ok_or_else(|| {
            MarketError::InvalidInput(format!(
                "current base price must be positive, got {}",
                self.current_base_price_usd
            ))
        })?;
        let quote_price = Price::new(self.current_quote_price_usd).ok_or_else(|| {
            MarketError::InvalidInput(format!(
                "current quote price must be positive, got {}",
                self.current_quote_price_usd
            ))
        })?;
        if self.base == self.quote {
            return Err(MarketError::SameBaseAndQuote(self.base.clone()));
        }
        let market_type = self.market_type.parse()?;
        Ok(ValidatedRequest {
            market_type,
            base_price,
            quote_price,
            expiry_time: self.expiry_time.with_timezone(&Utc),
        })
    }
}

/// Replacement values for an existing market. identity fields (name, type,
/// base, quote) are not part of an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketUpdate {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub lot_size: Option<u128>,
    pub tick_size: Option<Decimal>,
    pub min_quantity: Option<u128>,
    pub risk_step_size: Option<u128>,
    pub initial_margin_base: Option<Decimal>,
    pub initial_margin_step: Option<Decimal>,
    pub maintenance_margin_ratio: Option<Decimal>,
    pub max_liquidation_order_ticket: Option<u128>,
    pub max_liquidation_order_duration: Option<Duration>,
    pub impact_size: Option<u128>,
    pub mark_price_band: Option<u32>,
    pub last_price_protected_band: Option<u32>,
    pub index_oracle_id: Option<String>,
    pub expiry_time: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub trading_bandwidth: Option<u32>,
}

impl MarketUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(super) fn apply(&self, market: &mut Market) {
        fn set<T: Clone>(field: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *field = v.clone();
            }
        }
        set(&mut market.display_name, &self.display_name);
        set(&mut market.description, &self.description);
        set(&mut market.lot_size, &self.lot_size);
        set(&mut market.tick_size, &self.tick_size);
        set(&mut market.min_quantity, &self.min_quantity);
        set(&mut market.risk_step_size, &self.risk_step_size);
        set(&mut market.initial_margin_base, &self.initial_margin_base);
        set(&mut market.initial_margin_step, &self.initial_margin_step);
        set(&mut market.maintenance_margin_ratio, &self.maintenance_margin_ratio);
        set(&mut market.max_liquidation_order_ticket, &self.max_liquidation_order_ticket);
        set(&mut market.max_liquidation_order_duration, &self.max_liquidation_order_duration);
        set(&mut market.impact_size, &self.impact_size);
        set(&mut market.mark_price_band, &self.mark_price_band);
        set(&mut market.last_price_protected_band, &self.last_price_protected_band);
        set(&mut market.index_oracle_id, &self.index_oracle_id);
        set(&mut market.expiry_time, &self.expiry_time);
        set(&mut market.is_active, &self.is_active);
        set(&mut market.trading_bandwidth, &self.trading_bandwidth);
    }
}
