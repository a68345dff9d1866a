//! Market record and its structural validation.
//!
//! A market is a single base/quote pair with its trading increments and,
//! for futures, the risk parameters the margin engine reads. The record is
//! created once by the engine and afterwards only changed through explicit
//! update, settle or disable operations.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::MarketError;
use crate::fixed_point::is_integral_product;
use crate::types::{is_perpetual_expiry, perpetual_expiry, MarketType, MAX_EXPIRY_UNIX};

/// System wide maximum for lot size and tick size: 10^30.
pub const MAX_LOT_SIZE: u128 = 1_000_000_000_000_000_000_000_000_000_000;
pub const MAX_TICK_SIZE: u128 = MAX_LOT_SIZE;

pub const MAX_MARKET_NAME_LENGTH: usize = 128;
pub const MAX_MARKET_DISPLAY_NAME_LENGTH: usize = 128;

/// Upper bound for mark price and last price protected bands.
pub const MAX_PRICE_BAND: u32 = 20000;

pub const MIN_LIQUIDATION_ORDER_DURATION: Duration = Duration::from_secs(30);

/// Liquidation tickets must cover at least this many minimum quantities.
pub const MIN_LIQUIDATION_TICKET_MULTIPLE: u128 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    /// Immutable unique key, e.g. "mkt/12"
    pub name: String,
    /// Unique human label, e.g. "BTC_PERP.USDC"
    pub display_name: String,
    pub description: String,
    pub market_type: MarketType,
    pub base: String,
    pub quote: String,
    pub base_precision: u32,
    pub quote_precision: u32,
    /// Smallest tradable quantity step, in raw base units
    pub lot_size: u128,
    /// Smallest price step, in raw quote per raw base
    pub tick_size: Decimal,
    pub min_quantity: u128,
    pub risk_step_size: u128,
    pub initial_margin_base: Decimal,
    pub initial_margin_step: Decimal,
    pub maintenance_margin_ratio: Decimal,
    pub max_liquidation_order_ticket: u128,
    pub max_liquidation_order_duration: Duration,
    pub impact_size: u128,
    pub mark_price_band: u32,
    pub last_price_protected_band: u32,
    pub index_oracle_id: String,
    /// Unix epoch means perpetual
    pub expiry_time: DateTime<Utc>,
    pub is_active: bool,
    pub is_settled: bool,
    pub trading_bandwidth: u32,
    pub created_block_height: u64,
    pub closed_block_height: u64,
}

impl Market {
    /// A spot market with neutral risk fields. callers fill in the increments.
    pub fn spot(name: &str, display_name: &str, base: &str, quote: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            description: format!("{}/{} Spot Market", base.to_uppercase(), quote.to_uppercase()),
            market_type: MarketType::Spot,
            base: base.to_string(),
            quote: quote.to_string(),
            base_precision: 0,
            quote_precision: 0,
            lot_size: 1,
            tick_size: Decimal::ONE,
            min_quantity: 1,
            risk_step_size: 0,
            initial_margin_base: Decimal::ONE,
            initial_margin_step: Decimal::ZERO,
            maintenance_margin_ratio: Decimal::ZERO,
            max_liquidation_order_ticket: 0,
            max_liquidation_order_duration: Duration::ZERO,
            impact_size: 0,
            mark_price_band: 0,
            last_price_protected_band: 0,
            index_oracle_id: String::new(),
            expiry_time: perpetual_expiry(),
            is_active: true,
            is_settled: false,
            trading_bandwidth: 0,
            created_block_height: 0,
            closed_block_height: 0,
        }
    }

    pub fn is_spot(&self) -> bool {
        self.market_type == MarketType::Spot
    }

    pub fn is_futures(&self) -> bool {
        self.market_type == MarketType::Futures
    }

    pub fn is_perpetual_futures(&self) -> bool {
        self.is_futures() && is_perpetual_expiry(&self.expiry_time)
    }

    /// Structural checks, first violation wins. generic rules run before the
    /// rules of the declared market type.
    pub fn validate_basic(&self) -> Result<(), MarketError> {
        self.validate_generic()?;
        match self.market_type {
            MarketType::Spot => self.validate_spot(),
            MarketType::Futures => self.validate_futures(),
        }
    }

    fn validate_generic(&self) -> Result<(), MarketError> {
        let invalid = MarketError::invalid_market;

        if self.name.is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if !self.name.chars().all(is_name_char) {
            return Err(invalid("name must contain only a-z, A-Z, 0-9, _, '.' or '/'"));
        }
        if self.name.len() > MAX_MARKET_NAME_LENGTH {
            return Err(MarketError::InvalidMarket(format!(
                "name must be equal or less than {MAX_MARKET_NAME_LENGTH} in length"
            )));
        }
        if self.display_name.is_empty() {
            return Err(invalid("display_name must not be empty"));
        }
        if !self.display_name.chars().all(is_display_name_char) {
            return Err(invalid("display_name must contain only a-z, A-Z, 0-9, _, space, or '.'"));
        }
        if self.display_name.len() > MAX_MARKET_DISPLAY_NAME_LENGTH {
            return Err(MarketError::InvalidMarket(format!(
                "display_name must be equal or less than {MAX_MARKET_DISPLAY_NAME_LENGTH} in length"
            )));
        }
        if self.description.is_empty() {
            return Err(invalid("description must not be empty"));
        }
        if self.base.is_empty() {
            return Err(invalid("base must not be empty"));
        }
        if self.quote.is_empty() {
            return Err(invalid("quote must not be empty"));
        }
        if self.lot_size == 0 {
            return Err(invalid("lot_size must be more than zero"));
        }
        if self.lot_size > MAX_LOT_SIZE {
            return Err(invalid("lot_size is too large"));
        }
        if self.tick_size <= Decimal::ZERO {
            return Err(invalid("tick_size must be positive"));
        }
        if !is_integral_product(self.tick_size, self.lot_size) {
            return Err(invalid("tick_size * lot_size must be an integer"));
        }
        let tick_too_large = self
            .tick_size
            .trunc()
            .to_u128()
            .map_or(true, |whole| whole > MAX_TICK_SIZE);
        if tick_too_large {
            return Err(invalid("tick_size is too large"));
        }
        if self.min_quantity == 0 {
            return Err(invalid("min_quantity must be positive"));
        }
        if self.min_quantity < self.lot_size {
            return Err(invalid("min_quantity must be greater or equal to lot_size"));
        }
        if self.min_quantity % self.lot_size != 0 {
            return Err(MarketError::InvalidMarket(format!(
                "min_quantity: {} is not divisible by lot_size: {}",
                self.min_quantity, self.lot_size
            )));
        }
        Ok(())
    }

    fn validate_spot(&self) -> Result<(), MarketError> {
        let invalid = MarketError::invalid_market;

        if self.risk_step_size != 0 {
            return Err(invalid("risk_step_size for spot markets must be zero"));
        }
        if self.initial_margin_base != Decimal::ONE {
            return Err(invalid("initial_margin_base for spot markets must be 100%"));
        }
        if !self.initial_margin_step.is_zero() {
            return Err(invalid("initial_margin_step for spot markets must be zero"));
        }
        if !self.maintenance_margin_ratio.is_zero() {
            return Err(invalid("maintenance_margin_ratio for spot markets must be zero"));
        }
        if self.max_liquidation_order_ticket != 0 {
            return Err(invalid("max_liquidation_order_ticket for spot markets must be zero"));
        }
        if self.impact_size != 0 {
            return Err(invalid("impact_size for spot markets must be zero"));
        }
        if self.mark_price_band != 0 {
            return Err(invalid("mark_price_band for spot markets must be zero"));
        }
        if self.last_price_protected_band != 0 {
            return Err(invalid("last_price_protected_band for spot markets must be zero"));
        }
        if !self.index_oracle_id.is_empty() {
            return Err(invalid("index_oracle_id for spot markets must be empty"));
        }
        if !is_perpetual_expiry(&self.expiry_time) {
            return Err(invalid("expiry_time for spot markets must be zero"));
        }
        if !self.max_liquidation_order_duration.is_zero() {
            return Err(invalid("max_liquidation_order_duration for spot markets must be zero"));
        }
        if self.trading_bandwidth != 0 {
            return Err(invalid("trading_bandwidth for spot markets must be zero"));
        }
        Ok(())
    }

    fn validate_futures(&self) -> Result<(), MarketError> {
        let invalid = MarketError::invalid_market;

        if self.initial_margin_base <= Decimal::ZERO {
            return Err(invalid("initial_margin_base for future markets must be positive"));
        }
        if self.maintenance_margin_ratio <= Decimal::ZERO
            || self.maintenance_margin_ratio >= Decimal::ONE
        {
            return Err(invalid(
                "maintenance_margin_ratio for futures markets must between zero and one",
            ));
        }
        if self.initial_margin_step < Decimal::ZERO {
            return Err(invalid("initial_margin_step must not be negative"));
        }
        if (self.risk_step_size == 0) != self.initial_margin_step.is_zero() {
            return Err(invalid(
                "risk_step_size and initial_margin_step must be either both zero or both not zero",
            ));
        }
        let ticket_too_small = self
            .min_quantity
            .checked_mul(MIN_LIQUIDATION_TICKET_MULTIPLE)
            .map_or(true, |required| self.max_liquidation_order_ticket < required);
        if ticket_too_small {
            return Err(invalid("max_liquidation_order_ticket must be at least 1000x of min_quantity"));
        }
        if self.impact_size == 0 {
            return Err(invalid("impact_size for futures markets must be positive"));
        }
        if self.mark_price_band == 0 || self.mark_price_band > MAX_PRICE_BAND {
            return Err(invalid("mark_price_band for futures markets must be between 0 and 20000"));
        }
        if self.last_price_protected_band == 0 || self.last_price_protected_band > MAX_PRICE_BAND {
            return Err(invalid("last_price_protected_band must be between 0 and 20000"));
        }
        if self.index_oracle_id.is_empty() {
            return Err(invalid("index_oracle_id (empty) is required for futures markets"));
        }
        if self.max_liquidation_order_duration < MIN_LIQUIDATION_ORDER_DURATION {
            return Err(invalid("max_liquidation_order_duration must be at least 30 seconds"));
        }
        if self.expiry_time.timestamp() >= MAX_EXPIRY_UNIX {
            return Err(MarketError::InvalidInput(format!(
                "market expiry time's unix must be less than {MAX_EXPIRY_UNIX}"
            )));
        }
        Ok(())
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/')
}

fn is_display_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ' ')
}
