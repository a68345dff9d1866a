//! Trading increment derivation.
//!
//! Each increment starts from a usd target in [`MarketParams`], converts it
//! to raw base units at the current usd price, then snaps it onto a coarse
//! grid so that markets get human friendly numbers:
//!
//! - lot size: leading digit to the nearest 1 or 10 (`{1, 10} * 10^k`)
//! - tick size: leading digit to the nearest 1, 5 or 10, chosen so that
//!   `tick_size * lot_size` is an integer
//! - min quantity: 2 significant figures, then up to a multiple of lot size
//! - impact size: 2 significant figures
//!
//! All functions fail instead of clamping when the target is below one raw
//! unit; that only happens when the supplied prices are implausible.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::config::MarketParams;
use crate::error::MarketError;
use crate::fixed_point::{
    ceil_to_int, checked_mul, checked_quo, decimal_shift, int_to_decimal, leading_digit,
    round_to_nearest_five, round_to_nearest_ten, round_to_significant_figures,
};
use crate::types::{is_perpetual_expiry, MarketType, Price};

fn usd_target_in_base_units(
    usd_target: Decimal,
    base_price: Price,
    base_decimals: u32,
) -> Result<u128, MarketError> {
    let base_amount = checked_quo(usd_target, base_price.value())?;
    Ok(ceil_to_int(decimal_shift(base_amount, base_decimals as i64)?)?)
}

/// Snaps `target` to `{1, 10} * 10^(digits-1)`. 51234567 -> 100000000
pub fn snap_to_nearest_ten(target: u128) -> Result<u128, MarketError> {
    let (digit, factor) = leading_digit(target)?;
    round_to_nearest_ten(digit)?
        .checked_mul(factor)
        .ok_or_else(|| MarketError::InvalidLotSize(format!("{target} overflows when snapped")))
}

/// Snaps `target` to `{1, 5, 10} * 10^(digits-1)`. 41234567 -> 50000000
pub fn snap_to_nearest_five(target: u128) -> Result<u128, MarketError> {
    let (digit, factor) = leading_digit(target)?;
    round_to_nearest_five(digit)?
        .checked_mul(factor)
        .ok_or_else(|| MarketError::InvalidTickSize(format!("{target} overflows when snapped")))
}

/// Number of raw base units worth `default_lot_size_usd`.
pub fn generate_lot_size(
    params: &MarketParams,
    base_price: Price,
    base_decimals: u32,
) -> Result<u128, MarketError> {
    let target = usd_target_in_base_units(params.default_lot_size_usd, base_price, base_decimals)?;
    if target < 1 {
        return Err(MarketError::InvalidLotSize(format!(
            "lot size: {target}, please recheck current base price"
        )));
    }
    snap_to_nearest_ten(target)
}

/// Price increment in raw quote per raw base, such that one lot always
/// moves by an integer amount of quote.
pub fn generate_tick_size(
    params: &MarketParams,
    base_price: Price,
    quote_price: Price,
    base_decimals: u32,
    quote_decimals: u32,
    lot_size: u128,
) -> Result<Decimal, MarketError> {
    // raw price = raw quote / raw base
    let precision_diff = quote_decimals as i64 - base_decimals as i64;
    let ratio = checked_quo(
        checked_mul(params.default_tick_size_usd, base_price.value())?,
        quote_price.value(),
    )?;
    let target = decimal_shift(ratio, precision_diff)?;
    let target_int = ceil_to_int(checked_mul(target, int_to_decimal(lot_size)?)?)?;
    if target_int < 1 {
        return Err(MarketError::InvalidTickSize(format!(
            "tick size: {target_int}, please recheck current base price and current quote price"
        )));
    }
    let snapped = snap_to_nearest_five(target_int)?;
    let tick_size = checked_quo(int_to_decimal(snapped)?, int_to_decimal(lot_size)?)?;
    Ok(tick_size.normalize())
}

/// Raw base units worth `default_min_quantity_usd`, at 2 s.f., rounded up
/// to a whole number of lots.
pub fn generate_min_quantity(
    params: &MarketParams,
    base_price: Price,
    base_decimals: u32,
    lot_size: u128,
) -> Result<u128, MarketError> {
    if lot_size < 1 {
        return Err(MarketError::InvalidLotSize(format!("lot size: {lot_size}")));
    }
    let target =
        usd_target_in_base_units(params.default_min_quantity_usd, base_price, base_decimals)?;
    if target < 1 {
        return Err(MarketError::InvalidMinQuantity(format!(
            "min quantity: {target}, please recheck current base price"
        )));
    }
    let target = round_to_significant_figures(target, 2)?;
    target
        .div_ceil(lot_size)
        .checked_mul(lot_size)
        .ok_or_else(|| MarketError::InvalidMinQuantity(format!("min quantity {target} overflows")))
}

/// Raw base units worth `default_impact_size_usd`, at 2 s.f.
pub fn generate_impact_size(
    params: &MarketParams,
    base_price: Price,
    base_decimals: u32,
) -> Result<u128, MarketError> {
    let target =
        usd_target_in_base_units(params.default_impact_size_usd, base_price, base_decimals)?;
    if target < 1 {
        return Err(MarketError::InvalidImpactSize(format!(
            "impact size: {target}, please recheck current base price"
        )));
    }
    Ok(round_to_significant_figures(target, 2)?)
}

/// BTC_USDC, BTC_PERP.USDC or BTC_31DEC29.USDC
pub fn generate_display_name(
    market_type: MarketType,
    base_symbol: &str,
    quote_symbol: &str,
    expiry: &DateTime<Utc>,
) -> String {
    let name = match market_type {
        MarketType::Futures if is_perpetual_expiry(expiry) => {
            format!("{base_symbol}_PERP.{quote_symbol}")
        }
        MarketType::Futures => {
            format!("{base_symbol}_{}.{quote_symbol}", expiry.format("%d%b%y"))
        }
        MarketType::Spot => format!("{base_symbol}_{quote_symbol}"),
    };
    name.to_uppercase()
}

pub fn generate_description(
    market_type: MarketType,
    base_name: &str,
    base_symbol: &str,
    quote_symbol: &str,
    expiry: &DateTime<Utc>,
) -> String {
    match market_type {
        MarketType::Futures if is_perpetual_expiry(expiry) => {
            format!("{base_name} Perpetual Futures")
        }
        MarketType::Futures => {
            format!("{base_name} Futures Expiring {}", expiry.format("%-d %B %Y"))
        }
        MarketType::Spot => {
            format!(
                "{}/{} Spot Market",
                base_symbol.to_uppercase(),
                quote_symbol.to_uppercase()
            )
        }
    }
}
