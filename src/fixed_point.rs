//! Exact base-10 arithmetic used by the parameter generator and validator.
//!
//! Decimals are `rust_decimal::Decimal`; integer quantities are `u128`.
//! Intermediate quotients and products are quantised to [`DEC_PRECISION`]
//! places with banker's rounding so every replica produces the same digits.
//! Nothing here touches binary floating point.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};

/// Decimal places kept after every division or multiplication.
pub const DEC_PRECISION: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixedPointError {
    #[error("decimal overflow while {0}")]
    Overflow(&'static str),

    #[error("division by zero while {0}")]
    DivisionByZero(&'static str),

    #[error("value {0} is not a non-negative integer in range")]
    OutOfRange(Decimal),

    #[error("{0} is undefined for values below 1")]
    BelowOne(&'static str),

    #[error("significant figures must be at least 1")]
    InvalidSignificantFigures,

    #[error("leading digit {0} outside 1..=9")]
    InvalidLeadingDigit(u128),
}

pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp(DEC_PRECISION)
}

pub fn checked_quo(a: Decimal, b: Decimal) -> Result<Decimal, FixedPointError> {
    if b.is_zero() {
        return Err(FixedPointError::DivisionByZero("dividing"));
    }
    a.checked_div(b)
        .map(quantize)
        .ok_or(FixedPointError::Overflow("dividing"))
}

pub fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, FixedPointError> {
    a.checked_mul(b)
        .map(quantize)
        .ok_or(FixedPointError::Overflow("multiplying"))
}

/// 10^exp as an integer.
pub fn pow10(exp: u32) -> Result<u128, FixedPointError> {
    10u128
        .checked_pow(exp)
        .ok_or(FixedPointError::Overflow("raising 10 to a power"))
}

fn pow10_decimal(exp: u64) -> Result<Decimal, FixedPointError> {
    Decimal::TEN
        .checked_powu(exp)
        .ok_or(FixedPointError::Overflow("raising 10 to a power"))
}

/// Multiplies `value` by 10^places, or divides when `places` is negative.
pub fn decimal_shift(value: Decimal, places: i64) -> Result<Decimal, FixedPointError> {
    let factor = pow10_decimal(places.unsigned_abs())?;
    if places >= 0 {
        checked_mul(value, factor)
    } else {
        checked_quo(value, factor)
    }
}

/// Smallest integer not below `value`. negative results are rejected.
pub fn ceil_to_int(value: Decimal) -> Result<u128, FixedPointError> {
    let ceiled = value.ceil();
    ceiled.to_u128().ok_or(FixedPointError::OutOfRange(ceiled))
}

/// Integer part of `value`, dropping the fraction.
pub fn truncate_to_int(value: Decimal) -> Result<u128, FixedPointError> {
    let truncated = value.trunc();
    truncated.to_u128().ok_or(FixedPointError::OutOfRange(truncated))
}

pub fn int_to_decimal(value: u128) -> Result<Decimal, FixedPointError> {
    Decimal::from_u128(value).ok_or(FixedPointError::Overflow("converting an integer to decimal"))
}

/// Number of base-10 digits of `n`. fails for `n < 1`.
pub fn digit_count(n: u128) -> Result<u32, FixedPointError> {
    if n < 1 {
        return Err(FixedPointError::BelowOne("digit_count"));
    }
    Ok(n.ilog10() + 1)
}

/// Splits `n` into its leading digit and the positional factor 10^(digits-1).
/// 51234567 -> (5, 10_000_000)
pub fn leading_digit(n: u128) -> Result<(u128, u128), FixedPointError> {
    let digits = digit_count(n)?;
    let factor = pow10(digits - 1)?;
    Ok((n / factor, factor))
}

/// Keeps the leading `sf` digits of `n` and zeroes the rest.
///
/// This truncates: 3399 at 2 s.f. is 3300, not 3400. Every derived
/// minimum quantity and impact size depends on this exact behaviour.
pub fn round_to_significant_figures(n: u128, sf: u32) -> Result<u128, FixedPointError> {
    if sf < 1 {
        return Err(FixedPointError::InvalidSignificantFigures);
    }
    let digits = digit_count(n)?;
    let exponent = digits.saturating_sub(sf);
    let factor = pow10(exponent)?;
    Ok(n / factor * factor)
}

/// 1..=4 -> 1, 5..=9 -> 10
pub fn round_to_nearest_ten(digit: u128) -> Result<u128, FixedPointError> {
    match digit {
        1..=4 => Ok(1),
        5..=9 => Ok(10),
        _ => Err(FixedPointError::InvalidLeadingDigit(digit)),
    }
}

/// 1..=3 -> 1, 4..=6 -> 5, 7..=9 -> 10
pub fn round_to_nearest_five(digit: u128) -> Result<u128, FixedPointError> {
    match digit {
        1..=3 => Ok(1),
        4..=6 => Ok(5),
        7..=9 => Ok(10),
        _ => Err(FixedPointError::InvalidLeadingDigit(digit)),
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Whether `value * n` is an exact integer, computed without forming the
/// product so large lot sizes cannot overflow.
pub fn is_integral_product(value: Decimal, n: u128) -> bool {
    let normalized = value.normalize();
    let scale = normalized.scale();
    if scale == 0 {
        return true;
    }
    let numerator = normalized.mantissa().unsigned_abs();
    // scale never exceeds 28, so 10^scale always fits
    let denominator = 10u128.pow(scale);
    let reduced = denominator / gcd(numerator, denominator);
    n % reduced == 0
}
