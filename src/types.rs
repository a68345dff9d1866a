// 1.0: primitives shared by every module. market type, prices, tokens, expiry.
// prices are newtypes so a non-positive price cannot reach the generator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MarketError;

/// Unix seconds of 10000-01-01T00:00:00Z. expiries must stay strictly below it.
pub const MAX_EXPIRY_UNIX: i64 = 253_402_300_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Spot,
    Futures,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Spot => "spot",
            MarketType::Futures => "futures",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spot" => Ok(MarketType::Spot),
            "futures" => Ok(MarketType::Futures),
            _ => Err(MarketError::InvalidMarket("market_type is invalid".to_string())),
        }
    }
}

// 1.1: usd price of an asset. must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.2: token registry record. decimals is the base-10 precision of the denom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub denom: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
    pub is_active: bool,
}

impl Token {
    pub fn new(denom: &str, symbol: &str, name: &str, decimals: u32) -> Self {
        Self {
            denom: denom.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            is_active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

// 1.3: expiry. the unix epoch means "never expires".
pub fn perpetual_expiry() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

pub fn is_perpetual_expiry(expiry: &DateTime<Utc>) -> bool {
    expiry.timestamp() == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn market_type_parse() {
        assert_eq!("spot".parse::<MarketType>().unwrap(), MarketType::Spot);
        assert_eq!("futures".parse::<MarketType>().unwrap(), MarketType::Futures);
        assert!(matches!(
            "options".parse::<MarketType>(),
            Err(MarketError::InvalidMarket(_))
        ));
    }

    #[test]
    fn market_type_serde_is_lowercase() {
        let json = serde_json::to_string(&MarketType::Futures).unwrap();
        assert_eq!(json, "\"futures\"");
    }

    #[test]
    fn price_rejects_non_positive() {
        assert!(Price::new(dec!(0)).is_none());
        assert!(Price::new(dec!(-1)).is_none());
        assert_eq!(Price::new(dec!(0.5)).unwrap().value(), dec!(0.5));
    }

    #[test]
    fn perpetual_expiry_is_epoch() {
        assert!(is_perpetual_expiry(&perpetual_expiry()));
        let dated = DateTime::<Utc>::from_timestamp(1_900_000_000, 0).unwrap();
        assert!(!is_perpetual_expiry(&dated));
    }
}
