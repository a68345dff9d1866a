// 3.0 config.rs: generation targets and controlled params in one place.
// 3.1 MarketParams holds the usd targets the generator snaps onto its grid,
// plus the risk defaults stamped onto newly generated futures markets.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Risk fields written onto every generated futures market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuturesDefaults {
    // quantity of base per risk step. zero disables stepped margin
    pub risk_step_size: u128,
    // 0.01 = 1% initial margin, i.e. 100x
    pub initial_margin_base: Decimal,
    // added to initial_margin_base per risk step
    pub initial_margin_step: Decimal,
    // fraction of initial margin at which liquidation starts
    pub maintenance_margin_ratio: Decimal,
    pub max_liquidation_order_duration: Duration,
    // max liquidation ticket = multiplier * min quantity
    pub liquidation_ticket_multiplier: u128,
    pub mark_price_band: u32,
    pub last_price_protected_band: u32,
    pub trading_bandwidth: u32,
}

impl Default for FuturesDefaults {
    fn default() -> Self {
        Self {
            risk_step_size: 0,
            initial_margin_base: dec!(0.05), // 20x
            initial_margin_step: Decimal::ZERO,
            maintenance_margin_ratio: dec!(0.5),
            max_liquidation_order_duration: Duration::from_secs(30),
            liquidation_ticket_multiplier: 1000,
            mark_price_band: 2000,
            last_price_protected_band: 200,
            trading_bandwidth: 1500, // +/- 7.5%
        }
    }
}

/// Parameters read by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketParams {
    /// usd worth of one lot, ~$0.10
    pub default_lot_size_usd: Decimal,
    /// tick target, scaled by base price over quote price
    pub default_tick_size_usd: Decimal,
    /// usd worth of the smallest order, ~$1
    pub default_min_quantity_usd: Decimal,
    /// usd notional used to measure impact price, ~$100k
    pub default_impact_size_usd: Decimal,
    #[serde(default)]
    pub futures: FuturesDefaults,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            default_lot_size_usd: dec!(0.1),
            default_tick_size_usd: dec!(0.0001),
            default_min_quantity_usd: dec!(1),
            default_impact_size_usd: dec!(100000),
            futures: FuturesDefaults::default(),
        }
    }
}

impl MarketParams {
    // coarser grids for test networks
    pub fn testnet() -> Self {
        Self {
            default_lot_size_usd: dec!(1),
            default_min_quantity_usd: dec!(10),
            default_impact_size_usd: dec!(10000),
            ..Self::default()
        }
    }

    pub fn mainnet_conservative() -> Self {
        let mut params = Self::default();
        params.futures.initial_margin_base = dec!(0.1); // 10x
        params.futures.mark_price_band = 1000;
        params.futures.trading_bandwidth = 1000;
        params
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let targets = [
            ("default_lot_size_usd", self.default_lot_size_usd),
            ("default_tick_size_usd", self.default_tick_size_usd),
            ("default_min_quantity_usd", self.default_min_quantity_usd),
            ("default_impact_size_usd", self.default_impact_size_usd),
        ];
        for (field, value) in targets {
            if value <= Decimal::ZERO {
                return Err(ConfigError::InvalidTarget {
                    field,
                    reason: "must be positive".to_string(),
                });
            }
        }
        if self.default_min_quantity_usd < self.default_lot_size_usd {
            return Err(ConfigError::InvalidTarget {
                field: "default_min_quantity_usd",
                reason: "must not be below default_lot_size_usd".to_string(),
            });
        }

        let f = &self.futures;
        if f.initial_margin_base <= Decimal::ZERO {
            return Err(ConfigError::InvalidFutures {
                reason: "initial_margin_base must be positive".to_string(),
            });
        }
        if f.maintenance_margin_ratio <= Decimal::ZERO || f.maintenance_margin_ratio >= Decimal::ONE {
            return Err(ConfigError::InvalidFutures {
                reason: "maintenance_margin_ratio must be between 0 and 1".to_string(),
            });
        }
        if (f.risk_step_size == 0) != f.initial_margin_step.is_zero() || f.initial_margin_step < Decimal::ZERO {
            return Err(ConfigError::InvalidFutures {
                reason: "risk_step_size and initial_margin_step must be both zero or both positive".to_string(),
            });
        }
        if f.liquidation_ticket_multiplier < 1000 {
            return Err(ConfigError::InvalidFutures {
                reason: "liquidation_ticket_multiplier must be at least 1000".to_string(),
            });
        }
        if f.max_liquidation_order_duration < Duration::from_secs(30) {
            return Err(ConfigError::InvalidFutures {
                reason: "max_liquidation_order_duration must be at least 30 seconds".to_string(),
            });
        }
        for (name, band) in [
            ("mark_price_band", f.mark_price_band),
            ("last_price_protected_band", f.last_price_protected_band),
        ] {
            if band == 0 || band > 20000 {
                return Err(ConfigError::InvalidFutures {
                    reason: format!("{name} must be between 0 and 20000"),
                });
            }
        }
        Ok(())
    }
}

/** 3.2: governance controlled params. funding interval only for now */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlledParams {
    pub perpetuals_funding_interval: Duration,
}

impl ControlledParams {
    // shortened interval is for test genesis only; the caller opts in explicitly
    pub fn new(shorten_funding_interval: bool) -> Self {
        let minutes = if shorten_funding_interval { 1 } else { 60 };
        Self {
            perpetuals_funding_interval: Duration::from_secs(minutes * 60),
        }
    }

    pub fn validate_funding_interval(interval: Duration) -> Result<(), ConfigError> {
        let hour = Duration::from_secs(3600);
        if interval.as_nanos() % hour.as_nanos() != 0 {
            return Err(ConfigError::InvalidFundingInterval {
                reason: "perpetuals funding interval must be in hours resolution".to_string(),
            });
        }
        if interval < hour {
            return Err(ConfigError::InvalidFundingInterval {
                reason: "perpetuals funding interval must be at least 1 hour".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ControlledParams {
    fn default() -> Self {
        Self::new(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot parse params: {reason}")]
    Parse { reason: String },

    #[error("{field} {reason}")]
    InvalidTarget { field: &'static str, reason: String },

    #[error("futures defaults: {reason}")]
    InvalidFutures { reason: String },

    #[error("{reason}")]
    InvalidFundingInterval { reason: String },
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Testnet,
    Mainnet,
}

impl Environment {
    pub fn params(&self) -> MarketParams {
        match self {
            Environment::Development => MarketParams::default(),
            Environment::Testnet => MarketParams::testnet(),
            Environment::Mainnet => MarketParams::mainnet_conservative(),
        }
    }

    pub fn controlled_params(&self) -> ControlledParams {
        ControlledParams::new(matches!(self, Environment::Development))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        assert!(MarketParams::default().validate().is_ok());
    }

    #[test]
    fn test_environment_presets() {
        assert!(Environment::Development.params().validate().is_ok());
        assert!(Environment::Testnet.params().validate().is_ok());
        assert!(Environment::Mainnet.params().validate().is_ok());
    }

    #[test]
    fn test_non_positive_target_rejected() {
        let mut params = MarketParams::default();
        params.default_lot_size_usd = Decimal::ZERO;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvalidTarget { field: "default_lot_size_usd", .. })
        ));
    }

    #[test]
    fn test_invalid_maintenance_ratio() {
        let mut params = MarketParams::default();
        params.futures.maintenance_margin_ratio = dec!(1.1);
        assert!(matches!(params.validate(), Err(ConfigError::InvalidFutures { .. })));
    }

    #[test]
    fn test_mismatched_risk_step() {
        let mut params = MarketParams::default();
        params.futures.risk_step_size = 10_000_000;
        assert!(matches!(params.validate(), Err(ConfigError::InvalidFutures { .. })));
        params.futures.initial_margin_step = dec!(0.000005);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let raw = r#"
            default_lot_size_usd = "0.5"
            default_tick_size_usd = "0.0001"
            default_min_quantity_usd = "5"
            default_impact_size_usd = "50000"
        "#;
        let params = MarketParams::from_toml_str(raw).unwrap();
        assert_eq!(params.default_lot_size_usd, dec!(0.5));
        assert_eq!(params.futures, FuturesDefaults::default());
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        assert!(matches!(
            MarketParams::from_toml_str("default_lot_size_usd = ["),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_funding_interval() {
        assert_eq!(
            ControlledParams::default().perpetuals_funding_interval,
            Duration::from_secs(3600)
        );
        assert_eq!(
            ControlledParams::new(true).perpetuals_funding_interval,
            Duration::from_secs(60)
        );
        assert!(ControlledParams::validate_funding_interval(Duration::from_secs(7200)).is_ok());
        assert!(ControlledParams::validate_funding_interval(Duration::from_secs(5400)).is_err());
        assert!(ControlledParams::validate_funding_interval(Duration::ZERO).is_err());
    }

    #[test]
    fn test_params_serialization() {
        let params = MarketParams::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: MarketParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
