//! Engine configuration options.

use crate::config::{ControlledParams, Environment, MarketParams};

/// Sequence key for market names.
pub const MARKET_NAME_SEQUENCE_KEY: &str = "market_name";

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Generation targets and futures defaults.
    pub params: MarketParams,
    /// Governance controlled values such as the funding interval.
    pub controlled_params: ControlledParams,
    /// Keep an in-memory index of uniqueness keys and display names
    /// instead of scanning the store on every check.
    pub use_secondary_index: bool,
    /// Market names are `<prefix>/<seq>`.
    pub name_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            params: MarketParams::default(),
            controlled_params: ControlledParams::default(),
            use_secondary_index: false,
            name_prefix: "mkt".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn for_environment(env: Environment) -> Self {
        Self {
            params: env.params(),
            controlled_params: env.controlled_params(),
            ..Self::default()
        }
    }

    pub fn with_secondary_index(mut self) -> Self {
        self.use_secondary_index = true;
        self
    }

    pub(super) fn market_name(&self, seq: u64) -> String {
        format!("{}/{}", self.name_prefix, seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn names_use_prefix() {
        let config = EngineConfig::default();
        assert_eq!(config.market_name(12), "mkt/12");
    }

    #[test]
    fn development_shortens_funding_interval() {
        let config = EngineConfig::for_environment(Environment::Development);
        assert_eq!(
            config.controlled_params.perpetuals_funding_interval,
            Duration::from_secs(60)
        );
        let config = EngineConfig::for_environment(Environment::Mainnet);
        assert_eq!(
            config.controlled_params.perpetuals_funding_interval,
            Duration::from_secs(3600)
        );
    }
}
