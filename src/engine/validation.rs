//! Checks that need collaborators, run after `validate_basic` on create and
//! update.

use chrono::{DateTime, Duration, Utc};

use crate::collaborators::OracleRegistry;
use crate::error::MarketError;
use crate::market::Market;
use crate::types::is_perpetual_expiry;

/// Futures expiries must lie at least this far past the reference time.
pub fn min_expiry_lead() -> Duration {
    Duration::hours(1)
}

/// Oracle existence and expiry lead time for futures markets. spot markets
/// have nothing to check here.
pub fn validate_market(
    market: &Market,
    oracles: &dyn OracleRegistry,
    now: DateTime<Utc>,
) -> Result<(), MarketError> {
    if !market.is_futures() {
        return Ok(());
    }
    if !oracles.exists(&market.index_oracle_id) {
        return Err(MarketError::OracleNotFound(market.index_oracle_id.clone()));
    }
    if market.is_settled || is_perpetual_expiry(&market.expiry_time) {
        return Ok(());
    }
    let earliest = now
        .checked_add_signed(min_expiry_lead())
        .ok_or_else(|| MarketError::InvalidExpiry(format!("reference time {now} out of range")))?;
    if market.expiry_time < earliest {
        return Err(MarketError::InvalidExpiry(format!(
            "expiry {} is before {}",
            market.expiry_time.to_rfc3339(),
            earliest.to_rfc3339()
        )));
    }
    Ok(())
}
