// 2.0: every failure the core can surface. none are retryable and none are
// recovered locally; the enclosing transition discards its writes on error.

use crate::config::ConfigError;
use crate::events::EventError;
use crate::fixed_point::FixedPointError;
use crate::store::StoreError;
use crate::types::MarketType;

/// Coarse classification of a [`MarketError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    ArithmeticInfeasible,
    NotFound,
    Conflict,
    InvalidMarket,
    InvalidFeeTier,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    #[error("invalid request: {0}")]
    InvalidInput(String),

    #[error("quote and base token can't be the same: {0}")]
    SameBaseAndQuote(String),

    #[error("lot size should not be less than 1: {0}")]
    InvalidLotSize(String),

    #[error("tick size should not be less than 1: {0}")]
    InvalidTickSize(String),

    #[error("min quantity should not be less than 1: {0}")]
    InvalidMinQuantity(String),

    #[error("impact size should not be less than 1: {0}")]
    InvalidImpactSize(String),

    #[error("arithmetic: {0}")]
    Arithmetic(#[from] FixedPointError),

    #[error("token not found: {0}")]
    TokenNotFound(String),

    #[error("token is inactive: {0}")]
    TokenInactive(String),

    #[error("index oracle does not exist: {0}")]
    OracleNotFound(String),

    #[error("market not found: {0}")]
    MarketNotFound(String),

    #[error("duplicate market name: {0}")]
    DuplicateName(String),

    #[error("duplicate market display name: {0}")]
    DuplicateDisplayName(String),

    #[error(
        "market already exists for this base/quote denom, marketType and expiryTime: \
         {market_type} {base}/{quote} expiring {expiry}"
    )]
    MarketNotUnique {
        market_type: MarketType,
        base: String,
        quote: String,
        expiry: String,
    },

    #[error("invalid market: {0}")]
    InvalidMarket(String),

    #[error("tick size cannot be changed when outstanding positions exist: {0}")]
    HasOutstandingPositions(String),

    #[error("market expiry time must be at least 1 hr in the future: {0}")]
    InvalidExpiry(String),

    #[error("fee tier is not valid: {0}")]
    InvalidFeeTier(String),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("event sink: {0}")]
    Event(#[from] EventError),

    /// The transition failed and restoring the previous record failed too.
    #[error("{cause}; undoing the write failed: {rollback}")]
    RollbackFailed {
        cause: Box<MarketError>,
        rollback: StoreError,
    },
}

impl MarketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarketError::InvalidInput(_) | MarketError::SameBaseAndQuote(_) | MarketError::Config(_) => {
                ErrorKind::InvalidInput
            }
            MarketError::InvalidLotSize(_)
            | MarketError::InvalidTickSize(_)
            | MarketError::InvalidMinQuantity(_)
            | MarketError::InvalidImpactSize(_)
            | MarketError::Arithmetic(_) => ErrorKind::ArithmeticInfeasible,
            MarketError::TokenNotFound(_)
            | MarketError::TokenInactive(_)
            | MarketError::OracleNotFound(_)
            | MarketError::MarketNotFound(_) => ErrorKind::NotFound,
            MarketError::DuplicateName(_)
            | MarketError::DuplicateDisplayName(_)
            | MarketError::MarketNotUnique { .. } => ErrorKind::Conflict,
            MarketError::InvalidMarket(_)
            | MarketError::InvalidExpiry(_)
            | MarketError::HasOutstandingPositions(_) => ErrorKind::InvalidMarket,
            MarketError::InvalidFeeTier(_) => ErrorKind::InvalidFeeTier,
            MarketError::Store(_) | MarketError::Event(_) | MarketError::RollbackFailed { .. } => {
                ErrorKind::Internal
            }
        }
    }

    pub(crate) fn invalid_market(reason: &str) -> Self {
        MarketError::InvalidMarket(reason.to_string())
    }
}
