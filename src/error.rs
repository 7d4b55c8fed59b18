// =============================================================================
// Dashboard Error Kinds
// =============================================================================
//
// Every stage of the pipeline (fetch, indicators, composition) reports failures
// through `DashboardError`.  Messages are written for end users: the API layer
// forwards them verbatim.
// =============================================================================

use chrono::NaiveDate;
use thiserror::Error;

/// Result alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// Start date after end date. Caller-fixable.
    #[error("invalid date range: start {start} is after end {end}")]
    RangeInvalid { start: NaiveDate, end: NaiveDate },

    /// The data source does not know the ticker.
    #[error("ticker '{ticker}' not found")]
    NotFound { ticker: String },

    /// Transport failure, timeout, or an unusable provider response.
    #[error("market data request for '{ticker}' failed: {reason}")]
    NetworkFailure { ticker: String, reason: String },

    /// Not enough bars for the requested indicator window.
    #[error("need at least {required} bars for {indicator}, got {available}")]
    InsufficientData {
        indicator: String,
        required: usize,
        available: usize,
    },

    /// Invalid parameters or mismatched overlay/base ranges.
    #[error("configuration error: {0}")]
    Config(String),

    /// The source returned no bars for an otherwise valid request.
    #[error("no price data for '{ticker}' in the requested range")]
    NoData { ticker: String },
}

impl DashboardError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn insufficient(indicator: impl Into<String>, required: usize, available: usize) -> Self {
        Self::InsufficientData {
            indicator: indicator.into(),
            required,
            available,
        }
    }

    /// `true` for failures the caller may reasonably retry unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkFailure { .. })
    }

    /// Stable machine-readable kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RangeInvalid { .. } => "range_invalid",
            Self::NotFound { .. } => "not_found",
            Self::NetworkFailure { .. } => "network_failure",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::Config(_) => "config_error",
            Self::NoData { .. } => "no_data",
        }
    }
}
