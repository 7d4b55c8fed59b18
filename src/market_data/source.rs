use std::future::Future;

use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::market_data::{DateRange, PriceSeries};
use crate::types::Interval;

/// Parameters of one historical fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRequest {
    pub ticker: String,
    pub range: DateRange,
    pub interval: Interval,
}

impl FetchRequest {
    /// Normalise the ticker (trimmed, upper-case) and reject an empty one.
    pub fn new(ticker: &str, range: DateRange, interval: Interval) -> Result<Self> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(DashboardError::config("ticker must not be empty"));
        }
        Ok(Self {
            ticker,
            range,
            interval,
        })
    }
}

/// Boundary to an external provider of historical OHLCV bars.
///
/// Implementations return bars sorted ascending with missing sessions left
/// absent.  `NetworkFailure` must stay distinguishable from `NotFound`: the
/// former is retryable, the latter is a user-facing "unknown ticker".
pub trait MarketDataSource: Send + Sync {
    fn fetch(&self, request: &FetchRequest) -> impl Future<Output = Result<PriceSeries>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn ticker_is_normalised() {
        let req = FetchRequest::new("  aapl ", range(), Interval::Daily).unwrap();
        assert_eq!(req.ticker, "AAPL");
    }

    #[test]
    fn blank_ticker_rejected() {
        let err = FetchRequest::new("   ", range(), Interval::Daily).unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }
}
