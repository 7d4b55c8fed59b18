use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::types::Interval;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar. `timestamp` is the bar open time in Unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Inclusive calendar date range of a request.
///
/// Only [`DateRange::new`] and [`DateRange::lookback`] build one, so
/// `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::RangeInvalid { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering `days` calendar days up to and including `end`.
    pub fn lookback(end: NaiveDate, days: u32) -> Result<Self> {
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| DashboardError::config(format!("lookback of {days} days is out of range")))?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Start of the range as Unix seconds (00:00 UTC).
    pub fn start_unix_secs(&self) -> i64 {
        midnight_unix_secs(self.start)
    }

    /// Exclusive upper bound as Unix seconds: 00:00 UTC of the day after `end`.
    pub fn end_exclusive_unix_secs(&self) -> i64 {
        midnight_unix_secs(self.end) + 86_400
    }
}

fn midnight_unix_secs(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// PriceSeries -- validated, immutable bar sequence
// ---------------------------------------------------------------------------

/// Ordered bars for one ticker and interval.
///
/// Guaranteed non-empty with strictly increasing timestamps.  Fields are private
/// so the invariant cannot be broken after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    interval: Interval,
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    /// Validate and wrap `bars`.
    ///
    /// * empty `bars` => [`DashboardError::NoData`]
    /// * a timestamp that does not strictly increase => [`DashboardError::Config`]
    pub fn new(ticker: impl Into<String>, interval: Interval, bars: Vec<OhlcvBar>) -> Result<Self> {
        let ticker = ticker.into();
        if bars.is_empty() {
            return Err(DashboardError::NoData { ticker });
        }
        if let Some(pos) = bars.windows(2).position(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(DashboardError::config(format!(
                "bars for '{ticker}' are not strictly increasing at index {}",
                pos + 1
            )));
        }
        Ok(Self {
            ticker,
            interval,
            bars,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn timestamps(&self) -> Vec<i64> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    /// Binary search for a bar timestamp.
    pub fn contains_timestamp(&self, timestamp: i64) -> bool {
        self.bars
            .binary_search_by_key(&timestamp, |b| b.timestamp)
            .is_ok()
    }

    pub fn first_timestamp(&self) -> i64 {
        self.bars[0].timestamp
    }

    pub fn last_timestamp(&self) -> i64 {
        self.bars[self.bars.len() - 1].timestamp
    }
}
