// Shared fixtures for unit tests.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::{DashboardError, Result};
use crate::market_data::{FetchRequest, MarketDataSource, OhlcvBar, PriceSeries};
use crate::types::Interval;

/// 2024-01-01 00:00 UTC in Unix milliseconds.
pub const START_MS: i64 = 1_704_067_200_000;
pub const DAY_MS: i64 = 86_400_000;

/// Asserts two `f64` values are within an absolute tolerance.
macro_rules! assert_near {
    ($actual:expr, $expected:expr, $tol:expr) => {{
        let (a, e, t): (f64, f64, f64) = ($actual, $expected, $tol);
        assert!(
            (a - e).abs() <= t,
            "assert_near failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_near;

/// One bar per day starting at [`START_MS`], OHLC spread around `close`.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    bars_from_closes_at(START_MS, closes)
}

pub fn bars_from_closes_at(first_ms: i64, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            OhlcvBar::new(
                first_ms + i as i64 * DAY_MS,
                c,
                c + 1.0,
                c - 1.0,
                c,
                1_000.0 + i as f64,
            )
        })
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    PriceSeries::new("TEST", Interval::Daily, bars_from_closes(closes)).unwrap()
}

/// The 30-bar daily fixture: closes oscillate upward from 100.
pub fn thirty_bar_closes() -> Vec<f64> {
    vec![
        100.0, 101.0, 99.0, 102.0, 104.0, 103.0, 105.0, 107.0, 106.0, 108.0, 110.0, 109.0, 111.0,
        113.0, 112.0, 114.0, 116.0, 115.0, 117.0, 119.0, 118.0, 120.0, 122.0, 121.0, 123.0, 125.0,
        124.0, 126.0, 128.0, 127.0,
    ]
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// In-memory [`MarketDataSource`] backed by canned bars per ticker.
#[derive(Default)]
pub struct StaticSource {
    bars: HashMap<String, Vec<OhlcvBar>>,
    unreachable: bool,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ticker(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.bars.insert(ticker.to_uppercase(), bars);
        self
    }

    /// Every fetch fails with `NetworkFailure`.
    pub fn unreachable() -> Self {
        Self {
            bars: HashMap::new(),
            unreachable: true,
        }
    }
}

impl MarketDataSource for StaticSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries> {
        if self.unreachable {
            return Err(DashboardError::NetworkFailure {
                ticker: request.ticker.clone(),
                reason: "connection refused".into(),
            });
        }
        let bars = self
            .bars
            .get(&request.ticker)
            .ok_or_else(|| DashboardError::NotFound {
                ticker: request.ticker.clone(),
            })?;
        let start_ms = request.range.start_unix_secs() * 1_000;
        let end_ms = request.range.end_exclusive_unix_secs() * 1_000;
        let in_range = bars
            .iter()
            .filter(|b| b.timestamp >= start_ms && b.timestamp < end_ms)
            .copied()
            .collect();
        PriceSeries::new(request.ticker.clone(), request.interval, in_range)
    }
}
