// =============================================================================
// Yahoo Finance chart client — historical OHLCV bars
// =============================================================================
//
// Uses the public v8 chart endpoint:
//   GET /v8/finance/chart/{ticker}?period1=..&period2=..&interval=1d
//
// `period1` is 00:00 UTC of the start date and `period2` 00:00 UTC of the day
// after the end date, so the requested end date is inclusive.  Rows where the
// provider reports a null open/high/low/close are dropped; a null volume is 0.
// =============================================================================

use std::time::Duration;

use anyhow::Context;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::{DashboardError, Result};
use crate::market_data::{FetchRequest, MarketDataSource, OhlcvBar, PriceSeries};
use crate::types::Interval;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Option<ChartBody>,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Option<Vec<Quote>>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

impl Quote {
    fn value_at(series: &Option<Vec<Option<f64>>>, idx: usize) -> Option<f64> {
        series.as_ref().and_then(|v| v.get(idx)).and_then(|v| *v)
    }

    fn bar_at(&self, idx: usize, timestamp_secs: i64) -> Option<OhlcvBar> {
        Some(OhlcvBar::new(
            timestamp_secs * 1_000,
            Self::value_at(&self.open, idx)?,
            Self::value_at(&self.high, idx)?,
            Self::value_at(&self.low, idx)?,
            Self::value_at(&self.close, idx)?,
            Self::value_at(&self.volume, idx).unwrap_or(0.0),
        ))
    }
}

/// Decode a chart endpoint response into a validated [`PriceSeries`].
///
/// Error mapping:
/// * HTTP 404 or `chart.error.code == "Not Found"` => `NotFound`
/// * any other non-success status or an undecodable body => `NetworkFailure`
/// * a decodable body without bars => `NoData`
pub fn parse_chart_response(
    ticker: &str,
    interval: Interval,
    status: StatusCode,
    body: &str,
) -> Result<PriceSeries> {
    let not_found = || DashboardError::NotFound {
        ticker: ticker.to_string(),
    };
    let network = |reason: String| DashboardError::NetworkFailure {
        ticker: ticker.to_string(),
        reason,
    };

    if status == StatusCode::NOT_FOUND {
        return Err(not_found());
    }

    let parsed: ChartResponse = serde_json::from_str(body)
        .map_err(|e| network(format!("undecodable response (HTTP {status}): {e}")))?;
    let chart = parsed
        .chart
        .ok_or_else(|| network("response has no 'chart' object".into()))?;

    if let Some(err) = chart.error {
        if err.code.as_deref() == Some("Not Found") {
            return Err(not_found());
        }
        return Err(network(format!(
            "provider error {}: {}",
            err.code.unwrap_or_default(),
            err.description.unwrap_or_default()
        )));
    }

    if !status.is_success() {
        return Err(network(format!("provider returned HTTP {status}")));
    }

    let Some(result) = chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(DashboardError::NoData {
            ticker: ticker.to_string(),
        });
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .and_then(|i| i.quote)
        .and_then(|mut q| q.pop())
        .unwrap_or_default();

    let mut bars: Vec<OhlcvBar> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(idx, &ts)| quote.bar_at(idx, ts))
        .collect();

    let skipped = timestamps.len() - bars.len();
    if skipped > 0 {
        debug!(ticker, skipped, "dropped rows with missing OHLC values");
    }

    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);

    PriceSeries::new(ticker, interval, bars)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`MarketDataSource`] backed by the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooSource {
    base_url: Url,
    timeout: Duration,
    client: reqwest::Client,
}

impl YahooSource {
    /// Build a client for `base_url` whose every request is bounded by
    /// `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid market data base URL '{base_url}'"))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("price-dashboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, timeout_secs = timeout.as_secs_f64(), "YahooSource initialised");

        Ok(Self {
            base_url,
            timeout,
            client,
        })
    }

    fn chart_url(&self, ticker: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DashboardError::config(format!("base URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(&["v8", "finance", "chart", ticker]);
        Ok(url)
    }

    /// GET the chart for `request` and decode it.
    #[instrument(skip(self, request), name = "yahoo::get_chart", fields(ticker = %request.ticker, interval = %request.interval))]
    pub async fn get_chart(&self, request: &FetchRequest) -> Result<PriceSeries> {
        let url = self.chart_url(&request.ticker)?;
        let network = |reason: String| DashboardError::NetworkFailure {
            ticker: request.ticker.clone(),
            reason,
        };

        let resp = self
            .client
            .get(url)
            .query(&[
                ("period1", request.range.start_unix_secs().to_string()),
                ("period2", request.range.end_exclusive_unix_secs().to_string()),
                ("interval", request.interval.provider_code().to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    network(format!("timed out after {:.1}s", self.timeout.as_secs_f64()))
                } else {
                    network(format!("request failed: {e}"))
                }
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| network(format!("failed to read response body: {e}")))?;

        let series = parse_chart_response(&request.ticker, request.interval, status, &body);
        match &series {
            Ok(s) => debug!(bars = s.len(), "chart fetched"),
            Err(e) => warn!(error = %e, "chart fetch failed"),
        }
        series
    }
}

impl MarketDataSource for YahooSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries> {
        self.get_chart(request).await
    }
}

impl std::fmt::Debug for YahooSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooSource")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}
