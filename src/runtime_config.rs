// =============================================================================
// Runtime Configuration — dashboard defaults loaded from JSON
// =============================================================================
//
// Every tunable default of the dashboard lives here: which tickers to offer,
// how far back to look, indicator periods, annualization constants, and the
// market data client settings.  Requests may override most of these per call.
//
// All fields carry `#[serde(default)]` so that adding new fields never breaks
// loading an older config file.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::IndicatorConfig;
use crate::market_data::yahoo::DEFAULT_BASE_URL;
use crate::types::{BaseStyle, Interval};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_tickers() -> Vec<String> {
    vec!["AAPL".to_string(), "MSFT".to_string(), "GOOGL".to_string()]
}

fn default_lookback_days() -> u32 {
    365
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_yahoo_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_chart_height() -> u32 {
    600
}

fn default_panel_height() -> u32 {
    300
}

fn default_max_tickers_per_request() -> usize {
    10
}

fn default_daily_periods() -> f64 {
    Interval::Daily.default_periods_per_year()
}

fn default_weekly_periods() -> f64 {
    Interval::Weekly.default_periods_per_year()
}

fn default_monthly_periods() -> f64 {
    Interval::Monthly.default_periods_per_year()
}

// =============================================================================
// PeriodsPerYear
// =============================================================================

/// Annualization constants per bar interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodsPerYear {
    #[serde(default = "default_daily_periods")]
    pub daily: f64,

    #[serde(default = "default_weekly_periods")]
    pub weekly: f64,

    #[serde(default = "default_monthly_periods")]
    pub monthly: f64,
}

impl Default for PeriodsPerYear {
    fn default() -> Self {
        Self {
            daily: default_daily_periods(),
            weekly: default_weekly_periods(),
            monthly: default_monthly_periods(),
        }
    }
}

impl PeriodsPerYear {
    pub fn for_interval(&self, interval: Interval) -> f64 {
        match interval {
            Interval::Daily => self.daily,
            Interval::Weekly => self.weekly,
            Interval::Monthly => self.monthly,
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration of the dashboard backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Request defaults ---------------------------------------------------

    /// Tickers offered when the caller names none.
    #[serde(default = "default_tickers")]
    pub default_tickers: Vec<String>,

    /// Calendar days covered when the caller gives no start date.
    #[serde(default = "default_lookback_days")]
    pub default_lookback_days: u32,

    #[serde(default)]
    pub default_interval: Interval,

    #[serde(default)]
    pub default_base_style: BaseStyle,

    /// Indicator toggles and periods applied unless overridden.
    #[serde(default)]
    pub indicators: IndicatorConfig,

    #[serde(default)]
    pub periods_per_year: PeriodsPerYear,

    // --- Layout -------------------------------------------------------------

    #[serde(default = "default_chart_height")]
    pub chart_height: u32,

    #[serde(default = "default_panel_height")]
    pub panel_height: u32,

    // --- Market data --------------------------------------------------------

    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,

    /// Upper bound on one provider call; a timeout surfaces as a network failure.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum tickers accepted by the multi-ticker endpoint.
    #[serde(default = "default_max_tickers_per_request")]
    pub max_tickers_per_request: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_tickers: default_tickers(),
            default_lookback_days: default_lookback_days(),
            default_interval: Interval::default(),
            default_base_style: BaseStyle::default(),
            indicators: IndicatorConfig::default(),
            periods_per_year: PeriodsPerYear::default(),
            chart_height: default_chart_height(),
            panel_height: default_panel_height(),
            yahoo_base_url: default_yahoo_base_url(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_tickers_per_request: default_max_tickers_per_request(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            tickers = ?config.default_tickers,
            interval = %config.default_interval,
            "runtime config loaded"
        );

        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}
