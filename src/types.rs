// =============================================================================
// Shared types used across the dashboard pipeline
// =============================================================================

use serde::{Deserialize, Serialize};

/// Bar interval of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
}

impl Default for Interval {
    fn default() -> Self {
        Self::Daily
    }
}

impl Interval {
    /// Interval code understood by the Yahoo chart endpoint.
    pub fn provider_code(self) -> &'static str {
        match self {
            Self::Daily => "1d",
            Self::Weekly => "1wk",
            Self::Monthly => "1mo",
        }
    }

    /// Conventional number of bars per year, used for annualization when the
    /// configuration does not override it.
    pub fn default_periods_per_year(self) -> f64 {
        match self {
            Self::Daily => 252.0,
            Self::Weekly => 52.0,
            Self::Monthly => 12.0,
        }
    }

    /// Parse a user-supplied interval name (`daily`, `1d`, `weekly`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" | "1d" | "d" => Some(Self::Daily),
            "weekly" | "week" | "1wk" | "w" => Some(Self::Weekly),
            "monthly" | "month" | "1mo" | "m" => Some(Self::Monthly),
            _ => None,
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

/// How the base price layer of a chart is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseStyle {
    /// Single close-price line.
    Line,
    /// Full OHLC candlesticks.
    Candlestick,
}

impl Default for BaseStyle {
    fn default() -> Self {
        Self::Candlestick
    }
}

impl BaseStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "line" => Some(Self::Line),
            "candlestick" | "candle" | "candles" | "ohlc" => Some(Self::Candlestick),
            _ => None,
        }
    }
}

impl std::fmt::Display for BaseStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Line => write!(f, "line"),
            Self::Candlestick => write!(f, "candlestick"),
        }
    }
}
