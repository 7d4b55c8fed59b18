// =============================================================================
// Indicator Engine — one compute pass over a PriceSeries
// =============================================================================
//
// `compute` evaluates every indicator enabled in an `IndicatorConfig` and
// returns the results together.  It holds no state: identical inputs always
// produce identical outputs.  The first failing indicator aborts the pass and
// its error is returned unchanged.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::indicators::bollinger::{bollinger_bands, BollingerBands};
use crate::indicators::ema::ema;
use crate::indicators::returns::daily_returns;
use crate::indicators::rsi::rsi;
use crate::indicators::series::IndicatorSeries;
use crate::indicators::sma::sma;
use crate::indicators::volatility::volatility;
use crate::market_data::PriceSeries;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_ema_period() -> Option<usize> {
    Some(20)
}

fn default_sma_periods() -> Vec<usize> {
    vec![50, 200]
}

fn default_bollinger() -> Option<BollingerConfig> {
    Some(BollingerConfig::default())
}

fn default_rsi_period() -> Option<usize> {
    Some(14)
}

fn default_volatility() -> Option<VolatilityConfig> {
    Some(VolatilityConfig::default())
}

fn default_bollinger_period() -> usize {
    20
}

fn default_bollinger_width() -> f64 {
    2.0
}

fn default_volatility_window() -> usize {
    20
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerConfig {
    #[serde(default = "default_bollinger_period")]
    pub period: usize,

    /// Band offset in standard deviations.
    #[serde(default = "default_bollinger_width")]
    pub width: f64,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            period: default_bollinger_period(),
            width: default_bollinger_width(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolatilityConfig {
    #[serde(default = "default_volatility_window")]
    pub window: usize,

    /// Multiply by sqrt(periods per year of the bar interval).
    #[serde(default = "default_true")]
    pub annualize: bool,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            window: default_volatility_window(),
            annualize: true,
        }
    }
}

/// Indicator toggles and parameters of one request. `None` / empty disables
/// an indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default = "default_ema_period")]
    pub ema_period: Option<usize>,

    #[serde(default = "default_sma_periods")]
    pub sma_periods: Vec<usize>,

    #[serde(default = "default_bollinger")]
    pub bollinger: Option<BollingerConfig>,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: Option<usize>,

    #[serde(default = "default_true")]
    pub daily_returns: bool,

    #[serde(default = "default_volatility")]
    pub volatility: Option<VolatilityConfig>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema_period: default_ema_period(),
            sma_periods: default_sma_periods(),
            bollinger: default_bollinger(),
            rsi_period: default_rsi_period(),
            daily_returns: true,
            volatility: default_volatility(),
        }
    }
}

#[cfg(test)]
impl IndicatorConfig {
    /// Every indicator disabled.
    pub fn none() -> Self {
        Self {
            ema_period: None,
            sma_periods: Vec::new(),
            bollinger: None,
            rsi_period: None,
            daily_returns: false,
            volatility: None,
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// Results of one compute pass; fields mirror the enabled toggles.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IndicatorSet {
    pub ema: Option<IndicatorSeries>,
    pub smas: Vec<IndicatorSeries>,
    pub bollinger: Option<BollingerBands>,
    pub rsi: Option<IndicatorSeries>,
    pub daily_returns: Option<IndicatorSeries>,
    pub volatility: Option<IndicatorSeries>,
}

/// Evaluate every indicator enabled in `config` over `series`.
///
/// `periods_per_year` is used only when volatility annualization is on.
pub fn compute(
    series: &PriceSeries,
    config: &IndicatorConfig,
    periods_per_year: f64,
) -> Result<IndicatorSet> {
    let ema = config.ema_period.map(|p| ema(series, p)).transpose()?;

    let smas = config
        .sma_periods
        .iter()
        .map(|&p| sma(series, p))
        .collect::<Result<Vec<_>>>()?;

    let bollinger = config
        .bollinger
        .map(|bb| bollinger_bands(series, bb.period, bb.width))
        .transpose()?;

    let rsi = config.rsi_period.map(|p| rsi(series, p)).transpose()?;

    let daily_returns = if config.daily_returns {
        Some(daily_returns(series)?)
    } else {
        None
    };

    let volatility = config
        .volatility
        .map(|v| volatility(series, v.window, v.annualize.then_some(periods_per_year)))
        .transpose()?;

    Ok(IndicatorSet {
        ema,
        smas,
        bollinger,
        rsi,
        daily_returns,
        volatility,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::test_util::series_from_closes;

    fn closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn compute_is_idempotent() {
        let series = series_from_closes(&closes(260));
        let config = IndicatorConfig::default();
        let a = compute(&series, &config, 252.0).unwrap();
        let b = compute(&series, &config, 252.0).unwrap();
        assert_eq!(a, b);

        // Bit-identical, not merely approximately equal.
        let bits = |s: &IndicatorSet| -> Vec<u64> {
            s.volatility
                .as_ref()
                .unwrap()
                .points
                .iter()
                .map(|p| p.value.unwrap().to_bits())
                .collect()
        };
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn default_config_populates_everything() {
        let series = series_from_closes(&closes(260));
        let set = compute(&series, &IndicatorConfig::default(), 252.0).unwrap();
        assert_eq!(set.ema.as_ref().unwrap().len(), 260 - 19);
        assert_eq!(set.smas.len(), 2);
        assert_eq!(set.smas[1].len(), 260 - 199);
        assert!(set.bollinger.is_some());
        assert_eq!(set.rsi.as_ref().unwrap().len(), 260 - 14);
        assert_eq!(set.daily_returns.as_ref().unwrap().len(), 259);
        assert_eq!(set.volatility.as_ref().unwrap().len(), 240);
    }

    #[test]
    fn every_timestamp_comes_from_the_source() {
        let series = series_from_closes(&closes(260));
        let set = compute(&series, &IndicatorConfig::default(), 252.0).unwrap();
        let bb = set.bollinger.as_ref().unwrap();
        let all = set
            .ema
            .iter()
            .chain(&set.smas)
            .chain([&bb.middle, &bb.upper, &bb.lower])
            .chain(set.rsi.iter())
            .chain(set.daily_returns.iter())
            .chain(set.volatility.iter());
        for s in all {
            for p in &s.points {
                assert!(series.contains_timestamp(p.timestamp), "{} has foreign timestamp", s.name);
            }
        }
    }

    #[test]
    fn disabled_config_computes_nothing() {
        let series = series_from_closes(&[1.0]);
        let set = compute(&series, &IndicatorConfig::none(), 252.0).unwrap();
        assert_eq!(set, IndicatorSet::default());
    }

    #[test]
    fn first_failure_is_reported() {
        // 60 bars: EMA(20) fine, SMA(200) is not.
        let series = series_from_closes(&closes(60));
        let err = compute(&series, &IndicatorConfig::default(), 252.0).unwrap_err();
        assert_eq!(err, DashboardError::insufficient("a 200-period SMA", 200, 60));
    }

    #[test]
    fn unannualized_volatility_ignores_periods_per_year() {
        let series = series_from_closes(&closes(40));
        let config = IndicatorConfig {
            volatility: Some(VolatilityConfig { window: 10, annualize: false }),
            ..IndicatorConfig::none()
        };
        let a = compute(&series, &config, 252.0).unwrap();
        let b = compute(&series, &config, 12.0).unwrap();
        assert_eq!(a.volatility, b.volatility);
    }

    #[test]
    fn config_deserialises_with_defaults_and_disables_with_null() {
        let cfg: IndicatorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, IndicatorConfig::default());

        let cfg: IndicatorConfig =
            serde_json::from_str(r#"{ "ema_period": null, "sma_periods": [], "bollinger": { "width": 3.0 } }"#)
                .unwrap();
        assert_eq!(cfg.ema_period, None);
        assert!(cfg.sma_periods.is_empty());
        assert_eq!(cfg.bollinger, Some(BollingerConfig { period: 20, width: 3.0 }));
        assert_eq!(cfg.rsi_period, Some(14));
    }
}
