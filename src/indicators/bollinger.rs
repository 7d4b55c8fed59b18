// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the rolling *sample* standard
// deviation (n - 1 divisor) of the closes over the same window.

use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::indicators::series::{mean, require_window, sample_std_dev, IndicatorSeries};
use crate::market_data::PriceSeries;

/// The three bands, each aligned to the same timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerBands {
    pub middle: IndicatorSeries,
    pub upper: IndicatorSeries,
    pub lower: IndicatorSeries,
}

/// Per-window values of one Bollinger calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands over the closes of `series`.
///
/// # Errors
/// - `period < 2` (no sample std dev) or a negative / non-finite `width_std_dev`
///   => `Config`
/// - `series.len() < period` => `InsufficientData`
pub fn bollinger_bands(
    series: &PriceSeries,
    period: usize,
    width_std_dev: f64,
) -> Result<BollingerBands> {
    if !width_std_dev.is_finite() || width_std_dev < 0.0 {
        return Err(DashboardError::config(format!(
            "Bollinger width must be a non-negative number of standard deviations, got {width_std_dev}"
        )));
    }
    if period == 1 {
        return Err(DashboardError::config(
            "Bollinger band period must be at least 2: a one-bar window has no sample standard deviation",
        ));
    }
    require_window("Bollinger band", period, 2, period, series.len())?;

    let results = calculate_bollinger(&series.closes(), period, width_std_dev);
    let timestamps = &series.timestamps()[period - 1..];
    let label = format!("{period}, {width_std_dev}");

    Ok(BollingerBands {
        middle: IndicatorSeries::aligned(
            format!("BB Middle({label})"),
            timestamps,
            results.iter().map(|r| r.middle).collect(),
        ),
        upper: IndicatorSeries::aligned(
            format!("BB Upper({label})"),
            timestamps,
            results.iter().map(|r| r.upper).collect(),
        ),
        lower: IndicatorSeries::aligned(
            format!("BB Lower({label})"),
            timestamps,
            results.iter().map(|r| r.lower).collect(),
        ),
    })
}

/// Rolling Bollinger values for every full window of `closes`.
///
/// Empty when `period < 2` or fewer than `period` closes are supplied.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> Vec<BollingerResult> {
    if period < 2 || closes.len() < period {
        return Vec::new();
    }

    closes
        .windows(period)
        .map(|window| {
            let middle = mean(window);
            let std_dev = sample_std_dev(window);
            BollingerResult {
                upper: middle + num_std * std_dev,
                middle,
                lower: middle - num_std * std_dev,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_near, series_from_closes, thirty_bar_closes};

    #[test]
    fn bollinger_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let result = calculate_bollinger(&closes, 20, 2.0);
        assert_eq!(result.len(), 1);
        let bb = result[0];
        assert!(bb.upper > bb.middle);
        assert!(bb.lower < bb.middle);
        assert_near!(bb.middle, 10.5, 1e-12);
        // Sample variance of 1..=20 is 35.
        assert_near!(bb.upper - bb.middle, 2.0 * 35.0_f64.sqrt(), 1e-12);
    }

    #[test]
    fn bollinger_flat() {
        let series = series_from_closes(&[100.0; 20]);
        let bands = bollinger_bands(&series, 20, 2.0).unwrap();
        assert_eq!(bands.upper.values(), vec![Some(100.0)]);
        assert_eq!(bands.lower.values(), vec![Some(100.0)]);
    }

    #[test]
    fn band_offset_equals_width_times_std_dev() {
        let closes = thirty_bar_closes();
        let series = series_from_closes(&closes);
        let k = 2.5;
        let period = 10;
        let bands = bollinger_bands(&series, period, k).unwrap();
        assert_eq!(bands.middle.len(), closes.len() - period + 1);

        for (i, window) in closes.windows(period).enumerate() {
            let std = sample_std_dev(window);
            let middle = bands.middle.points[i].value.unwrap();
            let upper = bands.upper.points[i].value.unwrap();
            let lower = bands.lower.points[i].value.unwrap();
            assert_near!(upper - middle, k * std, 1e-9);
            assert_near!(middle - lower, k * std, 1e-9);
            assert_eq!(bands.upper.points[i].timestamp, bands.middle.points[i].timestamp);
        }
    }

    #[test]
    fn period_50_on_ten_bars_is_insufficient() {
        let series = series_from_closes(&[100.0, 101.0, 99.0, 102.0, 104.0, 103.0, 105.0, 107.0, 106.0, 108.0]);
        let err = bollinger_bands(&series, 50, 2.0).unwrap_err();
        assert_eq!(err, DashboardError::insufficient("a 50-period Bollinger band", 50, 10));
    }

    #[test]
    fn invalid_parameters_are_config_errors() {
        let series = series_from_closes(&[1.0, 2.0, 3.0]);
        assert_eq!(
            bollinger_bands(&series, 1, 2.0).unwrap_err(),
            DashboardError::config(
                "Bollinger band period must be at least 2: a one-bar window has no sample standard deviation"
            )
        );
        assert!(matches!(bollinger_bands(&series, 0, 2.0), Err(DashboardError::Config(_))));
        assert!(matches!(bollinger_bands(&series, 2, -1.0), Err(DashboardError::Config(_))));
        assert!(matches!(bollinger_bands(&series, 2, f64::NAN), Err(DashboardError::Config(_))));
    }
}
