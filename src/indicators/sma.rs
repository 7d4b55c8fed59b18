// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Unweighted mean of the last `period` closes.  Drawn as the 50/200 trend
// overlays and used as the Bollinger middle band.

use crate::error::Result;
use crate::indicators::series::{mean, require_window, IndicatorSeries};
use crate::market_data::PriceSeries;

/// SMA of the closes of `series`; `series.len() - period + 1` points.
pub fn sma(series: &PriceSeries, period: usize) -> Result<IndicatorSeries> {
    require_window("SMA", period, 1, period, series.len())?;
    let values = calculate_sma(&series.closes(), period);
    Ok(IndicatorSeries::aligned(
        format!("SMA({period})"),
        &series.timestamps()[period - 1..],
        values,
    ))
}

/// Rolling mean over `values`. Empty when `period == 0` or the input is short.
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values.windows(period).map(mean).collect()
}
