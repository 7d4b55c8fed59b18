// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the first `period` closes
// and is stamped with the timestamp of bar `period - 1`.
// =============================================================================

use crate::error::Result;
use crate::indicators::series::{require_window, IndicatorSeries};
use crate::market_data::PriceSeries;

/// EMA of the closes of `series`.
///
/// Output has `series.len() - period + 1` points.
///
/// # Errors
/// - `period == 0` => `Config`
/// - `series.len() < period` => `InsufficientData`
pub fn ema(series: &PriceSeries, period: usize) -> Result<IndicatorSeries> {
    require_window("EMA", period, 1, period, series.len())?;
    let values = calculate_ema(&series.closes(), period);
    Ok(IndicatorSeries::aligned(
        format!("EMA({period})"),
        &series.timestamps()[period - 1..],
        values,
    ))
}

/// Compute the EMA series for the given `closes` slice and look-back `period`.
///
/// Returns an empty `Vec` when the input is too short or the period is zero.
/// Each output element corresponds to a close starting at index `period - 1`.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let sma: f64 = closes[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(closes.len() - period + 1);
    result.push(sma);

    let mut prev_ema = sma;
    for &close in &closes[period..] {
        let ema = close * multiplier + prev_ema * (1.0 - multiplier);
        result.push(ema);
        prev_ema = ema;
    }

    result
}
