// =============================================================================
// Relative Strength Index (RSI) — rolling-mean gains and losses
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — For every window of `period` consecutive deltas take the simple
//          mean of the gains and the simple mean of the losses.
// Step 3 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Chart reference lines:  70 => OVERBOUGHT,  30 => OVERSOLD.
// =============================================================================

use crate::error::Result;
use crate::indicators::series::{require_window, IndicatorSeries};
use crate::market_data::PriceSeries;

pub const OVERBOUGHT: f64 = 70.0;
pub const OVERSOLD: f64 = 30.0;

/// RSI of the closes of `series`; first point at bar `period`.
///
/// # Errors
/// - `period == 0` => `Config`
/// - fewer than `period + 1` bars => `InsufficientData`
pub fn rsi(series: &PriceSeries, period: usize) -> Result<IndicatorSeries> {
    require_window("RSI", period, 1, period.saturating_add(1), series.len())?;
    let values = calculate_rsi(&series.closes(), period);
    Ok(IndicatorSeries::aligned(
        format!("RSI({period})"),
        &series.timestamps()[period..],
        values,
    ))
}

/// Compute the full RSI series for the given `closes` and `period`.
///
/// The returned vector has one RSI value for each close starting at index
/// `period`: the value at close `i` uses the `period` deltas ending at `i`.
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `closes.len() <= period` => empty vec (need at least `period` deltas)
/// - If average loss is zero (no down moves), RSI is clamped to 100.0.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    // --- Compute price deltas ------------------------------------------------
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let period_f = period as f64;
    deltas
        .windows(period)
        .map(|window| {
            let (sum_gain, sum_loss) = window.iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
                if d > 0.0 {
                    (g + d, l)
                } else {
                    (g, l - d)
                }
            });
            rsi_from_averages(sum_gain / period_f, sum_loss / period_f)
        })
        .collect()
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If both averages are zero, RSI is 50.0 (no movement).
/// - If average loss is zero (only gains), RSI is 100.0.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}
