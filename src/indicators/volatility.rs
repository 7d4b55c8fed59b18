// =============================================================================
// Rolling Volatility
// =============================================================================
//
// Sample standard deviation of bar returns over a rolling `window`, optionally
// annualized:
//   vol_t = stdev(r_{t-window+1} .. r_t) * sqrt(periods_per_year)
//
// `periods_per_year` depends on the bar interval (252 daily, 52 weekly, 12
// monthly by default) and is always supplied by the caller.  A window that
// contains an Undefined return yields an Undefined point.

use crate::error::Result;
use crate::indicators::returns::{check_periods_per_year, daily_returns};
use crate::indicators::series::{require_window, sample_std_dev, IndicatorPoint, IndicatorSeries};
use crate::market_data::PriceSeries;

/// Rolling volatility of `series`; `series.len() - window` points, the first
/// stamped at bar `window`.
///
/// # Errors
/// - `window < 2` or invalid `periods_per_year` => `Config`
/// - fewer than `window + 1` bars => `InsufficientData`
pub fn volatility(
    series: &PriceSeries,
    window: usize,
    periods_per_year: Option<f64>,
) -> Result<IndicatorSeries> {
    if let Some(ppy) = periods_per_year {
        check_periods_per_year(ppy)?;
    }
    require_window("volatility", window, 2, window.saturating_add(1), series.len())?;

    let returns = daily_returns(series)?;
    let scale = periods_per_year.map_or(1.0, f64::sqrt);

    let points = returns
        .points
        .windows(window)
        .map(|w| {
            let values: Option<Vec<f64>> = w.iter().map(|p| p.value).collect();
            IndicatorPoint {
                timestamp: w[window - 1].timestamp,
                value: values.map(|v| sample_std_dev(&v) * scale),
            }
        })
        .collect();

    let name = if periods_per_year.is_some() {
        format!("Volatility({window}, annualized)")
    } else {
        format!("Volatility({window})")
    };
    Ok(IndicatorSeries::new(name, points))
}
