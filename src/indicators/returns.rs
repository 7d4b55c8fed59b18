// =============================================================================
// Period Returns & Return Statistics
// =============================================================================
//
// Simple return of each bar versus the previous bar:
//   r_t = (close_t - close_{t-1}) / close_{t-1}
//
// Returns are fractions (0.01 == 1 %).  The first bar has no predecessor and
// produces no point.  A previous close of exactly zero makes r_t Undefined.

use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::indicators::series::{mean, sample_std_dev, IndicatorPoint, IndicatorSeries};
use crate::market_data::PriceSeries;

/// Bar-over-bar returns of `series`: exactly `series.len() - 1` points.
///
/// # Errors
/// - fewer than 2 bars => `InsufficientData`
pub fn daily_returns(series: &PriceSeries) -> Result<IndicatorSeries> {
    if series.len() < 2 {
        return Err(DashboardError::insufficient("daily returns", 2, series.len()));
    }

    let points = series
        .bars()
        .windows(2)
        .map(|w| IndicatorPoint {
            timestamp: w[1].timestamp,
            value: calculate_return(w[0].close, w[1].close),
        })
        .collect();

    Ok(IndicatorSeries::new("Daily Return", points))
}

/// `(current - previous) / previous`, or `None` when `previous` is zero or the
/// result is not finite.
pub fn calculate_return(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    let r = (current - previous) / previous;
    r.is_finite().then_some(r)
}

// =============================================================================
// Summary statistics
// =============================================================================

/// Summary of the defined returns of one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnStats {
    /// Number of defined returns used.
    pub count: usize,
    /// Mean per-bar return.
    pub mean_return: f64,
    /// Sample standard deviation of per-bar returns.
    pub std_dev: f64,
    /// `std_dev * sqrt(periods_per_year)`.
    pub annualized_volatility: f64,
    /// `mean_return / std_dev` with a zero risk-free rate; 0 when `std_dev` is 0.
    pub sharpe_ratio: f64,
    /// `sharpe_ratio * sqrt(periods_per_year)`.
    pub annualized_sharpe: f64,
    /// Compounded return over the whole series, `prod(1 + r) - 1`.
    pub cumulative_return: f64,
}

/// Statistics over the defined points of `returns`.
///
/// # Errors
/// - fewer than 2 defined returns => `InsufficientData`
/// - `periods_per_year` not finite and positive => `Config`
pub fn return_stats(returns: &IndicatorSeries, periods_per_year: f64) -> Result<ReturnStats> {
    check_periods_per_year(periods_per_year)?;

    let defined: Vec<f64> = returns.points.iter().filter_map(|p| p.value).collect();
    if defined.len() < 2 {
        return Err(DashboardError::insufficient(
            "return statistics (defined returns)",
            2,
            defined.len(),
        ));
    }

    let mean_return = mean(&defined);
    let std_dev = sample_std_dev(&defined);
    let sharpe_ratio = if std_dev > 0.0 { mean_return / std_dev } else { 0.0 };
    let scale = periods_per_year.sqrt();
    let cumulative_return = defined.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0;

    Ok(ReturnStats {
        count: defined.len(),
        mean_return,
        std_dev,
        annualized_volatility: std_dev * scale,
        sharpe_ratio,
        annualized_sharpe: sharpe_ratio * scale,
        cumulative_return,
    })
}

pub(crate) fn check_periods_per_year(periods_per_year: f64) -> Result<()> {
    if periods_per_year.is_finite() && periods_per_year > 0.0 {
        Ok(())
    } else {
        Err(DashboardError::config(format!(
            "periods per year must be a positive number, got {periods_per_year}"
        )))
    }
}
