use serde::Serialize;

use crate::error::{DashboardError, Result};

/// One indicator sample. `value == None` marks an Undefined point (e.g. a
/// return after a zero close); it is present on the time axis but has no value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub timestamp: i64,
    pub value: Option<f64>,
}

/// A named sequence of indicator samples aligned to a subset of a
/// [`PriceSeries`](crate::market_data::PriceSeries)'s timestamps.
///
/// Warm-up bars of windowed indicators are absent rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub name: String,
    pub points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn new(name: impl Into<String>, points: Vec<IndicatorPoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Pair `timestamps` with defined `values` one-to-one.
    pub fn aligned(name: impl Into<String>, timestamps: &[i64], values: Vec<f64>) -> Self {
        let points = timestamps
            .iter()
            .zip(values)
            .map(|(&timestamp, value)| IndicatorPoint {
                timestamp,
                value: Some(value),
            })
            .collect();
        Self::new(name, points)
    }
}

#[cfg(test)]
impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn timestamps(&self) -> Vec<i64> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }
}

// ---------------------------------------------------------------------------
// Window helpers shared by the windowed indicators
// ---------------------------------------------------------------------------

/// Validate a look-back `period` against the number of `available` samples.
///
/// * `period < min_period` => `Config` (invalid parameter)
/// * `available < required` => `InsufficientData`
pub(crate) fn require_window(
    indicator: &str,
    period: usize,
    min_period: usize,
    required: usize,
    available: usize,
) -> Result<()> {
    if period < min_period {
        return Err(DashboardError::config(format!(
            "{indicator} period must be at least {min_period}, got {period}"
        )));
    }
    if available < required {
        return Err(DashboardError::insufficient(
            format!("a {period}-period {indicator}"),
            required,
            available,
        ));
    }
    Ok(())
}

pub(crate) fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

/// Sample standard deviation (n - 1 divisor). Callers guarantee `len >= 2`.
pub(crate) fn sample_std_dev(window: &[f64]) -> f64 {
    let m = mean(window);
    let ss: f64 = window.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (window.len() - 1) as f64).sqrt()
}
