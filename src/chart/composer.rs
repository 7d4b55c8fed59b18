// =============================================================================
// Chart Composer
// =============================================================================
//
// Assembles a PriceSeries and a selection of indicator series into a
// ChartSpec:
//   - base layer: close line or OHLC candlesticks
//   - overlays:   drawn on the price axes, clipped to the base timestamps
//   - panels:     one per secondary series, sharing the time axis
//
// Inputs are borrowed and never modified.  An overlay or panel that shares no
// timestamp with the base series is a caller-level mismatch and fails the
// composition instead of rendering an empty line.
// =============================================================================

use std::collections::HashSet;

use crate::chart::spec::{BaseLayer, ChartSpec, Layer, LinePoint, LineStyle, Panel, ReferenceLine};
use crate::error::{DashboardError, Result};
use crate::indicators::IndicatorSeries;
use crate::market_data::PriceSeries;
use crate::types::BaseStyle;

/// An indicator to draw over the price layer.
#[derive(Debug, Clone)]
pub struct OverlayInput<'a> {
    pub series: &'a IndicatorSeries,
    pub style: LineStyle,
}

impl<'a> OverlayInput<'a> {
    pub fn new(series: &'a IndicatorSeries) -> Self {
        Self {
            series,
            style: LineStyle::default(),
        }
    }

    pub fn styled(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }
}

/// An indicator drawn in its own panel.
#[derive(Debug, Clone)]
pub struct PanelInput<'a> {
    pub series: &'a IndicatorSeries,
    /// Defaults to the series name.
    pub y_axis_title: Option<String>,
    pub reference_lines: Vec<ReferenceLine>,
}

impl<'a> PanelInput<'a> {
    pub fn new(series: &'a IndicatorSeries) -> Self {
        Self {
            series,
            y_axis_title: None,
            reference_lines: Vec::new(),
        }
    }

    pub fn with_axis_title(mut self, title: impl Into<String>) -> Self {
        self.y_axis_title = Some(title.into());
        self
    }

    pub fn with_reference_line(mut self, value: f64, style: LineStyle) -> Self {
        self.reference_lines.push(ReferenceLine { value, style });
        self
    }
}

/// Presentation settings that do not affect the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Defaults to "{ticker} Price Chart with Indicators".
    pub title: Option<String>,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub height: u32,
    pub panel_height: u32,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            title: None,
            x_axis_title: "Date".to_string(),
            y_axis_title: "Price".to_string(),
            height: 600,
            panel_height: 300,
        }
    }
}

/// Compose `series` with `overlays` and `secondary_panels` into a [`ChartSpec`].
///
/// # Errors
/// - an overlay or panel with no timestamp in common with `series` => `Config`
/// - two overlays with the same name => `Config`
pub fn compose(
    series: &PriceSeries,
    overlays: &[OverlayInput<'_>],
    base_style: BaseStyle,
    secondary_panels: &[PanelInput<'_>],
    options: &ComposeOptions,
) -> Result<ChartSpec> {
    let mut seen = HashSet::new();
    let mut overlay_layers = Vec::with_capacity(overlays.len());
    for overlay in overlays {
        if !seen.insert(overlay.series.name.as_str()) {
            return Err(DashboardError::config(format!(
                "overlay '{}' was supplied more than once",
                overlay.series.name
            )));
        }
        overlay_layers.push(clip_to_base(series, overlay.series, overlay.style.clone(), "overlay")?);
    }

    let panels = secondary_panels
        .iter()
        .map(|panel| {
            Ok(Panel {
                title: panel.series.name.clone(),
                y_axis_title: panel
                    .y_axis_title
                    .clone()
                    .unwrap_or_else(|| panel.series.name.clone()),
                height: options.panel_height,
                layer: clip_to_base(series, panel.series, LineStyle::default(), "panel")?,
                reference_lines: panel.reference_lines.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ChartSpec {
        title: options
            .title
            .clone()
            .unwrap_or_else(|| format!("{} Price Chart with Indicators", series.ticker())),
        x_axis_title: options.x_axis_title.clone(),
        y_axis_title: options.y_axis_title.clone(),
        height: options.height,
        base: base_layer(series, base_style),
        overlays: overlay_layers,
        panels,
    })
}

fn base_layer(series: &PriceSeries, style: BaseStyle) -> BaseLayer {
    match style {
        BaseStyle::Line => BaseLayer::Line {
            name: "Close".to_string(),
            points: series
                .bars()
                .iter()
                .map(|b| LinePoint {
                    timestamp: b.timestamp,
                    value: b.close,
                })
                .collect(),
        },
        BaseStyle::Candlestick => BaseLayer::Candlestick {
            name: "Candlestick".to_string(),
            bars: series.bars().to_vec(),
        },
    }
}

/// Keep only the points of `indicator` whose timestamp is a base bar.
fn clip_to_base(
    series: &PriceSeries,
    indicator: &IndicatorSeries,
    style: LineStyle,
    role: &str,
) -> Result<Layer> {
    let points: Vec<_> = indicator
        .points
        .iter()
        .filter(|p| series.contains_timestamp(p.timestamp))
        .copied()
        .collect();

    if points.is_empty() {
        return Err(DashboardError::config(format!(
            "{role} '{}' shares no timestamps with the {} series ({} to {})",
            indicator.name,
            series.ticker(),
            format_timestamp(series.first_timestamp()),
            format_timestamp(series.last_timestamp()),
        )));
    }

    Ok(Layer {
        name: indicator.name.clone(),
        style,
        points,
    })
}

fn format_timestamp(ms: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.date_naive().to_string())
        .unwrap_or_else(|| ms.to_string())
}
