// =============================================================================
// ChartSpec — declarative description of a multi-panel price chart
// =============================================================================
//
// A ChartSpec is plain data: a base price layer, overlay lines drawn on the
// same axes, and secondary panels that share the time axis.  It serialises to
// JSON for whatever renders it and is never mutated after composition.
// =============================================================================

use serde::Serialize;

use crate::indicators::IndicatorPoint;
use crate::market_data::OhlcvBar;

/// Stroke pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dash {
    #[default]
    Solid,
    Dash,
    Dot,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LineStyle {
    /// CSS colour; `None` lets the renderer pick from its palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub dash: Dash,
}

impl LineStyle {
    pub fn new(color: impl Into<String>, dash: Dash) -> Self {
        Self {
            color: Some(color.into()),
            dash,
        }
    }
}

/// One close price per bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinePoint {
    pub timestamp: i64,
    pub value: f64,
}

/// Bottom layer of the main panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BaseLayer {
    Line { name: String, points: Vec<LinePoint> },
    Candlestick { name: String, bars: Vec<OhlcvBar> },
}

#[cfg(test)]
impl BaseLayer {
    pub fn len(&self) -> usize {
        match self {
            Self::Line { points, .. } => points.len(),
            Self::Candlestick { bars, .. } => bars.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An indicator line clipped to the base layer's timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    pub style: LineStyle,
    pub points: Vec<IndicatorPoint>,
}

/// Horizontal guide drawn across a panel (e.g. RSI 70 / 30).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub value: f64,
    pub style: LineStyle,
}

/// Secondary panel below the main chart, sharing its time axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub y_axis_title: String,
    pub height: u32,
    pub layer: Layer,
    pub reference_lines: Vec<ReferenceLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub height: u32,
    pub base: BaseLayer,
    pub overlays: Vec<Layer>,
    pub panels: Vec<Panel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_layer_serialises_with_type_tag() {
        let base = BaseLayer::Line {
            name: "Close".into(),
            points: vec![LinePoint { timestamp: 1, value: 2.0 }],
        };
        let json = serde_json::to_value(&base).unwrap();
        assert_eq!(json["type"], "line");
        assert_eq!(json["points"][0]["value"], 2.0);
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn default_style_omits_colour() {
        let json = serde_json::to_value(LineStyle::default()).unwrap();
        assert!(json.get("color").is_none());
        assert_eq!(json["dash"], "solid");
        let dotted = serde_json::to_value(LineStyle::new("gray", Dash::Dot)).unwrap();
        assert_eq!(dotted["color"], "gray");
        assert_eq!(dotted["dash"], "dot");
    }

    #[test]
    fn undefined_points_serialise_as_null() {
        let layer = Layer {
            name: "Daily Return".into(),
            style: LineStyle::default(),
            points: vec![IndicatorPoint { timestamp: 5, value: None }],
        };
        let json = serde_json::to_value(&layer).unwrap();
        assert!(json["points"][0]["value"].is_null());
    }
}
