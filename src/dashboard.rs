// =============================================================================
// Dashboard Controller — one user interaction, start to finish
// =============================================================================
//
// Each interaction builds a fresh, immutable `DashboardRequest` and runs it
// through the pipeline:
//
//   fetch (MarketDataSource) → compute (indicators) → compose (chart)
//
// The controller holds no per-request state; two identical requests against
// the same data produce identical charts.
// =============================================================================

use std::time::Instant;

use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};

use crate::chart::{compose, ChartSpec, ComposeOptions, Dash, LineStyle, OverlayInput, PanelInput};
use crate::error::{DashboardError, Result};
use crate::indicators::{self, daily_returns, return_stats, rsi, IndicatorConfig, IndicatorSet, ReturnStats};
use crate::market_data::{DateRange, FetchRequest, MarketDataSource, PriceSeries};
use crate::runtime_config::{PeriodsPerYear, RuntimeConfig};
use crate::types::{BaseStyle, Interval};

/// Everything one interaction asks for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardRequest {
    pub ticker: String,
    pub range: DateRange,
    pub interval: Interval,
    pub indicators: IndicatorConfig,
    pub base_style: BaseStyle,
}

/// Renderable result of one interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// UUID v4 correlating this response with its log lines.
    pub request_id: String,
    pub ticker: String,
    pub interval: Interval,
    pub range: DateRange,
    pub bars: usize,
    pub chart: ChartSpec,
    /// Absent when the series has fewer than two defined returns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ReturnStats>,
    /// ISO 8601 timestamp of when this view was produced.
    pub generated_at: String,
}

/// Outcome for one ticker of a multi-ticker render.
#[derive(Debug)]
pub struct TickerOutcome {
    pub ticker: String,
    pub result: Result<DashboardView>,
}

/// Split a comma-separated ticker list: trimmed, upper-cased, blanks and
/// repeats dropped, first-seen order kept.
pub fn parse_tickers(input: &str) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for t in input.split(',').map(|t| t.trim().to_uppercase()) {
        if !t.is_empty() && !tickers.contains(&t) {
            tickers.push(t);
        }
    }
    tickers
}

pub struct Dashboard<S> {
    source: S,
    periods_per_year: PeriodsPerYear,
    chart_height: u32,
    panel_height: u32,
}

impl<S: MarketDataSource> Dashboard<S> {
    pub fn new(source: S, config: &RuntimeConfig) -> Self {
        Self {
            source,
            periods_per_year: config.periods_per_year,
            chart_height: config.chart_height,
            panel_height: config.panel_height,
        }
    }

    /// Run `request` through fetch, compute, and compose.
    pub async fn render(&self, request: &DashboardRequest) -> Result<DashboardView> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("render", request_id = %request_id, ticker = %request.ticker);
        let started = Instant::now();

        let result = self
            .render_inner(request, request_id)
            .instrument(span.clone())
            .await;

        span.in_scope(|| match &result {
            Ok(view) => info!(
                bars = view.bars,
                overlays = view.chart.overlays.len(),
                panels = view.chart.panels.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "dashboard rendered"
            ),
            Err(e) => warn!(kind = e.kind(), error = %e, "dashboard render failed"),
        });
        result
    }

    /// Render each request in turn. A failure affects only its own ticker.
    pub async fn render_many(&self, requests: &[DashboardRequest]) -> Vec<TickerOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            outcomes.push(TickerOutcome {
                ticker: request.ticker.clone(),
                result: self.render(request).await,
            });
        }
        outcomes
    }

    async fn render_inner(&self, request: &DashboardRequest, request_id: String) -> Result<DashboardView> {
        let fetch = FetchRequest::new(&request.ticker, request.range, request.interval)?;
        let series = self.source.fetch(&fetch).await?;
        let periods_per_year = self.periods_per_year.for_interval(series.interval());

        let set = indicators::compute(&series, &request.indicators, periods_per_year)?;
        let chart = self.compose_chart(&series, &set, request.base_style)?;
        let stats = summarize(&series, &set, periods_per_year)?;

        Ok(DashboardView {
            request_id,
            ticker: series.ticker().to_string(),
            interval: series.interval(),
            range: request.range,
            bars: series.len(),
            chart,
            stats,
            generated_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    fn compose_chart(&self, series: &PriceSeries, set: &IndicatorSet, base_style: BaseStyle) -> Result<ChartSpec> {
        let mut overlays: Vec<OverlayInput<'_>> = set.smas.iter().map(OverlayInput::new).collect();
        if let Some(ema) = &set.ema {
            overlays.push(OverlayInput::new(ema).styled(LineStyle::new("orange", Dash::Solid)));
        }
        if let Some(bb) = &set.bollinger {
            overlays.push(OverlayInput::new(&bb.upper).styled(LineStyle::new("gray", Dash::Dot)));
            overlays.push(OverlayInput::new(&bb.middle).styled(LineStyle::new("gray", Dash::Dash)));
            overlays.push(OverlayInput::new(&bb.lower).styled(LineStyle::new("gray", Dash::Dot)));
        }

        let mut panels = Vec::new();
        if let Some(rsi_series) = &set.rsi {
            panels.push(
                PanelInput::new(rsi_series)
                    .with_axis_title("RSI")
                    .with_reference_line(rsi::OVERBOUGHT, LineStyle::new("red", Dash::Dash))
                    .with_reference_line(rsi::OVERSOLD, LineStyle::new("green", Dash::Dash)),
            );
        }
        if let Some(returns) = &set.daily_returns {
            panels.push(
                PanelInput::new(returns)
                    .with_axis_title("Return")
                    .with_reference_line(0.0, LineStyle::new("gray", Dash::Dot)),
            );
        }
        if let Some(vol) = &set.volatility {
            panels.push(PanelInput::new(vol).with_axis_title("Volatility"));
        }

        let options = ComposeOptions {
            title: Some(format!("{} Price Chart with Indicators", series.ticker())),
            height: self.chart_height,
            panel_height: self.panel_height,
            ..ComposeOptions::default()
        };
        compose(series, &overlays, base_style, &panels, &options)
    }
}

/// Return statistics over the series, reusing the computed returns when the
/// returns panel is enabled.
fn summarize(series: &PriceSeries, set: &IndicatorSet, periods_per_year: f64) -> Result<Option<ReturnStats>> {
    let owned;
    let returns = match &set.daily_returns {
        Some(r) => r,
        None => match daily_returns(series) {
            Ok(r) => {
                owned = r;
                &owned
            }
            Err(DashboardError::InsufficientData { .. }) => return Ok(None),
            Err(e) => return Err(e),
        },
    };
    match return_stats(returns, periods_per_year) {
        Ok(stats) => Ok(Some(stats)),
        Err(DashboardError::InsufficientData { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
