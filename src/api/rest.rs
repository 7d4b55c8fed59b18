// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/` and are read-only:
//
//   GET /api/v1/health     liveness probe
//   GET /api/v1/defaults   configured tickers, range, and indicator defaults
//   GET /api/v1/chart      one DashboardView for one ticker
//   GET /api/v1/charts     one result per ticker of a comma-separated list
//
// Query parameters are translated into a `DashboardRequest`; anything the
// caller omits falls back to the runtime config.  Pipeline errors become a
// JSON body `{error, message, retryable}` with a matching status code.
//
// CORS is configured permissively; the API carries no credentials.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::app_state::AppState;
use crate::dashboard::{parse_tickers, DashboardRequest, DashboardView};
use crate::error::DashboardError;
use crate::indicators::{BollingerConfig, IndicatorConfig, VolatilityConfig};
use crate::market_data::{DateRange, MarketDataSource};
use crate::runtime_config::{PeriodsPerYear, RuntimeConfig};
use crate::types::{BaseStyle, Interval};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router<S: MarketDataSource + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health::<S>))
        .route("/api/v1/defaults", get(defaults::<S>))
        .route("/api/v1/chart", get(chart::<S>))
        .route("/api/v1/charts", get(charts::<S>))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Error responses
// =============================================================================

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    retryable: bool,
}

impl From<&DashboardError> for ErrorBody {
    fn from(err: &DashboardError) -> Self {
        Self {
            error: err.kind(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

fn status_for(err: &DashboardError) -> StatusCode {
    match err {
        DashboardError::RangeInvalid { .. } | DashboardError::Config(_) => StatusCode::BAD_REQUEST,
        DashboardError::NotFound { .. } | DashboardError::NoData { .. } => StatusCode::NOT_FOUND,
        DashboardError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DashboardError::NetworkFailure { .. } => StatusCode::BAD_GATEWAY,
    }
}

/// A pipeline error rendered as an HTTP response.
struct ApiError(DashboardError);

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (status_for(&self.0), Json(ErrorBody::from(&self.0))).into_response()
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    started_at: i64,
}

async fn health<S>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        server_time: Utc::now().timestamp_millis(),
        started_at: state.started_at,
    };
    Json(resp)
}

// =============================================================================
// Defaults
// =============================================================================

#[derive(Serialize)]
struct DefaultsResponse<'a> {
    tickers: &'a [String],
    lookback_days: u32,
    interval: Interval,
    base_style: BaseStyle,
    indicators: &'a IndicatorConfig,
    periods_per_year: PeriodsPerYear,
    max_tickers_per_request: usize,
}

async fn defaults<S>(State(state): State<Arc<AppState<S>>>) -> Response {
    let cfg = &state.config;
    Json(DefaultsResponse {
        tickers: &cfg.default_tickers,
        lookback_days: cfg.default_lookback_days,
        interval: cfg.default_interval,
        base_style: cfg.default_base_style,
        indicators: &cfg.indicators,
        periods_per_year: cfg.periods_per_year,
        max_tickers_per_request: cfg.max_tickers_per_request,
    })
    .into_response()
}

// =============================================================================
// Chart query parameters
// =============================================================================

/// Raw query string of the chart endpoints.  Every field is optional; values
/// are validated in [`build_request`] so errors carry a readable message.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub ticker: Option<String>,
    pub tickers: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub lookback_days: Option<String>,
    pub interval: Option<String>,
    pub style: Option<String>,
    pub ema: Option<String>,
    pub sma: Option<String>,
    pub bb_period: Option<String>,
    pub bb_width: Option<String>,
    pub rsi: Option<String>,
    pub vol_window: Option<String>,
    pub vol_annualize: Option<String>,
    pub returns: Option<String>,
}

fn is_off(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "off" | "none" | "false" | "no")
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, DashboardError> {
    value
        .trim()
        .parse()
        .map_err(|_| DashboardError::config(format!("{name} must be a number or 'off', got '{value}'")))
}

fn parse_flag(name: &str, value: &str) -> Result<bool, DashboardError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(DashboardError::config(format!("{name} must be true or false, got '{value}'"))),
    }
}

fn parse_date(name: &str, value: &str) -> Result<NaiveDate, DashboardError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DashboardError::config(format!("{name} must be a YYYY-MM-DD date, got '{value}'")))
}

/// `None` when absent, `Some(None)` for "off", `Some(Some(n))` for a number.
fn parse_toggle(name: &str, value: Option<&str>) -> Result<Option<Option<usize>>, DashboardError> {
    match value {
        None => Ok(None),
        Some(v) if is_off(v) => Ok(Some(None)),
        Some(v) => parse_number(name, v).map(|n| Some(Some(n))),
    }
}

fn apply_indicator_params(
    mut indicators: IndicatorConfig,
    query: &ChartQuery,
) -> Result<IndicatorConfig, DashboardError> {
    if let Some(ema) = parse_toggle("ema", query.ema.as_deref())? {
        indicators.ema_period = ema;
    }
    if let Some(rsi) = parse_toggle("rsi", query.rsi.as_deref())? {
        indicators.rsi_period = rsi;
    }

    if let Some(sma) = query.sma.as_deref() {
        indicators.sma_periods = if is_off(sma) {
            Vec::new()
        } else {
            sma.split(',')
                .filter(|p| !p.trim().is_empty())
                .map(|p| parse_number("sma", p))
                .collect::<Result<_, _>>()?
        };
    }

    if let Some(bb) = parse_toggle("bb_period", query.bb_period.as_deref())? {
        indicators.bollinger = bb.map(|period| BollingerConfig {
            period,
            ..indicators.bollinger.unwrap_or_default()
        });
    }
    if let Some(width) = query.bb_width.as_deref() {
        let width: f64 = parse_number("bb_width", width)?;
        if let Some(bb) = indicators.bollinger.as_mut() {
            bb.width = width;
        }
    }

    if let Some(vol) = parse_toggle("vol_window", query.vol_window.as_deref())? {
        indicators.volatility = vol.map(|window| VolatilityConfig {
            window,
            ..indicators.volatility.unwrap_or_default()
        });
    }
    if let Some(annualize) = query.vol_annualize.as_deref() {
        let annualize = parse_flag("vol_annualize", annualize)?;
        if let Some(vol) = indicators.volatility.as_mut() {
            vol.annualize = annualize;
        }
    }

    if let Some(returns) = query.returns.as_deref() {
        indicators.daily_returns = parse_flag("returns", returns)?;
    }

    Ok(indicators)
}

/// Translate `query` into a request for `ticker`, filling gaps from `config`.
/// `today` is the default end of the range.
pub fn build_request(
    config: &RuntimeConfig,
    query: &ChartQuery,
    ticker: &str,
    today: NaiveDate,
) -> Result<DashboardRequest, DashboardError> {
    let end = match query.end.as_deref() {
        Some(end) => parse_date("end", end)?,
        None => today,
    };
    let range = match query.start.as_deref() {
        Some(start) => DateRange::new(parse_date("start", start)?, end)?,
        None => {
            let days = match query.lookback_days.as_deref() {
                Some(days) => parse_number("lookback_days", days)?,
                None => config.default_lookback_days,
            };
            DateRange::lookback(end, days)?
        }
    };

    let interval = match query.interval.as_deref() {
        Some(v) => Interval::parse(v).ok_or_else(|| DashboardError::config(format!("unknown interval '{v}'")))?,
        None => config.default_interval,
    };
    let base_style = match query.style.as_deref() {
        Some(v) => BaseStyle::parse(v).ok_or_else(|| DashboardError::config(format!("unknown chart style '{v}'")))?,
        None => config.default_base_style,
    };

    Ok(DashboardRequest {
        ticker: ticker.trim().to_uppercase(),
        range,
        interval,
        indicators: apply_indicator_params(config.indicators.clone(), query)?,
        base_style,
    })
}

fn default_ticker(config: &RuntimeConfig) -> Result<String, DashboardError> {
    config
        .default_tickers
        .first()
        .cloned()
        .ok_or_else(|| DashboardError::config("no ticker given and no default tickers configured"))
}

// =============================================================================
// Chart endpoints
// =============================================================================

async fn chart<S: MarketDataSource>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<DashboardView>, ApiError> {
    let ticker = match query.ticker.as_deref() {
        Some(t) => t.to_string(),
        None => default_ticker(&state.config)?,
    };
    let request = build_request(&state.config, &query, &ticker, Utc::now().date_naive())?;
    debug!(
        ticker = %request.ticker,
        start = %request.range.start(),
        end = %request.range.end(),
        "chart request parsed"
    );

    let view = state.dashboard.render(&request).await?;
    Ok(Json(view))
}

#[derive(Serialize)]
struct TickerResult {
    ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    view: Option<DashboardView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

async fn charts<S: MarketDataSource>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<Vec<TickerResult>>, ApiError> {
    let cfg = &state.config;
    let tickers = match query.tickers.as_deref() {
        Some(list) => parse_tickers(list),
        None => parse_tickers(&cfg.default_tickers.join(",")),
    };
    if tickers.is_empty() {
        return Err(DashboardError::config("no tickers given").into());
    }
    if tickers.len() > cfg.max_tickers_per_request {
        return Err(DashboardError::config(format!(
            "at most {} tickers per request, got {}",
            cfg.max_tickers_per_request,
            tickers.len()
        ))
        .into());
    }

    let today = Utc::now().date_naive();
    let requests = tickers
        .iter()
        .map(|t| build_request(cfg, &query, t, today))
        .collect::<Result<Vec<_>, _>>()?;

    let outcomes = state.dashboard.render_many(&requests).await;
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(tickers = outcomes.len(), failed, "multi-ticker request finished");

    let results = outcomes
        .into_iter()
        .map(|o| match o.result {
            Ok(view) => TickerResult {
                ticker: o.ticker,
                view: Some(view),
                error: None,
            },
            Err(e) => TickerResult {
                ticker: o.ticker,
                view: None,
                error: Some(ErrorBody::from(&e)),
            },
        })
        .collect();
    Ok(Json(results))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::test_util::{bars_from_closes, date, StaticSource};

    fn closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.2).sin() * 5.0 + i as f64 * 0.1).collect()
    }

    fn app(source: StaticSource) -> Router {
        router(Arc::new(AppState::new(RuntimeConfig::default(), source)))
    }

    fn canned() -> StaticSource {
        StaticSource::new()
            .with_ticker("AAPL", bars_from_closes(&closes(250)))
            .with_ticker("MSFT", bars_from_closes(&closes(10)))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    const YEAR_2024: &str = "start=2024-01-01&end=2024-12-31";

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = get_json(app(canned()), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["server_time"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn defaults_expose_config() {
        let (status, body) = get_json(app(canned()), "/api/v1/defaults").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tickers"][0], "AAPL");
        assert_eq!(body["lookback_days"], 365);
        assert_eq!(body["indicators"]["ema_period"], 20);
        assert_eq!(body["periods_per_year"]["daily"], 252.0);
    }

    #[tokio::test]
    async fn chart_renders_requested_indicators() {
        let uri = format!("/api/v1/chart?ticker=aapl&{YEAR_2024}&style=line&sma=off&bb_period=off&vol_window=off");
        let (status, body) = get_json(app(canned()), &uri).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["ticker"], "AAPL");
        assert_eq!(body["bars"], 250);
        assert_eq!(body["chart"]["base"]["type"], "line");
        assert_eq!(body["chart"]["overlays"].as_array().unwrap().len(), 1);
        assert_eq!(body["chart"]["overlays"][0]["name"], "EMA(20)");
        let panels = body["chart"]["panels"].as_array().unwrap();
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0]["title"], "RSI(14)");
        assert_eq!(body["stats"]["count"], 249);
    }

    #[tokio::test]
    async fn unknown_ticker_is_404() {
        let uri = format!("/api/v1/chart?ticker=DOESNOTEXIST&{YEAR_2024}");
        let (status, body) = get_json(app(canned()), &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["retryable"], false);
    }

    #[tokio::test]
    async fn inverted_range_is_400() {
        let (status, body) =
            get_json(app(canned()), "/api/v1/chart?ticker=AAPL&start=2024-06-01&end=2024-01-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "range_invalid");
    }

    #[tokio::test]
    async fn short_series_is_422() {
        let uri = format!(
            "/api/v1/chart?ticker=MSFT&{YEAR_2024}&ema=off&sma=off&rsi=off&vol_window=off&returns=false&bb_period=50"
        );
        let (status, body) = get_json(app(canned()), &uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "insufficient_data");
        assert_eq!(body["message"], "need at least 50 bars for a 50-period Bollinger band, got 10");
    }

    #[tokio::test]
    async fn oversized_windows_are_422() {
        for param in ["rsi", "vol_window"] {
            let uri = format!("/api/v1/chart?ticker=AAPL&{YEAR_2024}&{param}={}", usize::MAX);
            let (status, body) = get_json(app(canned()), &uri).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{param}: {body}");
            assert_eq!(body["error"], "insufficient_data");
        }
    }

    #[tokio::test]
    async fn zero_period_is_config_error() {
        let uri = format!("/api/v1/chart?ticker=AAPL&{YEAR_2024}&ema=0");
        let (status, body) = get_json(app(canned()), &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "config_error");
    }

    #[tokio::test]
    async fn unreachable_source_is_502_and_retryable() {
        let uri = format!("/api/v1/chart?ticker=AAPL&{YEAR_2024}");
        let (status, body) = get_json(app(StaticSource::unreachable()), &uri).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "network_failure");
        assert_eq!(body["retryable"], true);
    }

    #[tokio::test]
    async fn charts_reports_each_ticker() {
        let uri = format!("/api/v1/charts?tickers=aapl,NOPE&{YEAR_2024}&sma=off");
        let (status, body) = get_json(app(canned()), &uri).await;
        assert_eq!(status, StatusCode::OK);
        let results = body.as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["ticker"], "AAPL");
        assert_eq!(results[0]["view"]["bars"], 250);
        assert!(results[0].get("error").is_none());
        assert_eq!(results[1]["ticker"], "NOPE");
        assert_eq!(results[1]["error"]["error"], "not_found");
    }

    #[tokio::test]
    async fn charts_rejects_too_many_tickers() {
        let list = (0..11).map(|i| format!("T{i}")).collect::<Vec<_>>().join(",");
        let (status, body) = get_json(app(canned()), &format!("/api/v1/charts?tickers={list}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "config_error");
    }

    #[test]
    fn build_request_uses_defaults() {
        let cfg = RuntimeConfig::default();
        let today = date(2024, 12, 31);
        let req = build_request(&cfg, &ChartQuery::default(), " msft ", today).unwrap();
        assert_eq!(req.ticker, "MSFT");
        assert_eq!(req.range.end(), today);
        assert_eq!(req.range.start(), date(2024, 1, 1));
        assert_eq!(req.interval, Interval::Daily);
        assert_eq!(req.base_style, BaseStyle::Candlestick);
        assert_eq!(req.indicators, cfg.indicators);
    }

    #[test]
    fn build_request_applies_overrides() {
        let cfg = RuntimeConfig::default();
        let query = ChartQuery {
            lookback_days: Some("30".into()),
            interval: Some("weekly".into()),
            ema: Some("off".into()),
            sma: Some("10, 30".into()),
            bb_width: Some("2.5".into()),
            vol_window: Some("10".into()),
            vol_annualize: Some("false".into()),
            returns: Some("false".into()),
            ..ChartQuery::default()
        };
        let req = build_request(&cfg, &query, "AAPL", date(2024, 3, 31)).unwrap();
        assert_eq!(req.range.start(), date(2024, 3, 1));
        assert_eq!(req.interval, Interval::Weekly);
        assert_eq!(req.indicators.ema_period, None);
        assert_eq!(req.indicators.sma_periods, vec![10, 30]);
        assert_eq!(
            req.indicators.bollinger,
            Some(BollingerConfig { period: 20, width: 2.5 })
        );
        assert_eq!(
            req.indicators.volatility,
            Some(VolatilityConfig { window: 10, annualize: false })
        );
        assert!(!req.indicators.daily_returns);
        assert_eq!(req.indicators.rsi_period, Some(14));
    }

    #[test]
    fn build_request_rejects_bad_values() {
        let cfg = RuntimeConfig::default();
        let today = date(2024, 1, 1);
        for query in [
            ChartQuery { interval: Some("hourly".into()), ..ChartQuery::default() },
            ChartQuery { style: Some("area".into()), ..ChartQuery::default() },
            ChartQuery { start: Some("01/02/2024".into()), ..ChartQuery::default() },
            ChartQuery { rsi: Some("fourteen".into()), ..ChartQuery::default() },
            ChartQuery { returns: Some("maybe".into()), ..ChartQuery::default() },
        ] {
            let err = build_request(&cfg, &query, "AAPL", today).unwrap_err();
            assert!(matches!(err, DashboardError::Config(_)), "{query:?} gave {err:?}");
        }
    }
}
