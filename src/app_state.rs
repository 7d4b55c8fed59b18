// =============================================================================
// Application State
// =============================================================================
//
// Shared across request handlers via `Arc<AppState>`.  Everything in here is
// immutable after startup: the runtime config and the dashboard controller
// (which owns the market data client).
// =============================================================================

use chrono::Utc;

use crate::dashboard::Dashboard;
use crate::market_data::{MarketDataSource, YahooSource};
use crate::runtime_config::RuntimeConfig;

pub struct AppState<S = YahooSource> {
    pub config: RuntimeConfig,
    pub dashboard: Dashboard<S>,
    /// Unix milliseconds at which the state was built.
    pub started_at: i64,
}

impl<S: MarketDataSource> AppState<S> {
    pub fn new(config: RuntimeConfig, source: S) -> Self {
        let dashboard = Dashboard::new(source, &config);
        Self {
            config,
            dashboard,
            started_at: Utc::now().timestamp_millis(),
        }
    }
}

impl AppState<YahooSource> {
    /// Build the production state: a Yahoo client configured from `config`.
    pub fn with_yahoo(config: RuntimeConfig) -> anyhow::Result<Self> {
        let source = YahooSource::new(&config.yahoo_base_url, config.fetch_timeout())?;
        Ok(Self::new(config, source))
    }
}
