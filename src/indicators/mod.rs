// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators drawn on the
// dashboard.  Every public function over a `PriceSeries` returns a `Result` so
// callers are forced to handle insufficient-data and bad-parameter cases.

pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod returns;
pub mod rsi;
pub mod series;
pub mod sma;
pub mod volatility;

pub use engine::{compute, BollingerConfig, IndicatorConfig, IndicatorSet, VolatilityConfig};
pub use returns::{daily_returns, return_stats, ReturnStats};
pub use series::{IndicatorPoint, IndicatorSeries};
