//! OHLCV ingestion: the one async boundary in an otherwise synchronous core.

mod ingestion;
mod provider;

pub use ingestion::fetch_bars;
pub use provider::{MarketDataProvider, RawBar};
