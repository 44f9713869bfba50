use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::Timeframe;
use crate::error::DataUnavailable;

/// A bar as the wire format hands it over: unvalidated decimal fields.
/// `fetch_bars` (§4.1) is responsible for turning these into invariant-
/// checked [`crate::domain::Bar`]s, dropping or rejecting what doesn't hold up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Abstract interface for fetching historical market data. Adapted from the
/// teacher's `MarketDataProvider` trait shape (`data/provider.rs`): a single
/// async method returning raw bars, with the HTTP/exchange details kept
/// entirely behind the implementation.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch `days` of history for `symbol` at the given `timeframe`.
    /// Implementations translate `timeframe` to their native interval/span.
    async fn get_historical_ohlcv(
        &self,
        symbol: &str,
        days: u32,
        timeframe: Timeframe,
    ) -> Result<Vec<RawBar>, DataUnavailable>;
}
