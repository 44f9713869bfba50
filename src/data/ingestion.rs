use std::collections::HashMap;

use tracing::warn;

use crate::domain::{Bar, Price, Timeframe, Volume};
use crate::logging::EventSink;

use super::provider::{MarketDataProvider, RawBar};

/// Fraction of invalid bars above which the whole fetch is discarded rather
/// than partially cleaned — the spec's 10% data-quality gate.
const MAX_INVALID_FRACTION: f64 = 0.10;

/// Request historical bars from `provider`, validate, and normalize them.
///
/// Steps: drop duplicate timestamps (keep the latest), reject bars that
/// violate the `Bar` invariants, and bail out to an empty result (with a
/// `data_quality_degraded` event) if more than 10% of bars were invalid.
/// Returns empty if `days` is below the timeframe's minimum. A provider
/// error is treated as "no zones", never propagated.
pub async fn fetch_bars(
    provider: &dyn MarketDataProvider,
    sink: &dyn EventSink,
    symbol: &str,
    days: u32,
    timeframe: Timeframe,
    min_days: u32,
) -> Vec<Bar> {
    if days < min_days {
        return Vec::new();
    }

    let raw = match provider.get_historical_ohlcv(symbol, days, timeframe).await {
        Ok(bars) => bars,
        Err(err) => {
            warn!(symbol, %err, "market data provider unavailable");
            sink.emit(
                "data_quality_degraded",
                serde_json::json!({
                    "symbol": symbol,
                    "timeframe": timeframe.as_str(),
                    "reason": "provider_error",
                    "detail": err.to_string(),
                }),
            );
            return Vec::new();
        }
    };

    normalize(raw, symbol, timeframe, sink)
}

fn normalize(raw: Vec<RawBar>, symbol: &str, timeframe: Timeframe, sink: &dyn EventSink) -> Vec<Bar> {
    if raw.is_empty() {
        return Vec::new();
    }

    // Dedup by timestamp, keeping the latest occurrence.
    let mut latest_by_ts: HashMap<chrono::DateTime<chrono::Utc>, RawBar> = HashMap::new();
    let mut order: Vec<chrono::DateTime<chrono::Utc>> = Vec::new();
    for bar in raw {
        if !latest_by_ts.contains_key(&bar.timestamp) {
            order.push(bar.timestamp);
        }
        latest_by_ts.insert(bar.timestamp, bar);
    }
    order.sort();

    let total = order.len();
    let mut valid = Vec::with_capacity(total);
    let mut invalid_count = 0usize;

    for ts in &order {
        let raw_bar = latest_by_ts[ts];
        match to_bar(raw_bar) {
            Ok(bar) => valid.push(bar),
            Err(err) => {
                invalid_count += 1;
                warn!(symbol, %err, "dropping invalid bar");
            }
        }
    }

    if total > 0 && (invalid_count as f64 / total as f64) > MAX_INVALID_FRACTION {
        sink.emit(
            "data_quality_degraded",
            serde_json::json!({
                "symbol": symbol,
                "timeframe": timeframe.as_str(),
                "reason": "too_many_invalid_bars",
                "invalid_count": invalid_count,
                "total_count": total,
            }),
        );
        return Vec::new();
    }

    // Bars must already be strictly increasing after the timestamp dedup
    // and sort above; this is a final defensive check against a
    // pathologically misbehaving provider.
    for window in valid.windows(2) {
        if window[0].timestamp >= window[1].timestamp {
            return Vec::new();
        }
    }

    valid
}

fn to_bar(raw: RawBar) -> Result<Bar, crate::error::InputInvariantError> {
    let open = Price::new(raw.open)?;
    let high = Price::new(raw.high)?;
    let low = Price::new(raw.low)?;
    let close = Price::new(raw.close)?;
    let volume = Volume::new(raw.volume)?;
    Bar::new(raw.timestamp, open, high, low, close, volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataUnavailable;
    use crate::logging::NullEventSink;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct FakeProvider {
        bars: Vec<RawBar>,
    }

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        async fn get_historical_ohlcv(
            &self,
            _symbol: &str,
            _days: u32,
            _timeframe: Timeframe,
        ) -> Result<Vec<RawBar>, DataUnavailable> {
            Ok(self.bars.clone())
        }
    }

    fn raw(day: i64, close: Decimal) -> RawBar {
        RawBar {
            timestamp: Utc.timestamp_opt(0, 0).unwrap() + Duration::days(day),
            open: close,
            high: close + dec!(1),
            low: close - dec!(1),
            close,
            volume: dec!(100),
        }
    }

    #[tokio::test]
    async fn returns_empty_below_min_days() {
        let provider = FakeProvider { bars: vec![] };
        let sink = NullEventSink;
        let bars = fetch_bars(&provider, &sink, "AAPL", 10, Timeframe::Daily, 30).await;
        assert!(bars.is_empty());
    }

    #[tokio::test]
    async fn dedups_keeping_latest_and_sorts() {
        let mut bars = vec![raw(1, dec!(100)), raw(1, dec!(105)), raw(2, dec!(110))];
        bars.reverse();
        let provider = FakeProvider { bars };
        let sink = NullEventSink;
        let result = fetch_bars(&provider, &sink, "AAPL", 30, Timeframe::Daily, 30).await;
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].close.value(), dec!(105));
        assert!(result[0].timestamp < result[1].timestamp);
    }

    #[tokio::test]
    async fn drops_invalid_bars_below_threshold() {
        let mut bars: Vec<RawBar> = (0..10).map(|i| raw(i, dec!(100) + Decimal::from(i))).collect();
        // one bad bar: low above high
        bars[0].low = dec!(1000);
        let provider = FakeProvider { bars };
        let sink = NullEventSink;
        let result = fetch_bars(&provider, &sink, "AAPL", 30, Timeframe::Daily, 30).await;
        assert_eq!(result.len(), 9);
    }

    #[tokio::test]
    async fn returns_empty_when_too_many_invalid() {
        let mut bars: Vec<RawBar> = (0..10).map(|i| raw(i, dec!(100) + Decimal::from(i))).collect();
        for b in bars.iter_mut().take(5) {
            b.low = dec!(100000);
        }
        let provider = FakeProvider { bars };
        let sink = NullEventSink;
        let result = fetch_bars(&provider, &sink, "AAPL", 30, Timeframe::Daily, 30).await;
        assert!(result.is_empty());
    }
}
