//! Zone-integrated target adjuster (§4.8). The one place zone detection is
//! put on a wall-clock budget — deadlines via `tokio::time::timeout`, never
//! thread cancellation, per the spec's hot-path requirement.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use crate::clock::Clock;
use crate::config::ZoneDetectorConfig;
use crate::domain::Price;
use crate::logging::EventSink;
use crate::models::{AdjustmentReason, TargetCalculation, Zone};

use super::proximity::find_nearest_resistance;

/// Looks up zones for `symbol`; the caller (the engine composition root)
/// supplies this as a thin wrapper around `detect_zones`. Boxed future so
/// `adjust_target` can wrap the call in `tokio::time::timeout` without
/// naming a generic associated future type on a trait object.
pub trait ZoneLookup: Send + Sync {
    fn zones_for(&self, symbol: &str) -> std::pin::Pin<Box<dyn Future<Output = anyhow::Result<Vec<Zone>>> + Send + '_>>;
}

/// `adjust_target` behavior, in order: no lookup configured -> `NoZone`;
/// lookup under `zone_timeout` budget, timeout/error -> fallback reasons;
/// nearest resistance within `search_ceiling_pct`, or none, or the zone at
/// or above the baseline target -> `NoZone`; else a 0.90 (default)
/// discounted candidate, gated against falling at or below entry.
pub async fn adjust_target(
    zone_lookup: Option<&Arc<dyn ZoneLookup>>,
    config: &ZoneDetectorConfig,
    clock: &dyn Clock,
    sink: &dyn EventSink,
    symbol: &str,
    entry_price: Price,
    original_2r_target: Price,
) -> TargetCalculation {
    let now = clock.now_utc();

    let Some(lookup) = zone_lookup else {
        return TargetCalculation::no_zone(original_2r_target, AdjustmentReason::NoZone, now);
    };

    let started_at = now;
    let zones = match tokio::time::timeout(config.zone_timeout, lookup.zones_for(symbol)).await {
        Ok(Ok(zones)) => zones,
        Ok(Err(err)) => {
            warn!(symbol, %err, "zone detection failed during target adjustment");
            sink.emit(
                "zone_detection_failed",
                serde_json::json!({"symbol": symbol, "detail": err.to_string()}),
            );
            return TargetCalculation::no_zone(original_2r_target, AdjustmentReason::ZoneDetectionFailed, now);
        }
        Err(_) => {
            let elapsed_ms = elapsed_ms(started_at, clock.now_utc());
            warn!(symbol, elapsed_ms, "zone detection exceeded timeout budget");
            sink.emit(
                "zone_detection_timeout",
                serde_json::json!({"symbol": symbol, "elapsed_ms": elapsed_ms}),
            );
            return TargetCalculation::no_zone(original_2r_target, AdjustmentReason::ZoneDetectionTimeout, now);
        }
    };

    let Some(zone) = find_nearest_resistance(entry_price, &zones, config.search_ceiling_pct) else {
        return TargetCalculation::no_zone(original_2r_target, AdjustmentReason::NoZone, now);
    };

    if zone.price_level.value() >= original_2r_target.value() {
        return TargetCalculation::no_zone(original_2r_target, AdjustmentReason::NoZone, now);
    }

    let candidate = zone.price_level.value() * config.adjustment_factor;

    if candidate <= entry_price.value() {
        sink.emit(
            "zone_too_close_to_entry",
            serde_json::json!({
                "symbol": symbol,
                "entry_price": entry_price.to_string(),
                "candidate": candidate.to_string(),
            }),
        );
        return TargetCalculation::no_zone(original_2r_target, AdjustmentReason::NoZone, now);
    }

    let adjusted_target = match Price::new(candidate) {
        Ok(price) => price,
        Err(_) => return TargetCalculation::no_zone(original_2r_target, AdjustmentReason::NoZone, now),
    };

    TargetCalculation::zone_resistance(
        adjusted_target,
        original_2r_target,
        zone.price_level,
        zone.strength_score,
        now,
    )
}

fn elapsed_ms(started_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - started_at).num_milliseconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::domain::{Timeframe, Volume};
    use crate::logging::{NullEventSink, RecordingEventSink};
    use crate::models::{TouchType, ZoneTouch, ZoneType};
    use rust_decimal_macros::dec;

    fn zone(price: Decimal, strength: u32) -> Zone {
        Zone {
            symbol: "AAPL".to_string(),
            price_level: Price::new(price).unwrap(),
            zone_type: ZoneType::Resistance,
            timeframe: Timeframe::Daily,
            touches: vec![ZoneTouch {
                timestamp: Utc::now(),
                price: Price::new(price).unwrap(),
                volume: Volume::new(dec!(100)).unwrap(),
                touch_type: TouchType::Rejection,
            }],
            average_volume: Volume::new(dec!(100)).unwrap(),
            highest_volume_touch: Volume::new(dec!(100)).unwrap(),
            strength_score: strength,
        }
    }

    struct FixedLookup(Vec<Zone>);

    impl ZoneLookup for FixedLookup {
        fn zones_for(&self, _symbol: &str) -> std::pin::Pin<Box<dyn Future<Output = anyhow::Result<Vec<Zone>>> + Send + '_>> {
            let zones = self.0.clone();
            Box::pin(async move { Ok(zones) })
        }
    }

    struct SlowLookup(std::time::Duration);

    impl ZoneLookup for SlowLookup {
        fn zones_for(&self, _symbol: &str) -> std::pin::Pin<Box<dyn Future<Output = anyhow::Result<Vec<Zone>>> + Send + '_>> {
            let delay = self.0;
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                Ok(Vec::new())
            })
        }
    }

    #[tokio::test]
    async fn no_lookup_returns_no_zone() {
        let config = ZoneDetectorConfig::default();
        let clock = FixedClock(Utc::now());
        let sink = NullEventSink;
        let calc = adjust_target(
            None,
            &config,
            &clock,
            &sink,
            "AAPL",
            Price::new(dec!(150.00)).unwrap(),
            Price::new(dec!(156.00)).unwrap(),
        )
        .await;
        assert_eq!(calc.adjustment_reason, AdjustmentReason::NoZone);
        assert_eq!(calc.adjusted_target.value(), dec!(156.00));
    }

    #[tokio::test]
    async fn zone_resistance_applies_discount() {
        // The default search_ceiling_pct (5%) combined with the default
        // adjustment_factor (0.90) makes a ZoneResistance candidate above
        // entry_price unreachable: a zone within 5% of entry, discounted by
        // 10%, lands at most at entry * 1.05 * 0.90 = entry * 0.945. A wider
        // ceiling is needed to exercise this path without tripping the
        // safety gate.
        let config = ZoneDetectorConfig::builder().search_ceiling_pct(dec!(15.0)).build().unwrap();
        let clock = FixedClock(Utc::now());
        let sink = NullEventSink;
        let lookup: Arc<dyn ZoneLookup> = Arc::new(FixedLookup(vec![zone(dec!(170.00), 7)]));
        let calc = adjust_target(
            Some(&lookup),
            &config,
            &clock,
            &sink,
            "AAPL",
            Price::new(dec!(150.00)).unwrap(),
            Price::new(dec!(200.00)).unwrap(),
        )
        .await;
        assert_eq!(calc.adjustment_reason, AdjustmentReason::ZoneResistance);
        assert_eq!(calc.adjusted_target.value(), dec!(153.00));
        assert_eq!(calc.resistance_zone_price.unwrap().value(), dec!(170.00));
        assert_eq!(calc.resistance_zone_strength, Some(7));
    }

    #[tokio::test]
    async fn safety_gate_rejects_candidate_at_or_below_entry() {
        let config = ZoneDetectorConfig::default();
        let clock = FixedClock(Utc::now());
        let sink = RecordingEventSink::new();
        let lookup: Arc<dyn ZoneLookup> = Arc::new(FixedLookup(vec![zone(dec!(150.50), 5)]));
        let calc = adjust_target(
            Some(&lookup),
            &config,
            &clock,
            &sink,
            "AAPL",
            Price::new(dec!(150.00)).unwrap(),
            Price::new(dec!(156.00)).unwrap(),
        )
        .await;
        assert_eq!(calc.adjustment_reason, AdjustmentReason::NoZone);
        assert_eq!(calc.adjusted_target.value(), dec!(156.00));
        let events = sink.events();
        assert!(events.iter().any(|(name, _)| name == "zone_too_close_to_entry"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_falls_back_and_logs() {
        let config = ZoneDetectorConfig::builder()
            .zone_timeout(std::time::Duration::from_millis(10))
            .build()
            .unwrap();
        let lookup: Arc<dyn ZoneLookup> = Arc::new(SlowLookup(std::time::Duration::from_millis(100)));
        let handle = tokio::spawn(async move {
            let clock = FixedClock(Utc::now());
            let sink = RecordingEventSink::new();
            let calc = adjust_target(
                Some(&lookup),
                &config,
                &clock,
                &sink,
                "AAPL",
                Price::new(dec!(150.00)).unwrap(),
                Price::new(dec!(156.00)).unwrap(),
            )
            .await;
            (calc, sink.events())
        });
        tokio::time::advance(std::time::Duration::from_millis(20)).await;
        let (calc, events) = handle.await.unwrap();
        assert_eq!(calc.adjustment_reason, AdjustmentReason::ZoneDetectionTimeout);
        assert_eq!(calc.adjusted_target.value(), dec!(156.00));
        assert!(events.iter().any(|(name, _)| name == "zone_detection_timeout"));
    }
}
