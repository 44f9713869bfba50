//! Composition root (§6). Wires the injected collaborators — market-data
//! provider, clock, event sink, config — together with the pure analysis
//! functions into the small, stable external API. Modeled on the teacher's
//! `engine/core.rs` `SniperEngine`: collaborators held as `Arc<dyn Trait>`,
//! constructed once, borrowed by every call.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::analysis::{
    adjust_target, build_zones, check_proximity, cluster_by_price, detect_breakout, find_nearest_resistance,
    find_nearest_support, find_swings, merge_zones, scan_bull_flag, ZoneLookup,
};
use crate::clock::Clock;
use crate::config::ZoneDetectorConfig;
use crate::data::{fetch_bars, MarketDataProvider};
use crate::domain::{Bar, Price, Timeframe};
use crate::logging::EventSink;
use crate::models::{BullFlagSignal, ProximityAlert, TargetCalculation, Zone, ZoneType};

/// The engine's external API surface. Holds its collaborators behind
/// `Arc<dyn Trait>` so cloning the engine (e.g. to hand one to each of N
/// concurrent `tokio::spawn` scans) is cheap and shares the same sink/clock.
#[derive(Clone)]
pub struct ZoneEngine {
    provider: Arc<dyn MarketDataProvider>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    config: Arc<ZoneDetectorConfig>,
}

impl ZoneEngine {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
        config: ZoneDetectorConfig,
    ) -> Self {
        Self {
            provider,
            clock,
            sink,
            config: Arc::new(config),
        }
    }

    /// §4.1-§4.5 composed: fetch, find swings, cluster, build+score, merge.
    /// Support and resistance zones are found independently (swing lows
    /// feed support, swing highs feed resistance) and concatenated.
    pub async fn detect_zones(&self, symbol: &str, days: u32, timeframe: Timeframe) -> Vec<Zone> {
        let bars = fetch_bars(
            self.provider.as_ref(),
            self.sink.as_ref(),
            symbol,
            days,
            timeframe,
            self.config.min_days(timeframe),
        )
        .await;

        if bars.is_empty() {
            return Vec::new();
        }

        let (swing_highs, swing_lows) = find_swings(&bars, self.config.swing_lookback_k);

        let resistance_clusters = cluster_by_price(swing_highs, self.config.tolerance_pct);
        let support_clusters = cluster_by_price(swing_lows, self.config.tolerance_pct);

        let dataset_avg_volume = mean_bar_volume(&bars);

        let resistance_zones = build_zones(
            resistance_clusters,
            &bars,
            symbol,
            ZoneType::Resistance,
            timeframe,
            &self.config,
            dataset_avg_volume,
        );
        let support_zones = build_zones(
            support_clusters,
            &bars,
            symbol,
            ZoneType::Support,
            timeframe,
            &self.config,
            dataset_avg_volume,
        );

        let mut all = resistance_zones;
        all.extend(support_zones);
        let merged = merge_zones(all, self.config.tolerance_pct);

        if let Some(strongest) = merged.first() {
            self.sink.emit(
                "zone_identified",
                serde_json::json!({
                    "symbol": symbol,
                    "timeframe": timeframe.as_str(),
                    "zone_count": merged.len(),
                    "strongest_zone_price": strongest.price_level.to_string(),
                    "strongest_zone_strength": strongest.strength_score,
                    "scan_timestamp": self.clock.now_utc().to_rfc3339(),
                }),
            );
        }
        info!(symbol, zone_count = merged.len(), "zone scan complete");

        merged
    }

    pub fn check_proximity(&self, symbol: &str, current_price: Price, zones: &[Zone]) -> Vec<ProximityAlert> {
        let alerts = check_proximity(
            symbol,
            zones,
            current_price,
            self.config.proximity_threshold_pct,
            self.clock.now_utc(),
        );
        for alert in &alerts {
            self.sink.emit(
                "proximity_alert",
                serde_json::json!({
                    "symbol": alert.symbol,
                    "zone_price": alert.zone_price.to_string(),
                    "current_price": alert.current_price.to_string(),
                    "distance_pct": alert.distance_pct.to_string(),
                    "direction": format!("{:?}", alert.direction),
                    "timestamp": alert.timestamp.to_rfc3339(),
                }),
            );
        }
        alerts
    }

    pub fn find_nearest_resistance<'a>(&self, current_price: Price, zones: &'a [Zone]) -> Option<&'a Zone> {
        find_nearest_resistance(current_price, zones, self.config.search_ceiling_pct)
    }

    pub fn find_nearest_support<'a>(&self, current_price: Price, zones: &'a [Zone]) -> Option<&'a Zone> {
        find_nearest_support(current_price, zones, self.config.search_ceiling_pct)
    }

    pub fn detect_breakout(&self, zone: &Zone, current_bar: &Bar, reference_avg_volume: Decimal) -> Option<Zone> {
        let result = detect_breakout(
            zone,
            current_bar,
            reference_avg_volume,
            self.config.breakout_price_pct,
            self.config.breakout_volume_mult,
        );
        if let Some(new_zone) = &result {
            self.sink.emit(
                "breakout_detected",
                serde_json::json!({
                    "symbol": zone.symbol,
                    "prior_zone_type": format!("{:?}", zone.zone_type),
                    "price_level": zone.price_level.to_string(),
                    "close": current_bar.close.to_string(),
                    "volume_ratio": (current_bar.volume.value() / reference_avg_volume).to_string(),
                    "timestamp": current_bar.timestamp.to_rfc3339(),
                }),
            );
            debug_assert_eq!(new_zone.price_level, zone.price_level);
        }
        result
    }

    /// §4.8. `adjust_target` uses `self` as the zone lookup — detecting
    /// zones for `symbol` at the daily timeframe with the engine's own
    /// history/threshold defaults — so callers never construct a
    /// `ZoneLookup` by hand.
    pub async fn adjust_target(&self, symbol: &str, entry_price: Price, original_2r_target: Price) -> TargetCalculation {
        let lookup: Arc<dyn ZoneLookup> = Arc::new(EngineZoneLookup {
            engine: self.clone(),
        });
        let started_at = std::time::Instant::now();
        let calc = adjust_target(
            Some(&lookup),
            &self.config,
            self.clock.as_ref(),
            self.sink.as_ref(),
            symbol,
            entry_price,
            original_2r_target,
        )
        .await;
        let elapsed_ms = started_at.elapsed().as_millis() as i64;

        self.sink.emit(
            "target_calculated",
            serde_json::json!({
                "symbol": symbol,
                "entry_price": entry_price.to_string(),
                "adjusted_target": calc.adjusted_target.to_string(),
                "original_2r_target": calc.original_2r_target.to_string(),
                "adjustment_reason": format!("{:?}", calc.adjustment_reason),
                "resistance_zone_price": calc.resistance_zone_price.map(|p| p.to_string()),
                "resistance_zone_strength": calc.resistance_zone_strength,
                "elapsed_ms": elapsed_ms,
                "timestamp": calc.timestamp.to_rfc3339(),
            }),
        );

        calc
    }

    /// §4.9 glue. Scans each symbol's daily bars independently; per-symbol
    /// results are concatenated in the order `symbols` was given.
    pub async fn scan_bull_flag(&self, symbols: &[String]) -> Vec<BullFlagSignal> {
        let mut signals = Vec::new();
        for symbol in symbols {
            let bars = fetch_bars(
                self.provider.as_ref(),
                self.sink.as_ref(),
                symbol,
                self.config.min_days(Timeframe::Daily),
                Timeframe::Daily,
                self.config.min_days(Timeframe::Daily),
            )
            .await;
            if bars.is_empty() {
                continue;
            }
            let lookup: Arc<dyn ZoneLookup> = Arc::new(EngineZoneLookup {
                engine: self.clone(),
            });
            let mut found = scan_bull_flag(
                symbol,
                &bars,
                &self.config,
                Some(&lookup),
                self.clock.as_ref(),
                self.sink.as_ref(),
            )
            .await;
            signals.append(&mut found);
        }
        signals
    }
}

fn mean_bar_volume(bars: &[Bar]) -> Decimal {
    if bars.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = bars.iter().map(|b| b.volume.value()).sum();
    total / Decimal::from(bars.len())
}

/// Adapts `ZoneEngine::detect_zones` (at the daily timeframe, the engine's
/// default scan horizon) to the `ZoneLookup` trait the target adjuster
/// expects, so the 50ms budget wraps the full fetch-cluster-build-merge
/// pipeline, not just a cache read.
struct EngineZoneLookup {
    engine: ZoneEngine,
}

impl ZoneLookup for EngineZoneLookup {
    fn zones_for(&self, symbol: &str) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Zone>>> + Send + '_>> {
        let symbol = symbol.to_string();
        Box::pin(async move {
            let days = self.engine.config.min_days(Timeframe::Daily);
            Ok(self.engine.detect_zones(&symbol, days, Timeframe::Daily).await)
        })
    }
}
