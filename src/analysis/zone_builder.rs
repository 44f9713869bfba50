//! Zone construction + strength scoring (§4.4). Grounded on the teacher's
//! `analysis/zone_scoring.rs` composite-score shape, generalized from its
//! fixed weight table to the spec's `touch_count + volume-bonus` formula.

use rust_decimal::Decimal;

use crate::config::ZoneDetectorConfig;
use crate::domain::{Bar, Price, Timeframe, Volume};
use crate::models::{Zone, ZoneTouch, ZoneType, TouchType};

use super::cluster::PriceCluster;

/// Builds zones from clusters, joining each member back to its source bar
/// by timestamp, then filters by the timeframe's minimum touch count.
/// Zones below threshold are dropped entirely, not retained as weak zones.
///
/// `dataset_avg_volume` is the mean volume across the *whole* fetched bar
/// series (the caller's concern — see `ZoneEngine::detect_zones`), used as
/// the baseline for each touch's volume-bonus check. A touch compares
/// against the overall series' typical volume, not the zone's own handful
/// of touches, so a zone built from only high-volume touches doesn't
/// silently cancel its own bonus by inflating its own average.
pub fn build_zones(
    clusters: Vec<PriceCluster>,
    bars: &[Bar],
    symbol: &str,
    zone_type: ZoneType,
    timeframe: Timeframe,
    config: &ZoneDetectorConfig,
    dataset_avg_volume: Decimal,
) -> Vec<Zone> {
    let mut zones: Vec<Zone> = clusters
        .into_iter()
        .filter_map(|cluster| build_one_zone(cluster, bars, symbol, zone_type, timeframe, config, dataset_avg_volume))
        .filter(|zone| zone.touch_count() >= config.touch_threshold(timeframe))
        .collect();

    zones.sort_by(|a, b| {
        b.strength_score
            .cmp(&a.strength_score)
            .then_with(|| b.last_touch_ts().cmp(&a.last_touch_ts()))
            .then_with(|| a.price_level.value().cmp(&b.price_level.value()))
    });

    zones
}

fn build_one_zone(
    cluster: PriceCluster,
    bars: &[Bar],
    symbol: &str,
    zone_type: ZoneType,
    timeframe: Timeframe,
    config: &ZoneDetectorConfig,
    dataset_avg_volume: Decimal,
) -> Option<Zone> {
    let price_level = median_price(&cluster)?;

    let mut touches: Vec<ZoneTouch> = cluster
        .points
        .iter()
        .filter_map(|point| {
            let bar_index = bars.iter().position(|b| b.timestamp == point.timestamp)?;
            let touch_type = classify_touch(bars, bar_index, zone_type, point.price, config.tolerance_pct);
            Some(ZoneTouch {
                timestamp: point.timestamp,
                price: point.price,
                volume: point.volume,
                touch_type,
            })
        })
        .collect();
    touches.sort_by_key(|t| t.timestamp);

    if touches.is_empty() {
        return None;
    }

    let average_volume = mean_volume(&touches);
    let highest_volume_touch = touches
        .iter()
        .map(|t| t.volume)
        .max()
        .unwrap_or_default();

    let bonus_threshold = dataset_avg_volume * config.volume_bonus_multiplier;
    let bonus_count = touches
        .iter()
        .filter(|t| t.volume.value() > bonus_threshold)
        .count();
    let strength_score = touches.len() as u32 + bonus_count as u32;

    Some(Zone {
        symbol: symbol.to_string(),
        price_level,
        zone_type,
        timeframe,
        touches,
        average_volume,
        highest_volume_touch,
        strength_score,
    })
}

/// A touch is classified by looking at the *next* bar after the touch bar:
/// if its close reverses back within tolerance of the extreme, the touch
/// bounced (support) or got rejected (resistance). No next bar, or no
/// reversal, is `Unclassified`.
fn classify_touch(
    bars: &[Bar],
    bar_index: usize,
    zone_type: ZoneType,
    extreme: Price,
    tolerance_pct: Decimal,
) -> TouchType {
    let Some(next_bar) = bars.get(bar_index + 1) else {
        return TouchType::Unclassified;
    };
    if !next_bar.reverses_within(extreme, tolerance_pct) {
        return TouchType::Unclassified;
    }
    match zone_type {
        ZoneType::Support => TouchType::Bounce,
        ZoneType::Resistance => TouchType::Rejection,
    }
}

/// Lower-median of the cluster's member prices, for deterministic even-count
/// behavior (per the spec's explicit resolution of this open question).
fn median_price(cluster: &PriceCluster) -> Option<Price> {
    if cluster.points.is_empty() {
        return None;
    }
    let mut prices: Vec<Decimal> = cluster.points.iter().map(|p| p.price.value()).collect();
    prices.sort();
    let mid = (prices.len() - 1) / 2;
    Price::new(prices[mid]).ok()
}

fn mean_volume(touches: &[ZoneTouch]) -> Volume {
    if touches.is_empty() {
        return Volume::default();
    }
    let total: Decimal = touches.iter().map(|t| t.volume.value()).sum();
    Volume::new(total / Decimal::from(touches.len())).unwrap_or_default()
}
