//! Proximity checking and nearest-zone lookups (§4.6).

use rust_decimal::Decimal;

use crate::domain::Price;
use crate::models::{ProximityAlert, ProximityDirection, Zone, ZoneType};

/// Returns an alert for every zone within `threshold_pct` of `current_price`,
/// excluding exact equality (touching, not approaching). Sorted by
/// `distance_pct` ascending.
pub fn check_proximity(
    symbol: &str,
    zones: &[Zone],
    current_price: Price,
    threshold_pct: Decimal,
    now: chrono::DateTime<chrono::Utc>,
) -> Vec<ProximityAlert> {
    let mut alerts: Vec<ProximityAlert> = zones
        .iter()
        .filter_map(|zone| {
            let distance_pct = distance_pct(current_price.value(), zone.price_level.value());
            if distance_pct <= Decimal::ZERO || distance_pct > threshold_pct {
                return None;
            }
            let direction = if current_price.value() < zone.price_level.value() {
                ProximityDirection::ApproachingResistance
            } else {
                ProximityDirection::ApproachingSupport
            };
            Some(ProximityAlert {
                symbol: symbol.to_string(),
                zone_id: zone.id(),
                zone_price: zone.price_level,
                current_price,
                distance_pct,
                direction,
                timestamp: now,
            })
        })
        .collect();

    alerts.sort_by(|a, b| a.distance_pct.cmp(&b.distance_pct));
    alerts
}

fn distance_pct(current_price: Decimal, zone_price: Decimal) -> Decimal {
    (current_price - zone_price).abs() / zone_price * Decimal::from(100)
}

/// The resistance zone with the lowest `price_level` above `current_price`,
/// within `search_ceiling_pct` of it.
pub fn find_nearest_resistance(current_price: Price, zones: &[Zone], search_ceiling_pct: Decimal) -> Option<&Zone> {
    let ceiling = current_price.value() * (Decimal::ONE + search_ceiling_pct / Decimal::from(100));
    zones
        .iter()
        .filter(|z| z.zone_type == ZoneType::Resistance)
        .filter(|z| z.price_level.value() > current_price.value() && z.price_level.value() <= ceiling)
        .min_by_key(|z| z.price_level.value())
}

/// Symmetric: the support zone with the highest `price_level` below
/// `current_price`, within `search_ceiling_pct` of it.
pub fn find_nearest_support(current_price: Price, zones: &[Zone], search_ceiling_pct: Decimal) -> Option<&Zone> {
    let floor = current_price.value() * (Decimal::ONE - search_ceiling_pct / Decimal::from(100));
    zones
        .iter()
        .filter(|z| z.zone_type == ZoneType::Support)
        .filter(|z| z.price_level.value() < current_price.value() && z.price_level.value() >= floor)
        .max_by_key(|z| z.price_level.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Timeframe, Volume};
    use crate::models::{ZoneTouch, TouchType};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn zone(price: Decimal, zone_type: ZoneType) -> Zone {
        Zone {
            symbol: "AAPL".to_string(),
            price_level: Price::new(price).unwrap(),
            zone_type,
            timeframe: Timeframe::Daily,
            touches: vec![ZoneTouch {
                timestamp: Utc::now(),
                price: Price::new(price).unwrap(),
                volume: Volume::new(dec!(100)).unwrap(),
                touch_type: TouchType::Unclassified,
            }],
            average_volume: Volume::new(dec!(100)).unwrap(),
            highest_volume_touch: Volume::new(dec!(100)).unwrap(),
            strength_score: 3,
        }
    }

    #[test]
    fn alerts_within_threshold_approaching_resistance() {
        let zones = vec![zone(dec!(155.00), ZoneType::Resistance)];
        let alerts = check_proximity("AAPL", &zones, Price::new(dec!(152.10)).unwrap(), dec!(2.0), Utc::now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].direction, ProximityDirection::ApproachingResistance);
        assert!(alerts[0].distance_pct > dec!(1.8) && alerts[0].distance_pct < dec!(1.9));
    }

    #[test]
    fn exact_equality_excluded() {
        let zones = vec![zone(dec!(155.00), ZoneType::Resistance)];
        let alerts = check_proximity("AAPL", &zones, Price::new(dec!(155.00)).unwrap(), dec!(2.0), Utc::now());
        assert!(alerts.is_empty());
    }

    #[test]
    fn outside_threshold_excluded() {
        let zones = vec![zone(dec!(155.00), ZoneType::Resistance)];
        let alerts = check_proximity("AAPL", &zones, Price::new(dec!(100.00)).unwrap(), dec!(2.0), Utc::now());
        assert!(alerts.is_empty());
    }

    #[test]
    fn nearest_resistance_picks_lowest_above_within_ceiling() {
        let zones = vec![
            zone(dec!(160.00), ZoneType::Resistance),
            zone(dec!(152.00), ZoneType::Resistance),
            zone(dec!(140.00), ZoneType::Support),
        ];
        let nearest = find_nearest_resistance(Price::new(dec!(150.00)).unwrap(), &zones, dec!(5.0)).unwrap();
        assert_eq!(nearest.price_level.value(), dec!(152.00));
    }

    #[test]
    fn nearest_resistance_excludes_beyond_ceiling() {
        let zones = vec![zone(dec!(200.00), ZoneType::Resistance)];
        assert!(find_nearest_resistance(Price::new(dec!(150.00)).unwrap(), &zones, dec!(5.0)).is_none());
    }

    #[test]
    fn nearest_support_picks_highest_below_within_floor() {
        let zones = vec![
            zone(dec!(140.00), ZoneType::Support),
            zone(dec!(148.00), ZoneType::Support),
        ];
        let nearest = find_nearest_support(Price::new(dec!(150.00)).unwrap(), &zones, dec!(5.0)).unwrap();
        assert_eq!(nearest.price_level.value(), dec!(148.00));
    }
}
