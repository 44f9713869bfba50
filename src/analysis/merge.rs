//! Zone merger (§4.5): consolidates overlapping zones, keeping the stronger
//! representative. Adapted from the teacher's sweep-merge convention
//! (`analysis/range_gap_finder.rs`) but merging by score rather than by
//! union of member ranges — touch histories are not unioned across merged
//! zones, a documented MVP simplification.

use rust_decimal::Decimal;

use crate::models::Zone;

/// Merges zones whose `price_level`s are within `tolerance_pct` of each
/// other (measured against the lower-indexed member's price, per §4.5),
/// keeping the stronger representative and discarding the other. Idempotent:
/// re-running on an already-merged list is a no-op.
pub fn merge_zones(mut zones: Vec<Zone>, tolerance_pct: Decimal) -> Vec<Zone> {
    let mut merged: Vec<Zone> = Vec::new();

    zones.sort_by(|a, b| a.price_level.value().cmp(&b.price_level.value()));

    'outer: for zone in zones.drain(..) {
        for existing in merged.iter_mut() {
            if within_tolerance(existing.price_level.value(), zone.price_level.value(), tolerance_pct)
                && existing.zone_type == zone.zone_type
                && existing.timeframe == zone.timeframe
            {
                if is_stronger(&zone, existing) {
                    *existing = zone;
                }
                continue 'outer;
            }
        }
        merged.push(zone);
    }

    merged.sort_by(|a, b| {
        b.strength_score
            .cmp(&a.strength_score)
            .then_with(|| b.last_touch_ts().cmp(&a.last_touch_ts()))
            .then_with(|| a.price_level.value().cmp(&b.price_level.value()))
    });

    merged
}

fn within_tolerance(price_a: Decimal, price_b: Decimal, tolerance_pct: Decimal) -> bool {
    let distance = (price_a - price_b).abs();
    let tolerance = price_a * tolerance_pct / Decimal::from(100);
    distance <= tolerance
}

fn is_stronger(candidate: &Zone, incumbent: &Zone) -> bool {
    match candidate.strength_score.cmp(&incumbent.strength_score) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => candidate.last_touch_ts() > incumbent.last_touch_ts(),
    }
}
