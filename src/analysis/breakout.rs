//! Breakout detection (§4.7). A pure function: the caller (bull-flag glue or
//! a scan loop) is responsible for not re-evaluating a zone that already
//! produced a breakout this session — this detector holds no state of its
//! own, matching the teacher's preference for stateless analysis functions
//! over internal mutable trackers.

use rust_decimal::Decimal;

use crate::domain::Bar;
use crate::models::{TouchType, Zone, ZoneTouch, ZoneType};

/// Resistance-only breakout (downside/support breakouts are deferred).
/// Recognized iff `current_bar.close >= price_level * (1 + breakout_price_pct/100)`
/// and `current_bar.volume >= reference_avg_volume * breakout_volume_mult`.
/// On success, returns a new `Support` zone carrying the prior history plus
/// an appended `Breakout` touch; the input zone is untouched.
pub fn detect_breakout(
    zone: &Zone,
    current_bar: &Bar,
    reference_avg_volume: Decimal,
    breakout_price_pct: Decimal,
    breakout_volume_mult: Decimal,
) -> Option<Zone> {
    if zone.zone_type != ZoneType::Resistance {
        return None;
    }

    let price_threshold = zone.price_level.value() * (Decimal::ONE + breakout_price_pct / Decimal::from(100));
    if current_bar.close.value() < price_threshold {
        return None;
    }

    let volume_threshold = reference_avg_volume * breakout_volume_mult;
    if current_bar.volume.value() < volume_threshold {
        return None;
    }

    let touch = ZoneTouch {
        timestamp: current_bar.timestamp,
        price: current_bar.close,
        volume: current_bar.volume,
        touch_type: TouchType::Breakout,
    };
    Some(zone.with_breakout_touch(touch))
}
