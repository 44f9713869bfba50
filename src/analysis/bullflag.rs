//! Bull-flag pattern recognition glue (§4.9). Grounded on the teacher's
//! pattern-scanning shape in `analysis/` (candidate window scan + score),
//! generalized to the pole/flag/breakout shape and wired to the target
//! adjuster for a zone-adjusted profit target.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::clock::Clock;
use crate::config::ZoneDetectorConfig;
use crate::domain::{Bar, Price};
use crate::logging::EventSink;
use crate::models::{AdjustmentReason, BullFlagSignal, FlagInfo, PoleInfo, TargetCalculation};

use super::target_adjuster::{adjust_target, ZoneLookup};

/// Scans `bars` for pole + flag + breakout setups and emits a signal per
/// occurrence. Runs with no overlap: once a pole/flag window is consumed it
/// is not re-scanned as the start of another pattern.
pub async fn scan_bull_flag(
    symbol: &str,
    bars: &[Bar],
    config: &ZoneDetectorConfig,
    zone_lookup: Option<&Arc<dyn ZoneLookup>>,
    clock: &dyn Clock,
    sink: &dyn EventSink,
) -> Vec<BullFlagSignal> {
    let mut signals = Vec::new();
    let mut i = 0;

    while i + 1 < bars.len() {
        let Some((pole, pole_end)) = find_pole(bars, i, config.pole_pct) else {
            i += 1;
            continue;
        };

        let Some((flag, flag_end)) = find_flag(bars, pole_end, config) else {
            i += 1;
            continue;
        };

        let Some(breakout_bar) = bars.get(flag_end + 1) else {
            i += 1;
            continue;
        };

        let flag_high = flag.high;
        let flag_low = flag.low;
        if breakout_bar.close.value() <= flag_high.value() {
            i += 1;
            continue;
        }
        let baseline_volume = rolling_baseline_volume(bars, flag_end);
        if breakout_bar.volume.value() <= baseline_volume {
            i += 1;
            continue;
        }

        let entry_price = flag_high;
        let stop_price = flag_low;
        let original_2r_target = Price::new(crate::models::baseline_2r_target(
            entry_price.value(),
            stop_price.value(),
        ))
        .unwrap_or(entry_price);

        let target = adjust_target(
            zone_lookup,
            config,
            clock,
            sink,
            symbol,
            entry_price,
            original_2r_target,
        )
        .await;

        let score = composite_score(&pole, &flag, &target);

        signals.push(BullFlagSignal {
            symbol: symbol.to_string(),
            entry_price,
            stop_price,
            target,
            pole,
            flag,
            score,
            timestamp: clock.now_utc(),
        });

        i = flag_end + 2;
    }

    signals
}

/// A pole is a monotone-ish rise of at least `pole_pct` completed within
/// 1 to 3 bars, starting at `start`. Returns the pole info and the index of
/// its last bar.
fn find_pole(bars: &[Bar], start: usize, pole_pct: Decimal) -> Option<(PoleInfo, usize)> {
    let start_bar = bars.get(start)?;
    let start_price = start_bar.low;

    for bar_count in 1..=3usize {
        let end = start + bar_count - 1;
        let Some(end_bar) = bars.get(end) else {
            break;
        };
        if !is_monotone_rise(bars, start, end) {
            continue;
        }
        let height_pct = (end_bar.high.value() - start_price.value()) / start_price.value() * Decimal::from(100);
        if height_pct >= pole_pct {
            return Some((
                PoleInfo {
                    start_price,
                    height_pct,
                    bar_count,
                },
                end,
            ));
        }
    }
    None
}

fn is_monotone_rise(bars: &[Bar], start: usize, end: usize) -> bool {
    bars[start..=end]
        .windows(2)
        .all(|w| w[1].close.value() >= w[0].close.value())
}

/// A flag is a 2-to-5-bar consolidation immediately following the pole,
/// whose high-low range stays within `flag_range_pct` of the pole high,
/// with non-positive slope (closes not trending back up).
fn find_flag(bars: &[Bar], pole_end: usize, config: &ZoneDetectorConfig) -> Option<(FlagInfo, usize)> {
    let pole_high = bars.get(pole_end)?.high;

    for bar_count in config.flag_min_bars..=config.flag_max_bars {
        let flag_start = pole_end + 1;
        let flag_end = flag_start + bar_count - 1;
        let Some(flag_bars) = bars.get(flag_start..=flag_end) else {
            break;
        };

        let high = flag_bars.iter().map(|b| b.high).max()?;
        let low = flag_bars.iter().map(|b| b.low).min()?;
        let range_pct = (high.value() - low.value()) / pole_high.value() * Decimal::from(100);
        if range_pct > config.flag_range_pct {
            continue;
        }

        let non_positive_slope = flag_bars
            .windows(2)
            .all(|w| w[1].close.value() <= w[0].close.value());
        if !non_positive_slope {
            continue;
        }

        return Some((
            FlagInfo {
                high,
                low,
                range_pct,
                bar_count,
            },
            flag_end,
        ));
    }
    None
}

/// Average volume of the bars making up the flag, used as the breakout's
/// volume baseline (the caller may substitute a longer reference window).
fn rolling_baseline_volume(bars: &[Bar], flag_end: usize) -> Decimal {
    let flag_start = flag_end.saturating_sub(4);
    let window = &bars[flag_start..=flag_end];
    if window.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = window.iter().map(|b| b.volume.value()).sum();
    total / Decimal::from(window.len())
}

fn composite_score(pole: &PoleInfo, flag: &FlagInfo, target: &TargetCalculation) -> Decimal {
    let zone_bonus = match target.adjustment_reason {
        AdjustmentReason::ZoneResistance => Decimal::from(target.resistance_zone_strength.unwrap_or(0)),
        _ => Decimal::ZERO,
    };
    pole.height_pct - flag.range_pct + zone_bonus
}
