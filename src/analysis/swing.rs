//! Swing-point detector (§4.2): N-bar pivot highs/lows. Windowed-scan style
//! adapted from the teacher's rolling-window pattern in
//! `models/timeseries.rs::calculate_rvol_at_index`, here made symmetric
//! (both sides of the bar, not trailing-only) and strict (ties are not
//! swings, avoiding plateau duplication).

use chrono::{DateTime, Utc};

use crate::domain::{Bar, Price, Volume};

/// A single swing point: the timestamp, price (the extremum), and the
/// volume of the bar it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingPoint {
    pub timestamp: DateTime<Utc>,
    pub price: Price,
    pub volume: Volume,
}

/// Finds swing highs and swing lows. A bar `i` is a swing high iff its high
/// is strictly greater than every bar's high in `[i-k, i-1] ∪ [i+1, i+k]`.
/// Swing low is symmetric on `.low`. The first and last `k` bars can never
/// be swings. O(n*k).
pub fn find_swings(bars: &[Bar], k: usize) -> (Vec<SwingPoint>, Vec<SwingPoint>) {
    let mut highs = Vec::new();
    let mut lows = Vec::new();

    if bars.len() <= 2 * k {
        return (highs, lows);
    }

    for i in k..bars.len() - k {
        let candidate = &bars[i];

        let is_swing_high = (i - k..i)
            .chain(i + 1..=i + k)
            .all(|j| candidate.high.value() > bars[j].high.value());
        if is_swing_high {
            highs.push(SwingPoint {
                timestamp: candidate.timestamp,
                price: candidate.high,
                volume: candidate.volume,
            });
        }

        let is_swing_low = (i - k..i)
            .chain(i + 1..=i + k)
            .all(|j| candidate.low.value() < bars[j].low.value());
        if is_swing_low {
            lows.push(SwingPoint {
                timestamp: candidate.timestamp,
                price: candidate.low,
                volume: candidate.volume,
            });
        }
    }

    (highs, lows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn bar(day: i64, high: Decimal, low: Decimal) -> Bar {
        let ts = Utc.timestamp_opt(0, 0).unwrap() + Duration::days(day);
        Bar::new(
            ts,
            Price::new((high + low) / dec!(2)).unwrap(),
            Price::new(high).unwrap(),
            Price::new(low).unwrap(),
            Price::new((high + low) / dec!(2)).unwrap(),
            Volume::new(dec!(1000)).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn detects_a_simple_swing_high() {
        let bars = vec![
            bar(0, dec!(100), dec!(95)),
            bar(1, dec!(102), dec!(97)),
            bar(2, dec!(110), dec!(105)), // swing high
            bar(3, dec!(103), dec!(98)),
            bar(4, dec!(101), dec!(96)),
        ];
        let (highs, lows) = find_swings(&bars, 2);
        assert_eq!(highs.len(), 1);
        assert_eq!(highs[0].price.value(), dec!(110));
        assert!(lows.is_empty() || lows[0].price.value() != dec!(110));
    }

    #[test]
    fn detects_a_simple_swing_low() {
        let bars = vec![
            bar(0, dec!(100), dec!(95)),
            bar(1, dec!(98), dec!(93)),
            bar(2, dec!(97), dec!(85)), // swing low
            bar(3, dec!(99), dec!(92)),
            bar(4, dec!(101), dec!(96)),
        ];
        let (_, lows) = find_swings(&bars, 2);
        assert_eq!(lows.len(), 1);
        assert_eq!(lows[0].price.value(), dec!(85));
    }

    #[test]
    fn ties_are_not_swings() {
        let bars = vec![
            bar(0, dec!(100), dec!(95)),
            bar(1, dec!(102), dec!(97)),
            bar(2, dec!(102), dec!(97)), // tie with bar 1, neither is a swing
            bar(3, dec!(100), dec!(95)),
            bar(4, dec!(99), dec!(94)),
        ];
        let (highs, _) = find_swings(&bars, 1);
        assert!(highs.is_empty());
    }

    #[test]
    fn boundary_bars_cannot_be_swings() {
        let bars = vec![
            bar(0, dec!(200), dec!(1)), // would be a swing high but is at the edge
            bar(1, dec!(100), dec!(95)),
            bar(2, dec!(101), dec!(96)),
        ];
        let (highs, _) = find_swings(&bars, 1);
        assert!(highs.is_empty());
    }

    #[test]
    fn too_few_bars_returns_empty() {
        let bars = vec![bar(0, dec!(100), dec!(95))];
        let (highs, lows) = find_swings(&bars, 2);
        assert!(highs.is_empty() && lows.is_empty());
    }
}
