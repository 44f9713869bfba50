use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::Price;

/// Why the adjusted target does (or does not) differ from the baseline 2:1
/// target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    ZoneResistance,
    NoZone,
    ZoneDetectionFailed,
    ZoneDetectionTimeout,
}

/// The final profit target, its baseline 2:1 reference, and the reason any
/// adjustment was (not) applied. Immutable value type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetCalculation {
    pub adjusted_target: Price,
    pub original_2r_target: Price,
    pub adjustment_reason: AdjustmentReason,
    pub resistance_zone_price: Option<Price>,
    pub resistance_zone_strength: Option<u32>,
    pub timestamp: DateTime<Utc>,
}

impl TargetCalculation {
    pub fn no_zone(original_2r_target: Price, reason: AdjustmentReason, timestamp: DateTime<Utc>) -> Self {
        debug_assert!(matches!(
            reason,
            AdjustmentReason::NoZone
                | AdjustmentReason::ZoneDetectionFailed
                | AdjustmentReason::ZoneDetectionTimeout
        ));
        Self {
            adjusted_target: original_2r_target,
            original_2r_target,
            adjustment_reason: reason,
            resistance_zone_price: None,
            resistance_zone_strength: None,
            timestamp,
        }
    }

    pub fn zone_resistance(
        adjusted_target: Price,
        original_2r_target: Price,
        resistance_zone_price: Price,
        resistance_zone_strength: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            adjusted_target,
            original_2r_target,
            adjustment_reason: AdjustmentReason::ZoneResistance,
            resistance_zone_price: Some(resistance_zone_price),
            resistance_zone_strength: Some(resistance_zone_strength),
            timestamp,
        }
    }

    pub fn is_consistent(&self) -> bool {
        let bounded = self.adjusted_target.value() <= self.original_2r_target.value();
        let zone_fields_consistent = match self.adjustment_reason {
            AdjustmentReason::ZoneResistance => {
                self.resistance_zone_price.is_some() && self.resistance_zone_strength.is_some()
            }
            _ => {
                self.resistance_zone_price.is_none()
                    && self.resistance_zone_strength.is_none()
                    && self.adjusted_target.value() == self.original_2r_target.value()
            }
        };
        bounded && zone_fields_consistent
    }
}

/// Baseline 2:1 target: entry + 2 * (entry - stop).
pub fn baseline_2r_target(entry: Decimal, stop: Decimal) -> Decimal {
    entry + Decimal::from(2) * (entry - stop)
}
