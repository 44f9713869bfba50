//! Typed detector configuration. Mirrors the teacher's frozen-constant-bundle
//! pattern (`config/analysis.rs`'s `pub const ANALYSIS: AnalysisConfig`), but
//! since this config is caller-supplied rather than compiled in, it is built
//! through a validating builder instead of a `const fn`.

use rust_decimal::Decimal;
use std::time::Duration;

use crate::domain::Timeframe;
use crate::error::ConfigError;

/// Frozen, validated detector thresholds. Construct via [`ZoneDetectorConfigBuilder`]
/// or [`ZoneDetectorConfig::default`] for the documented defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDetectorConfig {
    pub tolerance_pct: Decimal,
    pub touch_threshold_daily: usize,
    pub touch_threshold_4h: usize,
    pub proximity_threshold_pct: Decimal,
    pub volume_bonus_multiplier: Decimal,
    pub breakout_price_pct: Decimal,
    pub breakout_volume_mult: Decimal,
    pub zone_timeout: Duration,
    pub adjustment_factor: Decimal,
    pub search_ceiling_pct: Decimal,
    pub min_days_daily: u32,
    pub min_days_4h: u32,
    pub swing_lookback_k: usize,
    pub pole_pct: Decimal,
    pub flag_min_bars: usize,
    pub flag_max_bars: usize,
    pub flag_range_pct: Decimal,
}

impl ZoneDetectorConfig {
    pub fn builder() -> ZoneDetectorConfigBuilder {
        ZoneDetectorConfigBuilder::new()
    }

    pub fn touch_threshold(&self, timeframe: Timeframe) -> usize {
        match timeframe {
            Timeframe::Daily => self.touch_threshold_daily,
            Timeframe::FourHour => self.touch_threshold_4h,
        }
    }

    pub fn min_days(&self, timeframe: Timeframe) -> u32 {
        match timeframe {
            Timeframe::Daily => self.min_days_daily,
            Timeframe::FourHour => self.min_days_4h,
        }
    }
}

impl Default for ZoneDetectorConfig {
    fn default() -> Self {
        ZoneDetectorConfigBuilder::new()
            .build()
            .expect("documented defaults must pass validation")
    }
}

/// Builder that validates every threshold at `build()` time. Invalid
/// configuration is a hard startup error (`Err(ConfigError)`), never a
/// silent clamp — per-field clamping belongs to the newtypes in `domain`,
/// not to this top-level bundle.
#[derive(Debug, Clone)]
pub struct ZoneDetectorConfigBuilder {
    tolerance_pct: Decimal,
    touch_threshold_daily: usize,
    touch_threshold_4h: usize,
    proximity_threshold_pct: Decimal,
    volume_bonus_multiplier: Decimal,
    breakout_price_pct: Decimal,
    breakout_volume_mult: Decimal,
    zone_timeout: Duration,
    adjustment_factor: Decimal,
    search_ceiling_pct: Decimal,
    min_days_daily: u32,
    min_days_4h: u32,
    swing_lookback_k: usize,
    pole_pct: Decimal,
    flag_min_bars: usize,
    flag_max_bars: usize,
    flag_range_pct: Decimal,
}

macro_rules! setter {
    ($name:ident, $ty:ty) => {
        pub fn $name(mut self, value: $ty) -> Self {
            self.$name = value;
            self
        }
    };
}

impl ZoneDetectorConfigBuilder {
    pub fn new() -> Self {
        Self {
            tolerance_pct: Decimal::new(15, 1),          // 1.5
            touch_threshold_daily: 3,
            touch_threshold_4h: 2,
            proximity_threshold_pct: Decimal::new(20, 1), // 2.0
            volume_bonus_multiplier: Decimal::new(15, 1), // 1.5
            breakout_price_pct: Decimal::ONE,
            breakout_volume_mult: Decimal::new(13, 1), // 1.3
            zone_timeout: Duration::from_millis(50),
            adjustment_factor: Decimal::new(90, 2), // 0.90
            search_ceiling_pct: Decimal::new(50, 1), // 5.0
            min_days_daily: 30,
            min_days_4h: 30,
            swing_lookback_k: 2,
            pole_pct: Decimal::from(8),
            flag_min_bars: 2,
            flag_max_bars: 5,
            flag_range_pct: Decimal::from(5),
        }
    }

    setter!(tolerance_pct, Decimal);
    setter!(touch_threshold_daily, usize);
    setter!(touch_threshold_4h, usize);
    setter!(proximity_threshold_pct, Decimal);
    setter!(volume_bonus_multiplier, Decimal);
    setter!(breakout_price_pct, Decimal);
    setter!(breakout_volume_mult, Decimal);
    setter!(zone_timeout, Duration);
    setter!(adjustment_factor, Decimal);
    setter!(search_ceiling_pct, Decimal);
    setter!(min_days_daily, u32);
    setter!(min_days_4h, u32);
    setter!(swing_lookback_k, usize);
    setter!(pole_pct, Decimal);
    setter!(flag_min_bars, usize);
    setter!(flag_max_bars, usize);
    setter!(flag_range_pct, Decimal);

    pub fn build(self) -> Result<ZoneDetectorConfig, ConfigError> {
        positive("tolerance_pct", self.tolerance_pct)?;
        positive("proximity_threshold_pct", self.proximity_threshold_pct)?;
        positive("volume_bonus_multiplier", self.volume_bonus_multiplier)?;
        positive("breakout_price_pct", self.breakout_price_pct)?;
        positive("breakout_volume_mult", self.breakout_volume_mult)?;
        positive("search_ceiling_pct", self.search_ceiling_pct)?;
        positive("pole_pct", self.pole_pct)?;
        positive("flag_range_pct", self.flag_range_pct)?;
        in_range(
            "adjustment_factor",
            self.adjustment_factor,
            Decimal::ZERO,
            Decimal::ONE,
        )?;
        at_least("touch_threshold_daily", self.touch_threshold_daily, 1)?;
        at_least("touch_threshold_4h", self.touch_threshold_4h, 1)?;
        at_least("swing_lookback_k", self.swing_lookback_k, 1)?;
        at_least("flag_min_bars", self.flag_min_bars, 1)?;
        if self.flag_max_bars < self.flag_min_bars {
            return Err(ConfigError::TooSmall {
                field: "flag_max_bars",
                min: self.flag_min_bars,
                value: self.flag_max_bars,
            });
        }
        if self.zone_timeout.is_zero() {
            return Err(ConfigError::MustBePositive {
                field: "zone_timeout",
                value: "0ms".to_string(),
            });
        }

        Ok(ZoneDetectorConfig {
            tolerance_pct: self.tolerance_pct,
            touch_threshold_daily: self.touch_threshold_daily,
            touch_threshold_4h: self.touch_threshold_4h,
            proximity_threshold_pct: self.proximity_threshold_pct,
            volume_bonus_multiplier: self.volume_bonus_multiplier,
            breakout_price_pct: self.breakout_price_pct,
            breakout_volume_mult: self.breakout_volume_mult,
            zone_timeout: self.zone_timeout,
            adjustment_factor: self.adjustment_factor,
            search_ceiling_pct: self.search_ceiling_pct,
            min_days_daily: self.min_days_daily,
            min_days_4h: self.min_days_4h,
            swing_lookback_k: self.swing_lookback_k,
            pole_pct: self.pole_pct,
            flag_min_bars: self.flag_min_bars,
            flag_max_bars: self.flag_max_bars,
            flag_range_pct: self.flag_range_pct,
        })
    }
}

impl Default for ZoneDetectorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn positive(field: &'static str, value: Decimal) -> Result<(), ConfigError> {
    if value <= Decimal::ZERO {
        return Err(ConfigError::MustBePositive {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn in_range(field: &'static str, value: Decimal, low: Decimal, high: Decimal) -> Result<(), ConfigError> {
    if value <= low || value > high {
        return Err(ConfigError::OutOfRange {
            field,
            low: low.to_string(),
            high: high.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

fn at_least(field: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::TooSmall { field, min, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_successfully() {
        let cfg = ZoneDetectorConfig::default();
        assert_eq!(cfg.touch_threshold_daily, 3);
        assert_eq!(cfg.touch_threshold_4h, 2);
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        let err = ZoneDetectorConfig::builder()
            .tolerance_pct(Decimal::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MustBePositive { field: "tolerance_pct", .. }));
    }

    #[test]
    fn rejects_adjustment_factor_above_one() {
        let err = ZoneDetectorConfig::builder()
            .adjustment_factor(Decimal::from(2))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "adjustment_factor", .. }));
    }

    #[test]
    fn rejects_flag_max_below_min() {
        let err = ZoneDetectorConfig::builder()
            .flag_min_bars(5)
            .flag_max_bars(2)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::TooSmall { field: "flag_max_bars", .. }));
    }
}
