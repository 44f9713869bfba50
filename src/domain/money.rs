//! Newtype wrappers over `rust_decimal::Decimal`. Mirrors the teacher's
//! newtype-over-primitive convention (`PhPct`, `VolRatio`, `BaseVol`) but
//! backed by exact decimal arithmetic instead of `f64`, per the spec's
//! "never convert to binary float for price/volume" requirement.

use std::fmt;
use std::ops::Deref;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InputInvariantError;

/// A strictly positive monetary price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    pub fn new(value: Decimal) -> Result<Self, InputInvariantError> {
        if value <= Decimal::ZERO {
            return Err(InputInvariantError::NonPositivePrice(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Deref for Price {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative trade volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Volume(Decimal);

impl Volume {
    pub fn new(value: Decimal) -> Result<Self, InputInvariantError> {
        if value < Decimal::ZERO {
            return Err(InputInvariantError::NegativeVolume(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Deref for Volume {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for Volume {
    type Output = Volume;
    fn add(self, rhs: Self) -> Self::Output {
        Volume(self.0 + rhs.0)
    }
}

/// A percentage value, stored as the raw percent (e.g. `1.5` means 1.5%),
/// not a 0..1 fraction — matches the spec's literal percent thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pct(Decimal);

impl Pct {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Deref for Pct {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Pct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn price_rejects_non_positive() {
        assert!(Price::new(dec!(0)).is_err());
        assert!(Price::new(dec!(-1)).is_err());
        assert!(Price::new(dec!(0.01)).is_ok());
    }

    #[test]
    fn volume_rejects_negative() {
        assert!(Volume::new(dec!(-1)).is_err());
        assert!(Volume::new(dec!(0)).is_ok());
    }
}
