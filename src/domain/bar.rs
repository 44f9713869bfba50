use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InputInvariantError;

use super::{Price, Volume};

/// A single OHLCV bar. Construction enforces the invariants from the data
/// model: `low <= open,close <= high`, `low <= high`, `volume >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Volume,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Volume,
    ) -> Result<Self, InputInvariantError> {
        if low.value() > high.value() {
            return Err(InputInvariantError::LowAboveHigh {
                low: low.to_string(),
                high: high.to_string(),
            });
        }
        for (label, value) in [("open", open), ("close", close)] {
            if value.value() < low.value() || value.value() > high.value() {
                return Err(InputInvariantError::OpenCloseOutsideRange {
                    value: format!("{label}={value}"),
                    low: low.to_string(),
                    high: high.to_string(),
                });
            }
        }
        Ok(Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// True iff the close reversed back toward the open by at least
    /// `tolerance_pct` of the extreme that a touch was measured against —
    /// used by the zone builder to classify bounce/rejection touches.
    pub fn reverses_within(&self, extreme: Price, tolerance_pct: rust_decimal::Decimal) -> bool {
        let distance = (self.close.value() - extreme.value()).abs();
        let tolerance = extreme.value() * tolerance_pct / rust_decimal::Decimal::from(100);
        distance <= tolerance
    }
}

/// Candle granularity. Threshold selection per timeframe is wired explicitly
/// through `ZoneDetectorConfig`, never inferred from this enum alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    Daily,
    FourHour,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Daily => "daily",
            Timeframe::FourHour => "four_hour",
        }
    }
}
