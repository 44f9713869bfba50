use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Price, Timeframe, Volume};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneType {
    Support,
    Resistance,
}

impl ZoneType {
    pub fn flipped(self) -> Self {
        match self {
            ZoneType::Support => ZoneType::Resistance,
            ZoneType::Resistance => ZoneType::Support,
        }
    }
}

/// How a touch resolved against the zone at build time. `Unclassified` is
/// the real, expected outcome when the following bar neither bounces nor
/// rejects within tolerance — it is not a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchType {
    Bounce,
    Rejection,
    Breakout,
    Unclassified,
}

/// A bar extremum interacting with a zone within tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneTouch {
    pub timestamp: DateTime<Utc>,
    pub price: Price,
    pub volume: Volume,
    pub touch_type: TouchType,
}

/// A clustered price level with multiple historical touches and a strength
/// score. Immutable: a breakout produces a *new* `Zone`, never an in-place
/// mutation of this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub symbol: String,
    pub price_level: Price,
    pub zone_type: ZoneType,
    pub timeframe: Timeframe,
    pub touches: Vec<ZoneTouch>,
    pub average_volume: Volume,
    pub highest_volume_touch: Volume,
    pub strength_score: u32,
}

impl Zone {
    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    pub fn first_touch_ts(&self) -> Option<DateTime<Utc>> {
        self.touches.first().map(|t| t.timestamp)
    }

    pub fn last_touch_ts(&self) -> Option<DateTime<Utc>> {
        self.touches.last().map(|t| t.timestamp)
    }

    /// Deterministic opaque id derived from `(symbol, zone_type, timeframe,
    /// price_level)` so repeated scans over identical bars produce identical
    /// ids — the pure core never reaches for a random UUID generator.
    pub fn id(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.symbol.hash(&mut hasher);
        match self.zone_type {
            ZoneType::Support => 0u8.hash(&mut hasher),
            ZoneType::Resistance => 1u8.hash(&mut hasher),
        }
        self.timeframe.as_str().hash(&mut hasher);
        self.price_level.to_string().hash(&mut hasher);
        format!("zone-{:016x}", hasher.finish())
    }

    /// Produces the new, flipped-type zone a breakout emits. Preserves
    /// `price_level` and the prior `touches`; appends the `Breakout` touch.
    pub fn with_breakout_touch(&self, touch: ZoneTouch) -> Zone {
        let mut touches = self.touches.clone();
        touches.push(touch);
        Zone {
            symbol: self.symbol.clone(),
            price_level: self.price_level,
            zone_type: self.zone_type.flipped(),
            timeframe: self.timeframe,
            touches,
            average_volume: self.average_volume,
            highest_volume_touch: self.highest_volume_touch,
            strength_score: self.strength_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProximityDirection {
    ApproachingSupport,
    ApproachingResistance,
}

/// A zone whose distance from the current price is within the configured
/// threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityAlert {
    pub symbol: String,
    pub zone_id: String,
    pub zone_price: Price,
    pub current_price: Price,
    pub distance_pct: Decimal,
    pub direction: ProximityDirection,
    pub timestamp: DateTime<Utc>,
}
