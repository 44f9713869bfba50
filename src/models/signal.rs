use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::Price;

use super::TargetCalculation;

/// The sharp rise preceding a flag consolidation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoleInfo {
    pub start_price: Price,
    pub height_pct: Decimal,
    pub bar_count: usize,
}

/// The narrow consolidation following a pole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagInfo {
    pub high: Price,
    pub low: Price,
    pub range_pct: Decimal,
    pub bar_count: usize,
}

/// A detected bull-flag entry, with its zone-adjusted profit target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BullFlagSignal {
    pub symbol: String,
    pub entry_price: Price,
    pub stop_price: Price,
    pub target: TargetCalculation,
    pub pole: PoleInfo,
    pub flag: FlagInfo,
    pub score: Decimal,
    pub timestamp: DateTime<Utc>,
}
