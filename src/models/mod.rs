//! Value types produced by the analytical core. All are plain, immutable
//! data — no interior mutability, no mutation-in-place. A breakout produces
//! a new `Zone`; nothing here is ever patched.

mod signal;
mod target;
mod zone;

pub use signal::{FlagInfo, PoleInfo, BullFlagSignal};
pub use target::{baseline_2r_target, AdjustmentReason, TargetCalculation};
pub use zone::{ProximityAlert, ProximityDirection, Zone, ZoneTouch, ZoneType, TouchType};
