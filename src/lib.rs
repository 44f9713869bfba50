#![allow(clippy::too_many_arguments)]

pub mod analysis;
pub mod clock;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ZoneDetectorConfig, ZoneDetectorConfigBuilder};
pub use data::{fetch_bars, MarketDataProvider, RawBar};
pub use domain::{Bar, Price, Pct, Timeframe, Volume};
pub use engine::ZoneEngine;
pub use logging::{EventSink, JsonlEventSink, NullEventSink, RecordingEventSink};
pub use models::{
    AdjustmentReason, BullFlagSignal, FlagInfo, PoleInfo, ProximityAlert, ProximityDirection, TargetCalculation,
    TouchType, Zone, ZoneTouch, ZoneType,
};
