//! The pure, synchronous analytical core: swing detection through bull-flag
//! glue. Everything here is a plain function over owned/borrowed data —
//! no injected collaborators except where a component's contract names one
//! (the target adjuster's `ZoneLookup`, the bull-flag scanner's `Clock`
//! and `EventSink`).

mod breakout;
mod bullflag;
mod cluster;
mod merge;
mod proximity;
mod swing;
mod target_adjuster;
mod zone_builder;

pub use breakout::detect_breakout;
pub use bullflag::scan_bull_flag;
pub use cluster::{cluster_by_price, PriceCluster};
pub use merge::merge_zones;
pub use proximity::{check_proximity, find_nearest_resistance, find_nearest_support};
pub use swing::{find_swings, SwingPoint};
pub use target_adjuster::{adjust_target, ZoneLookup};
pub use zone_builder::build_zones;
