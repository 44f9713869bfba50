//! Numeric/time primitives: fixed-point price and volume arithmetic, UTC
//! timestamps, and the `Bar` record that everything downstream is built on.

mod bar;
mod money;

pub use bar::{Bar, Timeframe};
pub use money::{Pct, Price, Volume};
