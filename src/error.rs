//! Error taxonomy. Each component boundary gets a small `thiserror` enum;
//! callers that aggregate several causes use `anyhow::Result`.

use thiserror::Error;

/// Malformed input handed to the core — not retried, surfaced to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputInvariantError {
    #[error("price must be positive, got {0}")]
    NonPositivePrice(String),
    #[error("volume must be non-negative, got {0}")]
    NegativeVolume(String),
    #[error("bar invariant violated: low {low} > high {high}")]
    LowAboveHigh { low: String, high: String },
    #[error("bar invariant violated: open/close {value} outside [low {low}, high {high}]")]
    OpenCloseOutsideRange {
        value: String,
        low: String,
        high: String,
    },
    #[error("bars are not strictly increasing in timestamp at index {index}")]
    TimestampsNotIncreasing { index: usize },
    #[error("symbol must not be empty")]
    EmptySymbol,
}

/// The injected market-data service failed or returned insufficient data.
/// Callers treat this as "no zones" rather than propagating a hard failure.
#[derive(Debug, Error)]
pub enum DataUnavailable {
    #[error("market data provider error for {symbol}: {source}")]
    ProviderError {
        symbol: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("insufficient history for {symbol}: requested {requested_days} days, minimum {min_days}")]
    InsufficientHistory {
        symbol: String,
        requested_days: u32,
        min_days: u32,
    },
}

/// Configuration failed validation at construction time — a hard startup error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    MustBePositive { field: &'static str, value: String },
    #[error("{field} must be in ({low}, {high}], got {value}")]
    OutOfRange {
        field: &'static str,
        low: String,
        high: String,
        value: String,
    },
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: usize,
        value: usize,
    },
}

/// Unexpected failure inside detection internals. Caught at the nearest
/// component boundary and translated into a safe, typed fallback — never
/// allowed to propagate as a panic.
#[derive(Debug, Error)]
#[error("internal failure in {component}: {message}")]
pub struct InternalFailure {
    pub component: &'static str,
    pub message: String,
}

impl InternalFailure {
    pub fn new(component: &'static str, message: impl Into<String>) -> Self {
        Self {
            component,
            message: message.into(),
        }
    }
}
