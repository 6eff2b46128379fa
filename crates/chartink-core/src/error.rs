//! Error types for the fallible, non-interactive parts of the engine.
//!
//! Pointer and keyboard handling never fails: conversions return `Option`
//! and handlers silently abort. Only configuration, snapshots and timezone
//! switching report errors.

use thiserror::Error;

/// Errors reported by the store, configuration and timezone helpers.
#[derive(Debug, Error)]
pub enum ChartInkError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ChartInkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for fallible engine operations.
pub type ChartInkResult<T> = Result<T, ChartInkError>;
