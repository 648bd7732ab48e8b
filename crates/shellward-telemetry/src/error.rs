//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up tracing.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log level, a directive or the format is malformed.
    #[error("invalid logging configuration: {0}")]
    InvalidConfig(String),

    /// A global subscriber is already installed.
    #[error("failed to install subscriber: {0}")]
    Init(String),

    /// The log directory could not be created.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
