//! Audit-related error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur with audit logging.
///
/// Writing to the log never returns these; file failures during
/// `log_execution`, `log_security_event` and rotation are reported on the
/// diagnostic channel instead.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Reading or writing a log file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// A query filter is malformed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
