//! Error types for building policy components.

use thiserror::Error;

/// Errors raised while constructing a sanitizer or filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A regex-valued rule does not compile.
    #[error("invalid pattern '{pattern}' in {field}: {message}")]
    InvalidPattern {
        /// Which rule table the pattern came from.
        field: String,
        /// The offending pattern.
        pattern: String,
        /// Compiler error.
        message: String,
    },
}

/// Result type for policy construction.
pub type PolicyResult<T> = Result<T, PolicyError>;
