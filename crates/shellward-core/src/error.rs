//! The gate's error taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What kind of security rule a command tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Matched a blocked pattern or blocked-command list entry.
    BlockedCommand,
    /// Shell injection chaining or dangerous expansion.
    InjectionAttempt,
    /// `..` or symlink escape from the workspace.
    PathTraversal,
    /// A referenced path or `cd` target resolved outside the workspace.
    WorkspaceViolation,
    /// Referenced a protected system location (`/etc`, `/proc`, ...).
    SystemPath,
}

impl ViolationKind {
    /// Snake-case name used in log lines and statistics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BlockedCommand => "blocked_command",
            Self::InjectionAttempt => "injection_attempt",
            Self::PathTraversal => "path_traversal",
            Self::WorkspaceViolation => "workspace_violation",
            Self::SystemPath => "system_path",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced along the command pipeline.
///
/// `Validation` and `Violation` always refuse before any side effect.
/// `ConfirmationTimeout` behaves exactly like `ConfirmationDenied` apart from
/// the variant itself, which is retained for audit. `Diagnostic` failures are
/// reported and swallowed; they never reach a caller as a refusal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    /// Malformed, empty, oversized or control-character input.
    #[error("invalid command: {reason}")]
    Validation {
        /// Why the input was rejected.
        reason: String,
    },

    /// Blocked pattern, path traversal or workspace escape.
    #[error("security violation ({kind}): {reason}")]
    Violation {
        /// Which rule was tripped.
        kind: ViolationKind,
        /// Human-readable explanation.
        reason: String,
    },

    /// Nobody answered the confirmation prompt in time.
    #[error("confirmation timed out after {timeout_ms}ms")]
    ConfirmationTimeout {
        /// How long the prompt waited.
        timeout_ms: u64,
    },

    /// A human (or a remembered decision) refused the command.
    #[error("confirmation denied: {reason}")]
    ConfirmationDenied {
        /// Why the command was refused.
        reason: String,
    },

    /// The external process failed to run.
    #[error("execution failed: {0}")]
    Execution(String),

    /// Log write, rotation or sampling failure.
    #[error("diagnostic failure: {0}")]
    Diagnostic(String),
}

impl SecurityError {
    /// Whether this error is a policy refusal (as opposed to an execution or
    /// diagnostic failure).
    #[must_use]
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::Violation { .. }
                | Self::ConfirmationTimeout { .. }
                | Self::ConfirmationDenied { .. }
        )
    }

    /// Short label (`"validation"`, `"security_violation"`, ...) used as the
    /// `error_type` of audit records.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Violation { .. } => "security_violation",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::ConfirmationDenied { .. } => "confirmation_denied",
            Self::Execution(_) => "execution",
            Self::Diagnostic(_) => "diagnostic",
        }
    }
}

/// Result type for gate operations.
pub type SecurityResult<T> = Result<T, SecurityError>;
