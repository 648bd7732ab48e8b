use shellward_core::SecurityError;

/// Errors raised by the confirmation gate and session memory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApprovalError {
    /// A human, or a remembered decision, refused the command.
    #[error("confirmation denied: {reason}")]
    Denied {
        /// Why the command was refused.
        reason: String,
    },

    /// Nobody answered before the timeout.
    #[error("confirmation timed out after {timeout_ms}ms")]
    Timeout {
        /// How long the prompt waited, in milliseconds.
        timeout_ms: u64,
    },

    /// The prompt itself failed (closed terminal, broken channel).
    #[error("confirmation prompt failed: {0}")]
    Prompt(String),

    /// A command produced no usable pattern to remember.
    #[error("cannot derive a session pattern from '{command}': {message}")]
    InvalidPattern {
        /// The command being remembered.
        command: String,
        /// What went wrong.
        message: String,
    },
}

impl From<ApprovalError> for SecurityError {
    fn from(err: ApprovalError) -> Self {
        match err {
            ApprovalError::Denied { reason } => Self::ConfirmationDenied { reason },
            ApprovalError::Timeout { timeout_ms } => Self::ConfirmationTimeout { timeout_ms },
            other => Self::ConfirmationDenied {
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for approval operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;
