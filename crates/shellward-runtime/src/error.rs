//! Runtime error types.

use shellward_core::SecurityError;
use thiserror::Error;

/// Errors raised while assembling or driving the pipeline.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration could not be loaded or validated.
    #[error("configuration error: {0}")]
    Config(#[from] shellward_config::ConfigError),

    /// A configured pattern failed to compile.
    #[error("policy error: {0}")]
    Policy(#[from] shellward_policy::PolicyError),

    /// The workspace root is unusable.
    #[error("workspace error: {0}")]
    Workspace(#[from] shellward_workspace::WorkspaceError),

    /// The gate refused the command, or execution failed.
    #[error(transparent)]
    Security(#[from] SecurityError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
