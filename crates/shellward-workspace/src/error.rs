//! Error types for workspace boundary checks.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving paths against the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    /// The path resolves outside the workspace root.
    #[error("path {} is outside the workspace {}", .path.display(), .root.display())]
    PathOutsideWorkspace {
        /// The path as written in the command.
        path: PathBuf,
        /// The workspace root it escaped.
        root: PathBuf,
    },

    /// The workspace root itself is unusable.
    #[error("invalid workspace root {}: {reason}", .root.display())]
    InvalidRoot {
        /// The configured root.
        root: PathBuf,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for workspace operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
