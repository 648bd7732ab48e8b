//! The seam to whatever actually runs commands.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A command the gate has cleared for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Sanitized, path-resolved command text.
    pub command: String,
    /// Directory to run in.
    pub working_directory: PathBuf,
    /// Upper bound the gate enforces on the run.
    pub timeout: Duration,
}

/// What a finished command produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Exit status; `None` when killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the command exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs cleared commands.
///
/// Spawning processes is outside the gate; hosts supply this. The gate
/// wraps every call in the configured execution timeout, so implementations
/// should be cancel-safe.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `request` to completion.
    ///
    /// # Errors
    ///
    /// Returns a description of why the command could not be run at all.
    /// A command that ran and failed is an `Ok` with a non-zero exit code.
    async fn execute(&self, request: &ExecutionRequest) -> Result<CommandOutput, String>;
}

/// An executor that runs nothing and reports success.
///
/// For frontends that only authorize, such as a dry-run check.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunExecutor;

#[async_trait]
impl CommandExecutor for DryRunExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<CommandOutput, String> {
        tracing::debug!(command = %request.command, "dry run, not executing");
        Ok(CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        })
    }
}
