//! Test fixtures: configs, categorizations and a guard over a temporary
//! workspace.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use shellward_config::Config;
use shellward_core::{Categorization, CommandCategory, CommandContext, SecurityError};
use shellward_runtime::{Authorization, CommandGuard, GuardedExecution};
use shellward_telemetry::NullSampler;
use tempfile::TempDir;

use crate::mocks::{MockExecutor, ScriptedPrompt};

/// Install a test-friendly subscriber once; honours `RUST_LOG`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Default configuration with the resource monitor off.
#[must_use]
pub fn test_config() -> Config {
    let mut cfg = Config::default();
    cfg.monitor.enabled = false;
    cfg
}

/// A categorization for `category` with placeholder context.
#[must_use]
pub fn test_categorization(category: CommandCategory) -> Categorization {
    Categorization::new(
        category,
        None,
        "test categorization",
        CommandContext::new("test", "none"),
    )
}

/// A [`CommandGuard`] over a fresh temporary workspace.
///
/// Owns the tempdirs; they are removed when the harness drops.
pub struct GuardHarness {
    /// The guard under test.
    pub guard: CommandGuard,
    /// The executor the guard calls (shares its request log).
    pub executor: MockExecutor,
    workspace: TempDir,
    logs: Option<TempDir>,
}

impl GuardHarness {
    /// A guard with [`test_config`], logging in memory.
    #[must_use]
    pub fn new(prompt: ScriptedPrompt, executor: MockExecutor) -> Self {
        Self::with_config(test_config(), prompt, executor)
    }

    /// A guard with `cfg`, logging in memory unless `cfg` names a directory.
    ///
    /// # Panics
    ///
    /// Panics if the tempdir cannot be created or `cfg` is invalid.
    #[must_use]
    pub fn with_config(cfg: Config, prompt: ScriptedPrompt, executor: MockExecutor) -> Self {
        let workspace = TempDir::new().expect("failed to create workspace tempdir");
        Self::build(cfg, workspace, None, prompt, executor)
    }

    /// A guard with `cfg` whose audit files go to their own tempdir.
    ///
    /// # Panics
    ///
    /// Panics if a tempdir cannot be created or `cfg` is invalid.
    #[must_use]
    pub fn with_log_dir(mut cfg: Config, prompt: ScriptedPrompt, executor: MockExecutor) -> Self {
        let workspace = TempDir::new().expect("failed to create workspace tempdir");
        let logs = TempDir::new().expect("failed to create log tempdir");
        cfg.audit.directory = Some(logs.path().to_path_buf());
        Self::build(cfg, workspace, Some(logs), prompt, executor)
    }

    fn build(
        cfg: Config,
        workspace: TempDir,
        logs: Option<TempDir>,
        prompt: ScriptedPrompt,
        executor: MockExecutor,
    ) -> Self {
        let guard = CommandGuard::from_config(
            &cfg,
            workspace.path(),
            None,
            Arc::new(prompt),
            Arc::new(executor.clone()),
        )
        .expect("failed to assemble command guard")
        .with_sampler(Arc::new(NullSampler));

        Self {
            guard,
            executor,
            workspace,
            logs,
        }
    }

    /// The workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.workspace.path()
    }

    /// The audit directory, when one was created.
    #[must_use]
    pub fn log_dir(&self) -> Option<&Path> {
        self.logs.as_ref().map(TempDir::path)
    }

    /// Create `relative` (and its parents) under the workspace.
    ///
    /// # Panics
    ///
    /// Panics on I/O failure.
    pub fn create_dir(&self, relative: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(&path).expect("failed to create directory");
        path
    }

    /// Write `contents` to `relative` under the workspace.
    ///
    /// # Panics
    ///
    /// Panics on I/O failure.
    pub fn write_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directory");
        }
        fs::write(&path, contents).expect("failed to write file");
        path
    }

    /// Authorize `command` from the workspace root.
    ///
    /// # Errors
    ///
    /// Returns the guard's refusal.
    pub async fn authorize(&self, command: &str) -> Result<Authorization, SecurityError> {
        self.guard.authorize(command, self.root()).await
    }

    /// Run `command` from the workspace root.
    ///
    /// # Errors
    ///
    /// Returns the guard's refusal or execution failure.
    pub async fn run(&self, command: &str) -> Result<GuardedExecution, SecurityError> {
        self.guard.run(command, self.root()).await
    }

    /// Run `command` from `relative` under the workspace.
    ///
    /// # Errors
    ///
    /// Returns the guard's refusal or execution failure.
    pub async fn run_in(
        &self,
        relative: &str,
        command: &str,
    ) -> Result<GuardedExecution, SecurityError> {
        let cwd = self.root().join(relative);
        self.guard.run(command, &cwd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_harness_runs_safe_command() {
        let harness = GuardHarness::new(ScriptedPrompt::new(), MockExecutor::new());
        let run = harness.run("ls").await.unwrap();
        assert!(run.entry.success);
        assert_eq!(harness.executor.commands(), vec!["ls"]);
    }

    #[test]
    fn test_workspace_files() {
        let harness = GuardHarness::new(ScriptedPrompt::new(), MockExecutor::new());
        let path = harness.write_file("src/main.rs", "fn main() {}");
        assert!(path.starts_with(harness.root()));
        assert!(path.is_file());
        assert!(harness.log_dir().is_none());
    }

    #[test]
    fn test_categorization_flags_follow_category() {
        assert!(!test_categorization(CommandCategory::Blocked).allow_execution());
        assert!(test_categorization(CommandCategory::Risky).requires_confirmation());
    }
}
