//! The command guard: the full pipeline for one proposed command.
//!
//! # Flow
//!
//! 1. Policy filter (sanitize, categorize, lists, workspace boundary)
//! 2. Refusals are logged as a security event plus a failed execution entry
//! 3. Confirmation gate, when the decision asks for it
//! 4. Executor call, bounded by the maximum execution time
//! 5. Performance monitor brackets the call, folding in the output length
//! 6. The outcome is logged

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use shellward_approval::{
    ConfirmationGate, ConfirmationPrompt, ConfirmationRequest, ConfirmationResponse, SessionMemory,
};
use shellward_audit::{ExecutionLogEntry, ExecutionLogger, ExecutionRecord, SecurityEventType};
use shellward_config::Config;
use shellward_core::{CommandCategory, SecurityError, ShellwardHome};
use shellward_policy::{PolicyDecision, PolicyFilter};
use shellward_telemetry::{PerformanceMonitor, ResourceSampler, default_sampler};
use tracing::{debug, info};

use crate::config_bridge;
use crate::error::RuntimeResult;
use crate::executor::{CommandExecutor, CommandOutput, ExecutionRequest};

/// Error type recorded when the executor exceeds its time limit.
pub const EXECUTION_TIMEOUT_ERROR: &str = "execution_timeout";

/// Error type recorded when a command exits non-zero.
pub const EXIT_STATUS_ERROR: &str = "exit_status";

/// Timing and lifecycle settings for [`CommandGuard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardSettings {
    /// How long the confirmation prompt may wait.
    pub confirmation_timeout: Duration,
    /// How long the executor may run.
    pub max_execution_time: Duration,
    /// Sample resource usage during execution.
    pub monitor_enabled: bool,
    /// Sampling interval for the monitor.
    pub sample_interval: Duration,
    /// Clear session memory in [`CommandGuard::end_session`].
    pub clear_on_session_end: bool,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            confirmation_timeout: Duration::from_secs(30),
            max_execution_time: Duration::from_secs(300),
            monitor_enabled: true,
            sample_interval: Duration::from_millis(100),
            clear_on_session_end: true,
        }
    }
}

/// A command cleared to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    decision: PolicyDecision,
    confirmation: Option<ConfirmationResponse>,
    working_directory: PathBuf,
}

impl Authorization {
    /// The policy decision.
    #[must_use]
    pub fn decision(&self) -> &PolicyDecision {
        &self.decision
    }

    /// The confirmation answer, when one was needed.
    #[must_use]
    pub fn confirmation(&self) -> Option<&ConfirmationResponse> {
        self.confirmation.as_ref()
    }

    /// The text to execute.
    #[must_use]
    pub fn command(&self) -> &str {
        self.decision.sanitized_command()
    }

    /// The directory to execute in: the validated directory the command
    /// was submitted from.
    #[must_use]
    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// The command's category.
    #[must_use]
    pub fn category(&self) -> CommandCategory {
        self.decision.category()
    }
}

/// A command that ran, with its logged record.
#[derive(Debug, Clone)]
pub struct GuardedExecution {
    /// Why it was allowed.
    pub authorization: Authorization,
    /// What it produced.
    pub output: CommandOutput,
    /// The audit entry written for it.
    pub entry: ExecutionLogEntry,
}

/// Runs proposed commands through the whole gate.
pub struct CommandGuard {
    filter: PolicyFilter,
    gate: ConfirmationGate,
    logger: Arc<ExecutionLogger>,
    executor: Arc<dyn CommandExecutor>,
    sampler: Arc<dyn ResourceSampler>,
    settings: GuardSettings,
    user_id: Option<String>,
}

impl fmt::Debug for CommandGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandGuard")
            .field("filter", &self.filter)
            .field("gate", &self.gate)
            .field("logger", &self.logger)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CommandGuard {
    /// Assemble a guard from its stages with default settings.
    #[must_use]
    pub fn new(
        filter: PolicyFilter,
        gate: ConfirmationGate,
        logger: Arc<ExecutionLogger>,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            filter,
            gate,
            logger,
            executor,
            sampler: default_sampler(),
            settings: GuardSettings::default(),
            user_id: None,
        }
    }

    /// Assemble a guard from configuration.
    ///
    /// The workspace root is the configured one or `cwd`. Logs go to the
    /// configured directory, else `home`'s logs directory, else memory.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured regex does not compile or the
    /// workspace root is unusable.
    pub fn from_config(
        cfg: &Config,
        cwd: &Path,
        home: Option<&ShellwardHome>,
        prompt: Arc<dyn ConfirmationPrompt>,
        executor: Arc<dyn CommandExecutor>,
    ) -> RuntimeResult<Self> {
        let root = config_bridge::workspace_root(cfg, cwd);
        let filter = config_bridge::to_policy_filter(cfg, &root)?;

        let mut gate = ConfirmationGate::new(prompt);
        if let Some(memory) = config_bridge::to_session_memory(cfg) {
            gate = gate.with_memory(memory);
        }

        let logger = ExecutionLogger::new(
            shellward_core::SessionId::new(),
            config_bridge::to_logger_settings(cfg, home),
        );

        debug!(
            root = %root.display(),
            session = %logger.session_id(),
            "command guard assembled"
        );

        Ok(Self::new(filter, gate, Arc::new(logger), executor)
            .with_settings(config_bridge::to_guard_settings(cfg)))
    }

    /// Replace the timing and lifecycle settings.
    #[must_use]
    pub fn with_settings(mut self, settings: GuardSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Use `sampler` for performance monitoring.
    #[must_use]
    pub fn with_sampler(mut self, sampler: Arc<dyn ResourceSampler>) -> Self {
        self.sampler = sampler;
        self
    }

    /// Attribute log entries to `user_id`.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// The policy filter.
    #[must_use]
    pub fn filter(&self) -> &PolicyFilter {
        &self.filter
    }

    /// The audit logger.
    #[must_use]
    pub fn logger(&self) -> &Arc<ExecutionLogger> {
        &self.logger
    }

    /// Session memory, when enabled.
    #[must_use]
    pub fn memory(&self) -> Option<&Arc<SessionMemory>> {
        self.gate.memory()
    }

    /// The active settings.
    #[must_use]
    pub fn settings(&self) -> &GuardSettings {
        &self.settings
    }

    /// The policy decision alone, without confirmation or logging.
    #[must_use]
    pub fn evaluate(&self, command: &str, cwd: &Path) -> PolicyDecision {
        self.filter.filter_command(command, cwd)
    }

    /// Decide whether `command` may run, asking for confirmation when the
    /// policy requires it. Refusals are logged.
    ///
    /// # Errors
    ///
    /// Returns the refusal: a validation failure, a security violation, or
    /// a denied or timed-out confirmation.
    pub async fn authorize(
        &self,
        command: &str,
        cwd: &Path,
    ) -> Result<Authorization, SecurityError> {
        let decision = self.filter.filter_command(command, cwd);
        // The command's own `cd`s still run, so execution starts where it
        // was submitted, never where those `cd`s lead.
        let working_directory = decision
            .working_directory()
            .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);

        if !decision.allowed() {
            let err = decision.violation().cloned().unwrap_or_else(|| {
                SecurityError::Validation {
                    reason: decision.reason().unwrap_or("refused by policy").to_owned(),
                }
            });
            self.record_refusal(command, cwd, decision.category(), &err);
            return Err(err);
        }

        let confirmation = if decision.requires_confirmation() {
            let request = ConfirmationRequest::new(
                decision.sanitized_command(),
                decision.categorization().clone(),
                &working_directory,
                self.settings.confirmation_timeout,
            );
            match self.gate.confirm(&request).await {
                Ok(response) => Some(response),
                Err(e) => {
                    let err = SecurityError::from(e);
                    self.record_refusal(command, cwd, decision.category(), &err);
                    return Err(err);
                },
            }
        } else {
            None
        };

        Ok(Authorization {
            decision,
            confirmation,
            working_directory,
        })
    }

    /// Authorize `command`, then run it through the executor and log the
    /// outcome. A command that runs and exits non-zero is still `Ok`.
    ///
    /// # Errors
    ///
    /// Returns the refusal from [`authorize`](Self::authorize), or
    /// [`SecurityError::Execution`] when the executor fails or exceeds the
    /// maximum execution time.
    pub async fn run(&self, command: &str, cwd: &Path) -> Result<GuardedExecution, SecurityError> {
        let authorization = self.authorize(command, cwd).await?;
        let request = ExecutionRequest {
            command: authorization.command().to_owned(),
            working_directory: authorization.working_directory().to_path_buf(),
            timeout: self.settings.max_execution_time,
        };

        let mut monitor = self
            .settings
            .monitor_enabled
            .then(|| {
                PerformanceMonitor::new(Arc::clone(&self.sampler), self.settings.sample_interval)
            });
        if let Some(monitor) = monitor.as_mut() {
            monitor.start_monitoring(&request.command);
        }

        let started = tokio::time::Instant::now();
        let outcome = tokio::time::timeout(request.timeout, self.executor.execute(&request)).await;
        let execution_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let output_len = match &outcome {
            Ok(Ok(output)) => output.stdout.len().saturating_add(output.stderr.len()),
            _ => 0,
        };
        let performance = monitor.as_mut().map(|m| m.stop_monitoring(output_len));

        let record = ExecutionRecord {
            execution_time_ms,
            category: Some(authorization.category()),
            user_id: self.user_id.clone(),
            performance,
            ..ExecutionRecord::new(&request.command, &request.working_directory)
        };

        match outcome {
            Ok(Ok(output)) => {
                let success = output.success();
                let entry = self.logger.log_execution(ExecutionRecord {
                    exit_code: output.exit_code,
                    success,
                    stdout: Some(output.stdout.clone()),
                    stderr: Some(output.stderr.clone()),
                    error_type: (!success).then(|| EXIT_STATUS_ERROR.to_owned()),
                    ..record
                });
                debug!(
                    command = %request.command,
                    exit_code = ?output.exit_code,
                    "command finished"
                );
                Ok(GuardedExecution {
                    authorization,
                    output,
                    entry,
                })
            },
            Ok(Err(message)) => {
                let err = SecurityError::Execution(message);
                self.logger.log_execution(ExecutionRecord {
                    error_type: Some(err.error_type().to_owned()),
                    stderr: Some(err.to_string()),
                    ..record
                });
                Err(err)
            },
            Err(_) => {
                let err = SecurityError::Execution(format!(
                    "exceeded the maximum execution time of {}s",
                    request.timeout.as_secs()
                ));
                info!(command = %request.command, "command timed out");
                self.logger.log_execution(ExecutionRecord {
                    error_type: Some(EXECUTION_TIMEOUT_ERROR.to_owned()),
                    stderr: Some(err.to_string()),
                    ..record
                });
                Err(err)
            },
        }
    }

    /// Close the session: clear session memory when configured to,
    /// otherwise sweep expired decisions, then rotate oversized logs.
    pub fn end_session(&self) {
        if let Some(memory) = self.gate.memory() {
            if self.settings.clear_on_session_end {
                memory.clear();
            } else {
                let swept = memory.sweep_expired();
                debug!(swept, "expired session decisions removed");
            }
        }
        self.logger.rotate_logs();
    }

    fn record_refusal(
        &self,
        command: &str,
        cwd: &Path,
        category: CommandCategory,
        err: &SecurityError,
    ) {
        let reason = err.to_string();
        let event = SecurityEventType::for_error(err).map(|event_type| {
            self.logger.log_security_event(
                event_type,
                command,
                &reason,
                event_type.default_severity(),
            )
        });

        self.logger.log_execution(ExecutionRecord {
            success: false,
            error_type: Some(err.error_type().to_owned()),
            category: Some(category),
            user_id: self.user_id.clone(),
            stderr: Some(reason.clone()),
            security_events: event.into_iter().collect(),
            ..ExecutionRecord::new(command, cwd)
        });

        info!(command, %reason, "command refused");
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
