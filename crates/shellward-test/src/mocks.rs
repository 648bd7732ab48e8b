//! Mock implementations for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use shellward_approval::{
    ApprovalError, ApprovalResult, ConfirmationDecision, ConfirmationPrompt, ConfirmationRequest,
    ConfirmationResponse,
};
use shellward_runtime::{CommandExecutor, CommandOutput, ExecutionRequest};

#[derive(Debug, Clone)]
enum Step {
    Answer(ConfirmationResponse),
    Fail(String),
    Hang,
}

/// A confirmation prompt that plays back a queue of answers.
///
/// Once the queue is exhausted every further request is denied. Clones
/// share the queue and the request log, so a test can keep one handle
/// while the guard owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    /// Queued steps, consumed front to back.
    steps: Arc<Mutex<VecDeque<Step>>>,
    /// Every request seen, in order.
    requests: Arc<Mutex<Vec<ConfirmationRequest>>>,
}

impl ScriptedPrompt {
    /// Create a prompt with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, step: Step) -> Self {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(step);
        self
    }

    /// Queue an answer.
    #[must_use]
    pub fn then(self, decision: ConfirmationDecision, remember: bool) -> Self {
        self.push(Step::Answer(ConfirmationResponse::answered(decision, remember)))
    }

    /// Queue a one-off allow.
    #[must_use]
    pub fn then_allow(self) -> Self {
        self.then(ConfirmationDecision::Allow, false)
    }

    /// Queue a one-off deny.
    #[must_use]
    pub fn then_deny(self) -> Self {
        self.then(ConfirmationDecision::Deny, false)
    }

    /// Queue a prompt failure, as from a closed terminal.
    #[must_use]
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Step::Fail(message.into()))
    }

    /// Queue a prompt that never answers.
    #[must_use]
    pub fn then_hang(self) -> Self {
        self.push(Step::Hang)
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ConfirmationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Steps not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl ConfirmationPrompt for ScriptedPrompt {
    async fn confirm(&self, request: &ConfirmationRequest) -> ApprovalResult<ConfirmationResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let step = self
            .steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match step {
            Some(Step::Answer(response)) => Ok(response),
            Some(Step::Fail(message)) => Err(ApprovalError::Prompt(message)),
            Some(Step::Hang) => std::future::pending().await,
            None => Ok(ConfirmationResponse::answered(
                ConfirmationDecision::Deny,
                false,
            )),
        }
    }
}

/// A command executor that records requests and returns canned output.
#[derive(Debug, Clone)]
pub struct MockExecutor {
    /// Output for commands without a specific entry.
    default_output: CommandOutput,
    /// Output keyed by exact command text.
    outputs: HashMap<String, CommandOutput>,
    /// When set, every call fails with this message.
    failure: Option<String>,
    /// Simulated run time.
    delay: Option<Duration>,
    /// Every request seen, in order.
    requests: Arc<Mutex<Vec<ExecutionRequest>>>,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutor {
    /// An executor whose commands succeed with empty output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_output: CommandOutput {
                exit_code: Some(0),
                ..CommandOutput::default()
            },
            outputs: HashMap::new(),
            failure: None,
            delay: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Exit with `code` by default.
    #[must_use]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.default_output.exit_code = Some(code);
        self
    }

    /// Print `stdout` by default.
    #[must_use]
    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.default_output.stdout = stdout.into();
        self
    }

    /// Print `stderr` by default.
    #[must_use]
    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.default_output.stderr = stderr.into();
        self
    }

    /// Return `output` when asked to run exactly `command`.
    #[must_use]
    pub fn with_output_for(mut self, command: impl Into<String>, output: CommandOutput) -> Self {
        self.outputs.insert(command.into(), output);
        self
    }

    /// Fail every call with `message`.
    #[must_use]
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Sleep for `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Command texts received so far.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.command).collect()
    }

    /// Number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<CommandOutput, String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(message.clone());
        }
        Ok(self
            .outputs
            .get(&request.command)
            .unwrap_or(&self.default_output)
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_categorization;
    use shellward_core::CommandCategory;
    use std::path::PathBuf;

    fn request() -> ConfirmationRequest {
        ConfirmationRequest::new(
            "mkdir build",
            test_categorization(CommandCategory::Risky),
            "/tmp",
            Duration::from_secs(1),
        )
    }

    fn exec_request(command: &str) -> ExecutionRequest {
        ExecutionRequest {
            command: command.to_owned(),
            working_directory: PathBuf::from("/tmp"),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_script_plays_in_order_then_denies() {
        let prompt = ScriptedPrompt::new()
            .then(ConfirmationDecision::Trust, true)
            .then_fail("terminal closed");

        let first = prompt.confirm(&request()).await.unwrap();
        assert_eq!(first.decision, ConfirmationDecision::Trust);
        assert!(first.remember_decision);

        assert!(matches!(
            prompt.confirm(&request()).await,
            Err(ApprovalError::Prompt(_))
        ));

        let fallback = prompt.confirm(&request()).await.unwrap();
        assert_eq!(fallback.decision, ConfirmationDecision::Deny);
        assert_eq!(prompt.requests().len(), 3);
        assert_eq!(prompt.remaining(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_script() {
        let prompt = ScriptedPrompt::new().then_allow();
        let handle = prompt.clone();
        prompt.confirm(&request()).await.unwrap();
        assert_eq!(handle.requests()[0].command, "mkdir build");
        assert_eq!(handle.remaining(), 0);
    }

    #[tokio::test]
    async fn test_executor_output_selection() {
        let special = CommandOutput {
            exit_code: Some(3),
            stdout: String::new(),
            stderr: "boom".into(),
        };
        let executor = MockExecutor::new()
            .with_stdout("fine")
            .with_output_for("make", special.clone());

        assert_eq!(executor.execute(&exec_request("ls")).await.unwrap().stdout, "fine");
        assert_eq!(executor.execute(&exec_request("make")).await.unwrap(), special);
        assert_eq!(executor.commands(), vec!["ls", "make"]);
    }

    #[tokio::test]
    async fn test_executor_failure() {
        let executor = MockExecutor::new().failing("spawn failed");
        let err = executor.execute(&exec_request("ls")).await.unwrap_err();
        assert_eq!(err, "spawn failed");
        assert_eq!(executor.call_count(), 1);
    }
}
