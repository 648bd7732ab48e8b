use super::*;

use std::sync::Mutex;

use async_trait::async_trait;
use shellward_approval::{
    ApprovalResult, AutoDenyPrompt, ConfirmationDecision, StaticPrompt,
};
use shellward_audit::{LogQuery, LoggerSettings};
use shellward_core::{SessionId, ViolationKind};
use shellward_telemetry::NullSampler;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingExecutor {
    calls: Mutex<Vec<ExecutionRequest>>,
    exit_code: Option<i32>,
    stdout: Option<String>,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

impl RecordingExecutor {
    fn exiting(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<ExecutionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<CommandOutput, String> {
        self.calls.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.fail_with {
            return Err(message.clone());
        }
        Ok(CommandOutput {
            exit_code: self.exit_code,
            stdout: self.stdout.clone().unwrap_or_else(|| "ok".to_owned()),
            stderr: String::new(),
        })
    }
}

struct NeverAnswers;

#[async_trait]
impl ConfirmationPrompt for NeverAnswers {
    async fn confirm(
        &self,
        _request: &ConfirmationRequest,
    ) -> ApprovalResult<ConfirmationResponse> {
        std::future::pending().await
    }
}

struct Fixture {
    workspace: TempDir,
    executor: Arc<RecordingExecutor>,
    guard: CommandGuard,
}

fn fixture(prompt: Arc<dyn ConfirmationPrompt>, executor: RecordingExecutor) -> Fixture {
    fixture_with(Config::default(), prompt, executor)
}

fn fixture_with(
    cfg: Config,
    prompt: Arc<dyn ConfirmationPrompt>,
    executor: RecordingExecutor,
) -> Fixture {
    let workspace = tempfile::tempdir().unwrap();
    let executor = Arc::new(executor);
    let guard = CommandGuard::from_config(&cfg, workspace.path(), None, prompt, executor.clone())
        .unwrap()
        .with_sampler(Arc::new(NullSampler));
    Fixture {
        workspace,
        executor,
        guard,
    }
}

impl Fixture {
    fn cwd(&self) -> &Path {
        self.workspace.path()
    }

    fn entries(&self) -> Vec<ExecutionLogEntry> {
        self.guard
            .logger()
            .query_execution_logs(&LogQuery::new())
            .unwrap()
    }
}

#[tokio::test]
async fn test_safe_command_runs_without_confirmation() {
    let fx = fixture(Arc::new(AutoDenyPrompt), RecordingExecutor::exiting(0));

    let run = fx.guard.run("ls -la", fx.cwd()).await.unwrap();

    assert!(run.authorization.confirmation().is_none());
    assert_eq!(run.authorization.category(), CommandCategory::Safe);
    assert!(run.entry.success);
    assert_eq!(run.entry.exit_code, Some(0));
    assert!(run.entry.performance.is_some());
    assert_eq!(fx.executor.calls().len(), 1);
    assert_eq!(fx.executor.calls()[0].command, "ls -la");
}

#[tokio::test]
async fn test_output_length_reaches_performance_estimate() {
    let executor = RecordingExecutor {
        stdout: Some("x".repeat(64 * 1024)),
        ..RecordingExecutor::exiting(0)
    };
    let fx = fixture(Arc::new(AutoDenyPrompt), executor);

    let run = fx.guard.run("cat server.log", fx.cwd()).await.unwrap();

    let performance = run.entry.performance.unwrap();
    assert_eq!(performance.file_system_operations.reads, 1);
    assert_eq!(performance.file_system_operations.bytes_read, 64 * 1024);
}

#[tokio::test]
async fn test_blocked_command_never_reaches_executor() {
    let fx = fixture(Arc::new(AutoDenyPrompt), RecordingExecutor::exiting(0));

    let err = fx.guard.run("rm -rf /tmp/test", fx.cwd()).await.unwrap_err();

    assert!(matches!(
        err,
        SecurityError::Violation {
            kind: ViolationKind::BlockedCommand,
            ..
        }
    ));
    assert!(fx.executor.calls().is_empty());

    let events = fx.guard.logger().security_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, SecurityEventType::BlockedCommand);

    let entries = fx.entries();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].success);
    assert_eq!(entries[0].error_type.as_deref(), Some("security_violation"));
    assert_eq!(entries[0].category, Some(CommandCategory::Blocked));
    assert_eq!(entries[0].security_events.len(), 1);
}

#[tokio::test]
async fn test_risky_command_denied_by_prompt() {
    let fx = fixture(Arc::new(AutoDenyPrompt), RecordingExecutor::exiting(0));

    let err = fx.guard.run("mkdir build", fx.cwd()).await.unwrap_err();

    assert!(matches!(err, SecurityError::ConfirmationDenied { .. }));
    assert!(fx.executor.calls().is_empty());
    assert_eq!(
        fx.guard.logger().security_events()[0].event_type,
        SecurityEventType::ConfirmationDenied
    );
}

#[tokio::test]
async fn test_remembered_approval_skips_prompt() {
    let prompt = Arc::new(StaticPrompt::new(ConfirmationDecision::Allow, true));
    let fx = fixture(prompt, RecordingExecutor::exiting(0));

    let first = fx.guard.run("mkdir build", fx.cwd()).await.unwrap();
    assert!(!first.authorization.confirmation().unwrap().from_session_memory);
    assert_eq!(fx.guard.memory().unwrap().len(), 1);

    let second = fx.guard.run("mkdir dist", fx.cwd()).await.unwrap();
    assert!(second.authorization.confirmation().unwrap().from_session_memory);
    assert_eq!(fx.executor.calls().len(), 2);
}

#[tokio::test]
async fn test_remembered_block_refuses_later_commands() {
    let prompt = Arc::new(StaticPrompt::new(ConfirmationDecision::Block, true));
    let fx = fixture(prompt, RecordingExecutor::exiting(0));

    assert!(fx.guard.run("mkdir a", fx.cwd()).await.is_err());
    let err = fx.guard.run("mkdir b", fx.cwd()).await.unwrap_err();
    match err {
        SecurityError::ConfirmationDenied { reason } => assert!(reason.contains("earlier")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_timeout() {
    let mut cfg = Config::default();
    cfg.commands.confirmation_timeout_ms = 1_000;
    let fx = fixture_with(cfg, Arc::new(NeverAnswers), RecordingExecutor::exiting(0));

    let err = fx.guard.run("mkdir build", fx.cwd()).await.unwrap_err();

    assert_eq!(err, SecurityError::ConfirmationTimeout { timeout_ms: 1_000 });
    assert!(fx.executor.calls().is_empty());
    assert_eq!(
        fx.entries()[0].error_type.as_deref(),
        Some("confirmation_timeout")
    );
}

#[tokio::test(start_paused = true)]
async fn test_execution_timeout() {
    let mut cfg = Config::default();
    cfg.commands.max_execution_time_secs = 1;
    let executor = RecordingExecutor {
        delay: Some(Duration::from_secs(10)),
        ..RecordingExecutor::exiting(0)
    };
    let fx = fixture_with(cfg, Arc::new(AutoDenyPrompt), executor);

    let err = fx.guard.run("ls", fx.cwd()).await.unwrap_err();

    assert!(matches!(err, SecurityError::Execution(_)));
    let entry = &fx.entries()[0];
    assert_eq!(entry.error_type.as_deref(), Some(EXECUTION_TIMEOUT_ERROR));
    assert!(entry.execution_time_ms >= 1_000);
}

#[tokio::test]
async fn test_executor_failure_is_logged() {
    let executor = RecordingExecutor {
        fail_with: Some("no such shell".to_owned()),
        ..RecordingExecutor::default()
    };
    let fx = fixture(Arc::new(AutoDenyPrompt), executor);

    let err = fx.guard.run("pwd", fx.cwd()).await.unwrap_err();

    assert_eq!(err, SecurityError::Execution("no such shell".to_owned()));
    assert_eq!(fx.entries()[0].error_type.as_deref(), Some("execution"));
}

#[tokio::test]
async fn test_nonzero_exit_is_logged_as_failure() {
    let fx = fixture(Arc::new(AutoDenyPrompt), RecordingExecutor::exiting(2));

    let run = fx.guard.run("ls missing", fx.cwd()).await.unwrap();

    assert!(!run.output.success());
    assert!(!run.entry.success);
    assert_eq!(run.entry.error_type.as_deref(), Some(EXIT_STATUS_ERROR));
}

#[tokio::test]
async fn test_workspace_escape_refused() {
    let fx = fixture(Arc::new(AutoDenyPrompt), RecordingExecutor::exiting(0));

    let err = fx.guard.run("cat ../outside.txt", fx.cwd()).await.unwrap_err();

    assert!(matches!(err, SecurityError::Violation { .. }));
    assert!(fx.executor.calls().is_empty());
    assert_eq!(fx.guard.logger().security_events().len(), 1);
}

#[tokio::test]
async fn test_monitor_can_be_disabled() {
    let mut cfg = Config::default();
    cfg.monitor.enabled = false;
    let fx = fixture_with(cfg, Arc::new(AutoDenyPrompt), RecordingExecutor::exiting(0));

    let run = fx.guard.run("ls", fx.cwd()).await.unwrap();
    assert!(run.entry.performance.is_none());
}

#[tokio::test]
async fn test_user_id_attached() {
    let workspace = tempfile::tempdir().unwrap();
    let guard = CommandGuard::from_config(
        &Config::default(),
        workspace.path(),
        None,
        Arc::new(AutoDenyPrompt),
        Arc::new(RecordingExecutor::exiting(0)),
    )
    .unwrap()
    .with_user_id("agent-7");

    let run = guard.run("ls", workspace.path()).await.unwrap();
    assert_eq!(run.entry.user_id.as_deref(), Some("agent-7"));
}

#[tokio::test]
async fn test_end_session_clears_memory() {
    let prompt = Arc::new(StaticPrompt::new(ConfirmationDecision::Trust, true));
    let fx = fixture(prompt, RecordingExecutor::exiting(0));

    fx.guard.run("mkdir build", fx.cwd()).await.unwrap();
    assert_eq!(fx.guard.memory().unwrap().len(), 1);

    fx.guard.end_session();
    assert!(fx.guard.memory().unwrap().is_empty());
}

#[tokio::test]
async fn test_end_session_keeps_memory_when_configured() {
    let mut cfg = Config::default();
    cfg.session.clear_on_session_end = false;
    let prompt = Arc::new(StaticPrompt::new(ConfirmationDecision::Allow, true));
    let fx = fixture_with(cfg, prompt, RecordingExecutor::exiting(0));

    fx.guard.run("mkdir build", fx.cwd()).await.unwrap();
    fx.guard.end_session();
    assert_eq!(fx.guard.memory().unwrap().len(), 1);
}

#[tokio::test]
async fn test_guard_from_parts() {
    let workspace = tempfile::tempdir().unwrap();
    let cfg = Config::default();
    let filter = config_bridge::to_policy_filter(&cfg, workspace.path()).unwrap();
    let logger = Arc::new(ExecutionLogger::new(SessionId::new(), LoggerSettings::default()));
    let guard = CommandGuard::new(
        filter,
        ConfirmationGate::new(Arc::new(AutoDenyPrompt)),
        Arc::clone(&logger),
        Arc::new(RecordingExecutor::exiting(0)),
    )
    .with_sampler(Arc::new(NullSampler));

    assert!(guard.memory().is_none());
    let decision = guard.evaluate("mkdir x", workspace.path());
    assert!(decision.requires_confirmation());
    assert_eq!(logger.get_execution_statistics().total_executions, 0);
}
