//! Audit records: executions and security events.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use shellward_core::{CommandCategory, PerformanceSnapshot, SecurityError, SessionId, ViolationKind};
use uuid::Uuid;

/// What the caller knows about one execution; the logger adds id, session
/// and timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// The command that ran (or was refused).
    pub command: String,
    /// Where it ran.
    pub working_directory: PathBuf,
    /// Process exit code, when the process exited normally.
    pub exit_code: Option<i32>,
    /// Wall-clock duration in milliseconds.
    pub execution_time_ms: u64,
    /// Whether the command succeeded.
    pub success: bool,
    /// Captured standard output.
    pub stdout: Option<String>,
    /// Captured standard error.
    pub stderr: Option<String>,
    /// Short failure label (`"validation"`, `"execution"`, ...).
    pub error_type: Option<String>,
    /// Category assigned by the categorizer.
    pub category: Option<CommandCategory>,
    /// Who asked for the command.
    pub user_id: Option<String>,
    /// Resource usage during execution.
    pub performance: Option<PerformanceSnapshot>,
    /// Security events raised while evaluating the command.
    pub security_events: Vec<SecurityEvent>,
}

impl ExecutionRecord {
    /// A record for `command` run in `working_directory`.
    #[must_use]
    pub fn new(command: impl Into<String>, working_directory: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            working_directory: working_directory.into(),
            ..Self::default()
        }
    }
}

/// One immutable line of the execution log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    /// Unique entry id.
    pub id: Uuid,
    /// Session the command belonged to.
    pub session_id: SessionId,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// The command.
    pub command: String,
    /// Where it ran.
    pub working_directory: PathBuf,
    /// Process exit code.
    pub exit_code: Option<i32>,
    /// Wall-clock duration in milliseconds.
    pub execution_time_ms: u64,
    /// Whether the command succeeded.
    pub success: bool,
    /// Standard output, redacted and truncated per logger settings.
    pub stdout: Option<String>,
    /// Standard error, redacted and truncated per logger settings.
    pub stderr: Option<String>,
    /// Short failure label.
    pub error_type: Option<String>,
    /// Category assessment.
    pub category: Option<CommandCategory>,
    /// Who asked for the command.
    pub user_id: Option<String>,
    /// Resource usage during execution.
    pub performance: Option<PerformanceSnapshot>,
    /// Security events attached to this execution.
    pub security_events: Vec<SecurityEvent>,
}

impl ExecutionLogEntry {
    /// The on-disk line:
    /// `[ISO] [session] [id] command - Exit: n, Time: Xms, Success: bool, Category: c`.
    #[must_use]
    pub fn log_line(&self) -> String {
        let exit = self
            .exit_code
            .map_or_else(|| "-".to_owned(), |c| c.to_string());
        let category = self
            .category
            .map_or("unknown", CommandCategory::as_str);
        format!(
            "[{}] [{}] [{}] {} - Exit: {exit}, Time: {}ms, Success: {}, Category: {category}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.session_id,
            self.id,
            single_line(&self.command),
            self.execution_time_ms,
            self.success,
        )
    }
}

/// Kinds of security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventType {
    /// A blocked pattern or blocked-list entry matched.
    BlockedCommand,
    /// Injection chaining or a dangerous expansion.
    InjectionAttempt,
    /// `..` or symlink escape.
    PathTraversal,
    /// A path or `cd` target outside the workspace.
    WorkspaceViolation,
    /// A protected system location.
    SystemPath,
    /// Malformed input.
    InvalidInput,
    /// A human or remembered decision refused the command.
    ConfirmationDenied,
    /// Nobody answered the confirmation prompt.
    ConfirmationTimeout,
}

impl SecurityEventType {
    /// Snake-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BlockedCommand => "blocked_command",
            Self::InjectionAttempt => "injection_attempt",
            Self::PathTraversal => "path_traversal",
            Self::WorkspaceViolation => "workspace_violation",
            Self::SystemPath => "system_path",
            Self::InvalidInput => "invalid_input",
            Self::ConfirmationDenied => "confirmation_denied",
            Self::ConfirmationTimeout => "confirmation_timeout",
        }
    }

    /// The severity an event of this type carries by default.
    #[must_use]
    pub fn default_severity(self) -> Severity {
        match self {
            Self::InjectionAttempt => Severity::Critical,
            Self::BlockedCommand | Self::PathTraversal | Self::SystemPath => Severity::High,
            Self::WorkspaceViolation => Severity::Medium,
            Self::InvalidInput | Self::ConfirmationDenied | Self::ConfirmationTimeout => {
                Severity::Low
            },
        }
    }

    /// The event type for a refusal, or `None` for execution and diagnostic
    /// failures.
    #[must_use]
    pub fn for_error(err: &SecurityError) -> Option<Self> {
        match err {
            SecurityError::Validation { .. } => Some(Self::InvalidInput),
            SecurityError::Violation { kind, .. } => Some((*kind).into()),
            SecurityError::ConfirmationDenied { .. } => Some(Self::ConfirmationDenied),
            SecurityError::ConfirmationTimeout { .. } => Some(Self::ConfirmationTimeout),
            SecurityError::Execution(_) | SecurityError::Diagnostic(_) => None,
        }
    }
}

impl From<ViolationKind> for SecurityEventType {
    fn from(kind: ViolationKind) -> Self {
        match kind {
            ViolationKind::BlockedCommand => Self::BlockedCommand,
            ViolationKind::InjectionAttempt => Self::InjectionAttempt,
            ViolationKind::PathTraversal => Self::PathTraversal,
            ViolationKind::WorkspaceViolation => Self::WorkspaceViolation,
            ViolationKind::SystemPath => Self::SystemPath,
        }
    }
}

impl fmt::Display for SecurityEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious a security event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine refusal.
    Low,
    /// Boundary probe.
    Medium,
    /// Destructive or escaping attempt.
    High,
    /// Active injection.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        })
    }
}

/// One immutable line of the security log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique event id.
    pub id: Uuid,
    /// Session the command belonged to.
    pub session_id: SessionId,
    /// What happened.
    pub event_type: SecurityEventType,
    /// The offending command.
    pub command: String,
    /// Why it was refused.
    pub reason: String,
    /// How serious it is.
    pub severity: Severity,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
}

impl SecurityEvent {
    /// The on-disk line:
    /// `[ISO] [session] [id] command - Event: type, Severity: s, Reason: r`.
    #[must_use]
    pub fn log_line(&self) -> String {
        format!(
            "[{}] [{}] [{}] {} - Event: {}, Severity: {}, Reason: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.session_id,
            self.id,
            single_line(&self.command),
            self.event_type,
            self.severity,
            single_line(&self.reason),
        )
    }
}

/// Keep one record per line.
fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry() -> ExecutionLogEntry {
        ExecutionLogEntry {
            id: Uuid::nil(),
            session_id: SessionId::from_uuid(Uuid::nil()),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            command: "ls -la".to_owned(),
            working_directory: PathBuf::from("/work"),
            exit_code: Some(0),
            execution_time_ms: 12,
            success: true,
            stdout: None,
            stderr: None,
            error_type: None,
            category: Some(CommandCategory::Safe),
            user_id: None,
            performance: None,
            security_events: Vec::new(),
        }
    }

    #[test]
    fn test_execution_log_line() {
        assert_eq!(
            entry().log_line(),
            "[2024-05-01T12:00:00.000Z] [session:00000000-0000-0000-0000-000000000000] \
             [00000000-0000-0000-0000-000000000000] ls -la - Exit: 0, Time: 12ms, Success: true, Category: safe"
        );
    }

    #[test]
    fn test_log_line_without_exit_or_category() {
        let mut entry = entry();
        entry.exit_code = None;
        entry.category = None;
        entry.command = "echo a\nb".to_owned();
        let line = entry.log_line();
        assert!(line.contains("echo a b - Exit: -,"));
        assert!(line.ends_with("Category: unknown"));
    }

    #[test]
    fn test_event_types_for_errors() {
        let err = SecurityError::Violation {
            kind: ViolationKind::PathTraversal,
            reason: "x".to_owned(),
        };
        assert_eq!(
            SecurityEventType::for_error(&err),
            Some(SecurityEventType::PathTraversal)
        );
        assert_eq!(
            SecurityEventType::for_error(&SecurityError::Execution("boom".to_owned())),
            None
        );
        assert_eq!(
            SecurityEventType::InjectionAttempt.default_severity(),
            Severity::Critical
        );
    }
}
