//! The execution logger.
//!
//! Records live in two independently bounded in-memory buffers and are
//! mirrored, one line each, to two append-only files. File failures go to
//! the `shellward::diagnostics` tracing target and never reach the caller.

use std::collections::VecDeque;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shellward_core::dirs::{EXECUTION_LOG_FILE, SECURITY_LOG_FILE};
use shellward_core::{Clock, SessionId, SystemClock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entry::{ExecutionLogEntry, ExecutionRecord, SecurityEvent, SecurityEventType, Severity};
use crate::error::AuditResult;
use crate::export::{self, ExportFormat};
use crate::query::LogQuery;
use crate::redact::{redact_secrets, truncate_output};
use crate::stats::ExecutionStatistics;

/// Tracing target for best-effort failures.
pub const DIAGNOSTICS_TARGET: &str = "shellward::diagnostics";

/// Buffer caps, file location and output handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerSettings {
    /// Directory holding the two log files; `None` keeps logs in memory only.
    pub directory: Option<PathBuf>,
    /// In-memory execution entries kept.
    pub max_execution_logs: usize,
    /// In-memory security events kept.
    pub max_security_events: usize,
    /// Size past which a file is rotated.
    pub max_file_size_bytes: u64,
    /// Mask secrets in captured output.
    pub redact_output: bool,
    /// Captured output longer than this is truncated.
    pub max_output_chars: usize,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            directory: None,
            max_execution_logs: 1000,
            max_security_events: 1000,
            max_file_size_bytes: 10 * 1024 * 1024,
            redact_output: true,
            max_output_chars: 10_000,
        }
    }
}

#[derive(Default)]
struct Buffers {
    executions: VecDeque<ExecutionLogEntry>,
    events: VecDeque<SecurityEvent>,
}

/// Append-only audit log for one session.
pub struct ExecutionLogger {
    session_id: SessionId,
    settings: LoggerSettings,
    execution_path: Option<PathBuf>,
    security_path: Option<PathBuf>,
    buffers: Mutex<Buffers>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for ExecutionLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionLogger")
            .field("session_id", &self.session_id)
            .field("execution_path", &self.execution_path)
            .field("security_path", &self.security_path)
            .finish_non_exhaustive()
    }
}

impl ExecutionLogger {
    /// Create a logger for `session_id`.
    ///
    /// When `settings.directory` is set it is created if missing; failure to
    /// do so is reported and the logger keeps working in memory.
    #[must_use]
    pub fn new(session_id: SessionId, settings: LoggerSettings) -> Self {
        let (execution_path, security_path) = match settings.directory.as_deref() {
            Some(dir) => match fs::create_dir_all(dir) {
                Ok(()) => (
                    Some(dir.join(EXECUTION_LOG_FILE)),
                    Some(dir.join(SECURITY_LOG_FILE)),
                ),
                Err(e) => {
                    warn!(
                        target: DIAGNOSTICS_TARGET,
                        dir = %dir.display(),
                        error = %e,
                        "cannot create audit log directory, logging to memory only"
                    );
                    (None, None)
                },
            },
            None => (None, None),
        };

        Self {
            session_id,
            settings,
            execution_path,
            security_path,
            buffers: Mutex::new(Buffers::default()),
            clock: Arc::new(SystemClock),
        }
    }

    /// A logger that never touches the filesystem.
    #[must_use]
    pub fn in_memory(session_id: SessionId) -> Self {
        Self::new(session_id, LoggerSettings::default())
    }

    /// Use `clock` for record timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The session records are attributed to.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Path of the execution log file, when file logging is active.
    #[must_use]
    pub fn execution_log_path(&self) -> Option<&Path> {
        self.execution_path.as_deref()
    }

    /// Path of the security log file, when file logging is active.
    #[must_use]
    pub fn security_log_path(&self) -> Option<&Path> {
        self.security_path.as_deref()
    }

    /// Record one execution (or refusal) and return the stored entry.
    pub fn log_execution(&self, record: ExecutionRecord) -> ExecutionLogEntry {
        let entry = ExecutionLogEntry {
            id: Uuid::new_v4(),
            session_id: self.session_id.clone(),
            timestamp: self.clock.now(),
            command: record.command,
            working_directory: record.working_directory,
            exit_code: record.exit_code,
            execution_time_ms: record.execution_time_ms,
            success: record.success,
            stdout: record.stdout.map(|s| self.clean_output(&s)),
            stderr: record.stderr.map(|s| self.clean_output(&s)),
            error_type: record.error_type,
            category: record.category,
            user_id: record.user_id,
            performance: record.performance,
            security_events: record.security_events,
        };

        let mut buffers = self.lock();
        push_bounded(&mut buffers.executions, entry.clone(), self.settings.max_execution_logs);
        if let Some(path) = &self.execution_path {
            self.append_line(path, &entry.log_line());
        }
        drop(buffers);

        debug!(
            id = %entry.id,
            command = %entry.command,
            success = entry.success,
            "execution logged"
        );
        entry
    }

    /// Record a security event and return it.
    pub fn log_security_event(
        &self,
        event_type: SecurityEventType,
        command: &str,
        reason: &str,
        severity: Severity,
    ) -> SecurityEvent {
        let event = SecurityEvent {
            id: Uuid::new_v4(),
            session_id: self.session_id.clone(),
            event_type,
            command: command.to_owned(),
            reason: reason.to_owned(),
            severity,
            timestamp: self.clock.now(),
        };

        let mut buffers = self.lock();
        push_bounded(&mut buffers.events, event.clone(), self.settings.max_security_events);
        if let Some(path) = &self.security_path {
            self.append_line(path, &event.log_line());
        }
        drop(buffers);

        warn!(
            event_type = %event.event_type,
            severity = %event.severity,
            command = %event.command,
            reason = %event.reason,
            "security event"
        );
        event
    }

    /// Entries matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidQuery`](crate::AuditError::InvalidQuery)
    /// for a malformed command pattern.
    pub fn query_execution_logs(&self, query: &LogQuery) -> AuditResult<Vec<ExecutionLogEntry>> {
        query.apply(self.lock().executions.iter())
    }

    /// Security events, newest first.
    #[must_use]
    pub fn security_events(&self) -> Vec<SecurityEvent> {
        let mut events: Vec<SecurityEvent> = self.lock().events.iter().cloned().collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events
    }

    /// Statistics over the buffered logs.
    #[must_use]
    pub fn get_execution_statistics(&self) -> ExecutionStatistics {
        let buffers = self.lock();
        ExecutionStatistics::compute(buffers.executions.iter(), buffers.events.iter())
    }

    /// Render the entries matching `query` (all entries when `None`) and
    /// every buffered security event.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed query or a JSON encoding failure.
    pub fn export_logs(
        &self,
        format: ExportFormat,
        query: Option<&LogQuery>,
    ) -> AuditResult<String> {
        let default_query = LogQuery::default();
        let executions = self.query_execution_logs(query.unwrap_or(&default_query))?;
        let events = self.security_events();
        export::render(format, &executions, &events)
    }

    /// Rotate every log file past the size threshold, returning the backup
    /// paths created. Failures are reported, never fatal.
    pub fn rotate_logs(&self) -> Vec<PathBuf> {
        let _guard = self.lock();
        [self.execution_path.as_deref(), self.security_path.as_deref()]
            .into_iter()
            .flatten()
            .filter_map(|path| self.rotate_if_needed(path))
            .collect()
    }

    fn clean_output(&self, text: &str) -> String {
        let text = if self.settings.redact_output {
            redact_secrets(text)
        } else {
            text.to_owned()
        };
        truncate_output(&text, self.settings.max_output_chars)
    }

    /// Append one line; caller holds the buffer lock so appends are
    /// serialized.
    fn append_line(&self, path: &Path, line: &str) {
        self.rotate_if_needed(path);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{line}"));
        if let Err(e) = result {
            warn!(
                target: DIAGNOSTICS_TARGET,
                path = %path.display(),
                error = %e,
                "failed to append audit log line"
            );
        }
    }

    fn rotate_if_needed(&self, path: &Path) -> Option<PathBuf> {
        let size = fs::metadata(path).ok()?.len();
        if size <= self.settings.max_file_size_bytes {
            return None;
        }

        let mut backup = path.as_os_str().to_owned();
        backup.push(format!(".{}.backup", self.clock.now().timestamp_millis()));
        let backup = PathBuf::from(backup);

        match fs::rename(path, &backup) {
            Ok(()) => {
                debug!(from = %path.display(), to = %backup.display(), "audit log rotated");
                Some(backup)
            },
            Err(e) => {
                warn!(
                    target: DIAGNOSTICS_TARGET,
                    path = %path.display(),
                    error = %e,
                    "failed to rotate audit log"
                );
                None
            },
        }
    }

    fn lock(&self) -> MutexGuard<'_, Buffers> {
        self.buffers.lock().unwrap_or_else(|e| {
            warn!("ExecutionLogger buffer lock poisoned, recovering");
            PoisonError::into_inner(e)
        })
    }
}

/// The last `lines` lines of the log file at `path`.
///
/// # Errors
///
/// Returns [`AuditError::Io`](crate::AuditError::Io) if the file cannot be
/// read.
pub fn read_tail(path: &Path, lines: usize) -> AuditResult<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|source| crate::AuditError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let all: Vec<&str> = contents.lines().collect();
    let skip = all.len().saturating_sub(lines);
    Ok(all.into_iter().skip(skip).map(str::to_owned).collect())
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, item: T, cap: usize) {
    while buffer.len() >= cap.max(1) {
        buffer.pop_front();
    }
    buffer.push_back(item);
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
