//! Configuration types for the Shellward gate.
//!
//! This crate has no dependencies on other internal shellward crates. Every
//! struct implements [`Default`] with the same values as `defaults.toml`, so
//! a bare `[section]` header in TOML produces a working configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Allow/block lists and confirmation policy.
    pub commands: CommandsSection,
    /// Structural input checks.
    pub sanitizer: SanitizerSection,
    /// Extra entries for the categorizer's pattern tables.
    pub categories: CategoriesSection,
    /// Workspace boundary settings.
    pub workspace: WorkspaceSection,
    /// Remembered confirmation decisions.
    pub session: SessionSection,
    /// Execution and security-event logging.
    pub audit: AuditSection,
    /// Resource sampling during execution.
    pub monitor: MonitorSection,
    /// Tracing output.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// CommandsSection
// ---------------------------------------------------------------------------

/// Static command lists and the confirmation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct CommandsSection {
    /// Base verbs allowed without confirmation (exact match on the first word).
    pub allowed_commands: Vec<String>,
    /// Commands refused outright (exact or substring match).
    pub blocked_commands: Vec<String>,
    /// Regexes for commands that run without confirmation.
    pub trusted_commands: Vec<String>,
    /// Regexes for commands that are auto-approved.
    pub auto_approve_patterns: Vec<String>,
    /// Plain substrings that always block, regardless of category.
    pub always_block_patterns: Vec<String>,
    /// Master switch for confirmation of risky commands.
    pub require_confirmation: bool,
    /// Allow pipes, redirection, substitution and chaining.
    pub allow_complex_commands: bool,
    /// Minimum risk score (0-100) at which risky commands are confirmed.
    pub confirmation_threshold: u8,
    /// How long a confirmation prompt waits before denying.
    pub confirmation_timeout_ms: u64,
    /// Wall-clock limit for one execution.
    pub max_execution_time_secs: u64,
    /// Remember "remember this decision" answers for the session.
    pub session_memory: bool,
    /// Allow dangerous commands (with confirmation).
    pub allow_dangerous: bool,
    /// Confirm risky commands.
    pub require_confirmation_for_risky: bool,
    /// Confirm dangerous commands.
    pub require_confirmation_for_dangerous: bool,
}

impl Default for CommandsSection {
    fn default() -> Self {
        Self {
            allowed_commands: Vec::new(),
            blocked_commands: Vec::new(),
            trusted_commands: Vec::new(),
            auto_approve_patterns: Vec::new(),
            always_block_patterns: vec![
                "rm -rf /".to_owned(),
                ":(){ :|:& };:".to_owned(),
                "> /dev/sda".to_owned(),
            ],
            require_confirmation: true,
            allow_complex_commands: false,
            confirmation_threshold: 50,
            confirmation_timeout_ms: 30_000,
            max_execution_time_secs: 300,
            session_memory: true,
            allow_dangerous: false,
            require_confirmation_for_risky: true,
            require_confirmation_for_dangerous: true,
        }
    }
}

// ---------------------------------------------------------------------------
// SanitizerSection
// ---------------------------------------------------------------------------

/// Structural validation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerSection {
    /// Maximum command length in characters.
    pub max_command_length: usize,
    /// Additional shell-expansion regexes, appended to the built-in table.
    pub dangerous_patterns: Vec<String>,
}

impl Default for SanitizerSection {
    fn default() -> Self {
        Self {
            max_command_length: 10_000,
            dangerous_patterns: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// CategoriesSection
// ---------------------------------------------------------------------------

/// Extra categorizer entries, appended to the built-in tables.
///
/// Entries are substrings, or case-insensitive regexes when they start
/// with `^`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoriesSection {
    /// Extra blocked entries.
    pub blocked: Vec<String>,
    /// Extra dangerous entries.
    pub dangerous: Vec<String>,
    /// Extra safe entries.
    pub safe: Vec<String>,
    /// Extra risky entries.
    pub risky: Vec<String>,
}

// ---------------------------------------------------------------------------
// WorkspaceSection
// ---------------------------------------------------------------------------

/// Workspace boundary configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceSection {
    /// Workspace root. `None` uses the directory the gate was started in.
    pub root: Option<PathBuf>,
    /// Validate every path a command references.
    pub enforce_boundaries: bool,
    /// Globs refused even when they resolve inside the workspace.
    pub denied_paths: Vec<String>,
}

impl Default for WorkspaceSection {
    fn default() -> Self {
        Self {
            root: None,
            enforce_boundaries: true,
            denied_paths: vec!["**/.git/hooks/**".to_owned(), "**/.env".to_owned()],
        }
    }
}

// ---------------------------------------------------------------------------
// SessionSection
// ---------------------------------------------------------------------------

/// Session memory limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Maximum remembered decisions; the oldest is evicted first.
    pub max_entries: usize,
    /// Lifetime of a remembered decision.
    pub ttl_secs: u64,
    /// Forget every decision when the session ends.
    pub clear_on_session_end: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl_secs: 3600,
            clear_on_session_end: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AuditSection
// ---------------------------------------------------------------------------

/// Execution log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSection {
    /// Log directory. `None` uses `~/.shellward/logs`.
    pub directory: Option<PathBuf>,
    /// In-memory execution records kept.
    pub max_execution_logs: usize,
    /// In-memory security events kept.
    pub max_security_events: usize,
    /// Size past which a log file is rotated.
    pub max_file_size_bytes: u64,
    /// Mask secrets in captured output.
    pub redact_output: bool,
    /// Captured stdout/stderr is truncated to this many characters.
    pub max_output_chars: usize,
}

impl Default for AuditSection {
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

// ---------------------------------------------------------------------------
// MonitorSection
// ---------------------------------------------------------------------------

/// Performance monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    /// Sample resource usage while a command runs.
    pub enabled: bool,
    /// Sampling interval.
    pub sample_interval_ms: u64,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_interval_ms: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["shellward_policy=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
