//! Bridge from `shellward_config::Config` to domain types.
//!
//! The config crate depends on no other internal crate. These functions
//! translate its sections into the settings each pipeline stage takes, so
//! the conversion happens once, here, for every frontend.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use shellward_approval::SessionMemory;
use shellward_audit::LoggerSettings;
use shellward_config::Config;
use shellward_core::{CommandCategory, ShellwardHome};
use shellward_policy::{
    CategoryRules, Categorizer, FilterSettings, PolicyFilter, Sanitizer, SanitizerRules,
};
use shellward_telemetry::{LogConfig, LogFormat};
use shellward_workspace::{BoundaryEnforcer, WorkspaceSecurity};
use tracing::warn;

use crate::error::RuntimeResult;
use crate::guard::GuardSettings;

/// Convert config to [`SanitizerRules`]; configured patterns extend the
/// built-in table.
#[must_use]
pub fn to_sanitizer_rules(cfg: &Config) -> SanitizerRules {
    SanitizerRules {
        max_command_length: cfg.sanitizer.max_command_length,
        ..SanitizerRules::default()
    }
    .with_extra_patterns(cfg.sanitizer.dangerous_patterns.iter().cloned())
}

/// Convert config to [`CategoryRules`]: built-in tables, configured extras
/// and the always-block substrings.
#[must_use]
pub fn to_category_rules(cfg: &Config) -> CategoryRules {
    let extra = &cfg.categories;
    CategoryRules::builtin()
        .with_extra(CommandCategory::Blocked, extra.blocked.iter().cloned())
        .with_extra(CommandCategory::Dangerous, extra.dangerous.iter().cloned())
        .with_extra(CommandCategory::Safe, extra.safe.iter().cloned())
        .with_extra(CommandCategory::Risky, extra.risky.iter().cloned())
        .with_always_block(cfg.commands.always_block_patterns.iter().cloned())
}

/// Convert config to [`FilterSettings`].
#[must_use]
pub fn to_filter_settings(cfg: &Config) -> FilterSettings {
    let c = &cfg.commands;
    FilterSettings {
        allowed_commands: c.allowed_commands.clone(),
        blocked_commands: c.blocked_commands.clone(),
        trusted_commands: c.trusted_commands.clone(),
        auto_approve_patterns: c.auto_approve_patterns.clone(),
        require_confirmation: c.require_confirmation,
        allow_complex_commands: c.allow_complex_commands,
        confirmation_threshold: c.confirmation_threshold,
        allow_dangerous: c.allow_dangerous,
        require_confirmation_for_risky: c.require_confirmation_for_risky,
        require_confirmation_for_dangerous: c.require_confirmation_for_dangerous,
    }
}

/// The workspace root: the configured one, else `fallback`.
#[must_use]
pub fn workspace_root(cfg: &Config, fallback: &Path) -> PathBuf {
    cfg.workspace
        .root
        .clone()
        .unwrap_or_else(|| fallback.to_path_buf())
}

/// Convert config to a [`BoundaryEnforcer`], or `None` when boundaries are
/// not enforced.
///
/// # Errors
///
/// Returns an error if the workspace root cannot be resolved.
pub fn to_boundary_enforcer(
    cfg: &Config,
    workspace_root: &Path,
) -> RuntimeResult<Option<BoundaryEnforcer>> {
    if !cfg.workspace.enforce_boundaries {
        return Ok(None);
    }
    let security = WorkspaceSecurity::new(workspace_root)?;
    Ok(Some(BoundaryEnforcer::new(
        Arc::new(security),
        &cfg.workspace.denied_paths,
    )))
}

/// Build the complete [`PolicyFilter`].
///
/// # Errors
///
/// Returns an error if a configured regex does not compile or the
/// workspace root is unusable.
pub fn to_policy_filter(cfg: &Config, workspace_root: &Path) -> RuntimeResult<PolicyFilter> {
    let sanitizer = Sanitizer::new(to_sanitizer_rules(cfg))?;
    let categorizer = Categorizer::new(to_category_rules(cfg));
    let filter = PolicyFilter::new(sanitizer, categorizer, to_filter_settings(cfg))?;
    Ok(match to_boundary_enforcer(cfg, workspace_root)? {
        Some(boundary) => filter.with_boundary(boundary),
        None => filter,
    })
}

/// Convert config to a [`SessionMemory`], or `None` when session memory is
/// disabled.
#[must_use]
pub fn to_session_memory(cfg: &Config) -> Option<Arc<SessionMemory>> {
    cfg.commands.session_memory.then(|| {
        Arc::new(SessionMemory::new(
            cfg.session.max_entries,
            Duration::from_secs(cfg.session.ttl_secs),
        ))
    })
}

/// Convert config to [`LoggerSettings`].
///
/// Without a configured directory the logs go to `home`'s logs directory;
/// with neither, logging stays in memory.
#[must_use]
pub fn to_logger_settings(cfg: &Config, home: Option<&ShellwardHome>) -> LoggerSettings {
    let a = &cfg.audit;
    LoggerSettings {
        directory: a
            .directory
            .clone()
            .or_else(|| home.map(ShellwardHome::logs_dir)),
        max_execution_logs: a.max_execution_logs,
        max_security_events: a.max_security_events,
        max_file_size_bytes: a.max_file_size_bytes,
        redact_output: a.redact_output,
        max_output_chars: a.max_output_chars,
    }
}

/// Convert config to [`GuardSettings`].
#[must_use]
pub fn to_guard_settings(cfg: &Config) -> GuardSettings {
    GuardSettings {
        confirmation_timeout: Duration::from_millis(cfg.commands.confirmation_timeout_ms),
        max_execution_time: Duration::from_secs(cfg.commands.max_execution_time_secs),
        monitor_enabled: cfg.monitor.enabled,
        sample_interval: Duration::from_millis(cfg.monitor.sample_interval_ms),
        clear_on_session_end: cfg.session.clear_on_session_end,
    }
}

/// Convert config to [`LogConfig`]. An unknown format falls back to the
/// default with a warning.
#[must_use]
pub fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg.logging.format.parse().unwrap_or_else(|e| {
        warn!(error = %e, "falling back to the default log format");
        LogFormat::default()
    });
    cfg.logging.directives.iter().fold(
        LogConfig::new(&cfg.logging.level).with_format(format),
        |config, directive| config.with_directive(directive),
    )
}
