//! Post-merge configuration validation.
//!
//! Validates that deserialized [`Config`](crate::Config) values are within
//! acceptable ranges and that every regex-valued field compiles, so the
//! policy layer can be constructed without further checks.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_commands(config)?;
    validate_sanitizer(config)?;
    validate_session(config)?;
    validate_audit(config)?;
    validate_monitor(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

/// Compile every pattern, reporting the first one that fails.
fn validate_regexes(field: &str, patterns: &[String]) -> ConfigResult<()> {
    for pattern in patterns {
        if let Err(e) = regex::Regex::new(pattern) {
            return Err(invalid(field, format!("invalid regex '{pattern}': {e}")));
        }
    }
    Ok(())
}

fn validate_commands(config: &Config) -> ConfigResult<()> {
    let c = &config.commands;

    if c.confirmation_threshold > 100 {
        return Err(invalid(
            "commands.confirmation_threshold",
            format!(
                "confirmation_threshold {} is out of range; must be 0-100",
                c.confirmation_threshold
            ),
        ));
    }

    if c.confirmation_timeout_ms == 0 {
        return Err(invalid(
            "commands.confirmation_timeout_ms",
            "confirmation_timeout_ms must be greater than zero",
        ));
    }

    if c.max_execution_time_secs == 0 {
        return Err(invalid(
            "commands.max_execution_time_secs",
            "max_execution_time_secs must be greater than zero",
        ));
    }

    validate_regexes("commands.trusted_commands", &c.trusted_commands)?;
    validate_regexes("commands.auto_approve_patterns", &c.auto_approve_patterns)?;

    if c.always_block_patterns.iter().any(|p| p.trim().is_empty()) {
        return Err(invalid(
            "commands.always_block_patterns",
            "empty pattern would block every command",
        ));
    }

    Ok(())
}

fn validate_sanitizer(config: &Config) -> ConfigResult<()> {
    let s = &config.sanitizer;

    if s.max_command_length == 0 {
        return Err(invalid(
            "sanitizer.max_command_length",
            "max_command_length must be greater than zero",
        ));
    }

    validate_regexes("sanitizer.dangerous_patterns", &s.dangerous_patterns)
}

fn validate_session(config: &Config) -> ConfigResult<()> {
    let s = &config.session;

    if s.max_entries == 0 {
        return Err(invalid(
            "session.max_entries",
            "max_entries must be greater than zero",
        ));
    }

    if s.ttl_secs == 0 {
        return Err(invalid("session.ttl_secs", "ttl_secs must be greater than zero"));
    }

    Ok(())
}

fn validate_audit(config: &Config) -> ConfigResult<()> {
    let a = &config.audit;

    for (field, value) in [
        ("audit.max_execution_logs", a.max_execution_logs),
        ("audit.max_security_events", a.max_security_events),
        ("audit.max_output_chars", a.max_output_chars),
    ] {
        if value == 0 {
            return Err(invalid(field, "must be greater than zero"));
        }
    }

    if a.max_file_size_bytes == 0 {
        return Err(invalid(
            "audit.max_file_size_bytes",
            "must be greater than zero",
        ));
    }

    Ok(())
}

fn validate_monitor(config: &Config) -> ConfigResult<()> {
    if config.monitor.sample_interval_ms == 0 {
        return Err(invalid(
            "monitor.sample_interval_ms",
            "sample_interval_ms must be greater than zero",
        ));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if !matches!(
        l.level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported level '{}'; expected one of: trace, debug, info, warn, error",
                l.level
            ),
        ));
    }

    if !matches!(
        l.format.to_ascii_lowercase().as_str(),
        "pretty" | "compact" | "json" | "full"
    ) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported format '{}'; expected one of: pretty, compact, json, full",
                l.format
            ),
        ));
    }

    Ok(())
}
