//! `SHELLWARD_*` environment overrides.
//!
//! Unlike file layers, environment variables are applied last and win over
//! every file, including the workspace layer.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, set_nested};

/// Expected type of an overridable field.
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Str,
    Bool,
    Int,
}

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static [&'static str],
    kind: FieldKind,
}

/// All supported environment overrides.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "SHELLWARD_LOG_LEVEL",
        field_path: &["logging", "level"],
        kind: FieldKind::Str,
    },
    EnvMapping {
        var_name: "SHELLWARD_LOG_FORMAT",
        field_path: &["logging", "format"],
        kind: FieldKind::Str,
    },
    EnvMapping {
        var_name: "SHELLWARD_ALLOW_DANGEROUS",
        field_path: &["commands", "allow_dangerous"],
        kind: FieldKind::Bool,
    },
    EnvMapping {
        var_name: "SHELLWARD_CONFIRMATION_TIMEOUT_MS",
        field_path: &["commands", "confirmation_timeout_ms"],
        kind: FieldKind::Int,
    },
    EnvMapping {
        var_name: "SHELLWARD_MAX_EXECUTION_TIME_SECS",
        field_path: &["commands", "max_execution_time_secs"],
        kind: FieldKind::Int,
    },
    EnvMapping {
        var_name: "SHELLWARD_WORKSPACE_ROOT",
        field_path: &["workspace", "root"],
        kind: FieldKind::Str,
    },
];

/// Every supported override: variable name and the dotted field it sets.
pub fn override_vars() -> impl Iterator<Item = (&'static str, String)> {
    ENV_MAPPINGS
        .iter()
        .map(|m| (m.var_name, m.field_path.join(".")))
}

/// Snapshot the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Apply every mapped `SHELLWARD_*` variable present in `env_vars`.
///
/// Returns the number of overrides applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a value cannot be coerced to the
/// field's type.
pub fn apply_env_overrides<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };

        let value = coerce(mapping, raw)?;
        debug!(
            var = mapping.var_name,
            field = mapping.field_path.join("."),
            "applying env var override"
        );
        set_nested(merged, mapping.field_path, value);
        sources.insert(mapping.field_path.join("."), ConfigLayer::Environment);
        count = count.saturating_add(1);
    }

    Ok(count)
}

fn coerce(mapping: &EnvMapping, raw: &str) -> ConfigResult<toml::Value> {
    let trimmed = raw.trim();
    match mapping.kind {
        FieldKind::Str => Ok(toml::Value::String(trimmed.to_owned())),
        FieldKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(toml::Value::Boolean(true)),
            "0" | "false" | "no" | "off" => Ok(toml::Value::Boolean(false)),
            _ => Err(ConfigError::EnvError {
                var_name: mapping.var_name.to_owned(),
                message: format!("expected a boolean, got '{trimmed}'"),
            }),
        },
        FieldKind::Int => trimmed
            .parse::<i64>()
            .map(toml::Value::Integer)
            .map_err(|e| ConfigError::EnvError {
                var_name: mapping.var_name.to_owned(),
                message: format!("expected an integer, got '{trimmed}': {e}"),
            }),
    }
}
