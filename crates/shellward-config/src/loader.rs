//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `~/.shellward/config.toml` (user)
//! 3. Merge `{workspace}/.shellward/config.toml` (workspace) + restriction enforcement
//! 4. Apply `SHELLWARD_*` overrides
//! 5. Deserialize merged tree → `Config`
//! 6. Validate
//! 7. Return `ResolvedConfig`

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_overrides, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, enforce_restrictions};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
pub(crate) const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Load the configuration with layered file precedence.
///
/// `workspace_root` is the root the gate confines commands to. If `None`,
/// the workspace layer is skipped.
///
/// `shellward_home_override` is used as the `.shellward` directory itself,
/// bypassing `$SHELLWARD_HOME` and home-directory discovery.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, an override is
/// unparseable, or the final merged configuration fails validation.
pub fn load(
    workspace_root: Option<&Path>,
    shellward_home_override: Option<&Path>,
) -> ConfigResult<ResolvedConfig> {
    let env_vars = collect_env_vars();

    // 1. Embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    crate::merge::record_defaults(&merged, &mut field_sources);

    // 2. User config.
    let user_dir = match shellward_home_override {
        Some(dir) => dir.to_path_buf(),
        None => user_config_dir(env_vars.get("SHELLWARD_HOME").map(String::as_str))?,
    };
    let user_path = user_dir.join("config.toml");
    if let Some(overlay) = try_load_file(&user_path)? {
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            &ConfigLayer::User,
            &mut field_sources,
        );
        loaded_files.push(user_path.display().to_string());
        info!(path = %user_path.display(), "loaded user config");
    }

    // 3. Workspace config. The pre-workspace tree is the baseline the
    //    workspace may only tighten.
    if let Some(ws_root) = workspace_root {
        let ws_path = ws_root.join(".shellward").join("config.toml");
        if let Some(overlay) = try_load_file(&ws_path)? {
            let baseline = merged.clone();
            deep_merge_tracking(
                &mut merged,
                &overlay,
                "",
                &ConfigLayer::Workspace,
                &mut field_sources,
            );
            enforce_restrictions(&mut merged, &baseline, &overlay);

            loaded_files.push(ws_path.display().to_string());
            info!(path = %ws_path.display(), "loaded workspace config");
        }
    }

    // 4. Environment overrides.
    let env_count = apply_env_overrides(&mut merged, &mut field_sources, &env_vars)?;
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable overrides");
    }

    // 5. Deserialize.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 6. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a specific file path (no layering).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let Some(value) = try_load_file(path)? else {
        return Err(ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
    };

    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;

    validate::validate(&config)?;
    Ok(config)
}

/// The directory holding the user config (`$SHELLWARD_HOME` or
/// `~/.shellward`).
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDir`] if no home directory can be found.
pub fn user_config_dir(shellward_home: Option<&str>) -> ConfigResult<PathBuf> {
    if let Some(custom) = shellward_home {
        let p = PathBuf::from(custom);
        if p.is_absolute() {
            return Ok(p);
        }
        tracing::warn!(path = custom, "SHELLWARD_HOME is not absolute; ignoring");
    }

    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".shellward"))
        .ok_or(ConfigError::NoHomeDir)
}

/// Try to load a file, returning `None` if it doesn't exist.
///
/// Uses a single read to avoid races between an existence check and the read.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len()
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}
