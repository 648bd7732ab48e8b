//! CLI handlers for the `shellward config` subcommand.

use std::path::Path;

use anyhow::Result;
use shellward_config::{Config, ResolvedConfig, ShowFormat, env, loader};

use crate::theme::Theme;

/// Show the resolved configuration with source annotations.
pub(crate) fn show_config(workspace: &Path, format: &str, section: Option<&str>) -> Result<()> {
    let resolved = Config::load(Some(workspace))?;

    let show_format = match format {
        "json" => ShowFormat::Json,
        _ => ShowFormat::Toml,
    };

    let output = resolved
        .show(show_format, section)
        .map_err(|e| anyhow::anyhow!("failed to format config: {e}"))?;

    println!("{output}");
    Ok(())
}

/// Validate the configuration seen from `workspace`. Returns whether it is
/// valid.
pub(crate) fn validate_config(workspace: &Path) -> bool {
    match Config::load(Some(workspace)) {
        Ok(resolved) => {
            println!("{}", Theme::success("Configuration is valid."));
            if !resolved.loaded_files.is_empty() {
                println!("\nLoaded files:");
                for path in &resolved.loaded_files {
                    println!("  - {path}");
                }
            }
            true
        },
        Err(e) => {
            eprintln!("{}", Theme::error(&format!("Configuration error: {e}")));
            if let Some(file) = e.file() {
                eprintln!("  {}", Theme::kv("File", &file.display().to_string()));
            }
            if let Some(field) = e.field() {
                let hint = format!("Run `shellward config show` to see where {field} is set.");
                eprintln!("  {}", Theme::dimmed(&hint));
            }
            false
        },
    }
}

/// Show all config file paths that are checked.
pub(crate) fn show_paths(workspace: &Path) -> Result<()> {
    let shellward_home = std::env::var("SHELLWARD_HOME").ok();
    let user_dir = loader::user_config_dir(shellward_home.as_deref())?;
    let paths = ResolvedConfig::config_paths(&user_dir, Some(workspace));

    println!("Configuration files checked (in precedence order):\n");
    println!("  0. <embedded defaults>");
    for (i, path) in paths.iter().enumerate() {
        let status = if Path::new(path).exists() {
            "found"
        } else {
            "not found"
        };
        println!("  {}. {path}  [{status}]", i.saturating_add(1));
    }

    println!("\nEnvironment variable overrides:");
    for (var, field) in env::override_vars() {
        println!("  {var:<36} -> {field}");
    }

    Ok(())
}
