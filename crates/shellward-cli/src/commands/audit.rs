//! Audit command - read the on-disk audit trail.

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use shellward_config::Config;
use shellward_core::ShellwardHome;
use shellward_core::dirs::{EXECUTION_LOG_FILE, SECURITY_LOG_FILE};
use shellward_runtime::config_bridge;

use crate::OutputFormat;
use crate::theme::Theme;

/// Print the last `lines` lines of the execution log, or of the security
/// event log when `security` is set.
pub(crate) fn tail(cfg: &Config, lines: usize, security: bool, format: OutputFormat) -> Result<()> {
    let home = ShellwardHome::resolve().context("cannot locate the shellward home directory")?;
    let directory = config_bridge::to_logger_settings(cfg, Some(&home))
        .directory
        .unwrap_or_else(|| home.logs_dir());
    let path = directory.join(if security {
        SECURITY_LOG_FILE
    } else {
        EXECUTION_LOG_FILE
    });

    if !path.exists() {
        match format {
            OutputFormat::Json => println!("{}", json!({ "path": path, "lines": [] })),
            OutputFormat::Pretty => println!(
                "{}",
                Theme::info(&format!("No audit log at {}", path.display()))
            ),
        }
        return Ok(());
    }

    let tail = shellward_audit::read_tail(&path, lines)?;
    match format {
        OutputFormat::Json => println!("{:#}", json!({ "path": path, "lines": tail })),
        OutputFormat::Pretty => {
            println!("\n{}", Theme::header(&path.display().to_string()));
            println!("{}", Theme::separator());
            for line in &tail {
                println!("{}", highlight(line));
            }
            println!();
        },
    }
    Ok(())
}

/// Color failures and high-severity events.
fn highlight(line: &str) -> String {
    if line.contains("Success: false") || line.contains("Severity: critical") {
        line.red().to_string()
    } else if line.contains("Severity: high") {
        line.yellow().to_string()
    } else {
        line.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_leaves_successes_plain() {
        let ok = "[t] [s] [i] ls - Exit: 0, Time: 3ms, Success: true, Category: safe";
        assert_eq!(highlight(ok), ok);
    }
}
