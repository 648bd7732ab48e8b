//! Shellward CLI - inspect the command gate from a terminal.
//!
//! `check` runs a command through the full gate (with an interactive
//! confirmation prompt) without executing it; `categorize` shows how
//! commands are classified; `config` and `audit` inspect configuration and
//! the on-disk audit trail.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use shellward_config::Config;
use shellward_core::ShellwardHome;
use shellward_runtime::config_bridge;
use shellward_telemetry::{LogConfig, LogFormat, setup_logging};

mod commands;
mod prompt;
mod theme;

use commands::{audit, categorize, check, config};

/// Shellward - a safety gate between agents and the shell
#[derive(Parser)]
#[command(name = "shellward")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true, env = "SHELLWARD_WORKSPACE")]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Colored, human-readable.
    Pretty,
    /// One JSON document on stdout.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command through the gate without executing it
    Check {
        /// Deny anything that needs confirmation instead of prompting
        #[arg(long)]
        headless: bool,

        /// The command line to check
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Show the category of one or more commands
    Categorize {
        /// Commands to classify; quote each one
        #[arg(required = true)]
        commands: Vec<String>,
    },

    /// View and validate configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Inspect the audit trail
    Audit {
        #[command(subcommand)]
        command: AuditCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration with source annotations
    Show {
        /// Output format (toml or json)
        #[arg(short, long, default_value = "toml")]
        format: String,
        /// Show only a specific section (e.g. commands, workspace, audit)
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Validate the current configuration
    Validate,
    /// Show config file paths being checked
    Paths,
}

#[derive(Subcommand)]
enum AuditCommands {
    /// Print the most recent audit log lines
    Tail {
        /// Number of lines
        #[arg(short = 'n', long, default_value = "20")]
        lines: usize,
        /// Read the security event log instead of the execution log
        #[arg(long)]
        security: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let workspace = match cli.workspace {
        Some(path) => path,
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };

    // Load unified config for logging setup; fall back to defaults so that
    // `config validate` can still report what is wrong.
    let loaded = Config::load(Some(&workspace));
    let cfg = match &loaded {
        Ok(resolved) => resolved.config.clone(),
        Err(_) => Config::default(),
    };

    let mut log_config = if loaded.is_ok() {
        config_bridge::to_log_config(&cfg)
    } else {
        LogConfig::new("warn").with_format(LogFormat::Compact)
    };
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match cli.command {
        Commands::Check { headless, command } => {
            let resolved = loaded?;
            let command = command.join(" ");
            let home = ShellwardHome::resolve().ok();
            let allowed = check::run_check(
                &resolved.config,
                &command,
                &workspace,
                home.as_ref(),
                headless,
                cli.format,
            )
            .await?;
            if !allowed {
                std::process::exit(1);
            }
        },
        Commands::Categorize { commands } => {
            let resolved = loaded?;
            categorize::run_categorize(&resolved.config, &commands, cli.format);
        },
        Commands::Config { command } => handle_config(command, &workspace)?,
        Commands::Audit { command } => {
            let resolved = loaded?;
            handle_audit(command, &resolved.config, cli.format)?;
        },
    }

    Ok(())
}

fn handle_config(command: ConfigCommands, workspace: &std::path::Path) -> Result<()> {
    match command {
        ConfigCommands::Show { format, section } => {
            config::show_config(workspace, &format, section.as_deref())
        },
        ConfigCommands::Validate => {
            if !config::validate_config(workspace) {
                std::process::exit(1);
            }
            Ok(())
        },
        ConfigCommands::Paths => config::show_paths(workspace),
    }
}

fn handle_audit(command: AuditCommands, cfg: &Config, format: OutputFormat) -> Result<()> {
    match command {
        AuditCommands::Tail { lines, security } => audit::tail(cfg, lines, security, format),
    }
}
