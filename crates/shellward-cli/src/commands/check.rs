//! Check command - run one command line through the gate without executing
//! it.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use shellward_approval::{AutoDenyPrompt, ConfirmationPrompt};
use shellward_config::Config;
use shellward_core::{SecurityError, ShellwardHome};
use shellward_policy::PolicyDecision;
use shellward_runtime::{Authorization, CommandGuard, DryRunExecutor};
use tracing::warn;

use crate::OutputFormat;
use crate::prompt::TerminalPrompt;
use crate::theme::Theme;

/// Evaluate `command` from `cwd` and report the outcome.
///
/// Refusals are written to the audit logs under `home`. Returns whether
/// the command would have been allowed to run.
pub(crate) async fn run_check(
    cfg: &Config,
    command: &str,
    cwd: &Path,
    home: Option<&ShellwardHome>,
    headless: bool,
    format: OutputFormat,
) -> Result<bool> {
    if let Some(home) = home {
        if let Err(e) = home.ensure() {
            warn!(error = %e, root = %home.root().display(), "cannot create shellward home");
        }
    }

    let prompt: Arc<dyn ConfirmationPrompt> = if headless {
        Arc::new(AutoDenyPrompt)
    } else {
        Arc::new(TerminalPrompt)
    };
    let guard = CommandGuard::from_config(cfg, cwd, home, prompt, Arc::new(DryRunExecutor))?;

    let decision = guard.evaluate(command, cwd);
    if format == OutputFormat::Pretty {
        print_decision(&decision);
    }

    let outcome = guard.authorize(command, cwd).await;
    guard.end_session();

    match format {
        OutputFormat::Pretty => print_outcome(&outcome),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report(command, &decision, &outcome))?
        ),
    }
    Ok(outcome.is_ok())
}

fn print_decision(decision: &PolicyDecision) {
    let categorization = decision.categorization();

    println!("\n{}", Theme::header("Policy Decision"));
    println!("{}", Theme::separator());
    println!("  {}", Theme::kv("Command", decision.command()));
    if decision.sanitized_command() != decision.command() {
        println!("  {}", Theme::kv("Runs as", decision.sanitized_command()));
    }
    println!("  {}", Theme::kv("Category", &Theme::category(decision.category())));
    if let Some(reason) = decision.reason() {
        println!("  {}", Theme::kv("Reason", reason));
    }
    if let Some(pattern) = decision.matched_pattern() {
        println!("  {}", Theme::kv("Matched", pattern));
    }
    for warning in decision.warnings() {
        println!("  {}", Theme::warning(warning));
    }
    let alternatives = &categorization.context().alternatives;
    if !decision.allowed() && !alternatives.is_empty() {
        println!("  {}", Theme::dimmed("Try instead:"));
        for alternative in alternatives {
            println!("    - {alternative}");
        }
    }
    println!();
}

fn print_outcome(outcome: &Result<Authorization, SecurityError>) {
    match outcome {
        Ok(authorization) => match authorization.confirmation() {
            Some(response) if response.from_session_memory => {
                println!("{}", Theme::success("Allowed (remembered decision)"));
            },
            Some(response) => println!(
                "{}",
                Theme::success(&format!("Allowed after confirmation ({:?})", response.decision))
            ),
            None => println!("{}", Theme::success("Allowed")),
        },
        Err(SecurityError::ConfirmationTimeout { timeout_ms }) => println!(
            "{}",
            Theme::error(&format!("Refused: nobody answered within {timeout_ms}ms"))
        ),
        Err(err) => println!(
            "{} {}",
            Theme::error("Refused:"),
            err.to_string().red()
        ),
    }
}

fn report(
    command: &str,
    decision: &PolicyDecision,
    outcome: &Result<Authorization, SecurityError>,
) -> serde_json::Value {
    let (confirmation, error, error_type) = match outcome {
        Ok(authorization) => (json!(authorization.confirmation()), None, None),
        Err(err) => (serde_json::Value::Null, Some(err.to_string()), Some(err.error_type())),
    };
    json!({
        "command": command,
        "sanitized_command": decision.sanitized_command(),
        "category": decision.category(),
        "allowed": outcome.is_ok(),
        "requires_confirmation": decision.requires_confirmation(),
        "reason": decision.reason(),
        "matched_pattern": decision.matched_pattern(),
        "warnings": decision.warnings(),
        "alternatives": decision.categorization().context().alternatives,
        "confirmation": confirmation,
        "error": error,
        "error_type": error_type,
    })
}
