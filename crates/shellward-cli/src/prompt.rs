//! Terminal confirmation prompt.
//!
//! Implements [`ConfirmationPrompt`] with `dialoguer`. The blocking prompt
//! runs on the blocking pool; when the gate's timeout fires first, the
//! prompt thread is left to finish on its own and its answer is dropped.

use async_trait::async_trait;
use dialoguer::{Confirm, Select, theme::ColorfulTheme};
use shellward_approval::{
    ApprovalError, ApprovalResult, ConfirmationDecision, ConfirmationPrompt, ConfirmationRequest,
    ConfirmationResponse,
};

use crate::theme::Theme;

/// Menu entries, in display order.
const CHOICES: [(&str, ConfirmationDecision); 4] = [
    ("Allow", ConfirmationDecision::Allow),
    ("Deny", ConfirmationDecision::Deny),
    ("Trust this command for the session", ConfirmationDecision::Trust),
    ("Block this command for the session", ConfirmationDecision::Block),
];

/// Asks on the controlling terminal.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TerminalPrompt;

#[async_trait]
impl ConfirmationPrompt for TerminalPrompt {
    async fn confirm(&self, request: &ConfirmationRequest) -> ApprovalResult<ConfirmationResponse> {
        let request = request.clone();
        tokio::task::spawn_blocking(move || ask(&request))
            .await
            .map_err(|e| ApprovalError::Prompt(format!("prompt task failed: {e}")))?
    }
}

fn ask(request: &ConfirmationRequest) -> ApprovalResult<ConfirmationResponse> {
    eprintln!();
    eprintln!(
        "{}",
        Theme::confirmation_box(
            "Confirmation required",
            &describe(request),
            request.categorization.category()
        )
    );

    let labels: Vec<&str> = CHOICES.iter().map(|(label, _)| *label).collect();
    let theme = ColorfulTheme::default();
    let selection = Select::with_theme(&theme)
        .with_prompt("Run this command?")
        .items(&labels)
        .default(1)
        .interact()
        .map_err(|e| ApprovalError::Prompt(e.to_string()))?;

    let decision = CHOICES
        .get(selection)
        .map_or(ConfirmationDecision::Deny, |(_, decision)| *decision);

    // Trust and Block are session-wide by definition.
    let remember = match decision {
        ConfirmationDecision::Trust | ConfirmationDecision::Block => true,
        ConfirmationDecision::Allow | ConfirmationDecision::Deny => Confirm::with_theme(&theme)
            .with_prompt("Remember this decision for similar commands?")
            .default(false)
            .interact()
            .map_err(|e| ApprovalError::Prompt(e.to_string()))?,
    };

    Ok(ConfirmationResponse::answered(decision, remember))
}

/// The lines shown inside the confirmation box.
fn describe(request: &ConfirmationRequest) -> Vec<String> {
    let categorization = &request.categorization;
    let context = categorization.context();

    let mut lines = vec![
        Theme::kv("Command", &request.command),
        Theme::kv("Category", &Theme::category(categorization.category())),
        Theme::kv("Reason", categorization.reason()),
    ];
    if !context.operation_type.is_empty() {
        lines.push(Theme::kv("Operation", &context.operation_type));
    }
    if !context.impact.is_empty() {
        lines.push(Theme::kv("Impact", &context.impact));
    }
    lines.push(Theme::kv(
        "Directory",
        &request.working_directory.display().to_string(),
    ));
    lines.push(Theme::kv(
        "Timeout",
        &format!("{}s", request.timeout.as_secs()),
    ));
    if !context.alternatives.is_empty() {
        lines.push(String::new());
        lines.push(Theme::dimmed("Safer alternatives:"));
        lines.extend(context.alternatives.iter().map(|alt| format!("  - {alt}")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use shellward_core::{Categorization, CommandCategory, CommandContext};
    use std::time::Duration;

    #[test]
    fn test_description_includes_alternatives() {
        colored::control::set_override(false);
        let categorization = Categorization::new(
            CommandCategory::Dangerous,
            Some("^sudo\\b".to_owned()),
            "privileged command",
            CommandContext::new("privilege-escalation", "runs as root")
                .with_alternative("run without sudo"),
        );
        let request = ConfirmationRequest::new(
            "sudo apt update",
            categorization,
            "/work",
            Duration::from_secs(30),
        );

        let lines = describe(&request);
        assert!(lines.contains(&"Command: sudo apt update".to_owned()));
        assert!(lines.contains(&"Category: DANGEROUS".to_owned()));
        assert!(lines.contains(&"Timeout: 30s".to_owned()));
        assert!(lines.iter().any(|l| l.contains("run without sudo")));
    }

    #[test]
    fn test_trust_and_block_listed() {
        let decisions: Vec<_> = CHOICES.iter().map(|(_, d)| *d).collect();
        assert!(decisions.contains(&ConfirmationDecision::Trust));
        assert!(decisions.contains(&ConfirmationDecision::Block));
    }
}
