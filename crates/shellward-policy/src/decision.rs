//! The authoritative output of the policy filter.

use std::path::{Path, PathBuf};

use shellward_core::{Categorization, CommandCategory, SecurityError};

/// Allow/deny/confirm verdict for one command.
///
/// A decision over a Blocked categorization never reports `allowed() ==
/// true`, whatever the constructor was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    command: String,
    allowed: bool,
    requires_confirmation: bool,
    reason: Option<String>,
    matched_pattern: Option<String>,
    categorization: Categorization,
    violation: Option<SecurityError>,
    warnings: Vec<String>,
    sanitized_command: Option<String>,
    working_directory: Option<PathBuf>,
    resolved_cwd: Option<PathBuf>,
}

impl PolicyDecision {
    pub(crate) fn allow(
        command: &str,
        categorization: Categorization,
        requires_confirmation: bool,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            command: command.to_owned(),
            allowed: true,
            requires_confirmation,
            reason: Some(reason.into()),
            matched_pattern: categorization.matched_pattern().map(str::to_owned),
            categorization,
            violation: None,
            warnings: Vec::new(),
            sanitized_command: None,
            working_directory: None,
            resolved_cwd: None,
        }
    }

    pub(crate) fn deny(
        command: &str,
        categorization: Categorization,
        violation: SecurityError,
    ) -> Self {
        let reason = match &violation {
            SecurityError::Validation { reason }
            | SecurityError::Violation { reason, .. }
            | SecurityError::ConfirmationDenied { reason } => reason.clone(),
            other => other.to_string(),
        };
        Self {
            command: command.to_owned(),
            allowed: false,
            requires_confirmation: false,
            reason: Some(reason),
            matched_pattern: categorization.matched_pattern().map(str::to_owned),
            categorization,
            violation: Some(violation),
            warnings: Vec::new(),
            sanitized_command: None,
            working_directory: None,
            resolved_cwd: None,
        }
    }

    pub(crate) fn with_matched_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.matched_pattern = Some(pattern.into());
        self
    }

    pub(crate) fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub(crate) fn with_sanitized_command(mut self, sanitized: String) -> Self {
        self.sanitized_command = Some(sanitized);
        self
    }

    pub(crate) fn with_directories(
        mut self,
        working_directory: Option<PathBuf>,
        resolved_cwd: Option<PathBuf>,
    ) -> Self {
        self.working_directory = working_directory;
        self.resolved_cwd = resolved_cwd;
        self
    }

    /// The command as submitted.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether the command may proceed (possibly after confirmation).
    #[must_use]
    pub fn allowed(&self) -> bool {
        self.allowed && self.categorization.allow_execution()
    }

    /// Whether a human must confirm before execution.
    #[must_use]
    pub fn requires_confirmation(&self) -> bool {
        self.allowed() && self.requires_confirmation
    }

    /// The assigned risk tier.
    #[must_use]
    pub fn category(&self) -> CommandCategory {
        self.categorization.category()
    }

    /// Why the decision was reached.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// The rule that decided: a blocked-list entry, trusted pattern,
    /// auto-approve pattern or categorizer table entry.
    #[must_use]
    pub fn matched_pattern(&self) -> Option<&str> {
        self.matched_pattern.as_deref()
    }

    /// Full categorizer output.
    #[must_use]
    pub fn categorization(&self) -> &Categorization {
        &self.categorization
    }

    /// The structured refusal, when denied.
    #[must_use]
    pub fn violation(&self) -> Option<&SecurityError> {
        self.violation.as_ref()
    }

    /// Non-fatal observations from the sanitizer.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// The text to hand to the executor: sanitized, with `./` paths
    /// rewritten to absolute workspace paths. Falls back to the submitted
    /// command when nothing was produced.
    #[must_use]
    pub fn sanitized_command(&self) -> &str {
        self.sanitized_command.as_deref().unwrap_or(&self.command)
    }

    /// The validated directory the command starts in, when the workspace
    /// boundary checked it. This is where the command must be executed:
    /// its own `cd`s move on from here.
    #[must_use]
    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    /// Directory the command ends up in after every `cd` succeeds. For
    /// reporting only.
    #[must_use]
    pub fn resolved_cwd(&self) -> Option<&Path> {
        self.resolved_cwd.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shellward_core::{CommandContext, ViolationKind};

    fn categorization(category: CommandCategory) -> Categorization {
        Categorization::new(
            category,
            Some("pattern".to_owned()),
            "test",
            CommandContext::new("unknown", "none"),
        )
    }

    #[test]
    fn test_blocked_never_allowed() {
        let decision =
            PolicyDecision::allow("x", categorization(CommandCategory::Blocked), true, "forced");
        assert!(!decision.allowed());
        assert!(!decision.requires_confirmation());
    }

    #[test]
    fn test_deny_carries_reason_from_violation() {
        let decision = PolicyDecision::deny(
            "cat ../x",
            categorization(CommandCategory::Safe),
            SecurityError::Violation {
                kind: ViolationKind::PathTraversal,
                reason: "escapes workspace".to_owned(),
            },
        );
        assert!(!decision.allowed());
        assert_eq!(decision.reason(), Some("escapes workspace"));
        assert_eq!(decision.sanitized_command(), "cat ../x");
        assert_eq!(decision.matched_pattern(), Some("pattern"));
    }

    #[test]
    fn test_matched_pattern_override() {
        let decision =
            PolicyDecision::allow("x", categorization(CommandCategory::Risky), false, "trusted")
            .with_matched_pattern("^x$");
        assert_eq!(decision.matched_pattern(), Some("^x$"));
    }
}
