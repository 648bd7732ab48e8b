//! The policy filter: one allow/deny/confirm decision per command.
//!
//! # Evaluation Order
//!
//! 1. Sanitizer validation (structural and injection checks)
//! 2. Categorization of the sanitized text
//! 3. Blocked tier: deny
//! 4. Dangerous tier: deny unless enabled, otherwise allow with confirmation
//!    per `require_confirmation_for_dangerous`
//! 5. Blocked-command list (exact or substring): deny
//! 6. Complex syntax when disallowed: deny
//! 7. Trusted patterns: allow, no confirmation
//! 8. Auto-approve patterns: allow, no confirmation
//! 9. Allowed base verbs: allow, no confirmation
//! 10. Category confirmation (Risky by threshold, Safe never)
//!
//! Every allowed decision then passes through the workspace boundary
//! enforcer, when one is attached.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use shellward_core::{Categorization, CommandCategory, SecurityError, ViolationKind};
use shellward_workspace::BoundaryEnforcer;
use tracing::{debug, info};

use crate::categorizer::Categorizer;
use crate::decision::PolicyDecision;
use crate::error::PolicyResult;
use crate::pattern::compile_strict;
use crate::sanitizer::Sanitizer;

const COMPLEX_COMMANDS_DISABLED: &str =
    "complex commands (pipes, redirection, substitution or chaining) are disabled";

/// User-configured lists and switches consumed by [`PolicyFilter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct FilterSettings {
    /// Base verbs allowed without confirmation.
    pub allowed_commands: Vec<String>,
    /// Commands refused by exact or substring match.
    pub blocked_commands: Vec<String>,
    /// Regexes for commands that run without confirmation.
    pub trusted_commands: Vec<String>,
    /// Regexes for auto-approved commands.
    pub auto_approve_patterns: Vec<String>,
    /// Master switch for Risky confirmation.
    pub require_confirmation: bool,
    /// Permit pipes, redirection, substitution and chaining.
    pub allow_complex_commands: bool,
    /// Minimum risk score at which Risky commands are confirmed.
    pub confirmation_threshold: u8,
    /// Permit Dangerous commands at all.
    pub allow_dangerous: bool,
    /// Confirm Risky commands.
    pub require_confirmation_for_risky: bool,
    /// Confirm Dangerous commands.
    pub require_confirmation_for_dangerous: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            allowed_commands: Vec::new(),
            blocked_commands: Vec::new(),
            trusted_commands: Vec::new(),
            auto_approve_patterns: Vec::new(),
            require_confirmation: true,
            allow_complex_commands: false,
            confirmation_threshold: 50,
            allow_dangerous: false,
            require_confirmation_for_risky: true,
            require_confirmation_for_dangerous: true,
        }
    }
}

/// Combines sanitizer, categorizer, static lists and the boundary enforcer
/// into one decision.
///
/// Pure: the same command and working directory always produce the same
/// decision.
#[derive(Debug, Clone)]
pub struct PolicyFilter {
    sanitizer: Sanitizer,
    categorizer: Categorizer,
    settings: FilterSettings,
    trusted: Vec<Regex>,
    auto_approve: Vec<Regex>,
    blocked: Vec<String>,
    allowed: Vec<String>,
    boundary: Option<BoundaryEnforcer>,
}

impl PolicyFilter {
    /// Build a filter, compiling the trusted and auto-approve regexes.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidPattern`](crate::PolicyError::InvalidPattern)
    /// naming the first regex that does not compile.
    pub fn new(
        sanitizer: Sanitizer,
        categorizer: Categorizer,
        settings: FilterSettings,
    ) -> PolicyResult<Self> {
        let trusted =
            compile_strict("commands.trusted_commands", &settings.trusted_commands, true)?;
        let auto_approve = compile_strict(
            "commands.auto_approve_patterns",
            &settings.auto_approve_patterns,
            true,
        )?;
        let blocked = lowercase_entries(&settings.blocked_commands);
        let allowed = lowercase_entries(&settings.allowed_commands);

        Ok(Self {
            sanitizer,
            categorizer,
            settings,
            trusted,
            auto_approve,
            blocked,
            allowed,
            boundary: None,
        })
    }

    /// Attach a workspace boundary enforcer.
    #[must_use]
    pub fn with_boundary(mut self, boundary: BoundaryEnforcer) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// The active settings.
    #[must_use]
    pub fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    /// The categorizer in use.
    #[must_use]
    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    /// The attached boundary enforcer, if any.
    #[must_use]
    pub fn boundary(&self) -> Option<&BoundaryEnforcer> {
        self.boundary.as_ref()
    }

    /// Decide whether `command` may run in `working_directory`.
    #[must_use]
    pub fn filter_command(&self, command: &str, working_directory: &Path) -> PolicyDecision {
        let validation = self.sanitizer.validate(command);
        let sanitized = match (validation.valid, validation.sanitized) {
            (true, Some(sanitized)) => sanitized,
            _ => {
                let reason = validation
                    .reason
                    .unwrap_or_else(|| "command failed validation".to_owned());
                let violation = if validation
                    .failure
                    .is_some_and(|f| f.is_security_violation())
                {
                    SecurityError::Violation {
                        kind: ViolationKind::InjectionAttempt,
                        reason,
                    }
                } else {
                    SecurityError::Validation { reason }
                };
                info!(command, error = %violation, "command refused by sanitizer");
                let categorization = self.categorizer.categorize(command);
                return PolicyDecision::deny(command, categorization, violation);
            },
        };
        let warnings = validation.warnings;

        let categorization = self.categorizer.categorize(&sanitized);
        let decision = self
            .decide(command, &sanitized, categorization)
            .with_warnings(warnings)
            .with_sanitized_command(sanitized.clone());

        if !decision.allowed() {
            info!(
                command,
                category = %decision.category(),
                reason = decision.reason().unwrap_or_default(),
                "command refused by policy"
            );
            return decision;
        }

        self.enforce_boundary(decision, &sanitized, working_directory)
    }

    fn decide(
        &self,
        command: &str,
        sanitized: &str,
        categorization: Categorization,
    ) -> PolicyDecision {
        let category = categorization.category();
        let lowered = sanitized.to_lowercase();

        match category {
            CommandCategory::Blocked => {
                let reason = format!("command is blocked: {}", categorization.reason());
                return PolicyDecision::deny(
                    command,
                    categorization,
                    SecurityError::Violation {
                        kind: ViolationKind::BlockedCommand,
                        reason,
                    },
                );
            },
            CommandCategory::Dangerous if !self.settings.allow_dangerous => {
                return PolicyDecision::deny(
                    command,
                    categorization,
                    SecurityError::Violation {
                        kind: ViolationKind::BlockedCommand,
                        reason: "dangerous commands are disabled".to_owned(),
                    },
                );
            },
            CommandCategory::Dangerous => {
                return PolicyDecision::allow(
                    command,
                    categorization,
                    self.settings.require_confirmation_for_dangerous,
                    "dangerous command permitted by configuration",
                );
            },
            CommandCategory::Safe | CommandCategory::Risky => {},
        }

        if let Some(entry) = self
            .blocked
            .iter()
            .find(|b| lowered == **b || lowered.contains(b.as_str()))
        {
            let reason = format!("command matches blocked command '{entry}'");
            return PolicyDecision::deny(
                command,
                categorization,
                SecurityError::Violation {
                    kind: ViolationKind::BlockedCommand,
                    reason,
                },
            )
            .with_matched_pattern(entry.clone());
        }

        if !self.settings.allow_complex_commands && !self.sanitizer.is_simple_command(sanitized) {
            return PolicyDecision::deny(
                command,
                categorization,
                SecurityError::Violation {
                    kind: ViolationKind::BlockedCommand,
                    reason: COMPLEX_COMMANDS_DISABLED.to_owned(),
                },
            );
        }

        if let Some(re) = self.trusted.iter().find(|re| re.is_match(sanitized)) {
            debug!(command, pattern = re.as_str(), "trusted command");
            return PolicyDecision::allow(
                command,
                categorization,
                false,
                "matches a trusted pattern",
            )
            .with_matched_pattern(re.as_str());
        }

        if let Some(re) = self.auto_approve.iter().find(|re| re.is_match(sanitized)) {
            debug!(command, pattern = re.as_str(), "auto-approved command");
            return PolicyDecision::allow(
                command,
                categorization,
                false,
                "matches an auto-approve pattern",
            )
            .with_matched_pattern(re.as_str());
        }

        if let Some(verb) =
            base_verb(&lowered).filter(|v| self.allowed.iter().any(|a| a.as_str() == *v))
        {
            debug!(command, verb, "allowed command");
            return PolicyDecision::allow(
                command,
                categorization,
                false,
                format!("'{verb}' is an allowed command"),
            )
            .with_matched_pattern(verb);
        }

        let confirm = match category {
            CommandCategory::Risky => {
                self.settings.require_confirmation
                    && self.settings.require_confirmation_for_risky
                    && category.risk_score() >= self.settings.confirmation_threshold
            },
            _ => false,
        };
        let reason = if confirm {
            format!("{category} command requires confirmation")
        } else {
            format!("{category} command allowed")
        };
        PolicyDecision::allow(command, categorization, confirm, reason)
    }

    fn enforce_boundary(
        &self,
        decision: PolicyDecision,
        sanitized: &str,
        working_directory: &Path,
    ) -> PolicyDecision {
        let Some(boundary) = &self.boundary else {
            return decision;
        };

        let report = boundary.enforce(sanitized, working_directory);
        if let Some(violation) = report.violation {
            info!(
                command = decision.command(),
                path = %violation.path,
                kind = %violation.kind,
                "command refused at workspace boundary"
            );
            let warnings = decision.warnings().to_vec();
            return PolicyDecision::deny(
                decision.command(),
                decision.categorization().clone(),
                SecurityError::Violation {
                    kind: violation.kind,
                    reason: violation.reason,
                },
            )
            .with_warnings(warnings)
            .with_sanitized_command(sanitized.to_owned());
        }

        let rewritten = report
            .rewritten_command
            .unwrap_or_else(|| sanitized.to_owned());
        decision
            .with_sanitized_command(rewritten)
            .with_directories(report.working_directory, report.resolved_cwd)
    }
}

/// First word of a command, without any directory prefix.
fn base_verb(command: &str) -> Option<&str> {
    let first = command.split_whitespace().next()?;
    first.rsplit('/').next()
}

fn lowercase_entries(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
