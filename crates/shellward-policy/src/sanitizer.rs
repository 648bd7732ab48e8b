//! Structural validation and normalization of raw command text.
//!
//! # Validation Order
//!
//! Checks short-circuit on the first failure:
//!
//! 1. Non-empty, not whitespace-only, within the length limit
//! 2. No control characters (tab is the only one accepted)
//! 3. No dangerous shell-expansion pattern
//! 4. No injection chaining (a separator followed by a dangerous verb)

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PolicyResult;
use crate::pattern::compile_strict;

/// Built-in shell-expansion hazards.
pub const DEFAULT_DANGEROUS_PATTERNS: &[&str] = &[
    // Backtick command substitution.
    r"`[^`]*`",
    // Process substitution.
    r"[<>]\(",
    // Parameter expansion (${IFS}, ${var:-...}).
    r"\$\{[^}]*\}",
    // Command substitution invoking a dangerous verb.
    r"\$\([^)]*\b(?:rm|sudo|su|curl|wget|bash|sh|eval)\b",
    // Globs rooted at the filesystem root.
    r"(?:^|\s)/\*",
];

/// Verbs that must not follow a command separator.
pub const DEFAULT_DANGEROUS_VERBS: &[&str] = &[
    "rm", "sudo", "su", "curl", "wget", "bash", "sh", "eval", "chmod", "chown",
];

/// Substrings that make a command "complex".
const COMPLEX_SYNTAX: &[&str] = &["|", ">", "<", "`", "$(", "&&", "||", ";"];

static ANSI_ESCAPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)").ok()
});

static LITERAL_ESCAPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\\x[0-9a-fA-F]{2}|\\u[0-9a-fA-F]{4}|\\U[0-9a-fA-F]{8}").ok()
});

/// Rule table for a [`Sanitizer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizerRules {
    /// Maximum length in characters.
    pub max_command_length: usize,
    /// Regexes for dangerous shell-expansion forms.
    pub dangerous_patterns: Vec<String>,
    /// Verbs refused directly after `;`, `&`, `&&`, `|` or `||`.
    pub dangerous_verbs: Vec<String>,
}

impl Default for SanitizerRules {
    fn default() -> Self {
        Self {
            max_command_length: 10_000,
            dangerous_patterns: DEFAULT_DANGEROUS_PATTERNS
                .iter()
                .map(|p| (*p).to_owned())
                .collect(),
            dangerous_verbs: DEFAULT_DANGEROUS_VERBS
                .iter()
                .map(|v| (*v).to_owned())
                .collect(),
        }
    }
}

impl SanitizerRules {
    /// Append extra dangerous-expansion regexes to the table.
    #[must_use]
    pub fn with_extra_patterns(mut self, patterns: impl IntoIterator<Item = String>) -> Self {
        self.dangerous_patterns.extend(patterns);
        self
    }
}

/// Why validation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
    /// Empty or whitespace-only.
    Empty,
    /// Longer than the configured maximum.
    TooLong,
    /// Contains a disallowed control character.
    ControlCharacter,
    /// Matches a dangerous shell-expansion pattern.
    DangerousExpansion,
    /// A separator is followed by a dangerous verb.
    InjectionChaining,
}

impl ValidationFailure {
    /// Whether the failure indicates hostile input rather than malformed input.
    #[must_use]
    pub fn is_security_violation(self) -> bool {
        matches!(self, Self::DangerousExpansion | Self::InjectionChaining)
    }
}

/// Outcome of [`Sanitizer::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the command passed every check.
    pub valid: bool,
    /// Why it failed.
    pub reason: Option<String>,
    /// Which check failed.
    pub failure: Option<ValidationFailure>,
    /// Normalized command text, on success.
    pub sanitized: Option<String>,
    /// Non-fatal observations.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn fail(failure: ValidationFailure, reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
            failure: Some(failure),
            sanitized: None,
            warnings: Vec::new(),
        }
    }
}

/// Validates raw command text for structural safety.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    max_command_length: usize,
    dangerous: Vec<Regex>,
    injection: Option<Regex>,
}

impl Sanitizer {
    /// Compile a sanitizer from its rule table.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidPattern`](crate::PolicyError::InvalidPattern)
    /// if a dangerous pattern does not compile.
    pub fn new(rules: SanitizerRules) -> PolicyResult<Self> {
        let dangerous = compile_strict(
            "sanitizer.dangerous_patterns",
            &rules.dangerous_patterns,
            false,
        )?;

        let verbs: Vec<String> = rules
            .dangerous_verbs
            .iter()
            .filter(|v| !v.trim().is_empty())
            .map(|v| regex::escape(v.trim()))
            .collect();
        let injection = if verbs.is_empty() {
            None
        } else {
            let pattern = format!(r"(?:;|&&?|\|\|?)\s*(?:{})\b", verbs.join("|"));
            compile_strict("sanitizer.dangerous_verbs", &[pattern], false)?
                .into_iter()
                .next()
        };

        Ok(Self {
            max_command_length: rules.max_command_length,
            dangerous,
            injection,
        })
    }

    /// Run every check and, on success, produce the sanitized copy and
    /// warnings.
    #[must_use]
    pub fn validate(&self, command: &str) -> ValidationResult {
        if command.trim().is_empty() {
            return ValidationResult::fail(ValidationFailure::Empty, "command is empty");
        }

        let length = command.chars().count();
        if length > self.max_command_length {
            return ValidationResult::fail(
                ValidationFailure::TooLong,
                format!(
                    "command is {length} characters, exceeding the {} character limit",
                    self.max_command_length
                ),
            );
        }

        if let Some(c) = command.chars().find(|c| is_rejected_control(*c)) {
            return ValidationResult::fail(
                ValidationFailure::ControlCharacter,
                format!("command contains control character U+{:04X}", u32::from(c)),
            );
        }

        if let Some(re) = self.dangerous.iter().find(|re| re.is_match(command)) {
            debug!(command, pattern = re.as_str(), "dangerous expansion pattern");
            return ValidationResult::fail(
                ValidationFailure::DangerousExpansion,
                format!("command matches dangerous shell pattern '{}'", re.as_str()),
            );
        }

        if let Some(m) = self.injection.as_ref().and_then(|re| re.find(command)) {
            debug!(command, chained = m.as_str(), "injection chaining");
            return ValidationResult::fail(
                ValidationFailure::InjectionChaining,
                format!(
                    "command chains a dangerous command ('{}')",
                    m.as_str().trim()
                ),
            );
        }

        ValidationResult {
            valid: true,
            reason: None,
            failure: None,
            sanitized: Some(self.sanitize(command)),
            warnings: self.warnings_for(command),
        }
    }

    /// Normalize command text: strip ANSI escapes, control characters and
    /// literal `\xNN`/`\uNNNN`/`\UNNNNNNNN` sequences, then collapse
    /// whitespace.
    ///
    /// Idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
    #[must_use]
    pub fn sanitize(&self, command: &str) -> String {
        let mut current = command.to_owned();
        loop {
            let next = sanitize_pass(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    /// Remove disallowed control characters, keeping newline, carriage
    /// return and tab.
    #[must_use]
    pub fn strip_unsafe_characters(&self, command: &str) -> String {
        strip_unsafe_characters(command)
    }

    /// Whether the command avoids pipes, redirection, substitution and
    /// chaining.
    #[must_use]
    pub fn is_simple_command(&self, command: &str) -> bool {
        is_simple_command(command)
    }

    /// Non-fatal observations about a command.
    #[must_use]
    pub fn warnings_for(&self, command: &str) -> Vec<String> {
        let mut warnings = Vec::new();
        if command.contains(['*', '?']) {
            warnings.push("command uses wildcard patterns".to_owned());
        }
        if command.contains("../") || command.contains("..\\") || command.trim_end().ends_with("..")
        {
            warnings.push("command contains a path traversal sequence".to_owned());
        }
        if !is_simple_command(command) {
            warnings.push(
                "command uses complex shell syntax (pipes, redirection or chaining)".to_owned(),
            );
        }
        warnings
    }
}

/// Whether the command avoids every complex-syntax marker.
#[must_use]
pub fn is_simple_command(command: &str) -> bool {
    !COMPLEX_SYNTAX.iter().any(|marker| command.contains(marker))
}

/// Control characters removed by the strip transform.
fn is_disallowed_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

/// Control characters rejected by validation: the strip set plus newline
/// and carriage return.
fn is_rejected_control(c: char) -> bool {
    is_disallowed_control(c) || c == '\n' || c == '\r'
}

fn strip_unsafe_characters(command: &str) -> String {
    command.chars().filter(|c| !is_disallowed_control(*c)).collect()
}

fn sanitize_pass(input: &str) -> String {
    let mut text = match ANSI_ESCAPE.as_ref() {
        Some(re) => re.replace_all(input, "").into_owned(),
        None => input.to_owned(),
    };
    text = strip_unsafe_characters(&text);
    if let Some(re) = LITERAL_ESCAPE.as_ref() {
        text = re.replace_all(&text, "").into_owned();
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "sanitizer_tests.rs"]
mod tests;
