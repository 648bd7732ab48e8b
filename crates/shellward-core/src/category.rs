//! Command risk tiers and the classification record produced for a command.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Risk tier assigned to a command.
///
/// Variants are declared in ascending severity so the derived ordering
/// matches the reduction order `Blocked > Dangerous > Risky > Safe`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CommandCategory {
    /// Read-only or otherwise harmless.
    Safe,
    /// Modifies state inside the workspace; unknown commands land here.
    Risky,
    /// System-level or privileged operation.
    Dangerous,
    /// Never executed.
    Blocked,
}

impl CommandCategory {
    /// Every category, lowest severity first.
    pub const ALL: [Self; 4] = [Self::Safe, Self::Risky, Self::Dangerous, Self::Blocked];

    /// Severity rank used when reducing several categories to one
    /// (`Safe = 1` .. `Blocked = 4`).
    #[must_use]
    pub fn severity(self) -> u8 {
        match self {
            Self::Safe => 1,
            Self::Risky => 2,
            Self::Dangerous => 3,
            Self::Blocked => 4,
        }
    }

    /// Risk score on a 0–100 scale, compared against the configured
    /// confirmation threshold.
    #[must_use]
    pub fn risk_score(self) -> u8 {
        match self {
            Self::Safe => 10,
            Self::Risky => 50,
            Self::Dangerous => 80,
            Self::Blocked => 100,
        }
    }

    /// Whether commands in this tier need a human decision by default.
    #[must_use]
    pub fn requires_confirmation_by_default(self) -> bool {
        matches!(self, Self::Risky | Self::Dangerous)
    }

    /// Whether commands in this tier may ever execute.
    #[must_use]
    pub fn allows_execution(self) -> bool {
        !matches!(self, Self::Blocked)
    }

    /// Lower-case name (`"safe"`, `"risky"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Risky => "risky",
            Self::Dangerous => "dangerous",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" => Ok(Self::Safe),
            "risky" => Ok(Self::Risky),
            "dangerous" => Ok(Self::Dangerous),
            "blocked" => Ok(Self::Blocked),
            other => Err(format!("unknown command category '{other}'")),
        }
    }
}

/// Human-facing context attached to a classification.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandContext {
    /// Kind of operation (e.g. `"file-deletion"`, `"read-only"`).
    pub operation_type: String,
    /// What running the command could do.
    pub impact: String,
    /// Safer commands the agent could use instead.
    pub alternatives: Vec<String>,
}

impl CommandContext {
    /// Create a context with no alternatives.
    #[must_use]
    pub fn new(operation_type: impl Into<String>, impact: impl Into<String>) -> Self {
        Self {
            operation_type: operation_type.into(),
            impact: impact.into(),
            alternatives: Vec::new(),
        }
    }

    /// Add a suggested alternative.
    #[must_use]
    pub fn with_alternative(mut self, alternative: impl Into<String>) -> Self {
        self.alternatives.push(alternative.into());
        self
    }
}

/// The result of classifying one command.
///
/// Fields are private so the execution flags always agree with the
/// category: a [`CommandCategory::Blocked`] classification can never report
/// `allow_execution() == true`. Deserializing recomputes both flags from
/// the category and ignores any stored values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CategorizationRecord")]
pub struct Categorization {
    category: CommandCategory,
    matched_pattern: Option<String>,
    reason: String,
    requires_confirmation: bool,
    allow_execution: bool,
    context: CommandContext,
}

impl Categorization {
    /// Build a classification; confirmation and execution flags are derived
    /// from the category.
    #[must_use]
    pub fn new(
        category: CommandCategory,
        matched_pattern: Option<String>,
        reason: impl Into<String>,
        context: CommandContext,
    ) -> Self {
        Self {
            category,
            matched_pattern,
            reason: reason.into(),
            requires_confirmation: category.requires_confirmation_by_default(),
            allow_execution: category.allows_execution(),
            context,
        }
    }

    /// The assigned tier.
    #[must_use]
    pub fn category(&self) -> CommandCategory {
        self.category
    }

    /// The table entry that matched, if any.
    #[must_use]
    pub fn matched_pattern(&self) -> Option<&str> {
        self.matched_pattern.as_deref()
    }

    /// Why the tier was assigned.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Whether the tier asks for a human decision.
    #[must_use]
    pub fn requires_confirmation(&self) -> bool {
        self.requires_confirmation
    }

    /// Whether the command may run at all.
    #[must_use]
    pub fn allow_execution(&self) -> bool {
        self.allow_execution && self.category.allows_execution()
    }

    /// Operation type, impact and alternatives.
    #[must_use]
    pub fn context(&self) -> &CommandContext {
        &self.context
    }
}

/// Serialized form of a [`Categorization`] minus its derived flags.
#[derive(Deserialize)]
struct CategorizationRecord {
    category: CommandCategory,
    #[serde(default)]
    matched_pattern: Option<String>,
    reason: String,
    #[serde(default)]
    context: CommandContext,
}

impl From<CategorizationRecord> for Categorization {
    fn from(record: CategorizationRecord) -> Self {
        Self::new(
            record.category,
            record.matched_pattern,
            record.reason,
            record.context,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ordering_matches_severity() {
        let mut sorted = vec![
            CommandCategory::Dangerous,
            CommandCategory::Safe,
            CommandCategory::Blocked,
            CommandCategory::Risky,
        ];
        sorted.sort();
        assert_eq!(sorted, CommandCategory::ALL.to_vec());
        for pair in CommandCategory::ALL.windows(2) {
            assert!(pair[0].severity() < pair[1].severity());
            assert!(pair[0].risk_score() < pair[1].risk_score());
        }
    }

    #[test]
    fn test_blocked_never_allows_execution() {
        let c = Categorization::new(
            CommandCategory::Blocked,
            Some("rm -rf".to_string()),
            "destructive",
            CommandContext::default(),
        );
        assert!(!c.allow_execution());
        assert!(!c.requires_confirmation());
    }

    #[test]
    fn test_blocked_deserialized_with_allow_flag_still_refuses() {
        let json = serde_json::json!({
            "category": "blocked",
            "matched_pattern": null,
            "reason": "tampered",
            "requires_confirmation": false,
            "allow_execution": true,
            "context": { "operation_type": "x", "impact": "y", "alternatives": [] }
        });
        let c: Categorization = serde_json::from_value(json).unwrap();
        assert!(!c.allow_execution());
        assert_eq!(
            c,
            Categorization::new(
                CommandCategory::Blocked,
                None,
                "tampered",
                CommandContext::new("x", "y"),
            )
        );
    }

    #[test]
    fn test_deserialized_flags_rebuilt_from_category() {
        let json = serde_json::json!({
            "category": "risky",
            "reason": "unknown command",
            "requires_confirmation": false,
            "allow_execution": false
        });
        let c: Categorization = serde_json::from_value(json).unwrap();
        assert!(c.allow_execution());
        assert!(c.requires_confirmation());
        assert_eq!(c.context(), &CommandContext::default());

        let original = Categorization::new(
            CommandCategory::Safe,
            Some("^ls".to_owned()),
            "ok",
            CommandContext::default(),
        );
        let back: Categorization =
            serde_json::from_str(&serde_json::to_string(&original).unwrap()).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_flags_follow_category() {
        let safe =
            Categorization::new(CommandCategory::Safe, None, "ok", CommandContext::default());
        assert!(safe.allow_execution());
        assert!(!safe.requires_confirmation());

        let risky =
            Categorization::new(CommandCategory::Risky, None, "unknown", CommandContext::default());
        assert!(risky.allow_execution());
        assert!(risky.requires_confirmation());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Dangerous".parse::<CommandCategory>(), Ok(CommandCategory::Dangerous));
        assert!("unknown".parse::<CommandCategory>().is_err());
    }
}
