//! Risk classification of command text.
//!
//! Tables are evaluated Blocked → Dangerous → Safe → Risky and the first
//! matching entry wins, so Dangerous always beats Safe and Blocked beats
//! everything. A command that matches nothing is Risky.

mod rules;

pub use rules::{BLOCKED, CategoryRules, DANGEROUS, RISKY, SAFE};

use shellward_core::{Categorization, CommandCategory};
use tracing::debug;

use crate::pattern::Pattern;

#[derive(Debug, Clone)]
struct Rule {
    source: String,
    pattern: Pattern,
}

/// Classifies commands into risk tiers.
#[derive(Debug, Clone)]
pub struct Categorizer {
    tiers: Vec<(CommandCategory, Vec<Rule>)>,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(CategoryRules::builtin())
    }
}

impl Categorizer {
    /// Compile the rule tables.
    ///
    /// Table entries never fail to compile: a malformed `^` regex degrades
    /// to substring matching.
    #[must_use]
    pub fn new(rules: CategoryRules) -> Self {
        let table = |entries: &[String]| -> Vec<Rule> {
            entries
                .iter()
                .filter(|e| !e.trim().is_empty())
                .map(|e| Rule {
                    source: e.clone(),
                    pattern: Pattern::table_entry(e),
                })
                .collect()
        };

        let mut blocked: Vec<Rule> = rules
            .always_block
            .iter()
            .filter(|e| !e.trim().is_empty())
            .map(|e| Rule {
                source: e.clone(),
                pattern: Pattern::substring(e),
            })
            .collect();
        blocked.extend(table(&rules.blocked));

        Self {
            tiers: vec![
                (CommandCategory::Blocked, blocked),
                (CommandCategory::Dangerous, table(&rules.dangerous)),
                (CommandCategory::Safe, table(&rules.safe)),
                (CommandCategory::Risky, table(&rules.risky)),
            ],
        }
    }

    /// Classify one command.
    #[must_use]
    pub fn categorize(&self, command: &str) -> Categorization {
        let normalized = command.trim().to_lowercase();

        for (category, rules) in &self.tiers {
            if let Some(rule) = rules.iter().find(|r| r.pattern.is_match(&normalized)) {
                debug!(
                    command = %normalized,
                    category = %category,
                    pattern = %rule.source,
                    "command categorized"
                );
                return Categorization::new(
                    *category,
                    Some(rule.source.clone()),
                    format!("matched {category} pattern '{}'", rule.source),
                    rules::context_for(*category, &normalized),
                );
            }
        }

        debug!(command = %normalized, "no pattern matched, defaulting to risky");
        Categorization::new(
            CommandCategory::Risky,
            None,
            "no known pattern matched; treating as risky",
            rules::context_for(CommandCategory::Risky, &normalized),
        )
    }

    /// Classify each command.
    #[must_use]
    pub fn categorize_all<S: AsRef<str>>(&self, commands: &[S]) -> Vec<Categorization> {
        commands
            .iter()
            .map(|c| self.categorize(c.as_ref()))
            .collect()
    }

    /// The most severe tier among `commands`; Safe when there are none.
    #[must_use]
    pub fn highest_risk_category<S: AsRef<str>>(&self, commands: &[S]) -> CommandCategory {
        commands
            .iter()
            .map(|c| self.categorize(c.as_ref()).category())
            .max()
            .unwrap_or(CommandCategory::Safe)
    }
}
