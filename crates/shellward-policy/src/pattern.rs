//! Text matchers shared by the categorizer and the policy filter.

use regex::{Regex, RegexBuilder};
use tracing::warn;

/// A compiled matcher over lower-cased command text.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Plain, case-insensitive substring.
    Substring(String),
    /// Case-insensitive regular expression.
    Regex(Regex),
}

impl Pattern {
    /// A substring matcher, whatever the entry looks like.
    #[must_use]
    pub fn substring(raw: &str) -> Self {
        Self::Substring(raw.to_lowercase())
    }

    /// A rule-table entry: a regex when it starts with `^`, otherwise a
    /// substring. Malformed regexes degrade to substring matching.
    #[must_use]
    pub fn table_entry(raw: &str) -> Self {
        if raw.starts_with('^') {
            Self::regex_or_substring(raw)
        } else {
            Self::substring(raw)
        }
    }

    /// A regex, degrading to substring matching when it does not compile.
    #[must_use]
    pub fn regex_or_substring(raw: &str) -> Self {
        match RegexBuilder::new(raw).case_insensitive(true).build() {
            Ok(re) => Self::Regex(re),
            Err(e) => {
                warn!(
                    pattern = raw,
                    error = %e,
                    "malformed pattern, falling back to substring match"
                );
                Self::substring(raw)
            },
        }
    }

    /// Whether `text` matches.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Substring(needle) => text.to_lowercase().contains(needle.as_str()),
            Self::Regex(re) => re.is_match(text),
        }
    }
}

/// Compile a list of strict regexes, naming the first that fails.
pub(crate) fn compile_strict(
    field: &str,
    patterns: &[String],
    case_insensitive: bool,
) -> crate::PolicyResult<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(case_insensitive)
                .build()
                .map_err(|e| crate::PolicyError::InvalidPattern {
                    field: field.to_owned(),
                    pattern: p.clone(),
                    message: e.to_string(),
                })
        })
        .collect()
}
