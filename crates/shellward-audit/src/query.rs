//! Filtering the in-memory execution log.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use shellward_core::{CommandCategory, SessionId};

use crate::entry::ExecutionLogEntry;
use crate::error::{AuditError, AuditResult};

/// Filters for [`ExecutionLogger::query_execution_logs`](crate::ExecutionLogger::query_execution_logs).
///
/// Every set filter must match (AND semantics). Results are newest first,
/// then `offset` entries are skipped and at most `limit` returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogQuery {
    /// Earliest timestamp, inclusive.
    pub start: Option<DateTime<Utc>>,
    /// Latest timestamp, inclusive.
    pub end: Option<DateTime<Utc>>,
    /// Regex the command must match.
    pub command_pattern: Option<String>,
    /// Required success flag.
    pub success: Option<bool>,
    /// Required error type.
    pub error_type: Option<String>,
    /// Required category.
    pub category: Option<CommandCategory>,
    /// Minimum execution time in milliseconds, inclusive.
    pub min_execution_ms: Option<u64>,
    /// Maximum execution time in milliseconds, inclusive.
    pub max_execution_ms: Option<u64>,
    /// Required user id.
    pub user_id: Option<String>,
    /// Required session.
    pub session_id: Option<SessionId>,
    /// Entries to skip after sorting.
    pub offset: usize,
    /// Maximum entries to return.
    pub limit: Option<usize>,
}

impl LogQuery {
    /// An unfiltered query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only entries whose command matches `pattern`.
    #[must_use]
    pub fn command(mut self, pattern: impl Into<String>) -> Self {
        self.command_pattern = Some(pattern.into());
        self
    }

    /// Only successful (or failed) entries.
    #[must_use]
    pub fn success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    /// Only entries in `category`.
    #[must_use]
    pub fn category(mut self, category: CommandCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Only entries between `start` and `end`, inclusive.
    #[must_use]
    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Skip `offset` entries, then return at most `limit`.
    #[must_use]
    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    /// Apply the query to `entries`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidQuery`] if `command_pattern` is not a
    /// valid regex.
    pub fn apply<'a, I>(&self, entries: I) -> AuditResult<Vec<ExecutionLogEntry>>
    where
        I: IntoIterator<Item = &'a ExecutionLogEntry>,
    {
        let command_re = self
            .command_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| AuditError::InvalidQuery(format!("command pattern: {e}")))?;

        let mut matched: Vec<&ExecutionLogEntry> = entries
            .into_iter()
            .filter(|e| self.matches(e, command_re.as_ref()))
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let limit = self.limit.unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .skip(self.offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn matches(&self, entry: &ExecutionLogEntry, command_re: Option<&Regex>) -> bool {
        self.start.is_none_or(|start| entry.timestamp >= start)
            && self.end.is_none_or(|end| entry.timestamp <= end)
            && command_re.is_none_or(|re| re.is_match(&entry.command))
            && self.success.is_none_or(|s| entry.success == s)
            && self
                .error_type
                .as_deref()
                .is_none_or(|t| entry.error_type.as_deref() == Some(t))
            && self.category.is_none_or(|c| entry.category == Some(c))
            && self
                .min_execution_ms
                .is_none_or(|min| entry.execution_time_ms >= min)
            && self
                .max_execution_ms
                .is_none_or(|max| entry.execution_time_ms <= max)
            && self
                .user_id
                .as_deref()
                .is_none_or(|u| entry.user_id.as_deref() == Some(u))
            && self
                .session_id
                .as_ref()
                .is_none_or(|s| &entry.session_id == s)
    }
}
