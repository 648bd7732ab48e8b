//! Aggregate statistics over the in-memory logs.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use shellward_core::CommandCategory;

use crate::entry::{ExecutionLogEntry, SecurityEvent, SecurityEventType};

/// How many entries appear in the top-N lists.
pub const TOP_N: usize = 10;

/// Usage of one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandStat {
    /// Command text.
    pub command: String,
    /// Times it was logged.
    pub count: usize,
    /// Share of those runs that succeeded, 0.0-1.0.
    pub success_rate: f64,
}

/// Frequency of one error type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorStat {
    /// Error label.
    pub error_type: String,
    /// Occurrences.
    pub count: usize,
    /// Share of all failures, 0.0-1.0.
    pub share: f64,
}

/// Execution-time histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBuckets {
    /// Under one second.
    pub under_1s: usize,
    /// One to ten seconds, inclusive.
    pub from_1s_to_10s: usize,
    /// Over ten seconds.
    pub over_10s: usize,
}

/// Summary of the execution and security logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStatistics {
    /// Executions logged.
    pub total_executions: usize,
    /// Successful executions.
    pub successful: usize,
    /// Failed executions.
    pub failed: usize,
    /// `successful / total`, 0.0 when empty.
    pub success_rate: f64,
    /// Mean execution time in milliseconds, 0.0 when empty.
    pub mean_execution_ms: f64,
    /// Most frequent commands, most frequent first.
    pub top_commands: Vec<CommandStat>,
    /// Most frequent error types, most frequent first.
    pub top_errors: Vec<ErrorStat>,
    /// Executions per category.
    pub categories: BTreeMap<CommandCategory, usize>,
    /// Execution-time histogram.
    pub time_buckets: TimeBuckets,
    /// Security events per type.
    pub security_events: BTreeMap<SecurityEventType, usize>,
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

impl ExecutionStatistics {
    /// Derive statistics from log contents.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute<'a>(
        executions: impl IntoIterator<Item = &'a ExecutionLogEntry>,
        events: impl IntoIterator<Item = &'a SecurityEvent>,
    ) -> Self {
        let mut total = 0usize;
        let mut successful = 0usize;
        let mut total_ms = 0u128;
        let mut commands: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut errors: HashMap<&str, usize> = HashMap::new();
        let mut categories = BTreeMap::new();
        let mut time_buckets = TimeBuckets::default();

        for entry in executions {
            total = total.saturating_add(1);
            total_ms = total_ms.saturating_add(u128::from(entry.execution_time_ms));

            let slot = commands.entry(entry.command.as_str()).or_insert((0, 0));
            slot.0 = slot.0.saturating_add(1);
            if entry.success {
                successful = successful.saturating_add(1);
                slot.1 = slot.1.saturating_add(1);
            } else if let Some(error_type) = entry.error_type.as_deref() {
                let count = errors.entry(error_type).or_insert(0);
                *count = count.saturating_add(1);
            }

            if let Some(category) = entry.category {
                let count = categories.entry(category).or_insert(0usize);
                *count = count.saturating_add(1);
            }

            let bucket = match entry.execution_time_ms {
                0..1_000 => &mut time_buckets.under_1s,
                1_000..=10_000 => &mut time_buckets.from_1s_to_10s,
                _ => &mut time_buckets.over_10s,
            };
            *bucket = bucket.saturating_add(1);
        }

        let failed = total.saturating_sub(successful);

        let mut top_commands: Vec<CommandStat> = commands
            .into_iter()
            .map(|(command, (count, ok))| CommandStat {
                command: command.to_owned(),
                count,
                success_rate: ratio(ok, count),
            })
            .collect();
        top_commands.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.command.cmp(&b.command)));
        top_commands.truncate(TOP_N);

        let mut top_errors: Vec<ErrorStat> = errors
            .into_iter()
            .map(|(error_type, count)| ErrorStat {
                error_type: error_type.to_owned(),
                count,
                share: ratio(count, failed),
            })
            .collect();
        top_errors.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.error_type.cmp(&b.error_type))
        });
        top_errors.truncate(TOP_N);

        let mut security_events = BTreeMap::new();
        for event in events {
            let count = security_events.entry(event.event_type).or_insert(0usize);
            *count = count.saturating_add(1);
        }

        let mean_execution_ms = if total == 0 {
            0.0
        } else {
            total_ms as f64 / total as f64
        };

        Self {
            total_executions: total,
            successful,
            failed,
            success_rate: ratio(successful, total),
            mean_execution_ms,
            top_commands,
            top_errors,
            categories,
            time_buckets,
            security_events,
        }
    }
}
