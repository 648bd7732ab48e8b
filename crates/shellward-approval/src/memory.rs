//! Session memory of remembered confirmation decisions.
//!
//! When a human answers a prompt with "remember this decision", the answer
//! is stored under a pattern anchored to the command's base verb and reused
//! for later commands with the same verb. The store is bounded (oldest
//! entries are evicted first) and entries expire after a TTL; expired entries
//! stop matching immediately and are reclaimed by
//! [`SessionMemory::sweep_expired`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use shellward_core::{Clock, CommandCategory, SystemClock};
use tracing::{debug, warn};

use crate::error::{ApprovalError, ApprovalResult};

/// Default number of remembered decisions.
pub const DEFAULT_CAPACITY: usize = 100;

/// Default lifetime of a remembered decision.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// A decision kept in session memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RememberedDecision {
    /// Run matching commands without prompting.
    Allow,
    /// Refuse matching commands without prompting.
    Deny,
    /// Run matching commands without prompting; the user vouched for the verb.
    Trust,
}

impl RememberedDecision {
    /// Whether matching commands may run.
    #[must_use]
    pub fn permits(self) -> bool {
        matches!(self, Self::Allow | Self::Trust)
    }
}

impl fmt::Display for RememberedDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Trust => "trust",
        })
    }
}

/// One remembered decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDecision {
    /// Regex matched (case-insensitively) against later commands.
    pub command_pattern: String,
    /// What to do with matching commands.
    pub decision: RememberedDecision,
    /// When the decision was recorded.
    pub timestamp: DateTime<Utc>,
    /// Category of the command that was answered.
    pub category: CommandCategory,
    /// Risk score of that category.
    pub risk_score: u8,
}

#[derive(Debug)]
struct Entry {
    decision: SessionDecision,
    matcher: Regex,
}

/// Bounded, TTL-based store of remembered decisions.
///
/// Reads run in parallel; inserts, eviction and sweeps are serialized behind
/// the write lock.
pub struct SessionMemory {
    entries: RwLock<VecDeque<Entry>>,
    capacity: usize,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for SessionMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionMemory")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl SessionMemory {
    /// Create a store holding at most `capacity` decisions, each living for
    /// `ttl`. A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for timestamps and expiry.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Maximum number of decisions kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remember `decision` for commands sharing `command`'s base verb.
    ///
    /// Evicts the oldest entry when the store is full.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::InvalidPattern`] when `command` has no verb.
    pub fn record(
        &self,
        command: &str,
        decision: RememberedDecision,
        category: CommandCategory,
    ) -> ApprovalResult<SessionDecision> {
        let command_pattern = derive_pattern(command)?;
        let matcher = RegexBuilder::new(&command_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ApprovalError::InvalidPattern {
                command: command.to_owned(),
                message: e.to_string(),
            })?;

        let stored = SessionDecision {
            command_pattern,
            decision,
            timestamp: self.clock.now(),
            category,
            risk_score: category.risk_score(),
        };

        let mut entries = self.write();
        while entries.len() >= self.capacity {
            if let Some(evicted) = entries.pop_front() {
                debug!(
                    pattern = %evicted.decision.command_pattern,
                    "evicting oldest session decision"
                );
            }
        }
        entries.push_back(Entry {
            decision: stored.clone(),
            matcher,
        });
        debug!(
            pattern = %stored.command_pattern,
            decision = %stored.decision,
            "session decision recorded"
        );
        Ok(stored)
    }

    /// The most recent unexpired decision whose pattern matches `command`.
    #[must_use]
    pub fn find_matching(&self, command: &str) -> Option<SessionDecision> {
        let now = self.clock.now();
        let command = command.trim();
        self.read()
            .iter()
            .rev()
            .find(|e| !self.is_expired(&e.decision, now) && e.matcher.is_match(command))
            .map(|e| e.decision.clone())
    }

    /// Drop every expired decision, returning how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|e| !self.is_expired(&e.decision, now));
        let removed = before.saturating_sub(entries.len());
        if removed > 0 {
            debug!(removed, "expired session decisions swept");
        }
        removed
    }

    /// Forget everything.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Number of stored decisions, expired ones included until swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every stored decision, oldest first.
    #[must_use]
    pub fn export(&self) -> Vec<SessionDecision> {
        self.read().iter().map(|e| e.decision.clone()).collect()
    }

    fn is_expired(&self, decision: &SessionDecision, now: DateTime<Utc>) -> bool {
        decision
            .timestamp
            .checked_add_signed(self.ttl)
            .is_some_and(|expiry| now > expiry)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, VecDeque<Entry>> {
        self.entries.read().unwrap_or_else(|e| {
            warn!("SessionMemory read lock poisoned, recovering");
            PoisonError::into_inner(e)
        })
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, VecDeque<Entry>> {
        self.entries.write().unwrap_or_else(|e| {
            warn!("SessionMemory write lock poisoned, recovering");
            PoisonError::into_inner(e)
        })
    }
}

/// Pattern anchored to the command's base verb: `^<verb>(\s|$)`.
///
/// # Errors
///
/// Returns [`ApprovalError::InvalidPattern`] for an empty command.
pub fn derive_pattern(command: &str) -> ApprovalResult<String> {
    let verb = command
        .split_whitespace()
        .next()
        .ok_or_else(|| ApprovalError::InvalidPattern {
            command: command.to_owned(),
            message: "command is empty".to_owned(),
        })?;
    Ok(format!(r"^{}(\s|$)", regex::escape(&verb.to_lowercase())))
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
