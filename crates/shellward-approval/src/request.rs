//! Confirmation request and response types.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shellward_core::Categorization;

use crate::memory::RememberedDecision;

/// What the human is asked to decide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    /// The command awaiting confirmation.
    pub command: String,
    /// Why the command needs confirmation.
    pub categorization: Categorization,
    /// Where the command would run.
    pub working_directory: PathBuf,
    /// How long to wait before denying.
    pub timeout: Duration,
}

impl ConfirmationRequest {
    /// Create a request.
    #[must_use]
    pub fn new(
        command: impl Into<String>,
        categorization: Categorization,
        working_directory: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            categorization,
            working_directory: working_directory.into(),
            timeout,
        }
    }
}

/// The human's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationDecision {
    /// Run this command.
    Allow,
    /// Do not run this command.
    Deny,
    /// Run this command and vouch for its verb.
    Trust,
    /// Do not run this command, and refuse its verb from now on.
    Block,
}

impl ConfirmationDecision {
    /// Whether the command may run.
    #[must_use]
    pub fn is_approved(self) -> bool {
        matches!(self, Self::Allow | Self::Trust)
    }

    /// How the decision is kept in session memory. `Block` is stored as a
    /// deny.
    #[must_use]
    pub fn remembered_as(self) -> RememberedDecision {
        match self {
            Self::Allow => RememberedDecision::Allow,
            Self::Trust => RememberedDecision::Trust,
            Self::Deny | Self::Block => RememberedDecision::Deny,
        }
    }
}

impl From<RememberedDecision> for ConfirmationDecision {
    fn from(decision: RememberedDecision) -> Self {
        match decision {
            RememberedDecision::Allow => Self::Allow,
            RememberedDecision::Deny => Self::Deny,
            RememberedDecision::Trust => Self::Trust,
        }
    }
}

impl fmt::Display for ConfirmationDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Trust => "trust",
            Self::Block => "block",
        })
    }
}

/// Outcome of a confirmation round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationResponse {
    /// The decision.
    pub decision: ConfirmationDecision,
    /// Whether the decision should be kept in session memory.
    pub remember_decision: bool,
    /// Whether the prompt timed out (the decision is then `Deny`).
    pub timed_out: bool,
    /// Whether the answer came from session memory instead of a prompt.
    #[serde(default)]
    pub from_session_memory: bool,
}

impl ConfirmationResponse {
    /// A fresh answer from a prompt.
    #[must_use]
    pub fn answered(decision: ConfirmationDecision, remember_decision: bool) -> Self {
        Self {
            decision,
            remember_decision,
            timed_out: false,
            from_session_memory: false,
        }
    }

    /// The response produced when nobody answers in time.
    #[must_use]
    pub fn timed_out() -> Self {
        Self {
            decision: ConfirmationDecision::Deny,
            remember_decision: false,
            timed_out: true,
            from_session_memory: false,
        }
    }

    pub(crate) fn remembered(decision: RememberedDecision) -> Self {
        Self {
            decision: decision.into(),
            remember_decision: false,
            timed_out: false,
            from_session_memory: true,
        }
    }

    /// Whether the command may run.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.decision.is_approved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_is_remembered_as_deny() {
        assert_eq!(
            ConfirmationDecision::Block.remembered_as(),
            RememberedDecision::Deny
        );
        assert_eq!(
            ConfirmationDecision::Trust.remembered_as(),
            RememberedDecision::Trust
        );
    }

    #[test]
    fn test_timed_out_shape() {
        let response = ConfirmationResponse::timed_out();
        assert_eq!(response.decision, ConfirmationDecision::Deny);
        assert!(!response.remember_decision);
        assert!(response.timed_out);
        assert!(!response.is_approved());
    }

    #[test]
    fn test_decision_wire_names() {
        let json = serde_json::to_string(&ConfirmationDecision::Block).unwrap();
        assert_eq!(json, "\"block\"");
    }
}
