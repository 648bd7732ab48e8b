//! The human-confirmation capability and headless implementations.

use async_trait::async_trait;

use crate::error::ApprovalResult;
use crate::request::{ConfirmationDecision, ConfirmationRequest, ConfirmationResponse};

/// Asks a human whether a command may run.
///
/// Frontends (terminal, chat, web) implement this. The gate applies the
/// timeout, so implementations may wait indefinitely.
///
/// # Example
///
/// ```rust,ignore
/// struct AlwaysAllow;
///
/// #[async_trait::async_trait]
/// impl ConfirmationPrompt for AlwaysAllow {
///     async fn confirm(
///         &self,
///         _request: &ConfirmationRequest,
///     ) -> ApprovalResult<ConfirmationResponse> {
///         Ok(ConfirmationResponse::answered(ConfirmationDecision::Allow, false))
///     }
/// }
/// ```
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    /// Present `request` and wait for an answer.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Prompt`](crate::ApprovalError::Prompt) when
    /// no answer can be obtained. The gate treats this as a denial.
    async fn confirm(&self, request: &ConfirmationRequest) -> ApprovalResult<ConfirmationResponse>;
}

/// Denies every request. For headless operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDenyPrompt;

#[async_trait]
impl ConfirmationPrompt for AutoDenyPrompt {
    async fn confirm(&self, request: &ConfirmationRequest) -> ApprovalResult<ConfirmationResponse> {
        tracing::debug!(command = %request.command, "auto-denying confirmation request");
        Ok(ConfirmationResponse::answered(ConfirmationDecision::Deny, false))
    }
}

/// Answers every request the same way.
#[derive(Debug, Clone, Copy)]
pub struct StaticPrompt {
    decision: ConfirmationDecision,
    remember: bool,
}

impl StaticPrompt {
    /// Always answer `decision`, asking to remember it when `remember` is set.
    #[must_use]
    pub fn new(decision: ConfirmationDecision, remember: bool) -> Self {
        Self { decision, remember }
    }
}

#[async_trait]
impl ConfirmationPrompt for StaticPrompt {
    async fn confirm(
        &self,
        _request: &ConfirmationRequest,
    ) -> ApprovalResult<ConfirmationResponse> {
        Ok(ConfirmationResponse::answered(self.decision, self.remember))
    }
}
