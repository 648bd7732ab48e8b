//! The confirmation gate.
//!
//! # Flow
//!
//! 1. Consult session memory. A remembered deny refuses immediately; a
//!    remembered allow or trust approves without prompting.
//! 2. Otherwise present the request through the [`ConfirmationPrompt`],
//!    bounded by the request's timeout.
//! 3. A timeout resolves to `{deny, remember: false, timed_out: true}`; a
//!    failed prompt resolves to a plain deny.
//! 4. Answers marked "remember" are stored in session memory (`block` as
//!    `deny`).

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{ApprovalError, ApprovalResult};
use crate::memory::SessionMemory;
use crate::prompt::ConfirmationPrompt;
use crate::request::{ConfirmationDecision, ConfirmationRequest, ConfirmationResponse};

/// Suspends a command pending a human decision.
#[derive(Clone)]
pub struct ConfirmationGate {
    prompt: Arc<dyn ConfirmationPrompt>,
    memory: Option<Arc<SessionMemory>>,
}

impl fmt::Debug for ConfirmationGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmationGate")
            .field("memory", &self.memory)
            .finish_non_exhaustive()
    }
}

impl ConfirmationGate {
    /// Create a gate without session memory.
    #[must_use]
    pub fn new(prompt: Arc<dyn ConfirmationPrompt>) -> Self {
        Self {
            prompt,
            memory: None,
        }
    }

    /// Consult and update `memory`.
    #[must_use]
    pub fn with_memory(mut self, memory: Arc<SessionMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// The attached session memory.
    #[must_use]
    pub fn memory(&self) -> Option<&Arc<SessionMemory>> {
        self.memory.as_ref()
    }

    /// Resolve `request` to a decision.
    pub async fn prompt_user(&self, request: &ConfirmationRequest) -> ConfirmationResponse {
        if let Some(remembered) = self
            .memory
            .as_ref()
            .and_then(|m| m.find_matching(&request.command))
        {
            debug!(
                command = %request.command,
                pattern = %remembered.command_pattern,
                decision = %remembered.decision,
                "using remembered decision"
            );
            return ConfirmationResponse::remembered(remembered.decision);
        }

        let response =
            match tokio::time::timeout(request.timeout, self.prompt.confirm(request)).await {
                Ok(Ok(response)) => ConfirmationResponse::answered(
                    response.decision,
                    response.remember_decision,
                ),
                Ok(Err(e)) => {
                    warn!(
                        command = %request.command,
                        error = %e,
                        "confirmation prompt failed, denying"
                    );
                    ConfirmationResponse::answered(ConfirmationDecision::Deny, false)
                },
                Err(_) => {
                    info!(
                        command = %request.command,
                        timeout_ms = duration_ms(request),
                        "confirmation timed out"
                    );
                    ConfirmationResponse::timed_out()
                },
            };

        if response.remember_decision {
            self.remember(request, &response);
        }
        response
    }

    /// Like [`prompt_user`](Self::prompt_user), but maps any refusal to an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Timeout`] when nobody answered and
    /// [`ApprovalError::Denied`] for every other refusal.
    pub async fn confirm(
        &self,
        request: &ConfirmationRequest,
    ) -> ApprovalResult<ConfirmationResponse> {
        let response = self.prompt_user(request).await;
        if response.is_approved() {
            return Ok(response);
        }
        if response.timed_out {
            return Err(ApprovalError::Timeout {
                timeout_ms: duration_ms(request),
            });
        }
        let reason = if response.from_session_memory {
            format!("'{}' was refused earlier in this session", request.command)
        } else {
            format!("user answered {}", response.decision)
        };
        Err(ApprovalError::Denied { reason })
    }

    fn remember(&self, request: &ConfirmationRequest, response: &ConfirmationResponse) {
        let Some(memory) = &self.memory else {
            return;
        };
        if let Err(e) = memory.record(
            &request.command,
            response.decision.remembered_as(),
            request.categorization.category(),
        ) {
            warn!(command = %request.command, error = %e, "failed to remember decision");
        }
    }
}

fn duration_ms(request: &ConfirmationRequest) -> u64 {
    u64::try_from(request.timeout.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
