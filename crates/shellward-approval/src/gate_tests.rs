use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shellward_core::{Categorization, CommandCategory, CommandContext};

use super::*;
use crate::prompt::{AutoDenyPrompt, StaticPrompt};
use crate::request::ConfirmationDecision;
use crate::memory::RememberedDecision;

struct CountingPrompt {
    calls: AtomicUsize,
    decision: ConfirmationDecision,
    remember: bool,
}

impl CountingPrompt {
    fn new(decision: ConfirmationDecision, remember: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            decision,
            remember,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfirmationPrompt for CountingPrompt {
    async fn confirm(
        &self,
        _request: &ConfirmationRequest,
    ) -> ApprovalResult<ConfirmationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ConfirmationResponse::answered(self.decision, self.remember))
    }
}

struct SilentPrompt;

#[async_trait]
impl ConfirmationPrompt for SilentPrompt {
    async fn confirm(
        &self,
        _request: &ConfirmationRequest,
    ) -> ApprovalResult<ConfirmationResponse> {
        std::future::pending().await
    }
}

struct BrokenPrompt;

#[async_trait]
impl ConfirmationPrompt for BrokenPrompt {
    async fn confirm(
        &self,
        _request: &ConfirmationRequest,
    ) -> ApprovalResult<ConfirmationResponse> {
        Err(ApprovalError::Prompt("terminal closed".to_owned()))
    }
}

fn request(command: &str) -> ConfirmationRequest {
    ConfirmationRequest::new(
        command,
        Categorization::new(
            CommandCategory::Risky,
            Some(r"^mkdir\b".to_owned()),
            "matched risky pattern",
            CommandContext::new("file_write", "modifies files"),
        ),
        "/work",
        Duration::from_secs(30),
    )
}

#[tokio::test]
async fn test_prompt_answer_is_returned() {
    let gate = ConfirmationGate::new(Arc::new(StaticPrompt::new(
        ConfirmationDecision::Allow,
        false,
    )));
    let response = gate.prompt_user(&request("mkdir x")).await;
    assert!(response.is_approved());
    assert!(!response.timed_out);
    assert!(!response.from_session_memory);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_denies_without_remembering() {
    let memory = Arc::new(SessionMemory::default());
    let gate = ConfirmationGate::new(Arc::new(SilentPrompt)).with_memory(Arc::clone(&memory));

    let response = gate.prompt_user(&request("mkdir x")).await;
    assert_eq!(response, ConfirmationResponse::timed_out());
    assert!(memory.is_empty());

    let err = gate.confirm(&request("mkdir x")).await.unwrap_err();
    assert_eq!(err, ApprovalError::Timeout { timeout_ms: 30_000 });
}

#[tokio::test]
async fn test_remembered_allow_skips_prompt() {
    let prompt = CountingPrompt::new(ConfirmationDecision::Allow, true);
    let memory = Arc::new(SessionMemory::default());
    let gate = ConfirmationGate::new(prompt.clone()).with_memory(Arc::clone(&memory));

    assert!(gate.prompt_user(&request("mkdir a")).await.is_approved());
    assert_eq!(memory.len(), 1);

    let second = gate.prompt_user(&request("mkdir b")).await;
    assert!(second.is_approved());
    assert!(second.from_session_memory);
    assert_eq!(prompt.calls(), 1);
}

#[tokio::test]
async fn test_remembered_deny_short_circuits() {
    let prompt = CountingPrompt::new(ConfirmationDecision::Allow, false);
    let memory = Arc::new(SessionMemory::default());
    memory
        .record("rm old", RememberedDecision::Deny, CommandCategory::Risky)
        .unwrap();
    let gate = ConfirmationGate::new(prompt.clone()).with_memory(memory);

    let response = gate.prompt_user(&request("rm new")).await;
    assert_eq!(response.decision, ConfirmationDecision::Deny);
    assert!(response.from_session_memory);
    assert_eq!(prompt.calls(), 0);

    let err = gate.confirm(&request("RM again")).await.unwrap_err();
    assert!(matches!(err, ApprovalError::Denied { ref reason } if reason.contains("earlier")));
}

#[tokio::test]
async fn test_block_is_stored_as_deny() {
    let memory = Arc::new(SessionMemory::default());
    let gate = ConfirmationGate::new(Arc::new(StaticPrompt::new(ConfirmationDecision::Block, true)))
        .with_memory(Arc::clone(&memory));

    let response = gate.prompt_user(&request("curl example.com")).await;
    assert_eq!(response.decision, ConfirmationDecision::Block);
    assert!(!response.is_approved());

    let stored = memory.find_matching("curl other.com").unwrap();
    assert_eq!(stored.decision, RememberedDecision::Deny);
}

#[tokio::test]
async fn test_remember_without_memory_is_ignored() {
    let gate = ConfirmationGate::new(Arc::new(StaticPrompt::new(
        ConfirmationDecision::Trust,
        true,
    )));
    let response = gate.prompt_user(&request("make")).await;
    assert!(response.is_approved());
    assert!(response.remember_decision);
}

#[tokio::test]
async fn test_failed_prompt_denies() {
    let gate = ConfirmationGate::new(Arc::new(BrokenPrompt));
    let response = gate.prompt_user(&request("mkdir x")).await;
    assert_eq!(response.decision, ConfirmationDecision::Deny);
    assert!(!response.timed_out);
}

#[tokio::test]
async fn test_auto_deny() {
    let gate = ConfirmationGate::new(Arc::new(AutoDenyPrompt));
    let err = gate.confirm(&request("touch x")).await.unwrap_err();
    assert!(matches!(err, ApprovalError::Denied { ref reason } if reason == "user answered deny"));
}
