//! Shared helpers for integration tests.

use std::path::Path;

use shellward_config::Config;
use shellward_test::{GuardHarness, MockExecutor, ScriptedPrompt, test_config};

/// A harness over the default configuration.
#[allow(dead_code)]
pub fn harness(prompt: &ScriptedPrompt) -> GuardHarness {
    GuardHarness::new(prompt.clone(), MockExecutor::new())
}

/// A harness over `configure(test_config())`.
#[allow(dead_code)]
pub fn harness_with(prompt: &ScriptedPrompt, configure: impl FnOnce(&mut Config)) -> GuardHarness {
    let mut cfg = test_config();
    configure(&mut cfg);
    GuardHarness::with_config(cfg, prompt.clone(), MockExecutor::new())
}

/// The canonical workspace root the guard enforces against.
#[allow(dead_code)]
pub fn enforced_root(harness: &GuardHarness) -> &Path {
    harness
        .guard
        .filter()
        .boundary()
        .map_or_else(|| harness.root(), |b| b.workspace_root())
}
