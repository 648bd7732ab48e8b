//! Layered configuration feeding a live guard.

use std::fs;
use std::path::Path;

use shellward_config::Config;
use shellward_core::{SecurityError, ViolationKind};
use shellward_test::{GuardHarness, MockExecutor, ScriptedPrompt};

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn layered(user: &str, workspace: &str) -> Config {
    let home = tempfile::tempdir().unwrap();
    let ws = tempfile::tempdir().unwrap();
    write(&home.path().join("config.toml"), user);
    write(&ws.path().join(".shellward").join("config.toml"), workspace);

    let mut cfg = Config::load_with_home(Some(ws.path()), home.path())
        .unwrap()
        .config;
    cfg.monitor.enabled = false;
    cfg
}

#[tokio::test]
async fn test_user_trust_survives_workspace_layer() {
    let cfg = layered(
        "[commands]\ntrusted_commands = [\"^cargo test\\\\b\"]\n",
        "[commands]\ntrusted_commands = [\"^curl\\\\b\"]\nblocked_commands = [\"npm\"]\n",
    );
    assert_eq!(cfg.commands.trusted_commands, vec![r"^cargo test\b".to_owned()]);

    let prompt = ScriptedPrompt::new();
    let h = GuardHarness::with_config(cfg, prompt.clone(), MockExecutor::new());

    assert!(h.run("cargo test").await.is_ok());
    assert!(prompt.requests().is_empty());

    // The workspace could add a block but not a trust.
    let err = h.run("npm install").await.unwrap_err();
    assert!(matches!(
        err,
        SecurityError::Violation {
            kind: ViolationKind::BlockedCommand,
            ..
        }
    ));
    assert!(h.run("curl https://example.com").await.is_err());
    assert_eq!(prompt.requests().len(), 1);
}

#[tokio::test]
async fn test_workspace_cannot_enable_dangerous_commands() {
    let cfg = layered(
        "",
        "[commands]\nallow_dangerous = true\n\n[workspace]\nenforce_boundaries = false\n",
    );
    assert!(!cfg.commands.allow_dangerous);
    assert!(cfg.workspace.enforce_boundaries);

    let h = GuardHarness::with_config(cfg, ScriptedPrompt::new().then_allow(), MockExecutor::new());

    assert!(h.run("sudo apt update").await.is_err());
    assert!(h.run("cat ../outside").await.is_err());
    assert_eq!(h.executor.call_count(), 0);
}

#[tokio::test]
async fn test_user_layer_can_loosen() {
    let cfg = layered("[commands]\nallow_dangerous = true\n", "");
    assert!(cfg.commands.allow_dangerous);

    let prompt = ScriptedPrompt::new().then_allow();
    let h = GuardHarness::with_config(cfg, prompt.clone(), MockExecutor::new());

    assert!(h.run("sudo apt update").await.is_ok());
    assert_eq!(prompt.requests().len(), 1);
}
