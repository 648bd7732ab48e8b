//! Workspace boundary enforcement as seen through the guard.

mod common;

use shellward_core::{SecurityError, ViolationKind};
use shellward_test::ScriptedPrompt;

use common::{enforced_root, harness, harness_with};

fn violation_kind(err: &SecurityError) -> Option<ViolationKind> {
    match err {
        SecurityError::Violation { kind, .. } => Some(*kind),
        _ => None,
    }
}

#[tokio::test]
async fn test_relative_traversal_refused() {
    let h = harness(&ScriptedPrompt::new());

    let err = h.run("cat ../../secret").await.unwrap_err();

    assert_eq!(violation_kind(&err), Some(ViolationKind::PathTraversal));
    assert_eq!(h.executor.call_count(), 0);
}

#[tokio::test]
async fn test_absolute_path_outside_refused() {
    let h = harness(&ScriptedPrompt::new());

    let err = h.run("cat /opt/elsewhere/notes.txt").await.unwrap_err();

    assert_eq!(violation_kind(&err), Some(ViolationKind::WorkspaceViolation));
}

#[tokio::test]
async fn test_system_paths_refused() {
    let h = harness(&ScriptedPrompt::new());

    for command in ["cat /etc/passwd", "ls /proc/1", "cat ~/.ssh/id_ed25519"] {
        let err = h.run(command).await.unwrap_err();
        assert_eq!(violation_kind(&err), Some(ViolationKind::SystemPath), "{command}");
    }
    assert_eq!(h.executor.call_count(), 0);
}

#[tokio::test]
async fn test_dev_null_is_usable() {
    let prompt = ScriptedPrompt::new();
    let h = harness_with(&prompt, |cfg| {
        cfg.commands.allow_complex_commands = true;
        cfg.commands.auto_approve_patterns = vec!["^ls\\b".to_owned()];
    });

    assert!(h.run("ls -la > /dev/null").await.is_ok());
}

#[tokio::test]
async fn test_denied_glob_refused_inside_workspace() {
    let h = harness(&ScriptedPrompt::new());
    h.write_file(".env", "DATABASE_URL=postgres://localhost");

    let err = h.run("cat ./.env").await.unwrap_err();

    assert_eq!(violation_kind(&err), Some(ViolationKind::WorkspaceViolation));
    assert!(err.to_string().contains("denied path pattern"));
}

#[tokio::test]
async fn test_relative_paths_rewritten_to_workspace() {
    let h = harness(&ScriptedPrompt::new());
    h.write_file("src/main.rs", "fn main() {}");

    let run = h.run("cat ./src/main.rs").await.unwrap();

    let expected = enforced_root(&h).join("src/main.rs");
    assert_eq!(
        h.executor.commands(),
        vec![format!("cat {}", expected.display())]
    );
    assert_eq!(run.authorization.command(), format!("cat {}", expected.display()));
}

#[tokio::test]
async fn test_cd_runs_from_the_submitted_directory() {
    let prompt = ScriptedPrompt::new().then_allow();
    let h = harness(&prompt);
    h.create_dir("src");

    let run = h.run("cd src").await.unwrap();

    let root = enforced_root(&h);
    let requests = h.executor.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].working_directory, root);
    assert_eq!(prompt.requests()[0].working_directory, root);
    assert_eq!(
        run.authorization.decision().resolved_cwd(),
        Some(root.join("src").as_path())
    );
}

fn chained(prompt: &ScriptedPrompt) -> shellward_test::GuardHarness {
    harness_with(prompt, |cfg| {
        cfg.commands.allow_complex_commands = true;
        cfg.commands.trusted_commands = vec!["^cd\\b".to_owned()];
    })
}

#[tokio::test]
async fn test_cd_up_from_subdirectory_lands_inside() {
    let h = chained(&ScriptedPrompt::new());
    h.create_dir("sub");

    h.run_in("sub", "cd .. && touch stamp").await.unwrap();

    let root = enforced_root(&h);
    let requests = h.executor.requests();
    assert_eq!(requests[0].command, "cd .. && touch stamp");
    assert_eq!(requests[0].working_directory, root.join("sub"));
    // Where the shell ends up after running the `cd` itself.
    let landed = requests[0].working_directory.parent().unwrap();
    assert!(landed.starts_with(root));

    let err = h.run_in("sub", "cd ../.. && touch stamp").await.unwrap_err();
    assert_eq!(violation_kind(&err), Some(ViolationKind::PathTraversal));
    assert_eq!(h.executor.call_count(), 1);
}

#[tokio::test]
async fn test_paths_after_cd_rewritten_from_the_new_directory() {
    let h = chained(&ScriptedPrompt::new());
    h.write_file("sub/notes.txt", "notes");

    let run = h.run("cd sub && cat ./notes.txt").await.unwrap();

    let expected = enforced_root(&h).join("sub/notes.txt");
    assert_eq!(
        run.authorization.command(),
        format!("cd sub && cat {}", expected.display())
    );
    assert_eq!(h.executor.commands(), vec![run.authorization.command().to_owned()]);
}

#[tokio::test]
async fn test_traversal_after_cd_refused() {
    let h = chained(&ScriptedPrompt::new());
    h.create_dir("a/b");

    let err = h.run("cd a/b && cat ../../../x").await.unwrap_err();

    assert_eq!(violation_kind(&err), Some(ViolationKind::PathTraversal));
    assert_eq!(h.executor.call_count(), 0);
}

#[tokio::test]
async fn test_cd_out_of_workspace_refused() {
    let prompt = ScriptedPrompt::new().then_allow();
    let h = harness(&prompt);

    let err = h.run("cd ..").await.unwrap_err();

    assert_eq!(violation_kind(&err), Some(ViolationKind::PathTraversal));
    assert!(prompt.requests().is_empty());
}

#[tokio::test]
async fn test_subdirectory_cwd_stays_inside() {
    let h = harness(&ScriptedPrompt::new());
    h.create_dir("crates/core");

    let run = h.run_in("crates/core", "ls").await.unwrap();

    assert_eq!(
        run.authorization.working_directory(),
        enforced_root(&h).join("crates/core")
    );
}

#[tokio::test]
async fn test_boundaries_can_be_disabled() {
    let h = harness_with(&ScriptedPrompt::new(), |cfg| {
        cfg.workspace.enforce_boundaries = false;
    });

    assert!(h.guard.filter().boundary().is_none());
    assert!(h.run("cat ../../secret").await.is_ok());
}
