use super::*;
use crate::validator::WorkspaceSecurity;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    enforcer: BoundaryEnforcer,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
    std::fs::write(dir.path().join("src/a.txt"), "a").unwrap();

    let security = WorkspaceSecurity::new(dir.path())
        .unwrap()
        .with_home_dir("/home/tester");
    let root = security.workspace_root().to_path_buf();
    let enforcer = BoundaryEnforcer::new(Arc::new(security), &["**/.env".to_owned()])
        .with_home_dir("/home/tester");

    Fixture {
        _dir: dir,
        root,
        enforcer,
    }
}

#[test]
fn test_paths_inside_workspace_pass() {
    let f = fixture();
    let report = f.enforcer.enforce("cat ./src/a.txt src/b.txt", &f.root);

    assert!(report.is_allowed());
    assert_eq!(report.resolved_paths, vec![f.root.join("src/a.txt")]);
    assert_eq!(report.resolved_cwd, Some(f.root.clone()));
    assert_eq!(report.working_directory, Some(f.root.clone()));
}

#[test]
fn test_relative_traversal_refused() {
    let f = fixture();
    let report = f.enforcer.enforce("cat ../../secret", &f.root);

    let violation = report.violation.unwrap();
    assert_eq!(violation.kind, ViolationKind::PathTraversal);
    assert_eq!(violation.path, "../../secret");
}

#[test]
fn test_absolute_outside_refused() {
    let f = fixture();
    let result = f
        .enforcer
        .validate_command_paths("cp notes.txt /opt/elsewhere/notes.txt", &f.root);

    assert!(!result.valid);
    assert_eq!(result.offending_path.as_deref(), Some("/opt/elsewhere/notes.txt"));
    assert!(result.reason.unwrap().contains("/opt/elsewhere/notes.txt"));

    let report = f.enforcer.enforce("cp notes.txt /opt/elsewhere/notes.txt", &f.root);
    assert_eq!(
        report.violation.unwrap().kind,
        ViolationKind::WorkspaceViolation
    );
}

#[test]
fn test_cd_inside_updates_cwd() {
    let f = fixture();
    let result = f.enforcer.validate_working_directory("cd src && ls", &f.root);

    assert!(result.valid);
    assert_eq!(result.resolved_cwd, Some(f.root.join("src")));
}

#[test]
fn test_cd_outside_refused() {
    let f = fixture();
    let result = f.enforcer.validate_working_directory("cd .. && ls", &f.root);
    assert!(!result.valid);
    assert!(result.reason.unwrap().contains("cd target '..'"));

    let chained = f
        .enforcer
        .validate_working_directory("cd src; cd ../..", &f.root);
    assert!(!chained.valid);
}

#[test]
fn test_cwd_outside_workspace_refused() {
    let f = fixture();
    let result = f
        .enforcer
        .validate_working_directory("ls", Path::new("/opt"));
    assert!(!result.valid);
}

#[test]
fn test_system_paths_refused() {
    let f = fixture();

    for command in [
        "cat /etc/passwd",
        "ls /proc/1",
        "cat /sys/kernel/version",
        "ls /root",
        "ls /home/other/.ssh",
        "cat ~/.bashrc",
        "dd if=/dev/zero of=out.img",
    ] {
        let violation = f.enforcer.check_system_paths(command);
        assert!(
            matches!(violation, Some(BoundaryViolation { kind: ViolationKind::SystemPath, .. })),
            "{command} should be refused"
        );
    }
}

#[test]
fn test_own_home_and_dev_null_not_system_paths() {
    let f = fixture();
    assert!(f.enforcer.check_system_paths("ls /home/tester/project").is_none());
    assert!(f.enforcer.check_system_paths("ls > /dev/null").is_none());
    assert!(f.enforcer.check_system_paths("ls /etcetera").is_none());
    assert!(f.enforcer.enforce("ls src > /dev/null", &f.root).is_allowed());
}

#[test]
fn test_denied_glob_refused_inside_workspace() {
    let f = fixture();
    let report = f.enforcer.enforce("cat ./.env", &f.root);

    let violation = report.violation.unwrap();
    assert_eq!(violation.kind, ViolationKind::WorkspaceViolation);
    assert!(violation.reason.contains("denied path pattern"));
}

#[test]
fn test_rewrite_relative_paths() {
    let f = fixture();
    let rewritten = f
        .enforcer
        .rewrite_relative_paths("cat ./src/a.txt --out=./build/x", &f.root)
        .unwrap();

    assert_eq!(
        rewritten,
        format!(
            "cat {} --out={}",
            f.root.join("src/a.txt").display(),
            f.root.join("build/x").display()
        )
    );
}

#[test]
fn test_rewrite_refuses_escape() {
    let f = fixture();
    let sub = f.root.join("src");
    assert!(
        f.enforcer
            .rewrite_relative_paths("cat ./../../x", &sub)
            .is_none()
    );
}

#[test]
fn test_extract_paths_delegates() {
    let f = fixture();
    assert_eq!(
        f.enforcer.extract_paths("mv ./a ../b"),
        vec!["./a".to_owned(), "../b".to_owned()]
    );
}

#[test]
fn test_paths_after_cd_resolve_from_the_new_directory() {
    let f = fixture();
    let report = f.enforcer.enforce("cd src && cat ./a.txt", &f.root);

    assert!(report.is_allowed());
    assert_eq!(report.working_directory, Some(f.root.clone()));
    assert_eq!(report.resolved_cwd, Some(f.root.join("src")));
    assert_eq!(
        report.rewritten_command,
        Some(format!(
            "cd src && cat {}",
            f.root.join("src/a.txt").display()
        ))
    );
    assert!(report.resolved_paths.contains(&f.root.join("src/a.txt")));
}

#[test]
fn test_traversal_after_cd_measured_from_the_new_directory() {
    let f = fixture();

    let escape = f.enforcer.enforce("cd src/nested && cat ../../../x", &f.root);
    let violation = escape.violation.unwrap();
    assert_eq!(violation.kind, ViolationKind::PathTraversal);
    assert_eq!(violation.path, "../../../x");

    let sibling = f.enforcer.enforce("cd src/nested && cat ../a.txt", &f.root);
    assert!(sibling.is_allowed());
    assert!(sibling.resolved_paths.contains(&f.root.join("src/a.txt")));
}

#[test]
fn test_failed_cd_keeps_the_old_directory_in_play() {
    let f = fixture();

    // With `;` the `cat` also runs when `cd` fails, from the workspace root.
    let report = f.enforcer.enforce("cd src; cat ../x", &f.root);
    assert_eq!(
        report.violation.unwrap().kind,
        ViolationKind::PathTraversal
    );

    let result = f
        .enforcer
        .validate_command_paths("cd src || cat ../x", &f.root);
    assert!(!result.valid);
    assert_eq!(result.offending_path.as_deref(), Some("../x"));
}

#[test]
fn test_cd_back_out_after_and_is_inside() {
    let f = fixture();
    let result = f
        .enforcer
        .validate_working_directory("cd src && cd ..", &f.root);

    assert!(result.valid);
    assert_eq!(result.resolved_cwd, Some(f.root.clone()));
}
