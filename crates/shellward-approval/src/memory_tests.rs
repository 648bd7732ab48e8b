use super::*;
use chrono::Duration as ChronoDuration;
use shellward_core::ManualClock;

fn memory_with_clock() -> (SessionMemory, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let memory = SessionMemory::default().with_clock(clock.clone());
    (memory, clock)
}

#[test]
fn test_derive_pattern_anchors_base_verb() {
    assert_eq!(derive_pattern("mkdir -p build").unwrap(), r"^mkdir(\s|$)");
    assert_eq!(derive_pattern("  C++ main.cc").unwrap(), r"^c\+\+(\s|$)");
    assert!(derive_pattern("   ").is_err());
}

#[test]
fn test_record_and_find() {
    let (memory, _clock) = memory_with_clock();
    memory
        .record("mkdir build", RememberedDecision::Allow, CommandCategory::Risky)
        .unwrap();

    let found = memory.find_matching("mkdir other").unwrap();
    assert_eq!(found.decision, RememberedDecision::Allow);
    assert_eq!(found.risk_score, 50);
    assert!(memory.find_matching("MKDIR shouting").is_some());
    assert!(memory.find_matching("mkdir").is_some());
    assert!(memory.find_matching("mkdirs x").is_none());
    assert!(memory.find_matching("touch x").is_none());
}

#[test]
fn test_most_recent_decision_wins() {
    let (memory, _clock) = memory_with_clock();
    memory
        .record("rm a", RememberedDecision::Allow, CommandCategory::Risky)
        .unwrap();
    memory
        .record("rm b", RememberedDecision::Deny, CommandCategory::Risky)
        .unwrap();

    assert_eq!(
        memory.find_matching("rm c").unwrap().decision,
        RememberedDecision::Deny
    );
}

#[test]
fn test_ttl_and_sweep() {
    let (memory, clock) = memory_with_clock();
    memory
        .record("touch x", RememberedDecision::Trust, CommandCategory::Risky)
        .unwrap();

    clock.advance(ChronoDuration::minutes(59));
    assert!(memory.find_matching("touch y").is_some());
    assert_eq!(memory.sweep_expired(), 0);

    clock.advance(ChronoDuration::minutes(2));
    assert!(memory.find_matching("touch y").is_none());
    assert_eq!(memory.len(), 1);
    assert_eq!(memory.sweep_expired(), 1);
    assert!(memory.is_empty());
}

#[test]
fn test_capacity_evicts_oldest() {
    let clock = Arc::new(ManualClock::starting_now());
    let memory = SessionMemory::new(100, DEFAULT_TTL).with_clock(clock);

    for i in 0..150 {
        memory
            .record(&format!("cmd{i} arg"), RememberedDecision::Allow, CommandCategory::Risky)
            .unwrap();
    }

    assert_eq!(memory.len(), 100);
    assert!(memory.find_matching("cmd0").is_none());
    assert!(memory.find_matching("cmd49").is_none());
    assert!(memory.find_matching("cmd50").is_some());
    assert!(memory.find_matching("cmd149").is_some());
    assert_eq!(memory.export()[0].command_pattern, r"^cmd50(\s|$)");
}

#[test]
fn test_clear_and_export() {
    let (memory, _clock) = memory_with_clock();
    memory
        .record("ls", RememberedDecision::Allow, CommandCategory::Safe)
        .unwrap();
    memory
        .record("sudo ls", RememberedDecision::Deny, CommandCategory::Dangerous)
        .unwrap();

    let exported = memory.export();
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[1].decision, RememberedDecision::Deny);
    assert_eq!(exported[1].risk_score, 80);

    let json = serde_json::to_value(&exported[1]).unwrap();
    assert_eq!(json["decision"], "deny");
    assert_eq!(json["category"], "dangerous");

    memory.clear();
    assert!(memory.is_empty());
    assert!(memory.find_matching("ls").is_none());
}

#[test]
fn test_zero_capacity_keeps_one() {
    let memory = SessionMemory::new(0, DEFAULT_TTL);
    memory
        .record("a", RememberedDecision::Allow, CommandCategory::Risky)
        .unwrap();
    memory
        .record("b", RememberedDecision::Allow, CommandCategory::Risky)
        .unwrap();
    assert_eq!(memory.capacity(), 1);
    assert_eq!(memory.len(), 1);
    assert!(memory.find_matching("b").is_some());
}

#[test]
fn test_permits() {
    assert!(RememberedDecision::Allow.permits());
    assert!(RememberedDecision::Trust.permits());
    assert!(!RememberedDecision::Deny.permits());
}
