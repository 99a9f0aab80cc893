//! Falsification Tests: Category A - Assertion Chains (F001-F019)

use std::sync::Arc;

use justest_core::{Child, HandleKind, MockT, Root, T, Value, get_helper, root_of, with};
use justest_matchers::{be_equal_to, succeed};
use parking_lot::Mutex;

// =============================================================================
// F001-F006: End-to-end chains
// =============================================================================

/// F001: A matching assertion records no failure.
#[test]
fn f001_equal_values_pass() {
    let mock = MockT::new();
    assert!(mock.run(|t| {
        with(t).verify(1).will(be_equal_to(1)).or_fail();
    }));
    assert!(mock.failures().is_empty());
}

/// F002: A mismatch fails with a unified diff and both citation lines.
#[test]
fn f002_mismatch_reports_diff_and_citations() {
    let mock = MockT::new();
    assert!(!mock.run(|t| {
        with(t).verify(1).will(be_equal_to(2)).or_fail();
    }));
    let failures = mock.failures();
    assert_eq!(failures.len(), 1);
    let lines: Vec<&str> = failures[0].lines().collect();
    assert!(lines.contains(&"-2"), "{}", failures[0]);
    assert!(lines.contains(&"+1"), "{}", failures[0]);
    assert!(failures[0].contains("    Caller:    "));
    assert!(failures[0].contains("    Assertion: "));
    assert!(failures[0].contains("dsl.rs"));
}

/// F003: The matcher's transformed actuals are returned.
#[test]
fn f003_terminal_returns_actuals() {
    let mock = MockT::new();
    assert!(mock.run(|t| {
        let out = with(t)
            .verify_all([Value::from("deployed"), Value::Nil])
            .will(succeed())
            .or_fail();
        assert_eq!(out, vec![Value::from("deployed")]);
    }));
}

/// F004: Succeed passes on nil.
#[test]
fn f004_succeed_on_nil() {
    let mock = MockT::new();
    assert!(mock.run(|t| {
        with(t).verify(()).will(succeed()).or_fail();
    }));
}

/// F005: Succeed fails on an error with the documented wording.
#[test]
fn f005_succeed_rejects_error() {
    let mock = MockT::new();
    assert!(!mock.run(|t| {
        with(t).verify(Value::error_msg("x")).will(succeed()).or_fail();
    }));
    assert!(
        mock.failures()[0]
            .starts_with("Expected last actual value to be nil or a non-error value, not a non-nil error: x")
    );
}

/// F006: A second terminal is a usage error.
#[test]
#[should_panic(expected = "assertion already evaluated")]
fn f006_second_terminal_panics() {
    let mock = MockT::new();
    let mut assertion = with(&mock).verify(1).will(be_equal_to(1));
    assertion.or_fail();
    assertion.or_fail();
}

// =============================================================================
// F007-F012: Handle chain
// =============================================================================

/// F007: `root_of` terminates at the outermost handle.
#[test]
fn f007_root_of_walks_chain() {
    let mock = MockT::new();
    let a = Child::new(&mock, String::new());
    let b = Child::new(&a, String::new());
    let c = Child::new(&b, String::new());
    assert_eq!(root_of(&c).id(), mock.id());
    assert_eq!(root_of(&c).kind(), HandleKind::Mock);
    assert_eq!(root_of(&mock).id(), mock.id());
}

/// F008: Root cleanups run in reverse registration order.
#[test]
fn f008_root_cleanups_lifo() {
    let order = Arc::new(Mutex::new(Vec::new()));
    {
        let root = Root::named("f008");
        for step in ["namespace", "repository", "environment"] {
            let order = Arc::clone(&order);
            root.cleanup(Box::new(move || order.lock().push(step)));
        }
    }
    assert_eq!(
        *order.lock(),
        vec!["environment", "repository", "namespace"]
    );
}

/// F009: Child cleanups outlive the child and run with the parent's.
#[test]
fn f009_child_cleanups_reparent() {
    let mock = MockT::new();
    {
        let child = Child::new(&mock, String::new());
        child.cleanup(Box::new(|| {}));
        child.cleanup(Box::new(|| {}));
    }
    assert_eq!(mock.cleanups(), 2);
}

/// F010: Scratchpad lookups fall through to the parent.
#[test]
fn f010_scratchpad_falls_through() {
    let mock = MockT::new();
    mock.add_value("cluster", Value::from("kind-e2e"));
    let child = Child::new(&mock, String::new());
    assert_eq!(child.value("cluster"), Some(Value::from("kind-e2e")));
    child.add_value("cluster", Value::from("override"));
    assert_eq!(child.value("cluster"), Some(Value::from("override")));
    assert_eq!(mock.value("cluster"), Some(Value::from("kind-e2e")));
    assert_eq!(mock.value("missing"), None);
}

/// F011: A root is named after the running test.
#[test]
fn f011_root_named_after_test() {
    let root = Root::new();
    assert!(root.name().contains("f011_root_named_after_test"));
}

/// F012: A child failure reaches the root as a test failure.
#[test]
#[should_panic(expected = "Expected actual 0 to be nil")]
fn f012_root_failure_panics() {
    let root = Root::named("f012");
    with(&root)
        .verify(1)
        .will(justest_matchers::be_nil())
        .or_fail();
}

// =============================================================================
// F013: Assertion helpers
// =============================================================================

fn expect_replicas(t: &dyn T, replicas: i64) {
    get_helper(t)();
    with(t).verify(replicas).will(be_equal_to(3)).or_fail();
}

fn citation_line<'a>(failure: &'a str, label: &str) -> &'a str {
    failure
        .lines()
        .find(|l| l.trim_start().starts_with(label))
        .unwrap_or_default()
}

/// F013: A registered helper is skipped; the caller line cites its caller.
#[test]
fn f013_helper_attributed_to_caller() {
    let mock = MockT::new();
    assert!(!mock.run(|t| {
        expect_replicas(t, 2);
    }));
    let failures = mock.failures();
    let caller = citation_line(&failures[0], "Caller:");
    let assertion = citation_line(&failures[0], "Assertion:");
    assert!(caller.contains("dsl.rs:"), "got {caller}");
    assert!(caller.ends_with("expect_replicas(t, 2);"), "got {caller}");
    assert!(
        assertion.ends_with("with(t).verify(replicas).will(be_equal_to(3)).or_fail();"),
        "got {assertion}"
    );
}
