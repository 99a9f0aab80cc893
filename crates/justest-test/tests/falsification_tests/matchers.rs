//! Falsification Tests: Category B - Built-in Matchers (F020-F049)

use std::time::Duration;

use justest_core::{Buffer, Channel, Kind, Matcher, MockT, T, Value, with};
use justest_matchers::{
    ConditionExpectation, ConditionStatus, be_between, be_empty, be_equal_to, be_greater_than,
    be_less_than, be_nil, fail, have_conditions, not, say, succeed,
};
use justest_test::ConvergingResource;
use proptest::prelude::*;

fn passes(m: &dyn Matcher, actual: impl Into<Value>) -> bool {
    let mock = MockT::new();
    let actual = actual.into();
    mock.run(|t| {
        m.apply(t, vec![actual]);
    })
}

// =============================================================================
// F020-F025: Ordering boundaries
// =============================================================================

/// F020: Between includes both endpoints.
#[test]
fn f020_between_inclusive() {
    let m = be_between(1, 3);
    assert!(passes(&m, 1));
    assert!(passes(&m, 3));
    assert!(passes(&m, 2));
    assert!(!passes(&m, 0));
    assert!(!passes(&m, 4));
}

/// F021: Greater-than is strict.
#[test]
fn f021_greater_than_strict() {
    assert!(!passes(&be_greater_than(5), 5));
    assert!(passes(&be_greater_than(5), 6));
    assert!(!passes(&be_less_than(5), 5));
    assert!(passes(&be_less_than(5), 4));
}

/// F022: Float bounds compare as floats.
#[test]
fn f022_float_bounds() {
    assert!(passes(&be_between(0.5, 1.5), 1.0));
    assert!(!passes(&be_greater_than(0.5), 0.25));
}

/// F023: Ordering reads through function actuals.
#[test]
fn f023_ordering_through_func() {
    assert!(passes(&be_greater_than(10), Value::func(|| 11)));
}

// =============================================================================
// F026-F032: Presence and text
// =============================================================================

/// F026: Empty string, slice, mapping and buffered channel are empty.
#[test]
fn f026_empty_boundaries() {
    assert!(passes(&be_empty(), ""));
    assert!(passes(&be_empty(), Value::slice(Vec::<Value>::new())));
    assert!(passes(&be_empty(), Value::map(Vec::<(String, Value)>::new())));
    let (_tx, ch) = Channel::bounded(4);
    assert!(passes(&be_empty(), ch));
    assert!(!passes(&be_empty(), "x"));
}

/// F027: Typed nulls are nil; pointers to nil are not.
#[test]
fn f027_nil() {
    assert!(passes(&be_nil(), ()));
    assert!(passes(&be_nil(), Value::null(Kind::Slice)));
    assert!(!passes(&be_nil(), Value::pointer(())));
}

/// F030: Nil reads through function actuals and re-polls them.
#[test]
fn f030_nil_polls_function() {
    let mock = MockT::new();
    assert!(mock.run(|t| {
        with(t)
            .verify(Value::func(|| None::<i32>))
            .will(be_nil())
            .or_fail();
    }));

    let calls = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
    let counter = std::sync::Arc::clone(&calls);
    let mock = MockT::new();
    assert!(mock.run(|t| {
        with(t)
            .verify(Value::func(move || {
                let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                (n < 2).then_some("pending")
            }))
            .will(be_nil())
            .within(Duration::from_secs(2), Duration::from_millis(10));
    }));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
}

/// F028: Say anchors behave at the empty string.
#[test]
fn f028_say_boundaries() {
    assert!(!passes(&say("^a+$"), ""));
    assert!(passes(&say("^a+$"), "a"));
    assert!(passes(&say("^ab+c$"), "abbc"));
}

/// F029: Say reads a buffer as it fills.
#[test]
fn f029_say_reads_buffer() {
    use std::io::Write;

    let mut out = Buffer::new();
    let actual = Value::from(&out);
    assert!(!passes(&say("Synced"), actual.clone()));
    writeln!(out, "environment preview-42: Synced").unwrap();
    assert!(passes(&say("Synced"), actual));
}

// =============================================================================
// F033-F039: Negation and errors
// =============================================================================

/// F033: Not inverts a passing matcher.
#[test]
fn f033_not_fails_when_inner_passes() {
    let mock = MockT::new();
    assert!(!mock.run(|t| {
        with(t).verify(1).will(not(be_equal_to(1))).or_fail();
    }));
    assert!(mock.failures()[0].starts_with("Expected matcher to fail, but it passed for [1]"));
}

/// F034: Not propagates panics that are not failures.
#[test]
#[should_panic(expected = "matcher bug")]
fn f034_not_propagates_panics() {
    let buggy = |_: &dyn T, _: Vec<Value>| -> Vec<Value> { panic!("matcher bug") };
    let mock = MockT::new();
    mock.run(|t| {
        not(buggy).apply(t, vec![]);
    });
}

/// F035: Fail consumes the trailing error of a function result.
#[test]
fn f035_fail_on_function_error() {
    let mock = MockT::new();
    let reconcile = Value::func(|| -> Result<u32, String> { Err("conflict".into()) });
    assert!(mock.run(|t| {
        let out = with(t).verify(reconcile).will(fail()).or_fail();
        assert!(out.is_empty());
    }));
}

/// F036: Succeed invokes a function actual and keeps its value.
#[test]
fn f036_succeed_on_function_value() {
    let mock = MockT::new();
    let reconcile = Value::func(|| -> Result<u32, String> { Ok(3) });
    assert!(mock.run(|t| {
        let out = with(t).verify(reconcile).will(succeed()).or_fail();
        assert_eq!(out, vec![Value::from(3u32)]);
    }));
}

// =============================================================================
// F040-F045: Conditions
// =============================================================================

/// F040: Conditions match once the resource converges.
#[test]
fn f040_conditions_after_convergence() {
    let resource = ConvergingResource::new("preview", 2);
    let ready = || {
        have_conditions(vec![
            ConditionExpectation::new("Ready")
                .status(ConditionStatus::True)
                .reason("^Synced$"),
        ])
    };
    resource.reconcile().unwrap();
    assert!(!passes(&ready(), resource.status_func()));
    resource.reconcile().unwrap();
    assert!(passes(&ready(), resource.status_func()));
}

/// F041: A progressing message is matched by pattern.
#[test]
fn f041_condition_message_pattern() {
    let resource = ConvergingResource::new("preview", 3);
    resource.reconcile().unwrap();
    let m = have_conditions(vec![
        ConditionExpectation::new("Ready")
            .status(ConditionStatus::False)
            .message(r"^reconcile \d+/3$"),
    ]);
    assert!(passes(&m, resource.status_func()));
}

// =============================================================================
// F046-F049: Properties
// =============================================================================

proptest! {
    /// F046: Equality is reflexive and its negation fails on the same value.
    #[test]
    fn f046_equal_reflexive(x in any::<i64>(), s in "[a-z]{0,12}") {
        prop_assert!(passes(&be_equal_to(x), x));
        prop_assert!(!passes(&not(be_equal_to(x)), x));
        prop_assert!(passes(&be_equal_to(s.clone()), s.clone()));
        prop_assert!(!passes(&not(be_equal_to(s.clone())), s));
    }

    /// F047: Not(M) passes exactly when M fails.
    #[test]
    fn f047_not_inverts(min in -1000i64..1000, x in -1000i64..1000) {
        let inner = passes(&be_greater_than(min), x);
        let negated = passes(&not(be_greater_than(min)), x);
        prop_assert_ne!(inner, negated);
    }

    /// F048: Between agrees with the integer comparison.
    #[test]
    fn f048_between_agrees(a in -100i64..100, b in -100i64..100, x in -200i64..200) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert_eq!(passes(&be_between(lo, hi), x), lo <= x && x <= hi);
    }
}
