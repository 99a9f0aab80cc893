//! Falsification Tests: Category D - Eventual Assertions (F070-F089)

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::time::{Duration, Instant};

use justest_core::{MockT, Probe, Root, T, Value, with};
use justest_matchers::{
    ConditionExpectation, ConditionStatus, be_equal_to, eventually, have_conditions,
};
use justest_test::{Controller, ConvergingResource, FlappingProbe};

use super::init_tracing;

const SECOND: Duration = Duration::from_secs(1);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// =============================================================================
// F070-F076: Within
// =============================================================================

/// F070: A counter reaches 3 on the third tick, and the trial is logged.
#[test]
fn f070_within_passes_on_third_tick() {
    init_tracing();
    let mock = MockT::new();
    let counter = Arc::new(AtomicI64::new(0));
    let c = Arc::clone(&counter);
    let next = Value::func(move || c.fetch_add(1, Ordering::SeqCst) + 1);
    assert!(mock.run(|t| {
        let out = with(t).verify(next).will(be_equal_to(3)).within(SECOND, ms(100));
        assert_eq!(out, vec![Value::from(3i64)]);
    }));
    assert_eq!(counter.load(Ordering::SeqCst), 3);
    assert!(mock.log_messages().iter().any(|m| m.contains("trial=3")));
}

/// F071: A matcher that never passes fails once, naming the window.
#[test]
fn f071_within_timeout_names_duration() {
    let mock = MockT::new();
    let started = Instant::now();
    assert!(!mock.run(|t| {
        with(t).verify("Pending").will(be_equal_to("Ready")).within(ms(300), ms(50));
    }));
    assert!(started.elapsed() >= ms(300));
    let failures = mock.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("Timed out after 300ms waiting for assertion to pass: "));
    assert!(failures[0].contains("Trials: "));
}

/// F072: A tick slower than the window never finishes once.
#[test]
fn f072_within_tick_never_finished() {
    let mock = MockT::new();
    let slow = Value::func(|| {
        std::thread::sleep(ms(250));
        1
    });
    assert!(!mock.run(|t| {
        with(t).verify(slow).will(be_equal_to(1)).within(ms(100), ms(50));
    }));
    assert!(mock.failures()[0].contains("(tick never finished once)"));
}

/// F073: Ticks never overlap, even when a tick outruns the interval.
#[test]
fn f073_ticks_do_not_overlap() {
    let mock = MockT::new();
    let in_flight = Arc::new(AtomicU32::new(0));
    let overlapped = Arc::new(AtomicU32::new(0));
    let (f, o) = (Arc::clone(&in_flight), Arc::clone(&overlapped));
    let slow = Value::func(move || {
        if f.fetch_add(1, Ordering::SeqCst) > 0 {
            o.fetch_add(1, Ordering::SeqCst);
        }
        std::thread::sleep(ms(60));
        f.fetch_sub(1, Ordering::SeqCst);
        "Pending"
    });
    assert!(!mock.run(|t| {
        with(t).verify(slow).will(be_equal_to("Ready")).within(ms(300), ms(10));
    }));
    assert_eq!(overlapped.load(Ordering::SeqCst), 0);
}

/// F074: Cleanups registered inside a tick run before the next tick.
#[test]
fn f074_tick_cleanups_run_between_ticks() {
    let mock = MockT::new();
    let open = Arc::new(AtomicI64::new(0));
    let max_open = Arc::new(AtomicI64::new(0));
    let (o, m) = (Arc::clone(&open), Arc::clone(&max_open));
    let port_forward = move |t: &dyn T, _: Vec<Value>| -> Vec<Value> {
        let now = o.fetch_add(1, Ordering::SeqCst) + 1;
        m.fetch_max(now, Ordering::SeqCst);
        let o = Arc::clone(&o);
        t.cleanup(Box::new(move || {
            o.fetch_sub(1, Ordering::SeqCst);
        }));
        t.fatal("not yet".into())
    };
    assert!(!mock.run(|t| {
        with(t).verify(1).will(port_forward).within(ms(200), ms(20));
    }));
    assert_eq!(max_open.load(Ordering::SeqCst), 1);
    assert_eq!(open.load(Ordering::SeqCst), 0);
}

/// F075: A reconciled resource becomes Ready while a controller runs.
#[test]
fn f075_within_converging_resource() {
    init_tracing();
    let root = Root::named("f075");
    let resource = ConvergingResource::new("preview-env", 3);
    resource.inject_conflicts(1);
    let _controller = Controller::spawn(resource.clone(), ms(20)).unwrap();
    with(&root)
        .verify(resource.status_func())
        .will(have_conditions(vec![
            ConditionExpectation::new("Ready")
                .status(ConditionStatus::True)
                .reason("Synced"),
        ]))
        .within(2 * SECOND, ms(25));
    assert!(resource.reconciles() >= 3);
}

/// F076: An expired test deadline cancels the assertion with its reason.
#[test]
#[should_panic(expected = "Context canceled after")]
fn f076_within_honors_test_deadline() {
    let root = Root::named("f076").with_deadline(Instant::now() - ms(1));
    with(&root).verify(1).will(be_equal_to(2)).within(SECOND, ms(100));
}

// =============================================================================
// F080-F084: For
// =============================================================================

/// F080: A stable probe holds for the whole window.
#[test]
fn f080_for_holds() {
    let mock = MockT::new();
    let probe = FlappingProbe::new(1, 0);
    assert!(mock.run(|t| {
        let out = with(t)
            .verify(probe.as_func())
            .will(be_equal_to("healthy"))
            .for_duration(ms(200), ms(40));
        assert_eq!(out, vec![Value::from("healthy")]);
    }));
    assert!(probe.checks() >= 3);
    assert!(mock.log_messages()[0].starts_with("Assertion held for 200ms"));
}

/// F081: A failure after a pass fails within one interval of it.
#[test]
fn f081_for_fails_fast_after_pass() {
    let interval = ms(100);
    let probe = FlappingProbe::degrading(2);
    let failed_at = Arc::new(parking_lot::Mutex::new(None::<Instant>));
    let status = {
        let (probe, failed_at) = (probe.clone(), Arc::clone(&failed_at));
        Value::func(move || {
            let healthy = probe.check();
            let mut first_failure = failed_at.lock();
            if !healthy && first_failure.is_none() {
                *first_failure = Some(Instant::now());
            }
            if healthy { "healthy" } else { "degraded" }
        })
    };

    let mock = MockT::new();
    assert!(!mock.run(|t| {
        with(t)
            .verify(status.clone())
            .will(be_equal_to("healthy"))
            .for_duration(5 * SECOND, interval);
    }));
    let returned_at = Instant::now();

    let failed_at = failed_at.lock().expect("third check ran");
    assert!(
        returned_at - failed_at < interval,
        "failed {:?} after the failing check",
        returned_at - failed_at
    );
    assert_eq!(probe.checks(), 3);
    let failure = &mock.failures()[0];
    assert!(failure.starts_with("Assertion failed after "));
    assert!(failure.contains("and did not pass repeatedly for 5s"));
}

/// F082: For never passing times out like Within.
#[test]
fn f082_for_never_passing_times_out() {
    let mock = MockT::new();
    assert!(!mock.run(|t| {
        with(t).verify(1).will(be_equal_to(2)).for_duration(ms(150), ms(50));
    }));
    assert!(mock.failures()[0].starts_with("Timed out after 150ms waiting for assertion to pass"));
}

// =============================================================================
// F085-F089: Usage and nesting
// =============================================================================

/// F085: An interval above the duration is a usage error.
#[test]
#[should_panic(expected = "exceeds duration")]
fn f085_interval_above_duration_panics() {
    let _ = Probe::new(ms(100), ms(200));
}

/// F086: An interval equal to the duration is accepted.
#[test]
fn f086_interval_equal_duration_accepted() {
    let probe = Probe::new(ms(100), ms(100));
    assert_eq!(probe.interval, probe.duration);
}

/// F087: A zero window is a usage error at the terminal.
#[test]
#[should_panic(expected = "eventual duration must be positive")]
fn f087_zero_duration_panics() {
    let mock = MockT::new();
    with(&mock)
        .verify(1)
        .will(be_equal_to(1))
        .within(Duration::ZERO, ms(1));
}

/// F088: Eventually nests inside a one-shot assertion.
#[test]
fn f088_nested_eventually() {
    let mock = MockT::new();
    let resource = ConvergingResource::new("nested", 2);
    let r = resource.clone();
    let reconcile_and_read = Value::func(move || {
        let _ = r.reconcile();
        r.ready_reason()
    });
    assert!(mock.run(|t| {
        with(t)
            .verify(reconcile_and_read)
            .will(eventually(be_equal_to("Synced")).within(SECOND).probing_every(ms(20)))
            .or_fail();
    }));
}

/// F089: An unexpected panic in a tick surfaces with the trial number.
#[test]
#[should_panic(expected = "Unexpected panic in assertion tick 1: index out of range")]
fn f089_unexpected_panic_propagates() {
    let mock = MockT::new();
    let exploding = |_: &dyn T, _: Vec<Value>| -> Vec<Value> { panic!("index out of range") };
    mock.run(|t| {
        with(t).verify(1).will(exploding).within(SECOND, ms(50));
    });
}
