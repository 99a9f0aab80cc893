//! Falsification Tests: Category C - Value Resolution (F050-F069)

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use justest_core::{
    Channel, ChannelExtractor, FuncExtractor, Kind, MockT, PointerExtractor, T, Value,
    ValueExtractor, extract_same_value, extractor_unsupported, numeric_extractor,
};
use proptest::prelude::*;

fn resolving(recurse: bool) -> ValueExtractor {
    ValueExtractor::new(extract_same_value)
        .with(Kind::Chan, ChannelExtractor::new(recurse))
        .with(Kind::Pointer, PointerExtractor::new(recurse))
        .with(Kind::Func, FuncExtractor::new(recurse))
}

/// F050: A buffered channel yields its value without recursion.
#[test]
fn f050_channel_without_recursion() {
    let mock = MockT::new();
    let (tx, ch) = Channel::bounded(1);
    tx.send(Value::pointer(7)).unwrap();
    let out = resolving(false).extract(&mock, &Value::from(ch));
    assert_eq!(out, Some(Value::pointer(7)));
}

/// F051: With recursion the received value is resolved again.
#[test]
fn f051_channel_with_recursion() {
    let mock = MockT::new();
    let (tx, ch) = Channel::bounded(1);
    tx.send(Value::pointer(7)).unwrap();
    let out = resolving(true).extract(&mock, &Value::from(ch));
    assert_eq!(out, Some(Value::from(7)));
}

/// F052: Empty and closed channels both resolve to not-found.
#[test]
fn f052_empty_and_closed_channels() {
    let mock = MockT::new();
    let ve = resolving(true);
    let (tx, ch) = Channel::bounded(1);
    assert_eq!(ve.extract(&mock, &Value::from(ch.clone())), None);
    drop(tx);
    assert!(ch.is_closed());
    assert_eq!(ve.extract(&mock, &Value::from(ch)), None);
}

/// F053: Nil and typed nulls resolve to themselves whatever the map says.
#[test]
fn f053_nil_is_fixed() {
    let mock = MockT::new();
    let ve = ValueExtractor::new(extractor_unsupported);
    assert!(mock.run(|t| {
        assert_eq!(ve.extract(t, &Value::Nil), Some(Value::Nil));
        assert_eq!(
            ve.extract(t, &Value::null(Kind::Pointer)),
            Some(Value::null(Kind::Pointer))
        );
    }));
}

/// F054: Unsupported kinds fail with the value echoed.
#[test]
fn f054_unsupported_value() {
    let mock = MockT::new();
    assert!(!mock.run(|t| {
        numeric_extractor().extract(t, &Value::from("12"));
    }));
    assert_eq!(mock.failures(), vec![r#"Unsupported actual value: "12""#]);
}

/// F055: A function taking the handle receives it and is called once per
/// extraction.
#[test]
fn f055_function_receives_handle() {
    let mock = MockT::named("f055");
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let probe = Value::func(move |t: &dyn T| {
        counter.fetch_add(1, Ordering::SeqCst);
        t.name()
    });
    let ve = resolving(true);
    assert_eq!(ve.extract(&mock, &probe), Some(Value::from("f055")));
    assert_eq!(ve.extract(&mock, &probe), Some(Value::from("f055")));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// F056: A function error fails the handle.
#[test]
fn f056_function_error_fails() {
    let mock = MockT::new();
    let probe = Value::func(|| -> Result<(), String> { Err("connection refused".into()) });
    assert!(!mock.run(|t| {
        resolving(true).extract(t, &probe);
    }));
    assert_eq!(mock.failures(), vec!["Function failed: connection refused"]);
}

/// F057: A function returning nothing resolves to not-found, while a
/// function returning only an error resolves to nil on success.
#[test]
fn f057_unit_function_is_not_found() {
    let mock = MockT::new();
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let probe = Value::func(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(resolving(true).extract(&mock, &probe), None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let fallible = Value::func(|| -> Result<(), String> { Ok(()) });
    assert_eq!(resolving(true).extract(&mock, &fallible), Some(Value::Nil));
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<u32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
    ]
}

fn nested() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 8, 1, |inner| inner.prop_map(|v| Value::pointer(v)))
}

proptest! {
    /// F060: Without recursion, extraction of a plain value is idempotent.
    #[test]
    fn f060_extract_idempotent(v in scalar()) {
        let mock = MockT::new();
        let ve = resolving(false);
        let once = ve.extract(&mock, &v).unwrap();
        let twice = ve.extract(&mock, &once).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// F061: With recursion, nested pointers reach a fixed point.
    #[test]
    fn f061_recursion_reaches_fixed_point(v in nested()) {
        let mock = MockT::new();
        let ve = resolving(true);
        let resolved = ve.extract(&mock, &v).unwrap();
        prop_assert_ne!(resolved.kind(), Kind::Pointer);
        prop_assert_eq!(ve.extract(&mock, &resolved).unwrap(), resolved);
    }

    /// F062: A channel hands out buffered values in order, then not-found.
    #[test]
    fn f062_channel_drains_in_order(items in proptest::collection::vec(any::<i32>(), 1..8)) {
        let mock = MockT::new();
        let (tx, ch) = Channel::bounded(items.len());
        for i in &items {
            tx.send(*i).unwrap();
        }
        let ve = resolving(false);
        let actual = Value::from(ch);
        for i in &items {
            prop_assert_eq!(ve.extract(&mock, &actual), Some(Value::from(*i)));
        }
        prop_assert_eq!(ve.extract(&mock, &actual), None);
    }
}
