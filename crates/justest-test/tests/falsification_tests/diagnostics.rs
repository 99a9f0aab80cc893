//! Falsification Tests: Category E - Diagnostics (F090-F099)

use std::time::Duration;

use justest_core::config::{Config, DarkMode, InterruptSignal};
use justest_core::diagnostics::{
    InterruptFlag, Location, Theme, UNEVALUATED_HEADER, UnevaluatedRegistry,
    assert_not_interrupted_by,
};
use justest_core::{MockT, Root, with};
use justest_matchers::be_equal_to;

/// F090: A never-terminated assertion fails the test when the root closes.
#[test]
#[should_panic(expected = "There were unevaluated test statements")]
fn f090_unevaluated_fails_root() {
    let root = Root::named("f090");
    let _pending = with(&root).verify(1).will(be_equal_to(1));
}

/// F091: The report carries a colorized snippet of the offending line.
#[test]
fn f091_unevaluated_snippet_is_colorized() {
    let registry = UnevaluatedRegistry::new();
    let location = Location::new("f091", file!(), line!());
    registry.insert(&location);
    let report = registry.drain_report(Some(Theme::Dark)).unwrap();
    assert!(report.starts_with(UNEVALUATED_HEADER));
    assert!(report.contains("\x1b["));
    assert!(report.contains("diagnostics.rs"));
    assert!(registry.is_empty());
}

/// F092: The same statement left pending twice is reported once with a count.
#[test]
fn f092_repeated_statement_counted() {
    let mock = MockT::new();
    for _ in 0..2 {
        let _pending = with(&mock).verify(1).will(be_equal_to(1));
    }
    mock.close();
    let failures = mock.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with(UNEVALUATED_HEADER));
    assert!(failures[0].contains("(2 times)"));
}

/// F093: An evaluated assertion leaves nothing to report.
#[test]
fn f093_evaluated_assertion_not_reported() {
    let mock = MockT::new();
    assert!(mock.run(|t| {
        with(t).verify(1).will(be_equal_to(1)).or_fail();
    }));
    mock.close();
    assert!(mock.failures().is_empty());
}

/// F094: A raised interrupt fails the next check with the signal name.
#[test]
fn f094_interrupt_fails_with_signal() {
    let flag = InterruptFlag::new();
    let mock = MockT::new();
    assert!(mock.run(|t| assert_not_interrupted_by(t, &flag)));
    assert!(flag.raise(InterruptSignal::Int));
    assert!(!flag.raise(InterruptSignal::Term));
    assert!(!mock.run(|t| assert_not_interrupted_by(t, &flag)));
    assert_eq!(mock.failures(), vec!["Process canceled via signal SIGINT"]);
}

/// F095: The call site is echoed from source.
#[test]
fn f095_location_echoes_source() {
    let location = Location::new("f095", file!(), line!());
    let citation = location.citation();
    assert!(citation.contains("diagnostics.rs:"));
    assert!(citation.contains("Location::new(\"f095\""));
}

/// F096: Configuration parses from TOML with defaults filled in.
#[test]
fn f096_config_from_toml() -> anyhow::Result<()> {
    let config = Config::from_toml_str(
        r#"
        dark-mode = "force-dark"
        interrupt-signals = ["SIGINT", "SIGTERM"]
        stack-trace-skip-prefixes = ["my_suite::helpers::"]
        default-within = "30s"
        "#,
    )?;
    assert_eq!(config.dark_mode, DarkMode::ForceDark);
    assert_eq!(
        config.interrupt_signals,
        vec![InterruptSignal::Int, InterruptSignal::Term]
    );
    assert_eq!(config.default_within, Duration::from_secs(30));
    assert!(config.default_interval <= config.default_within);
    Ok(())
}

/// F097: An interval above the window is rejected at load.
#[test]
fn f097_config_rejects_inverted_timing() {
    let err = Config::from_toml_str(
        r#"
        default-within = "1s"
        default-interval = "2s"
        "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("default-interval cannot exceed default-within"));
}
