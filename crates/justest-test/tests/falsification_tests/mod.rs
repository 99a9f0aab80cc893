//! Falsification tests grouped by concern.
//!
//! - `dsl`: F001-F019, assertion chains and handle lifecycle
//! - `matchers`: F020-F049, built-in matcher boundaries
//! - `extract`: F050-F069, value resolution
//! - `eventual`: F070-F089, `within` and `for_duration`
//! - `diagnostics`: F090-F099, citations, unevaluated report, interrupts

// Allow test-specific patterns that are denied in production code
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod diagnostics;
mod dsl;
mod eventual;
mod extract;
mod matchers;

/// Routes harness logs to the test writer so `--nocapture` shows them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("justest_core=debug")),
        )
        .with_test_writer()
        .try_init();
}
