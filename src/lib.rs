//! Justest: fluent assertions with eventual-consistency probing.
//!
//! Built for tests of reconcilers that converge over time: assert once with
//! `or_fail`, until the first pass with `within`, or continuously with
//! `for_duration`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use justest::prelude::*;
//! use std::time::Duration;
//!
//! let t = Root::new();
//! with(&t).verify(1).will(be_equal_to(1)).or_fail();
//! with(&t)
//!     .verify(Value::func(|| "Ready"))
//!     .will(be_equal_to("Ready"))
//!     .within(Duration::from_secs(5), Duration::from_millis(100));
//! ```

pub use justest_core as core;
pub use justest_matchers as matchers;

/// Prelude module for common imports.
pub mod prelude {
    pub use justest_core::{
        Buffer, Channel, Config, Matcher, MockT, Root, T, Value, configure, get_helper, root_of,
        with,
    };
    pub use justest_matchers::{
        ConditionExpectation, ConditionStatus, be_between, be_empty, be_equal_to,
        be_greater_than, be_less_than, be_nil, eventually, fail, have_conditions, not, say,
        succeed,
    };
}

/// Installs a `tracing` subscriber that writes harness logs through the test
/// writer. Filtered by `RUST_LOG`, defaulting to `justest_core=info`.
pub fn init_test_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("justest_core=info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init()
        .is_err()
    {
        tracing::trace!("tracing subscriber already installed");
    }
}
