//! Eventual matching nested inside another assertion.

use std::time::Duration;

use justest_core::eventual::{self, Probe};
use justest_core::{Matcher, T, Value, config};

/// Matcher built by [`eventually`].
pub struct Eventually<M> {
    inner: M,
    within: Option<Duration>,
    interval: Option<Duration>,
}

/// Retries `inner` until it passes. Window and probing interval default to
/// the configured `default-within` and `default-interval`.
pub const fn eventually<M: Matcher>(inner: M) -> Eventually<M> {
    Eventually {
        inner,
        within: None,
        interval: None,
    }
}

impl<M> Eventually<M> {
    /// Sets the window.
    #[must_use]
    pub const fn within(mut self, duration: Duration) -> Self {
        self.within = Some(duration);
        self
    }

    /// Sets the probing interval.
    #[must_use]
    pub const fn probing_every(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    fn probe(&self) -> Probe {
        let defaults = config();
        Probe::new(
            self.within.unwrap_or(defaults.default_within),
            self.interval.unwrap_or(defaults.default_interval),
        )
    }
}

impl<M: Matcher> Matcher for Eventually<M> {
    fn apply(&self, t: &dyn T, actuals: Vec<Value>) -> Vec<Value> {
        eventual::within(t, &self.inner, &actuals, self.probe())
    }
}
