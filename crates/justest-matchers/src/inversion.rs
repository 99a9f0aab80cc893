//! Negation of a matcher.

use std::panic::resume_unwind;

use justest_core::handle::fatal::Caught;
use justest_core::{Inverse, Matcher, T, Value};

/// Matcher built by [`not`].
pub struct Not<M> {
    inner: M,
}

/// Passes when `inner` fails and fails when it passes. Panics other than the
/// inner matcher's failure propagate.
pub const fn not<M: Matcher>(inner: M) -> Not<M> {
    Not { inner }
}

impl<M: Matcher> Matcher for Not<M> {
    fn apply(&self, t: &dyn T, actuals: Vec<Value>) -> Vec<Value> {
        let inverse = Inverse::new(t);
        match inverse.capture(|it| self.inner.apply(it, actuals.clone())) {
            Caught::Fatal => {
                tracing::trace!(
                    absorbed = ?inverse.captured(),
                    "inner matcher failed as expected"
                );
                actuals
            }
            Caught::Returned(_) => t.fatal(format!(
                "Expected matcher to fail, but it passed for {actuals:?}"
            )),
            Caught::Panicked(payload) => resume_unwind(payload),
        }
    }
}
