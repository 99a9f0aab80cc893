//! The matcher contract.

use crate::handle::T;
use crate::value::Value;

/// A predicate with side effects over actuals.
///
/// On mismatch a matcher calls [`T::fatal`] on the handle it was given. On
/// success it returns the (possibly transformed) actuals so matchers compose.
pub trait Matcher: Send + Sync {
    /// Applies the matcher.
    fn apply(&self, t: &dyn T, actuals: Vec<Value>) -> Vec<Value>;
}

impl<F> Matcher for F
where
    F: Fn(&dyn T, Vec<Value>) -> Vec<Value> + Send + Sync,
{
    fn apply(&self, t: &dyn T, actuals: Vec<Value>) -> Vec<Value> {
        self(t, actuals)
    }
}
