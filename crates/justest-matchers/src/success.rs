//! Matchers over a trailing error actual.
//!
//! Functions under test commonly return `(value, error)`. [`succeed`]
//! requires the trailing error to be absent; [`fail`] requires it present.
//! A trailing function actual is invoked first, and its `Err` counts as the
//! error.

use justest_core::{Matcher, T, Value};

/// Matcher built by [`succeed`].
pub struct Succeed;

/// Matcher built by [`fail`].
pub struct Fail;

/// Passes when the last actual is absent, nil, or not an error. A trailing
/// nil is stripped from the returned actuals.
pub const fn succeed() -> Succeed {
    Succeed
}

/// Passes when the last actual is a non-nil error, which is consumed from
/// the returned actuals.
pub const fn fail() -> Fail {
    Fail
}

fn call_trailing(t: &dyn T, actuals: &mut [Value]) {
    if let Some(last) = actuals.last_mut() {
        if let Value::Func(f) = last {
            *last = match f.call(t) {
                Ok(v) => v,
                Err(e) => Value::error_msg(e.to_string()),
            };
        }
    }
}

impl Matcher for Succeed {
    fn apply(&self, t: &dyn T, mut actuals: Vec<Value>) -> Vec<Value> {
        call_trailing(t, &mut actuals);
        match actuals.last() {
            Some(Value::Error(e)) => t.fatal(format!(
                "Expected last actual value to be nil or a non-error value, not a non-nil error: {e}"
            )),
            Some(v) if v.is_nil() => {
                actuals.pop();
            }
            _ => {}
        }
        actuals
    }
}

impl Matcher for Fail {
    fn apply(&self, t: &dyn T, mut actuals: Vec<Value>) -> Vec<Value> {
        call_trailing(t, &mut actuals);
        match actuals.last() {
            Some(Value::Error(_)) => {
                actuals.pop();
                actuals
            }
            Some(v) => t.fatal(format!(
                "Expected last actual value to be a non-nil error, but got {v:?}"
            )),
            None => t.fatal("Expected last actual value to be a non-nil error, but got no actuals".into()),
        }
    }
}
