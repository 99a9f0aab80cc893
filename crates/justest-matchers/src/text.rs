//! Regular-expression matching over text actuals.

use justest_core::{Matcher, T, Value};
use regex::Regex;

use crate::resolve;

/// Matcher built by [`say`].
pub struct Say {
    pattern: Regex,
}

/// Passes when every actual matches `pattern`. Accepts strings, bytes, and
/// pointers to either (such as a [`justest_core::Buffer`]).
///
/// # Panics
/// Panics if `pattern` is not a valid regular expression.
#[track_caller]
#[allow(clippy::panic)]
pub fn say(pattern: &str) -> Say {
    match Regex::new(pattern) {
        Ok(pattern) => Say { pattern },
        Err(e) => panic!("usage error: invalid pattern {pattern:?}: {e}"),
    }
}

/// Like [`say`] with a precompiled expression.
pub const fn say_regex(pattern: Regex) -> Say {
    Say { pattern }
}

impl Matcher for Say {
    fn apply(&self, t: &dyn T, actuals: Vec<Value>) -> Vec<Value> {
        let ve = resolve::textual();
        for (idx, actual) in actuals.iter().enumerate() {
            let resolved = resolve::resolve(t, &ve, idx, actual);
            let Some(text) = resolved.as_text() else {
                t.fatal(format!("Unsupported actual value: {resolved:?}"));
            };
            if !self.pattern.is_match(&text) {
                t.fatal(format!(
                    "Expected actual {idx} to match {:?} but got {text:?}",
                    self.pattern.as_str()
                ));
            }
        }
        actuals
    }
}
