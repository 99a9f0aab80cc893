//! Nil and emptiness matchers.

use justest_core::{
    FuncExtractor, JustestError, Kind, Matcher, T, Value, ValueExtractor, extractor_value_len,
};

use crate::resolve;

/// Matcher built by [`be_nil`].
pub struct BeNil;

/// Passes when every actual is nil or a typed null. Channels and functions
/// are resolved first; pointers are not dereferenced, so a pointer to nil is
/// not nil.
pub const fn be_nil() -> BeNil {
    BeNil
}

impl Matcher for BeNil {
    fn apply(&self, t: &dyn T, actuals: Vec<Value>) -> Vec<Value> {
        let ve = resolve::standard();
        for (idx, actual) in actuals.iter().enumerate() {
            let resolved = resolve::resolve(t, &ve, idx, actual);
            if !resolved.is_nil() {
                t.fatal(format!("Expected actual {idx} to be nil but got {resolved:?}"));
            }
        }
        actuals
    }
}

/// Matcher built by [`be_empty`].
pub struct BeEmpty;

/// Passes when every actual has length zero: text, bytes, arrays, slices,
/// maps, buffered channel content, or pointers to any of those.
pub const fn be_empty() -> BeEmpty {
    BeEmpty
}

fn length_extractor() -> ValueExtractor {
    ValueExtractor::new(extractor_value_len).with(Kind::Func, FuncExtractor::new(true))
}

fn unsupported(t: &dyn T, v: &Value) -> ! {
    t.fatal(JustestError::extract(format!("{v:?}")).to_string())
}

impl Matcher for BeEmpty {
    fn apply(&self, t: &dyn T, actuals: Vec<Value>) -> Vec<Value> {
        let ve = length_extractor();
        for (idx, actual) in actuals.iter().enumerate() {
            let resolved = resolve::resolve(t, &ve, idx, actual);
            let len = match &resolved {
                Value::Uint(n) => *n as usize,
                Value::Null(_) => resolved.len().unwrap_or_else(|| unsupported(t, &resolved)),
                _ => unsupported(t, &resolved),
            };
            if len != 0 {
                t.fatal(format!(
                    "Expected actual {idx} to be empty but it has length {len}: {actual:?}"
                ));
            }
        }
        actuals
    }
}
