//! Numeric ordering matchers.

use std::cmp::Ordering;

use justest_core::{Matcher, T, Value, numeric_extractor, numeric_ordering};

use crate::resolve;

enum Bound {
    Above(Value),
    Below(Value),
    Between(Value, Value),
}

/// Ordering matcher built by [`be_greater_than`], [`be_less_than`] and
/// [`be_between`].
pub struct Ordered(Bound);

/// Passes when every actual is strictly greater than `min`.
pub fn be_greater_than(min: impl Into<Value>) -> Ordered {
    Ordered(Bound::Above(min.into()))
}

/// Passes when every actual is strictly less than `max`.
pub fn be_less_than(max: impl Into<Value>) -> Ordered {
    Ordered(Bound::Below(max.into()))
}

/// Passes when every actual lies in `[min, max]`.
pub fn be_between(min: impl Into<Value>, max: impl Into<Value>) -> Ordered {
    Ordered(Bound::Between(min.into(), max.into()))
}

impl Ordered {
    fn bounds(&self) -> Vec<&Value> {
        match &self.0 {
            Bound::Above(b) | Bound::Below(b) => vec![b],
            Bound::Between(min, max) => vec![min, max],
        }
    }

    fn check(&self, t: &dyn T, idx: usize, actual: &Value) {
        for bound in self.bounds() {
            if bound.kind() != actual.kind() {
                t.fatal(format!(
                    "Expected actual {idx} to be of kind {} but got {}: {actual:?}",
                    bound.kind(),
                    actual.kind()
                ));
            }
        }
        let Some(cmp) = numeric_ordering(actual.kind()) else {
            t.fatal(format!("Unsupported actual value: {actual:?}"));
        };
        let compare = |bound: &Value| match cmp(actual, bound) {
            Some(ordering) => ordering,
            None => t.fatal(format!("Actual {idx} is not comparable to {bound:?}: {actual:?}")),
        };
        match &self.0 {
            Bound::Above(min) => {
                if compare(min) != Ordering::Greater {
                    t.fatal(format!(
                        "Expected actual {idx} to be greater than {min:?} but got {actual:?}"
                    ));
                }
            }
            Bound::Below(max) => {
                if compare(max) != Ordering::Less {
                    t.fatal(format!(
                        "Expected actual {idx} to be less than {max:?} but got {actual:?}"
                    ));
                }
            }
            Bound::Between(min, max) => {
                if compare(min) == Ordering::Less || compare(max) == Ordering::Greater {
                    t.fatal(format!(
                        "Expected actual {idx} to be between {min:?} and {max:?} but got {actual:?}"
                    ));
                }
            }
        }
    }
}

impl Matcher for Ordered {
    fn apply(&self, t: &dyn T, actuals: Vec<Value>) -> Vec<Value> {
        let resolved = resolve::resolve_all(t, &numeric_extractor(), &actuals);
        for (idx, actual) in resolved.iter().enumerate() {
            self.check(t, idx, actual);
        }
        resolved
    }
}
