//! Deep equality with a pluggable oracle.

use std::sync::Arc;

use justest_core::{Matcher, T, Value};
use similar::TextDiff;

use crate::resolve;

/// Equality oracle: `Err` carries the explanation shown on mismatch.
pub type Comparator = Arc<dyn Fn(&Value, &Value) -> Result<(), String> + Send + Sync>;

/// Matcher comparing every actual to one expected value.
pub struct EqualTo {
    expected: Value,
    comparator: Comparator,
}

/// Passes when each actual deeply equals `expected`. Mismatches are reported
/// as a unified diff.
pub fn be_equal_to(expected: impl Into<Value>) -> EqualTo {
    EqualTo {
        expected: expected.into(),
        comparator: Arc::new(diff_comparator),
    }
}

/// Alias of [`be_equal_to`].
pub fn equal_to(expected: impl Into<Value>) -> EqualTo {
    be_equal_to(expected)
}

impl EqualTo {
    /// Replaces the equality oracle.
    #[must_use]
    pub fn using(
        mut self,
        comparator: impl Fn(&Value, &Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.comparator = Arc::new(comparator);
        self
    }
}

impl Matcher for EqualTo {
    fn apply(&self, t: &dyn T, actuals: Vec<Value>) -> Vec<Value> {
        let resolved = resolve::resolve_all(t, &resolve::standard(), &actuals);
        for actual in &resolved {
            if let Err(explanation) = (self.comparator)(&self.expected, actual) {
                t.fatal(explanation);
            }
        }
        resolved
    }
}

/// Default oracle: structural equality, explained with a unified diff.
pub fn diff_comparator(expected: &Value, actual: &Value) -> Result<(), String> {
    if expected == actual {
        return Ok(());
    }
    Err(format!(
        "Unexpected difference (\"-\" lines are expected values; \"+\" lines are actual values):\n{}",
        unified_diff(expected, actual)
    ))
}

fn unified_diff(expected: &Value, actual: &Value) -> String {
    let expected = format!("{expected:#?}\n");
    let actual = format!("{actual:#?}\n");
    TextDiff::from_lines(&expected, &actual)
        .unified_diff()
        .context_radius(3)
        .header("expected", "actual")
        .to_string()
}
