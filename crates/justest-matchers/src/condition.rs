//! Status conditions in the shape reconcilers publish them, and a matcher
//! that checks a resource's conditions against expectations.

use std::fmt;

use justest_core::{Matcher, T, Value};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::resolve;

/// Condition status following the Kubernetes convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionStatus {
    /// Condition holds.
    True,
    /// Condition does not hold.
    False,
    /// Not yet determined.
    #[default]
    Unknown,
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One entry of a resource's `status.conditions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition (e.g., Ready, Finalized)
    #[serde(rename = "type")]
    pub type_: String,

    /// Status of the condition
    #[serde(default)]
    pub status: ConditionStatus,

    /// Machine-readable reason
    #[serde(default)]
    pub reason: String,

    /// Human-readable message
    #[serde(default)]
    pub message: String,

    /// Last transition timestamp as published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

impl Condition {
    /// Creates a condition without a transition time.
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: None,
        }
    }
}

/// What a condition of a given type is expected to look like. Unset fields
/// are not checked.
#[derive(Debug, Clone)]
pub struct ConditionExpectation {
    type_: String,
    status: Option<ConditionStatus>,
    reason: Option<Regex>,
    message: Option<Regex>,
}

impl ConditionExpectation {
    /// Expects a condition of type `type_` to be present.
    pub fn new(type_: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            status: None,
            reason: None,
            message: None,
        }
    }

    /// Requires a status.
    #[must_use]
    pub const fn status(mut self, status: ConditionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Requires the reason to match `pattern`.
    ///
    /// # Panics
    /// Panics if `pattern` is not a valid regular expression.
    #[must_use]
    #[track_caller]
    pub fn reason(mut self, pattern: &str) -> Self {
        self.reason = Some(compile(pattern));
        self
    }

    /// Requires the message to match `pattern`.
    ///
    /// # Panics
    /// Panics if `pattern` is not a valid regular expression.
    #[must_use]
    #[track_caller]
    pub fn message(mut self, pattern: &str) -> Self {
        self.message = Some(compile(pattern));
        self
    }

    /// The expected condition type.
    pub fn type_(&self) -> &str {
        &self.type_
    }
}

#[track_caller]
#[allow(clippy::panic)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("usage error: invalid pattern {pattern:?}: {e}"))
}

/// Checks `actual` against `expected`. Either both are absent or both are
/// present and every field the expectation sets agrees.
pub fn condition_equivalent(
    expected: Option<&ConditionExpectation>,
    actual: Option<&Condition>,
) -> Result<(), String> {
    let (expected, actual) = match (expected, actual) {
        (None, None) => return Ok(()),
        (Some(e), None) => return Err(format!("expected condition {:?} is missing", e.type_)),
        (None, Some(a)) => return Err(format!("unexpected condition {:?}", a.type_)),
        (Some(e), Some(a)) => (e, a),
    };
    if let Some(status) = expected.status {
        if status != actual.status {
            return Err(format!(
                "condition {:?} has status {} instead of {status}",
                actual.type_, actual.status
            ));
        }
    }
    if let Some(re) = &expected.reason {
        if !re.is_match(&actual.reason) {
            return Err(format!(
                "condition {:?} has reason {:?} which does not match {:?}",
                actual.type_,
                actual.reason,
                re.as_str()
            ));
        }
    }
    if let Some(re) = &expected.message {
        if !re.is_match(&actual.message) {
            return Err(format!(
                "condition {:?} has message {:?} which does not match {:?}",
                actual.type_,
                actual.message,
                re.as_str()
            ));
        }
    }
    Ok(())
}

/// Why an actual could not be read as a list of conditions.
#[derive(Debug, thiserror::Error)]
pub enum ConditionParseError {
    /// The value has no JSON form.
    #[error(transparent)]
    Value(#[from] justest_core::JustestError),

    /// The JSON does not have the condition shape.
    #[error("malformed conditions: {0}")]
    Shape(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConditionsDoc {
    List(Vec<Condition>),
    Holder { conditions: Vec<Condition> },
}

/// Reads `value` as either a list of conditions or an object carrying a
/// `conditions` field.
pub fn parse_conditions(value: &Value) -> Result<Vec<Condition>, ConditionParseError> {
    let json = value.to_json()?;
    Ok(match serde_json::from_value::<ConditionsDoc>(json)? {
        ConditionsDoc::List(list) | ConditionsDoc::Holder { conditions: list } => list,
    })
}

/// Matcher built by [`have_conditions`].
pub struct HaveConditions {
    expected: Vec<ConditionExpectation>,
}

/// Passes when, for every expectation, the actual carries a condition of
/// that type satisfying it.
pub const fn have_conditions(expected: Vec<ConditionExpectation>) -> HaveConditions {
    HaveConditions { expected }
}

impl Matcher for HaveConditions {
    fn apply(&self, t: &dyn T, actuals: Vec<Value>) -> Vec<Value> {
        let ve = resolve::standard();
        for (idx, actual) in actuals.iter().enumerate() {
            let resolved = resolve::resolve(t, &ve, idx, actual);
            let conditions = match parse_conditions(&resolved) {
                Ok(c) => c,
                Err(e) => t.fatal(format!("Actual {idx} is not a list of conditions: {e}")),
            };
            for expectation in &self.expected {
                let found = conditions.iter().find(|c| c.type_ == expectation.type_);
                if let Err(e) = condition_equivalent(Some(expectation), found) {
                    t.fatal(format!("Unexpected conditions in actual {idx}: {e}"));
                }
            }
        }
        actuals
    }
}
