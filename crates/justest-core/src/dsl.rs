//! Fluent entrypoint: `with(t).verify(x).will(m).or_fail()`.
//!
//! Building an [`Assertion`] records its call site on the root handle;
//! exactly one terminal ([`Assertion::or_fail`], [`Assertion::within`] or
//! [`Assertion::for_duration`]) must evaluate it before the root closes.

use std::time::Duration;

use crate::diagnostics::{Location, citation_block};
use crate::error::usage_panic;
use crate::eventual::{self, Probe};
use crate::handle::{Child, T, root_of};
use crate::matcher::Matcher;
use crate::value::Value;

/// Starts an assertion chain on `t`.
pub fn with(t: &dyn T) -> Verifier<'_> {
    Verifier { t }
}

/// First builder stage: holds the handle.
#[must_use = "call verify() to supply actual values"]
pub struct Verifier<'t> {
    t: &'t dyn T,
}

impl<'t> Verifier<'t> {
    /// Supplies a single actual.
    pub fn verify(self, actual: impl Into<Value>) -> Asserter<'t> {
        Asserter {
            t: self.t,
            actuals: vec![actual.into()],
        }
    }

    /// Supplies any number of actuals.
    pub fn verify_all<I, V>(self, actuals: I) -> Asserter<'t>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Asserter {
            t: self.t,
            actuals: actuals.into_iter().map(Into::into).collect(),
        }
    }
}

/// Second builder stage: handle plus actuals.
#[must_use = "call will() to supply a matcher"]
pub struct Asserter<'t> {
    t: &'t dyn T,
    actuals: Vec<Value>,
}

impl<'t> Asserter<'t> {
    /// Attaches the matcher and registers the assertion as pending.
    #[track_caller]
    pub fn will(self, matcher: impl Matcher + 't) -> Assertion<'t> {
        let location = Location::caller();
        if let Some(registry) = root_of(self.t).unevaluated() {
            registry.insert(&location);
        }
        Assertion {
            t: self.t,
            actuals: self.actuals,
            matcher: Box::new(matcher),
            location,
            evaluated: false,
        }
    }
}

/// A fully built assertion awaiting its terminal.
pub struct Assertion<'t> {
    t: &'t dyn T,
    actuals: Vec<Value>,
    matcher: Box<dyn Matcher + 't>,
    location: Location,
    evaluated: bool,
}

impl<'t> Assertion<'t> {
    /// Evaluates once, failing the handle on mismatch.
    pub fn or_fail(&mut self) -> Vec<Value> {
        let child = self.begin();
        self.matcher.apply(&child, self.actuals.clone())
    }

    /// Retries until the matcher passes once or `duration` elapses.
    ///
    /// # Panics
    /// Panics on a zero duration or interval, or an interval above the
    /// duration.
    #[track_caller]
    pub fn within(&mut self, duration: Duration, interval: Duration) -> Vec<Value> {
        let probe = Probe::new(duration, interval);
        let child = self.begin();
        eventual::within(&child, self.matcher.as_ref(), &self.actuals, probe)
    }

    /// Requires the matcher to keep passing for `duration`.
    ///
    /// # Panics
    /// Panics on a zero duration or interval, or an interval above the
    /// duration.
    #[track_caller]
    pub fn for_duration(&mut self, duration: Duration, interval: Duration) -> Vec<Value> {
        let probe = Probe::new(duration, interval);
        let child = self.begin();
        eventual::hold_for(&child, self.matcher.as_ref(), &self.actuals, probe)
    }

    /// Returns where the assertion was built.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Marks the assertion evaluated and builds the handle it runs on.
    fn begin(&mut self) -> Child<'t> {
        if self.evaluated {
            usage_panic("assertion already evaluated");
        }
        self.evaluated = true;
        if let Some(registry) = root_of(self.t).unevaluated() {
            registry.remove(&self.location);
        }
        let caller = Location::nearest_user_frame();
        Child::new(self.t, citation_block(caller.as_ref(), &self.location))
    }
}
