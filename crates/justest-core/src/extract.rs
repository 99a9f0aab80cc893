//! Kind-dispatched resolution of actual values.
//!
//! A [`ValueExtractor`] maps each [`Kind`] to an [`Extractor`]. Lookups that
//! miss fall back to the [`Kind::Invalid`] slot. An extractor returns
//! `Some(value)` when the actual resolved and `None` when it is not available
//! yet (an empty channel, say), which only matters to eventual assertions.
//! Resolution failures go through [`T::fatal`].

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::JustestError;
use crate::handle::T;
use crate::value::{Kind, Value};

/// Resolves one kind of actual.
pub trait Extractor: Send + Sync {
    /// Resolves `v`. `ve` is the dispatching extractor, used for recursion.
    fn extract(&self, ve: &ValueExtractor, t: &dyn T, v: &Value) -> Option<Value>;
}

impl<F> Extractor for F
where
    F: Fn(&ValueExtractor, &dyn T, &Value) -> Option<Value> + Send + Sync,
{
    fn extract(&self, ve: &ValueExtractor, t: &dyn T, v: &Value) -> Option<Value> {
        self(ve, t, v)
    }
}

/// Kind-keyed extractor map.
#[derive(Clone)]
pub struct ValueExtractor {
    extractors: HashMap<Kind, Arc<dyn Extractor>>,
}

impl ValueExtractor {
    /// Creates a map whose default slot holds `default`.
    pub fn new(default: impl Extractor + 'static) -> Self {
        let mut extractors: HashMap<Kind, Arc<dyn Extractor>> = HashMap::new();
        extractors.insert(Kind::Invalid, Arc::new(default));
        Self { extractors }
    }

    /// Registers `extractor` for `kind`, replacing any previous entry.
    #[must_use]
    pub fn with(mut self, kind: Kind, extractor: impl Extractor + 'static) -> Self {
        self.insert(kind, extractor);
        self
    }

    /// Registers `extractor` for `kind` in place.
    pub fn insert(&mut self, kind: Kind, extractor: impl Extractor + 'static) {
        self.extractors.insert(kind, Arc::new(extractor));
    }

    /// Returns true if `kind` has a dedicated entry.
    #[must_use]
    pub fn handles(&self, kind: Kind) -> bool {
        kind != Kind::Invalid && self.extractors.contains_key(&kind)
    }

    /// Resolves `v`. Nil and typed nulls always resolve to themselves.
    pub fn extract(&self, t: &dyn T, v: &Value) -> Option<Value> {
        if v.is_nil() {
            return Some(v.clone());
        }
        let extractor = self
            .extractors
            .get(&v.kind())
            .or_else(|| self.extractors.get(&Kind::Invalid));
        match extractor {
            Some(extractor) => extractor.extract(self, t, v),
            None => extractor_unsupported(self, t, v),
        }
    }
}

/// Resolves the value to itself.
pub fn extract_same_value(_: &ValueExtractor, _: &dyn T, v: &Value) -> Option<Value> {
    Some(v.clone())
}

/// Fails with `Unsupported actual value: V`.
pub fn extractor_unsupported(_: &ValueExtractor, t: &dyn T, v: &Value) -> Option<Value> {
    t.fatal(JustestError::extract(format!("{v:?}")).to_string())
}

/// Resolves to the value's length. Pointers to measurable values are
/// dereferenced first.
pub fn extractor_value_len(ve: &ValueExtractor, t: &dyn T, v: &Value) -> Option<Value> {
    match v {
        Value::Pointer(p) => extractor_value_len(ve, t, &p.load()),
        other => match other.len() {
            Some(n) => Some(Value::from(n)),
            None => extractor_unsupported(ve, t, other),
        },
    }
}

/// Non-blocking receive from a channel actual.
#[derive(Debug, Clone, Copy)]
pub struct ChannelExtractor {
    recurse: bool,
}

impl ChannelExtractor {
    /// With `recurse`, the received value is resolved again.
    #[must_use]
    pub const fn new(recurse: bool) -> Self {
        Self { recurse }
    }
}

impl Extractor for ChannelExtractor {
    fn extract(&self, ve: &ValueExtractor, t: &dyn T, v: &Value) -> Option<Value> {
        let Value::Chan(ch) = v else {
            return extractor_unsupported(ve, t, v);
        };
        let received = ch.try_recv()?;
        if self.recurse {
            ve.extract(t, &received)
        } else {
            Some(received)
        }
    }
}

/// Dereferences a pointer actual.
#[derive(Debug, Clone, Copy)]
pub struct PointerExtractor {
    recurse: bool,
}

impl PointerExtractor {
    /// With `recurse`, the pointee is resolved again.
    #[must_use]
    pub const fn new(recurse: bool) -> Self {
        Self { recurse }
    }
}

impl Extractor for PointerExtractor {
    fn extract(&self, ve: &ValueExtractor, t: &dyn T, v: &Value) -> Option<Value> {
        let Value::Pointer(p) = v else {
            return extractor_unsupported(ve, t, v);
        };
        let pointee = p.load();
        if self.recurse {
            ve.extract(t, &pointee)
        } else {
            Some(pointee)
        }
    }
}

/// Invokes a function actual and resolves to its return value. A closure
/// returning `()` is still invoked but resolves to not-found.
#[derive(Debug, Clone, Copy)]
pub struct FuncExtractor {
    recurse: bool,
}

impl FuncExtractor {
    /// With `recurse`, the return value is resolved again.
    #[must_use]
    pub const fn new(recurse: bool) -> Self {
        Self { recurse }
    }
}

impl Extractor for FuncExtractor {
    fn extract(&self, ve: &ValueExtractor, t: &dyn T, v: &Value) -> Option<Value> {
        let Value::Func(f) = v else {
            return extractor_unsupported(ve, t, v);
        };
        match f.call(t) {
            Ok(_) if !f.yields_value() => None,
            Ok(returned) if self.recurse => ve.extract(t, &returned),
            Ok(returned) => Some(returned),
            Err(e) => t.fatal(format!("Function failed: {e}")),
        }
    }
}

/// Extractor that accepts only numbers, resolving indirections on the way.
#[must_use]
pub fn numeric_extractor() -> ValueExtractor {
    ValueExtractor::new(extractor_unsupported)
        .with(Kind::Int, extract_same_value)
        .with(Kind::Uint, extract_same_value)
        .with(Kind::Float, extract_same_value)
        .with(Kind::Pointer, PointerExtractor::new(true))
        .with(Kind::Chan, ChannelExtractor::new(true))
        .with(Kind::Func, FuncExtractor::new(true))
}

/// Three-way comparison over one numeric kind.
pub type NumericOrdering = fn(&Value, &Value) -> Option<Ordering>;

/// Returns the comparison for `kind`, or `None` for non-numeric kinds.
///
/// Both operands must have `kind`; mixed operands compare as `None`.
#[must_use]
pub fn numeric_ordering(kind: Kind) -> Option<NumericOrdering> {
    fn ints(a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
    fn uints(a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Uint(a), Value::Uint(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
    fn floats(a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
    match kind {
        Kind::Int => Some(ints),
        Kind::Uint => Some(uints),
        Kind::Float => Some(floats),
        _ => None,
    }
}
