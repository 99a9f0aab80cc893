//! Callables as actual values.
//!
//! A function actual is probed by the function extractor on every
//! evaluation. The accepted shapes are closures taking nothing or the
//! current handle, and returning a value, nothing, or a `Result` of either.
//!
//! ```rust,ignore
//! Value::func(|| counter.fetch_add(1, Ordering::SeqCst) + 1);
//! Value::func(|t: &dyn T| -> Result<Value, io::Error> { read_status(t) });
//! ```

use std::any::TypeId;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;

use super::Value;
use crate::handle::T;

/// Boxed error returned by fallible function actuals.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type Callable = dyn FnMut(&dyn T) -> Result<Value, BoxError> + Send;

/// Type-erased callable.
#[derive(Clone)]
pub struct Func {
    callable: Arc<Mutex<Box<Callable>>>,
    yields: bool,
}

impl Func {
    /// Erases a closure of one of the shapes accepted by [`IntoFunc`].
    pub fn new<M, F: IntoFunc<M>>(f: F) -> Self {
        Self {
            yields: F::yields_value(),
            callable: Arc::new(Mutex::new(f.into_callable())),
        }
    }

    /// Returns false for closures returning `()`, which produce no value to
    /// inspect.
    #[must_use]
    pub const fn yields_value(&self) -> bool {
        self.yields
    }

    /// Invokes the callable with `t`.
    ///
    /// # Errors
    /// Returns the error produced by the callable.
    pub fn call(&self, t: &dyn T) -> Result<Value, BoxError> {
        let mut callable = self.callable.lock();
        (*callable)(t)
    }
}

/// Conversion of a closure into a [`Func`]. `M` is a marker that only
/// disambiguates the closure shape.
pub trait IntoFunc<M>: Send + 'static {
    #[doc(hidden)]
    fn into_callable(self) -> Box<Callable>;

    #[doc(hidden)]
    fn yields_value() -> bool {
        true
    }
}

fn is_unit<R: 'static>() -> bool {
    TypeId::of::<R>() == TypeId::of::<()>()
}

/// Marker: no parameter, plain return.
pub struct Returns<R>(PhantomData<R>);
/// Marker: no parameter, fallible return.
pub struct TryReturns<R, E>(PhantomData<(R, E)>);
/// Marker: handle parameter, plain return.
pub struct WithT<R>(PhantomData<R>);
/// Marker: handle parameter, fallible return.
pub struct TryWithT<R, E>(PhantomData<(R, E)>);

impl<F, R> IntoFunc<Returns<R>> for F
where
    F: FnMut() -> R + Send + 'static,
    R: Into<Value> + 'static,
{
    fn into_callable(mut self) -> Box<Callable> {
        Box::new(move |_: &dyn T| Ok(self().into()))
    }

    fn yields_value() -> bool {
        !is_unit::<R>()
    }
}

impl<F, R, E> IntoFunc<TryReturns<R, E>> for F
where
    F: FnMut() -> Result<R, E> + Send + 'static,
    R: Into<Value>,
    E: Into<BoxError>,
{
    fn into_callable(mut self) -> Box<Callable> {
        Box::new(move |_: &dyn T| self().map(Into::into).map_err(Into::into))
    }
}

impl<F, R> IntoFunc<WithT<R>> for F
where
    F: FnMut(&dyn T) -> R + Send + 'static,
    R: Into<Value> + 'static,
{
    fn into_callable(mut self) -> Box<Callable> {
        Box::new(move |t: &dyn T| Ok(self(t).into()))
    }

    fn yields_value() -> bool {
        !is_unit::<R>()
    }
}

impl<F, R, E> IntoFunc<TryWithT<R, E>> for F
where
    F: FnMut(&dyn T) -> Result<R, E> + Send + 'static,
    R: Into<Value>,
    E: Into<BoxError>,
{
    fn into_callable(mut self) -> Box<Callable> {
        Box::new(move |t: &dyn T| self(t).map(Into::into).map_err(Into::into))
    }
}
