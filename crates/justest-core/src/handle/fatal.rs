//! Scoped failure capture.
//!
//! Non-root handles abort the current evaluation by unwinding with a
//! [`FatalSentinel`] tagged with their own id. Only the boundary that owns
//! the handle catches it; everything else keeps unwinding. The sentinel is
//! raised with `resume_unwind`, which bypasses the panic hook, so aborted
//! ticks do not print panic reports.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};

use super::HandleId;

/// Unwind payload raised by a capturing handle's `fatal`.
#[derive(Debug)]
pub struct FatalSentinel {
    /// Handle that raised the failure.
    pub handle: HandleId,
}

/// Outcome of running code inside a capture boundary.
pub enum Caught<R> {
    /// The closure returned normally.
    Returned(R),
    /// The owning handle called `fatal`.
    Fatal,
    /// Something else unwound: a foreign sentinel or an ordinary panic.
    Panicked(Box<dyn Any + Send>),
}

/// Unwinds with a sentinel owned by `handle`.
pub fn raise(handle: HandleId) -> ! {
    resume_unwind(Box::new(FatalSentinel { handle }))
}

/// Runs `f`, catching only the sentinel raised by `handle`.
pub fn catch_fatal<R>(handle: HandleId, f: impl FnOnce() -> R) -> Caught<R> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Caught::Returned(value),
        Err(payload) => match payload.downcast_ref::<FatalSentinel>() {
            Some(sentinel) if sentinel.handle == handle => Caught::Fatal,
            _ => Caught::Panicked(payload),
        },
    }
}

/// Returns true if `payload` is a sentinel from any handle.
#[must_use]
pub fn is_sentinel(payload: &(dyn Any + Send)) -> bool {
    payload.is::<FatalSentinel>()
}

/// Best-effort text of a panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(sentinel) = payload.downcast_ref::<FatalSentinel>() {
        format!("fatal failure raised by handle {}", sentinel.handle)
    } else {
        "non-string panic payload".to_string()
    }
}
