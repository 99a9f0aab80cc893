//! Per-tick handle of the eventual engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use super::fatal::{self, Caught};
use super::{Cleanup, CleanupStack, HandleId, HandleKind, T, scratchpad};

/// Handle active during one tick. Failures abort the tick, never the test.
pub struct Retrying<'p> {
    id: HandleId,
    parent: &'p dyn T,
    trial: u32,
    deadline: Instant,
    abandoned: &'p AtomicBool,
    failure: Mutex<Option<String>>,
    cleanups: CleanupStack,
}

impl<'p> Retrying<'p> {
    /// Creates the handle for `trial`. `abandoned` is raised by the engine
    /// once it stops waiting for this tick.
    #[must_use]
    pub fn new(parent: &'p dyn T, trial: u32, deadline: Instant, abandoned: &'p AtomicBool) -> Self {
        Self {
            id: HandleId::new(),
            parent,
            trial,
            deadline,
            abandoned,
            failure: Mutex::new(None),
            cleanups: CleanupStack::default(),
        }
    }

    /// Returns the 1-based trial number.
    #[must_use]
    pub const fn trial(&self) -> u32 {
        self.trial
    }

    /// Returns the failure recorded during this tick.
    #[must_use]
    pub fn failure(&self) -> Option<String> {
        self.failure.lock().clone()
    }

    /// Runs `f` against this handle, catching only this handle's failure.
    pub fn capture<R>(&self, f: impl FnOnce(&dyn T) -> R) -> Caught<R> {
        fatal::catch_fatal(self.id, || f(self))
    }

    /// Runs the tick's cleanups, newest first.
    pub fn finish(&self) {
        self.cleanups.run(&format!("trial {}", self.trial));
    }
}

impl T for Retrying<'_> {
    fn id(&self) -> HandleId {
        self.id
    }

    fn kind(&self) -> HandleKind {
        HandleKind::Retrying
    }

    fn parent(&self) -> Option<&dyn T> {
        Some(self.parent)
    }

    fn cleanup(&self, f: Cleanup) {
        self.cleanups.push(f);
    }

    fn fatal(&self, message: String) -> ! {
        tracing::debug!(trial = self.trial, failure = %message, "tick failed");
        *self.failure.lock() = Some(message);
        fatal::raise(self.id)
    }

    fn log(&self, message: &str) {
        self.parent.log(&format!("[trial={}] {message}", self.trial));
    }

    fn failed(&self) -> bool {
        self.failure.lock().is_some()
    }

    fn deadline(&self) -> Option<Instant> {
        Some(
            self.parent
                .deadline()
                .map_or(self.deadline, |d| d.min(self.deadline)),
        )
    }

    fn done(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
            || Instant::now() >= self.deadline
            || self.parent.done()
    }

    fn err(&self) -> Option<String> {
        if self.abandoned.load(Ordering::SeqCst) || Instant::now() >= self.deadline {
            return Some("eventual assertion deadline exceeded".to_string());
        }
        self.parent.err()
    }
}

impl Drop for Retrying<'_> {
    fn drop(&mut self) {
        self.finish();
        scratchpad::forget(self.id);
    }
}
