//! Inverse handle used by `Not`.

use parking_lot::Mutex;

use super::fatal::{self, Caught};
use super::{Cleanup, CleanupStack, HandleId, HandleKind, T, scratchpad};

/// Captures the first failure of a nested matcher instead of propagating it.
pub struct Inverse<'p> {
    id: HandleId,
    parent: &'p dyn T,
    captured: Mutex<Option<String>>,
    cleanups: CleanupStack,
}

impl<'p> Inverse<'p> {
    /// Creates an inverse handle under `parent`.
    #[must_use]
    pub fn new(parent: &'p dyn T) -> Self {
        Self {
            id: HandleId::new(),
            parent,
            captured: Mutex::new(None),
            cleanups: CleanupStack::default(),
        }
    }

    /// Returns the captured failure, if the nested matcher failed.
    #[must_use]
    pub fn captured(&self) -> Option<String> {
        self.captured.lock().clone()
    }

    /// Runs `f` against this handle, catching only this handle's failure.
    pub fn capture<R>(&self, f: impl FnOnce(&dyn T) -> R) -> Caught<R> {
        fatal::catch_fatal(self.id, || f(self))
    }
}

impl T for Inverse<'_> {
    fn id(&self) -> HandleId {
        self.id
    }

    fn kind(&self) -> HandleKind {
        HandleKind::Inverse
    }

    fn parent(&self) -> Option<&dyn T> {
        Some(self.parent)
    }

    fn cleanup(&self, f: Cleanup) {
        self.cleanups.push(f);
    }

    fn fatal(&self, message: String) -> ! {
        {
            let mut captured = self.captured.lock();
            if captured.is_none() {
                tracing::trace!(failure = %message, "inverse handle captured failure");
                *captured = Some(message);
            }
        }
        fatal::raise(self.id)
    }

    fn log(&self, message: &str) {
        self.parent.log(message);
    }

    fn failed(&self) -> bool {
        self.captured.lock().is_some()
    }
}

impl Drop for Inverse<'_> {
    fn drop(&mut self) {
        self.cleanups.reparent(self.parent);
        scratchpad::forget(self.id);
    }
}
