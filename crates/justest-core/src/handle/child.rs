//! Child handle carrying explanation context.

use std::sync::atomic::{AtomicBool, Ordering};

use super::{Cleanup, CleanupStack, HandleId, HandleKind, T, scratchpad};

/// Wraps a parent and appends `context` to every failure forwarded to it.
///
/// Cleanups registered on the child are re-parented to the enclosing handle
/// when the child is dropped.
pub struct Child<'p> {
    id: HandleId,
    parent: &'p dyn T,
    context: String,
    cleanups: CleanupStack,
    failed: AtomicBool,
}

impl<'p> Child<'p> {
    /// Creates a child of `parent`.
    #[must_use]
    pub fn new(parent: &'p dyn T, context: impl Into<String>) -> Self {
        Self {
            id: HandleId::new(),
            parent,
            context: context.into(),
            cleanups: CleanupStack::default(),
            failed: AtomicBool::new(false),
        }
    }

    /// Returns the explanation context.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }
}

impl T for Child<'_> {
    fn id(&self) -> HandleId {
        self.id
    }

    fn kind(&self) -> HandleKind {
        HandleKind::Child
    }

    fn parent(&self) -> Option<&dyn T> {
        Some(self.parent)
    }

    fn cleanup(&self, f: Cleanup) {
        self.cleanups.push(f);
    }

    fn fatal(&self, message: String) -> ! {
        self.failed.store(true, Ordering::SeqCst);
        self.parent.fatal(format!("{message}{}", self.context))
    }

    fn log(&self, message: &str) {
        self.parent.log(message);
    }

    fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

impl Drop for Child<'_> {
    fn drop(&mut self) {
        self.cleanups.reparent(self.parent);
        scratchpad::forget(self.id);
    }
}
