//! Recording handle for testing matchers and the harness itself.

use std::panic::resume_unwind;

use parking_lot::Mutex;

use super::fatal::{self, Caught};
use super::{Cleanup, HandleId, HandleKind, T, scratchpad};
use crate::diagnostics::{UNEVALUATED_HEADER, UnevaluatedRegistry};

/// Handle that records failures, cleanups and log lines instead of acting.
///
/// `fatal` aborts the closure passed to [`MockT::run`]; call it outside
/// `run` and the abort escapes as a panic.
pub struct MockT {
    id: HandleId,
    name: String,
    cleanups: Mutex<Vec<Cleanup>>,
    failures: Mutex<Vec<String>>,
    logs: Mutex<Vec<String>>,
    registry: UnevaluatedRegistry,
}

impl MockT {
    /// Creates a mock named `mock`.
    #[must_use]
    pub fn new() -> Self {
        Self::named("mock")
    }

    /// Creates a mock with a custom name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: HandleId::new(),
            name: name.into(),
            cleanups: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
            registry: UnevaluatedRegistry::new(),
        }
    }

    /// Runs `f` against the mock. Returns false if `f` was aborted by a
    /// failure on this mock. Any other panic propagates.
    pub fn run(&self, f: impl FnOnce(&dyn T)) -> bool {
        match fatal::catch_fatal(self.id, || f(self)) {
            Caught::Returned(()) => true,
            Caught::Fatal => false,
            Caught::Panicked(payload) => resume_unwind(payload),
        }
    }

    /// Returns the number of recorded, not yet executed cleanups.
    #[must_use]
    pub fn cleanups(&self) -> usize {
        self.cleanups.lock().len()
    }

    /// Returns the recorded failure messages.
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().clone()
    }

    /// Returns the recorded log lines.
    #[must_use]
    pub fn log_messages(&self) -> Vec<String> {
        self.logs.lock().clone()
    }

    /// Executes recorded cleanups, newest first.
    pub fn run_cleanups(&self) {
        let cleanups = std::mem::take(&mut *self.cleanups.lock());
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }
    }

    /// Closes the mock like a root: runs cleanups and records leftover
    /// unevaluated assertions as a failure.
    pub fn close(&self) {
        self.run_cleanups();
        if let Some(report) = self.registry.drain_report(None) {
            debug_assert!(report.starts_with(UNEVALUATED_HEADER));
            self.failures.lock().push(report);
        }
    }
}

impl Default for MockT {
    fn default() -> Self {
        Self::new()
    }
}

impl T for MockT {
    fn id(&self) -> HandleId {
        self.id
    }

    fn kind(&self) -> HandleKind {
        HandleKind::Mock
    }

    fn parent(&self) -> Option<&dyn T> {
        None
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn cleanup(&self, f: Cleanup) {
        self.cleanups.lock().push(f);
    }

    fn fatal(&self, message: String) -> ! {
        self.failures.lock().push(message);
        fatal::raise(self.id)
    }

    fn log(&self, message: &str) {
        self.logs.lock().push(message.to_string());
    }

    fn failed(&self) -> bool {
        !self.failures.lock().is_empty()
    }

    fn unevaluated(&self) -> Option<&UnevaluatedRegistry> {
        Some(&self.registry)
    }
}

impl Drop for MockT {
    fn drop(&mut self) {
        scratchpad::forget(self.id);
    }
}
