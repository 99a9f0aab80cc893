//! Root handle bound to the running test.

use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use super::{Cleanup, CleanupStack, HandleId, HandleKind, T, scratchpad};
use crate::diagnostics::{UnevaluatedRegistry, cite_nearest, theme};

/// Outermost handle of a test.
///
/// Failing it panics, which is how the Rust test harness fails a test. A
/// failure raised directly on the root, rather than through an assertion,
/// gets the citation of the nearest user frame appended. On
/// drop it runs cleanups in reverse order and fails the test if any
/// assertion was built but never evaluated.
///
/// ```rust,ignore
/// #[test]
/// fn deploys_branch() {
///     let t = Root::new();
///     with(&t).verify(1).will(be_equal_to(1)).or_fail();
/// }
/// ```
pub struct Root {
    id: HandleId,
    name: String,
    cleanups: CleanupStack,
    failed: AtomicBool,
    registry: UnevaluatedRegistry,
    deadline: Option<Instant>,
    canceled: Mutex<Option<String>>,
}

impl Root {
    /// Creates a root named after the current test thread.
    #[must_use]
    pub fn new() -> Self {
        let name = std::thread::current()
            .name()
            .unwrap_or("unnamed")
            .to_string();
        Self::named(name)
    }

    /// Creates a root with an explicit test name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: HandleId::new(),
            name: name.into(),
            cleanups: CleanupStack::default(),
            failed: AtomicBool::new(false),
            registry: UnevaluatedRegistry::new(),
            deadline: None,
            canceled: Mutex::new(None),
        }
    }

    /// Sets an overall deadline observed by eventual assertions.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Cancels the test context. In-flight eventual assertions stop retrying.
    pub fn cancel(&self, reason: impl Into<String>) {
        let mut canceled = self.canceled.lock();
        if canceled.is_none() {
            *canceled = Some(reason.into());
        }
    }
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

impl T for Root {
    fn id(&self) -> HandleId {
        self.id
    }

    fn kind(&self) -> HandleKind {
        HandleKind::Root
    }

    fn parent(&self) -> Option<&dyn T> {
        None
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn cleanup(&self, f: Cleanup) {
        self.cleanups.push(f);
    }

    #[allow(clippy::panic)]
    fn fatal(&self, message: String) -> ! {
        self.failed.store(true, Ordering::SeqCst);
        tracing::debug!(test = %self.name, "test failed");
        let message = cite_nearest(message);
        panic!("{message}")
    }

    fn log(&self, message: &str) {
        println!("{message}");
    }

    fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst) || std::thread::panicking()
    }

    fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    fn done(&self) -> bool {
        self.canceled.lock().is_some() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn err(&self) -> Option<String> {
        if let Some(reason) = self.canceled.lock().clone() {
            return Some(reason);
        }
        self.deadline
            .filter(|d| Instant::now() >= *d)
            .map(|_| "test deadline exceeded".to_string())
    }

    fn unevaluated(&self) -> Option<&UnevaluatedRegistry> {
        Some(&self.registry)
    }
}

impl Drop for Root {
    #[allow(clippy::panic)]
    fn drop(&mut self) {
        self.cleanups.run(&self.name);
        scratchpad::forget(self.id);

        let theme = std::io::stderr().is_terminal().then(theme::current);
        let Some(report) = self.registry.drain_report(theme) else {
            return;
        };
        if std::thread::panicking() {
            eprintln!("{report}");
        } else {
            self.failed.store(true, Ordering::SeqCst);
            panic!("{report}");
        }
    }
}
