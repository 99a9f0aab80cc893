//! Test handles.
//!
//! Every level of composition gets its own handle implementing [`T`]:
//!
//! | Variant | Created by | `fatal` behavior |
//! |---------|------------|------------------|
//! | [`Root`] | the test | fails the test (panics) |
//! | [`Child`] | a terminal evaluation | appends its context, forwards to parent |
//! | [`Inverse`] | `Not(..)` | captures one failure, aborts the inner matcher |
//! | [`Retrying`] | each eventual tick | records the failure, aborts the tick |
//! | [`MockT`] | self-tests | records the failure, aborts [`MockT::run`] |
//!
//! Handles form a parent chain; [`root_of`] walks it to the top.

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::LazyLock;
use std::time::Instant;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::diagnostics::UnevaluatedRegistry;
use crate::diagnostics::location::register_nearest_helper;
use crate::value::Value;

pub mod child;
pub mod fatal;
pub mod inverse;
pub mod mock;
pub mod retrying;
pub mod root;

pub use child::Child;
pub use inverse::Inverse;
pub use mock::MockT;
pub use retrying::Retrying;
pub use root::Root;

/// Deferred teardown registered on a handle.
pub type Cleanup = Box<dyn FnOnce() + Send>;

/// Unique handle identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(Uuid);

impl HandleId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// Bound to the test itself.
    Root,
    /// Explanation context for one evaluation.
    Child,
    /// Failure capture for `Not`.
    Inverse,
    /// One eventual tick.
    Retrying,
    /// Recording handle for self-tests.
    Mock,
}

/// The uniform testing surface.
///
/// Implementations must be shareable across the eventual engine's worker
/// thread, hence `Send + Sync`.
pub trait T: Send + Sync {
    /// Returns this handle's identifier.
    fn id(&self) -> HandleId;

    /// Returns the variant tag.
    fn kind(&self) -> HandleKind;

    /// Returns the enclosing handle, `None` for roots.
    fn parent(&self) -> Option<&dyn T>;

    /// Registers a teardown thunk. Thunks run in reverse registration order.
    fn cleanup(&self, f: Cleanup);

    /// Reports a fatal failure and stops the current evaluation.
    fn fatal(&self, message: String) -> !;

    /// Writes a log line to the test output.
    fn log(&self, message: &str);

    /// Returns true once a failure was reported through this handle.
    fn failed(&self) -> bool;

    /// Returns the test name.
    fn name(&self) -> String {
        self.parent().map_or_else(|| "unnamed".to_string(), T::name)
    }

    /// Returns the instant after which work on behalf of this handle is moot.
    fn deadline(&self) -> Option<Instant> {
        self.parent().and_then(T::deadline)
    }

    /// Returns true once this handle was canceled or its deadline passed.
    fn done(&self) -> bool {
        self.parent().is_some_and(T::done)
    }

    /// Returns why [`T::done`] became true.
    fn err(&self) -> Option<String> {
        self.parent().and_then(T::err)
    }

    /// Returns the unevaluated-assertion registry, present on roots only.
    fn unevaluated(&self) -> Option<&UnevaluatedRegistry> {
        None
    }

    /// Formats and reports a fatal failure.
    fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.fatal(args.to_string())
    }

    /// Formats and logs a line.
    fn logf(&self, args: fmt::Arguments<'_>) {
        self.log(&args.to_string());
    }

    /// Looks up a scratchpad value, falling through to the parent on miss.
    fn value(&self, key: &str) -> Option<Value> {
        scratchpad::load(self.id(), key).or_else(|| self.parent().and_then(|p| p.value(key)))
    }

    /// Stores a scratchpad value on this handle.
    fn add_value(&self, key: &str, value: Value) {
        scratchpad::store(self.id(), key, value);
    }
}

/// Walks the parent chain to the outermost handle.
#[must_use]
pub fn root_of(t: &dyn T) -> &dyn T {
    let mut current = t;
    while let Some(parent) = current.parent() {
        current = parent;
    }
    current
}

/// Returns a marker that, when called from a helper function, makes failure
/// citations skip that function and point at its caller.
pub fn get_helper(t: &dyn T) -> impl Fn() + '_ {
    move || {
        tracing::trace!(test = %t.name(), "marking assertion helper");
        register_nearest_helper();
    }
}

/// LIFO stack of cleanups owned by one handle.
#[derive(Default)]
pub(crate) struct CleanupStack(Mutex<Vec<Cleanup>>);

impl CleanupStack {
    pub(crate) fn push(&self, f: Cleanup) {
        self.0.lock().push(f);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Removes all cleanups, oldest first.
    pub(crate) fn take(&self) -> Vec<Cleanup> {
        std::mem::take(&mut *self.0.lock())
    }

    /// Runs all cleanups newest first. A panicking cleanup is logged and the
    /// rest still run.
    pub(crate) fn run(&self, owner: &str) {
        let cleanups = self.take();
        for (idx, cleanup) in cleanups.into_iter().enumerate().rev() {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(cleanup)) {
                tracing::warn!(
                    owner = owner,
                    cleanup = idx,
                    error = %fatal::panic_message(payload.as_ref()),
                    "cleanup failed, continuing"
                );
            }
        }
    }

    /// Moves all cleanups to `parent`, preserving their relative order.
    pub(crate) fn reparent(&self, parent: &dyn T) {
        for cleanup in self.take() {
            parent.cleanup(cleanup);
        }
    }
}

/// Per-handle key/value scratchpad.
pub(crate) mod scratchpad {
    use super::*;

    static VALUES: LazyLock<Mutex<HashMap<HandleId, HashMap<String, Value>>>> =
        LazyLock::new(|| Mutex::new(HashMap::new()));

    pub(crate) fn load(id: HandleId, key: &str) -> Option<Value> {
        VALUES.lock().get(&id).and_then(|m| m.get(key).cloned())
    }

    pub(crate) fn store(id: HandleId, key: &str, value: Value) {
        VALUES
            .lock()
            .entry(id)
            .or_default()
            .insert(key.to_string(), value);
    }

    pub(crate) fn forget(id: HandleId) {
        VALUES.lock().remove(&id);
    }
}
