//! A reconciled resource that converges after a number of passes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use justest_core::Value;
use justest_matchers::{Condition, ConditionStatus};
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::{ReconcileError, Result};

/// Status block published by the resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    /// Generation the conditions describe.
    pub observed_generation: u64,
    /// Published conditions.
    pub conditions: Vec<Condition>,
}

#[derive(Debug)]
struct State {
    name: String,
    generation: u64,
    reconciles: u32,
    ready_after: u32,
    pending_conflicts: u32,
    deleted: bool,
    status: ResourceStatus,
}

/// Shared handle to a simulated resource. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct ConvergingResource {
    state: Arc<Mutex<State>>,
}

impl ConvergingResource {
    /// Creates a resource that becomes ready on reconcile number
    /// `ready_after`.
    #[must_use]
    pub fn new(name: impl Into<String>, ready_after: u32) -> Self {
        let name = name.into();
        let status = ResourceStatus {
            observed_generation: 0,
            conditions: vec![Condition::new(
                "Ready",
                ConditionStatus::Unknown,
                "Initializing",
                "waiting for first reconcile",
            )],
        };
        Self {
            state: Arc::new(Mutex::new(State {
                name,
                generation: 1,
                reconciles: 0,
                ready_after,
                pending_conflicts: 0,
                deleted: false,
                status,
            })),
        }
    }

    /// Makes the next `n` reconciles fail with a conflict.
    pub fn inject_conflicts(&self, n: u32) {
        self.state.lock().pending_conflicts = n;
    }

    /// Marks the resource deleted; further reconciles fail.
    pub fn delete(&self) {
        self.state.lock().deleted = true;
    }

    /// Bumps the generation, which resets readiness until the new spec has
    /// been reconciled `ready_after` more times.
    pub fn update_spec(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.reconciles = 0;
        set_ready(
            &mut state.status,
            ConditionStatus::False,
            "Progressing",
            "spec changed",
        );
    }

    /// Runs one reconcile pass, returning the pass count for the current
    /// generation.
    ///
    /// # Errors
    /// Returns an error when a conflict was injected or the resource is gone.
    pub fn reconcile(&self) -> Result<u32> {
        let mut state = self.state.lock();
        if state.deleted {
            return Err(ReconcileError::NotFound(state.name.clone()));
        }
        if state.pending_conflicts > 0 {
            state.pending_conflicts -= 1;
            tracing::debug!(resource = %state.name, "reconcile conflict");
            return Err(ReconcileError::conflict(state.name.clone()));
        }

        state.reconciles += 1;
        let pass = state.reconciles;
        let generation = state.generation;
        state.status.observed_generation = generation;
        if pass >= state.ready_after {
            set_ready(&mut state.status, ConditionStatus::True, "Synced", "all replicas available");
        } else {
            let message = format!("reconcile {pass}/{}", state.ready_after);
            set_ready(&mut state.status, ConditionStatus::False, "Reconciling", &message);
        }
        tracing::debug!(resource = %state.name, pass, generation, "reconciled");
        Ok(pass)
    }

    /// Number of successful reconciles for the current generation.
    #[must_use]
    pub fn reconciles(&self) -> u32 {
        self.state.lock().reconciles
    }

    /// Snapshot of the status block.
    #[must_use]
    pub fn status(&self) -> ResourceStatus {
        self.state.lock().status.clone()
    }

    /// Reason of the `Ready` condition.
    #[must_use]
    pub fn ready_reason(&self) -> String {
        self.state
            .lock()
            .status
            .conditions
            .iter()
            .find(|c| c.type_ == "Ready")
            .map(|c| c.reason.clone())
            .unwrap_or_default()
    }

    /// A function actual that reads the status on every evaluation.
    #[must_use]
    pub fn status_func(&self) -> Value {
        let resource = self.clone();
        Value::func(move || -> std::result::Result<Value, justest_core::JustestError> {
            Value::from_serialize(&resource.status())
        })
    }
}

fn set_ready(status: &mut ResourceStatus, to: ConditionStatus, reason: &str, message: &str) {
    match status.conditions.iter_mut().find(|c| c.type_ == "Ready") {
        Some(c) => {
            c.status = to;
            c.reason = reason.to_string();
            c.message = message.to_string();
        }
        None => status
            .conditions
            .push(Condition::new("Ready", to, reason, message)),
    }
}

/// Background reconcile loop. Stops and joins on drop.
pub struct Controller {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Controller {
    /// Reconciles `resource` every `period` on a dedicated thread.
    ///
    /// # Errors
    /// Returns [`ReconcileError::Spawn`] if the thread cannot be started.
    pub fn spawn(resource: ConvergingResource, period: Duration) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name("justest-controller".into())
            .spawn(move || {
                while !flag.load(Ordering::SeqCst) {
                    if let Err(e) = resource.reconcile() {
                        tracing::debug!(error = %e, "reconcile failed, retrying");
                    }
                    std::thread::sleep(period);
                }
            })
            .map_err(|e| ReconcileError::Spawn(e.to_string()))?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
