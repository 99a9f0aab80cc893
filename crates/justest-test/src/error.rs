//! Simulated reconcile errors.

/// Result type alias for reconcile operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Reconcile errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// Optimistic concurrency conflict on update.
    #[error("conflict updating {resource}: object has been modified")]
    Conflict {
        /// Resource name.
        resource: String,
    },

    /// The resource was deleted.
    #[error("resource {0} not found")]
    NotFound(String),

    /// The background controller could not start.
    #[error("controller failed to start: {0}")]
    Spawn(String),
}

impl ReconcileError {
    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(resource: impl Into<String>) -> Self {
        Self::Conflict {
            resource: resource.into(),
        }
    }
}
