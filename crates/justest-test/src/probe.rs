//! Health probe that degrades after a number of checks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use justest_core::Value;

/// Passes `healthy` checks, then fails `unhealthy` checks, and repeats.
/// An `unhealthy` of zero never fails.
#[derive(Debug, Clone)]
pub struct FlappingProbe {
    checks: Arc<AtomicU32>,
    healthy: u32,
    unhealthy: u32,
}

impl FlappingProbe {
    /// Creates a probe with the given cycle.
    #[must_use]
    pub fn new(healthy: u32, unhealthy: u32) -> Self {
        Self {
            checks: Arc::new(AtomicU32::new(0)),
            healthy,
            unhealthy,
        }
    }

    /// Probe that passes `healthy` times and then fails forever.
    #[must_use]
    pub fn degrading(healthy: u32) -> Self {
        Self::new(healthy, u32::MAX - healthy)
    }

    /// Performs one check.
    pub fn check(&self) -> bool {
        let n = self.checks.fetch_add(1, Ordering::SeqCst);
        let cycle = self.healthy.saturating_add(self.unhealthy);
        if self.unhealthy == 0 || cycle == 0 {
            return true;
        }
        n % cycle < self.healthy
    }

    /// Checks performed so far.
    #[must_use]
    pub fn checks(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }

    /// A function actual yielding `"healthy"` or `"degraded"` per check.
    #[must_use]
    pub fn as_func(&self) -> Value {
        let probe = self.clone();
        Value::func(move || if probe.check() { "healthy" } else { "degraded" })
    }
}
