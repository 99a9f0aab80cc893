//! Timed retry engine behind `within` and `for_duration`.
//!
//! Each tick runs the matcher on a fresh [`Retrying`] handle on a scoped
//! worker thread, so a slow matcher never blocks the driver. At most one tick
//! is in flight; a tick that outruns its interval delays the next one until it
//! returns. The first tick fires immediately.
//!
//! The deadline is authoritative. When it fires while a tick is still running,
//! the driver marks the tick abandoned, waits for it to finish its cleanups in
//! 50ms polls, and discards its result.

use std::any::Any;
use std::panic::resume_unwind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::config;
use crate::diagnostics::interrupt;
use crate::error::usage_panic;
use crate::handle::fatal::{self, Caught};
use crate::handle::{Retrying, T};
use crate::matcher::Matcher;
use crate::value::Value;

/// Poll period while waiting for a late tick or watching for cancellation.
const POLL: Duration = Duration::from_millis(50);

/// Timing of an eventual assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Total window.
    pub duration: Duration,
    /// Period between tick starts.
    pub interval: Duration,
}

impl Probe {
    /// Creates a validated probe.
    ///
    /// # Panics
    /// Panics if either duration is zero or `interval` exceeds `duration`.
    #[track_caller]
    #[must_use]
    pub fn new(duration: Duration, interval: Duration) -> Self {
        if duration.is_zero() {
            usage_panic("eventual duration must be positive");
        }
        if interval.is_zero() {
            usage_panic("eventual interval must be positive");
        }
        if interval > duration {
            usage_panic(format!(
                "eventual interval {} exceeds duration {}",
                humantime::format_duration(interval),
                humantime::format_duration(duration)
            ));
        }
        Self { duration, interval }
    }
}

impl Default for Probe {
    /// Uses the configured `default-within` and `default-interval`.
    fn default() -> Self {
        let config = config();
        Self::new(config.default_within, config.default_interval)
    }
}

/// Which eventual semantics to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Pass at least once before the deadline.
    Within,
    /// Pass on every completed tick until the deadline.
    For,
}

/// Retries `matcher` until it passes once, failing `t` at the deadline.
pub fn within(t: &dyn T, matcher: &dyn Matcher, actuals: &[Value], probe: Probe) -> Vec<Value> {
    run(Mode::Within, t, matcher, actuals, probe)
}

/// Requires `matcher` to keep passing until the deadline.
pub fn hold_for(t: &dyn T, matcher: &dyn Matcher, actuals: &[Value], probe: Probe) -> Vec<Value> {
    run(Mode::For, t, matcher, actuals, probe)
}

enum TickResult {
    Passed(Vec<Value>),
    Failed(String),
    Panicked(Box<dyn Any + Send>),
}

struct Report {
    trial: u32,
    result: TickResult,
}

enum Outcome {
    Passed(Vec<Value>),
    Failed(String),
    Panicked { trial: u32, payload: Box<dyn Any + Send> },
}

#[derive(Default)]
struct Progress {
    trial: u32,
    ticking: bool,
    last_failure: Option<String>,
    last_pass: Option<Vec<Value>>,
    passed_once: bool,
}

impl Progress {
    fn at_deadline(&mut self, mode: Mode, probe: Probe) -> Outcome {
        if mode == Mode::For {
            if let Some(actuals) = self.last_pass.take() {
                return Outcome::Passed(actuals);
            }
        }
        let d = humantime::format_duration(probe.duration);
        Outcome::Failed(match &self.last_failure {
            Some(failure) => format!("Timed out after {d} waiting for assertion to pass: {failure}"),
            None => format!("Timed out after {d} waiting for assertion to pass (tick never finished once)"),
        })
    }

    fn canceled(&mut self, mode: Mode, reason: &str, elapsed: Duration) -> Outcome {
        if mode == Mode::For {
            if let Some(actuals) = self.last_pass.take() {
                return Outcome::Passed(actuals);
            }
        }
        Outcome::Failed(format!(
            "Context canceled after {} waiting for assertion to pass: {reason}",
            rounded(elapsed)
        ))
    }
}

fn rounded(d: Duration) -> humantime::FormattedDuration {
    humantime::format_duration(Duration::from_millis(d.as_millis() as u64))
}

fn run(mode: Mode, t: &dyn T, matcher: &dyn Matcher, actuals: &[Value], probe: Probe) -> Vec<Value> {
    interrupt::install();

    let start = Instant::now();
    let deadline = start + probe.duration;
    let abandoned = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel::<Report>();
    let mut progress = Progress::default();

    let outcome = thread::scope(|scope| {
        let abandoned = &abandoned;
        let mut next_tick = start;

        let mut outcome = loop {
            let now = Instant::now();
            if now >= deadline {
                break progress.at_deadline(mode, probe);
            }
            if t.done() {
                let reason = t.err().unwrap_or_else(|| "context done".to_string());
                break progress.canceled(mode, &reason, now - start);
            }

            if !progress.ticking && now >= next_tick {
                interrupt::assert_not_interrupted(t);
                progress.trial += 1;
                progress.ticking = true;
                let trial = progress.trial;
                let actuals = actuals.to_vec();
                let tx = tx.clone();
                scope.spawn(move || {
                    let tick = Retrying::new(t, trial, deadline, abandoned);
                    let result = match tick.capture(|rt| matcher.apply(rt, actuals)) {
                        Caught::Returned(actuals) => TickResult::Passed(actuals),
                        Caught::Fatal => TickResult::Failed(tick.failure().unwrap_or_default()),
                        Caught::Panicked(payload) => TickResult::Panicked(payload),
                    };
                    tick.finish();
                    drop(tick);
                    let _ = tx.send(Report { trial, result });
                });
                while next_tick <= now {
                    next_tick += probe.interval;
                }
            }

            let wake = if progress.ticking { deadline } else { next_tick.min(deadline) };
            let wait = wake.saturating_duration_since(Instant::now()).min(POLL);
            let report = match rx.recv_timeout(wait) {
                Ok(report) => report,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => continue,
            };
            progress.ticking = false;
            let elapsed = start.elapsed();
            match report.result {
                TickResult::Passed(actuals) => {
                    tracing::debug!(trial = report.trial, elapsed = ?elapsed, "tick passed");
                    if mode == Mode::Within {
                        t.log(&format!(
                            "Assertion passed on trial={} after {}",
                            report.trial,
                            rounded(elapsed)
                        ));
                        break Outcome::Passed(actuals);
                    }
                    progress.passed_once = true;
                    progress.last_pass = Some(actuals);
                }
                TickResult::Failed(failure) => {
                    tracing::debug!(trial = report.trial, elapsed = ?elapsed, "tick failed");
                    if mode == Mode::For && progress.passed_once {
                        break Outcome::Failed(format!(
                            "Assertion failed after {} and did not pass repeatedly for {}: {failure}",
                            rounded(elapsed),
                            humantime::format_duration(probe.duration)
                        ));
                    }
                    progress.last_pass = None;
                    progress.last_failure = Some(failure);
                }
                TickResult::Panicked(payload) => {
                    break Outcome::Panicked {
                        trial: report.trial,
                        payload,
                    };
                }
            }
        };

        abandoned.store(true, Ordering::SeqCst);
        while progress.ticking {
            match rx.recv_timeout(POLL) {
                Ok(report) => {
                    progress.ticking = false;
                    tracing::debug!(trial = report.trial, "discarding late tick");
                    if let TickResult::Panicked(payload) = report.result {
                        outcome = Outcome::Panicked {
                            trial: report.trial,
                            payload,
                        };
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::debug!(trial = progress.trial, "waiting for late tick cleanups");
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        outcome
    });

    let elapsed = start.elapsed();
    match outcome {
        Outcome::Passed(actuals) => {
            if mode == Mode::For {
                t.log(&format!(
                    "Assertion held for {} over {} trials",
                    humantime::format_duration(probe.duration),
                    progress.trial
                ));
            }
            actuals
        }
        Outcome::Failed(message) => t.fatal(format!(
            "{message}\n    Trials: {}, elapsed: {}",
            progress.trial,
            rounded(elapsed)
        )),
        Outcome::Panicked { trial, payload } => {
            if fatal::is_sentinel(payload.as_ref()) {
                resume_unwind(payload);
            }
            unexpected_panic(trial, payload.as_ref())
        }
    }
}

#[allow(clippy::panic)]
fn unexpected_panic(trial: u32, payload: &(dyn Any + Send)) -> ! {
    panic!(
        "Unexpected panic in assertion tick {trial}: {}",
        fatal::panic_message(payload)
    )
}
