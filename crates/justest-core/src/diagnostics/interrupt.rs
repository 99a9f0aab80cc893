//! Signal-aware cancellation of eventual assertions.
//!
//! A single write-once word records the first configured signal received.
//! Every tick of the eventual engine reads it before doing any work.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::config::{InterruptSignal, config};
use crate::handle::T;

/// Exit status used when a second interrupt arrives.
const SECOND_SIGNAL_EXIT_CODE: i32 = 130;

/// Write-once interrupt flag.
#[derive(Debug, Default)]
pub struct InterruptFlag(AtomicI32);

impl InterruptFlag {
    /// Creates a cleared flag.
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicI32::new(0))
    }

    /// Records `signal` unless a signal was already recorded.
    ///
    /// Returns true if this call set the flag.
    pub fn raise(&self, signal: InterruptSignal) -> bool {
        self.0
            .compare_exchange(0, signal.number(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Returns the recorded signal, if any.
    #[must_use]
    pub fn get(&self) -> Option<InterruptSignal> {
        match self.0.load(Ordering::SeqCst) {
            0 => None,
            n => InterruptSignal::from_number(n),
        }
    }
}

/// Process-wide flag fed by the signal subscriber.
pub static INTERRUPTED: InterruptFlag = InterruptFlag::new();

/// Returns the signal that interrupted the process, if any.
#[must_use]
pub fn interrupted() -> Option<InterruptSignal> {
    INTERRUPTED.get()
}

/// Fails `t` if the process was interrupted.
pub fn assert_not_interrupted(t: &dyn T) {
    assert_not_interrupted_by(t, &INTERRUPTED);
}

/// Fails `t` if `flag` was raised.
pub fn assert_not_interrupted_by(t: &dyn T, flag: &InterruptFlag) {
    if let Some(signal) = flag.get() {
        t.fatal(format!("Process canceled via signal {signal}"));
    }
}

/// Starts the signal subscriber once per process.
///
/// The subscriber runs a current-thread runtime on a dedicated thread. The
/// first configured signal raises [`INTERRUPTED`]; a second one exits.
pub fn install() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        let signals = config().interrupt_signals;
        let spawned = std::thread::Builder::new()
            .name("justest-signals".into())
            .spawn(move || subscribe(signals));
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "failed to start interrupt subscriber");
        }
    });
}

fn subscribe(signals: Vec<InterruptSignal>) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::warn!(error = %e, "failed to build interrupt runtime");
            return;
        }
    };

    runtime.block_on(async move {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<InterruptSignal>(4);
        for signal in signals {
            if signal == InterruptSignal::Kill {
                tracing::debug!("SIGKILL cannot be observed; relying on other signals");
                continue;
            }
            listen(signal, tx.clone());
        }
        drop(tx);

        while let Some(signal) = rx.recv().await {
            if INTERRUPTED.raise(signal) {
                tracing::info!(signal = %signal, "interrupt received, canceling eventual assertions");
            } else {
                tracing::warn!(signal = %signal, "second interrupt received, exiting");
                std::process::exit(SECOND_SIGNAL_EXIT_CODE);
            }
        }
    });
}

#[cfg(unix)]
fn listen(signal: InterruptSignal, tx: tokio::sync::mpsc::Sender<InterruptSignal>) {
    use tokio::signal::unix::{SignalKind, signal as unix_signal};

    let mut stream = match unix_signal(SignalKind::from_raw(signal.number())) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(signal = %signal, error = %e, "cannot subscribe to signal");
            return;
        }
    };
    tokio::spawn(async move {
        while stream.recv().await.is_some() {
            if tx.send(signal).await.is_err() {
                break;
            }
        }
    });
}

#[cfg(not(unix))]
fn listen(signal: InterruptSignal, tx: tokio::sync::mpsc::Sender<InterruptSignal>) {
    if signal != InterruptSignal::Int {
        tracing::debug!(signal = %signal, "only SIGINT is observable on this platform");
        return;
    }
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(signal).await.is_err() {
                break;
            }
        }
    });
}
