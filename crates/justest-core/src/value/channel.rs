//! Bounded channels as actual values.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

use super::Value;
use crate::error::{JustestError, Result, usage_panic};

/// Receiving end of a bounded channel. Clones share the same receiver.
#[derive(Clone)]
pub struct Channel(Arc<Mutex<mpsc::Receiver<Value>>>);

/// Sending end of a [`Channel`].
#[derive(Clone)]
pub struct ChannelSender(mpsc::Sender<Value>);

impl Channel {
    /// Creates a channel buffering up to `capacity` values.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    #[track_caller]
    #[must_use]
    pub fn bounded(capacity: usize) -> (ChannelSender, Self) {
        if capacity == 0 {
            usage_panic("channel capacity must be positive");
        }
        let (tx, rx) = mpsc::channel(capacity);
        (ChannelSender(tx), Self(Arc::new(Mutex::new(rx))))
    }

    /// Receives without blocking. Empty and closed channels both yield `None`.
    pub fn try_recv(&self) -> Option<Value> {
        match self.0.lock().try_recv() {
            Ok(value) => Some(value),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Number of buffered values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once every sender was dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.lock().is_closed()
    }

    /// Returns true if both handles share one receiver.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl ChannelSender {
    /// Buffers `value` without blocking.
    ///
    /// # Errors
    /// Returns an error if the buffer is full or the receiver is gone.
    pub fn send(&self, value: impl Into<Value>) -> Result<()> {
        self.0.try_send(value.into()).map_err(|e| match e {
            TrySendError::Full(_) => JustestError::Channel("channel is full".into()),
            TrySendError::Closed(_) => JustestError::Channel("channel is closed".into()),
        })
    }
}
