//! Shared mutable cells.

use std::io;
use std::sync::Arc;

use parking_lot::RwLock;

use super::Value;

/// Shared, mutable indirection to a value. Clones alias the same cell.
#[derive(Clone)]
pub struct Pointer(Arc<RwLock<Value>>);

impl Pointer {
    /// Creates a cell holding `value`.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Returns a copy of the pointee.
    #[must_use]
    pub fn load(&self) -> Value {
        self.0.read().clone()
    }

    /// Replaces the pointee.
    pub fn store(&self, value: impl Into<Value>) {
        *self.0.write() = value.into();
    }

    /// Mutates the pointee in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        f(&mut self.0.write())
    }

    /// Returns true if both pointers alias the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Output sink whose content can be asserted on while it is being written.
///
/// Cloning shares the underlying bytes.
#[derive(Clone)]
pub struct Buffer(Pointer);

impl Buffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self(Pointer::new(Value::Bytes(Vec::new())))
    }

    /// Returns the pointer through which the buffer is asserted on.
    #[must_use]
    pub fn pointer(&self) -> Pointer {
        self.0.clone()
    }

    /// Returns a copy of the written bytes.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        match self.0.load() {
            Value::Bytes(b) => b,
            _ => Vec::new(),
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(|v| match v {
            Value::Bytes(bytes) => bytes.extend_from_slice(buf),
            other => *other = Value::Bytes(buf.to_vec()),
        });
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
