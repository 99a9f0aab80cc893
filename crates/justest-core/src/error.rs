//! Error types for justest-core.
//!
//! Assertion failures are not errors: they travel through [`crate::T::fatal`].
//! This enum covers configuration, misuse and value-resolution problems.

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, JustestError>;

/// Harness errors.
#[derive(Debug, thiserror::Error)]
pub enum JustestError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The harness was used incorrectly (always surfaced as a panic).
    #[error("usage error: {0}")]
    Usage(String),

    /// An actual value could not be resolved.
    #[error("Unsupported actual value: {0}")]
    Extract(String),

    /// Channel send failed.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Conversion between values and JSON failed.
    #[error("value conversion failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl JustestError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a usage error.
    #[must_use]
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Creates an extraction error.
    #[must_use]
    pub fn extract(msg: impl Into<String>) -> Self {
        Self::Extract(msg.into())
    }

    /// Returns true if this error indicates a programming mistake in the test.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

/// Raises a usage error. Misuse never degrades silently.
#[allow(clippy::panic)]
#[track_caller]
pub(crate) fn usage_panic(msg: impl Into<String>) -> ! {
    panic!("{}", JustestError::usage(msg))
}
