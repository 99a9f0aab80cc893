//! Harness configuration.
//!
//! Validated at load time, with sensible defaults. Installed process-wide
//! through [`configure`] and read back with [`config`].

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{JustestError, Result};

/// Syntax theme selection for unevaluated-assertion snippets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DarkMode {
    /// Query the OS appearance once, falling back to light.
    #[default]
    Auto,
    /// Always use the light theme.
    ForceLight,
    /// Always use the dark theme.
    ForceDark,
}

/// Signals that raise the interrupt flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterruptSignal {
    /// SIGINT.
    #[serde(alias = "SIGINT")]
    Int,
    /// SIGTERM.
    #[serde(alias = "SIGTERM")]
    Term,
    /// SIGQUIT.
    #[serde(alias = "SIGQUIT")]
    Quit,
    /// SIGHUP.
    #[serde(alias = "SIGHUP")]
    Hup,
    /// SIGKILL. Accepted, but no process can observe it.
    #[serde(alias = "SIGKILL")]
    Kill,
}

impl InterruptSignal {
    /// Returns the conventional signal name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Int => "SIGINT",
            Self::Term => "SIGTERM",
            Self::Quit => "SIGQUIT",
            Self::Hup => "SIGHUP",
            Self::Kill => "SIGKILL",
        }
    }

    /// Returns the POSIX signal number.
    #[must_use]
    pub const fn number(&self) -> i32 {
        match self {
            Self::Hup => 1,
            Self::Int => 2,
            Self::Quit => 3,
            Self::Kill => 9,
            Self::Term => 15,
        }
    }

    /// Maps a POSIX signal number back to a known signal.
    #[must_use]
    pub const fn from_number(number: i32) -> Option<Self> {
        match number {
            1 => Some(Self::Hup),
            2 => Some(Self::Int),
            3 => Some(Self::Quit),
            9 => Some(Self::Kill),
            15 => Some(Self::Term),
            _ => None,
        }
    }
}

impl std::fmt::Display for InterruptSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Theme selection for colorized snippets.
    #[serde(default)]
    pub dark_mode: DarkMode,

    /// Signals that cancel in-flight eventual assertions.
    #[serde(default = "default_interrupt_signals")]
    pub interrupt_signals: Vec<InterruptSignal>,

    /// Extra symbol prefixes skipped when attributing failures to user code.
    #[serde(default)]
    pub stack_trace_skip_prefixes: Vec<String>,

    /// Default window for `Eventually` when none is given.
    #[serde(default = "default_within", with = "humantime_duration")]
    pub default_within: Duration,

    /// Default probing interval for `Eventually` when none is given.
    #[serde(default = "default_interval", with = "humantime_duration")]
    pub default_interval: Duration,
}

fn default_interrupt_signals() -> Vec<InterruptSignal> {
    vec![InterruptSignal::Int, InterruptSignal::Kill]
}

fn default_within() -> Duration {
    Duration::from_secs(10)
}

fn default_interval() -> Duration {
    Duration::from_millis(100)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dark_mode: DarkMode::default(),
            interrupt_signals: default_interrupt_signals(),
            stack_trace_skip_prefixes: Vec::new(),
            default_within: default_within(),
            default_interval: default_interval(),
        }
    }
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.default_within.is_zero() {
            return Err(JustestError::config("default-within must be positive"));
        }
        if self.default_interval.is_zero() {
            return Err(JustestError::config("default-interval must be positive"));
        }
        if self.default_interval > self.default_within {
            return Err(JustestError::config(
                "default-interval cannot exceed default-within",
            ));
        }
        if let Some(empty) = self
            .stack_trace_skip_prefixes
            .iter()
            .find(|p| p.trim().is_empty())
        {
            return Err(JustestError::config(format!(
                "stack-trace-skip-prefixes cannot contain blank entries: {empty:?}"
            )));
        }
        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    /// Returns an error if the text cannot be parsed or is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| JustestError::config(format!("failed to read config: {e}")))?;
        Self::from_toml_str(&content)
    }
}

static CONFIG: LazyLock<RwLock<Config>> = LazyLock::new(|| RwLock::new(Config::default()));

/// Installs the process-wide configuration.
///
/// # Errors
/// Returns an error if the configuration is invalid; the previous one stays.
pub fn configure(config: Config) -> Result<()> {
    config.validate()?;
    tracing::debug!(?config, "installing justest configuration");
    *CONFIG.write() = config;
    Ok(())
}

/// Returns a snapshot of the process-wide configuration.
#[must_use]
pub fn config() -> Config {
    CONFIG.read().clone()
}

mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*d).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
