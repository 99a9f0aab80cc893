//! Call-site attribution.
//!
//! Assertion sites come from `#[track_caller]`; the function symbol and the
//! caller citation come from walking the stack and skipping harness frames.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use parking_lot::RwLock;

use super::source;
use crate::config::config;

/// Symbol prefixes that never count as user code.
const HARNESS_PREFIXES: &[&str] = &[
    "justest_core::",
    "justest_matchers::",
    "justest::",
    "std::",
    "core::",
    "alloc::",
    "backtrace::",
    "test::",
    "panic_unwind::",
];

/// Functions registered through [`crate::get_helper`].
static HELPERS: LazyLock<RwLock<Vec<String>>> = LazyLock::new(|| RwLock::new(Vec::new()));

/// A resolved source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Demangled function symbol, or `<unknown>`.
    pub function: String,
    /// Source file as recorded by the compiler or the debug info.
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// Trimmed text of the line, when the file is readable.
    pub source: Option<String>,
}

/// Identity of a location in the unevaluated registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocationKey {
    /// Function symbol.
    pub function: String,
    /// Source file.
    pub file: String,
    /// 1-based line.
    pub line: u32,
}

impl Location {
    /// Builds a location and echoes its source line. Absolute paths inside
    /// the workspace are shortened to the compiler's relative form.
    #[must_use]
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        let file = source::display_path(&file.into());
        let source = source::line(&file, line);
        Self {
            function: function.into(),
            file,
            line,
            source,
        }
    }

    /// Location of the caller, resolved through `#[track_caller]`.
    #[track_caller]
    #[must_use]
    pub fn caller() -> Self {
        let loc = std::panic::Location::caller();
        let function = frames()
            .into_iter()
            .find(|f| f.is_at(loc.file(), loc.line()))
            .map(|f| f.function)
            .unwrap_or_else(|| "<unknown>".to_string());
        Self::new(function, loc.file(), loc.line())
    }

    /// First stack frame that does not belong to the harness, a configured
    /// prefix, or a registered helper.
    #[must_use]
    pub fn nearest_user_frame() -> Option<Self> {
        let extra = config().stack_trace_skip_prefixes;
        let helpers = HELPERS.read().clone();
        frames().into_iter().find_map(|f| {
            if is_harness_symbol(&f.function, &extra) || is_helper(&f.function, &helpers) {
                return None;
            }
            let file = f.file?;
            let line = f.line?;
            Some(Self::new(f.function, file, line))
        })
    }

    /// Returns the registry key of this location.
    #[must_use]
    pub fn key(&self) -> LocationKey {
        LocationKey {
            function: self.function.clone(),
            file: self.file.clone(),
            line: self.line,
        }
    }

    /// Formats as `file:line -> source`.
    #[must_use]
    pub fn citation(&self) -> String {
        match &self.source {
            Some(src) => format!("{}:{} -> {}", self.file, self.line, src),
            None => format!("{}:{}", self.file, self.line),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Registers the nearest user function as a helper, so that failures are
/// attributed to its caller instead.
pub(crate) fn register_nearest_helper() {
    if let Some(loc) = Location::nearest_user_frame() {
        let mut helpers = HELPERS.write();
        if !helpers.contains(&loc.function) {
            tracing::debug!(function = %loc.function, "registered assertion helper");
            helpers.push(loc.function);
        }
    }
}

const CALLER_LINE: &str = "\n    Caller:    ";

/// Builds the two-line citation appended to assertion failures.
#[must_use]
pub fn citation_block(caller: Option<&Location>, assertion: &Location) -> String {
    let caller = caller.unwrap_or(assertion);
    format!(
        "{CALLER_LINE}{}\n    Assertion: {}",
        caller.citation(),
        assertion.citation()
    )
}

/// Returns true if `message` already carries a citation block.
#[must_use]
pub fn has_citation(message: &str) -> bool {
    message.contains(CALLER_LINE)
}

/// Appends a citation of the nearest user frame unless `message` has one.
#[must_use]
pub fn cite_nearest(message: String) -> String {
    if has_citation(&message) {
        return message;
    }
    match Location::nearest_user_frame() {
        Some(site) => format!("{message}{}", citation_block(None, &site)),
        None => message,
    }
}

/// Decides whether a demangled symbol belongs to harness internals.
///
/// `<A as B>::f` symbols are internal when either side is. Symbols without a
/// path (`main`, `_start`, thread trampolines) are never user frames. Frames
/// inside `::tests::` modules are always user frames.
#[must_use]
pub fn is_harness_symbol(symbol: &str, extra: &[String]) -> bool {
    if symbol.contains("::tests::") {
        return false;
    }
    if !symbol.contains("::") {
        return true;
    }
    let matches = |s: &str| {
        HARNESS_PREFIXES.iter().any(|p| s.starts_with(p))
            || extra.iter().any(|p| s.starts_with(p.as_str()))
    };
    match symbol.strip_prefix('<') {
        Some(rest) => match rest.split_once(" as ") {
            Some((self_ty, trait_path)) => matches(self_ty) || matches(trait_path),
            None => matches(rest),
        },
        None => matches(symbol),
    }
}

fn is_helper(symbol: &str, helpers: &[String]) -> bool {
    helpers
        .iter()
        .any(|h| symbol == h || symbol.strip_prefix(h.as_str()).is_some_and(|r| r.starts_with("::")))
}

struct Frame {
    function: String,
    file: Option<String>,
    line: Option<u32>,
}

impl Frame {
    fn is_at(&self, file: &str, line: u32) -> bool {
        self.line == Some(line)
            && self
                .file
                .as_deref()
                .is_some_and(|f| f == file || Path::new(f).ends_with(file))
    }
}

fn frames() -> Vec<Frame> {
    let mut frames = Vec::new();
    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            frames.push(Frame {
                function: symbol
                    .name()
                    .map(|n| format!("{n:#}"))
                    .unwrap_or_default(),
                file: symbol.filename().map(|p| p.display().to_string()),
                line: symbol.lineno(),
            });
        });
        true
    });
    frames
}
