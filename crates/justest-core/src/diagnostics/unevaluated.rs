//! Registry of assertions that were built but never evaluated.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use parking_lot::Mutex;

use super::location::{Location, LocationKey};
use super::source;
use super::theme::Theme;

/// Lines of context shown around an unevaluated statement.
const SNIPPET_CONTEXT: u32 = 2;

/// Header of the unevaluated-assertion report.
pub const UNEVALUATED_HEADER: &str = "There were unevaluated test statements";

/// Per-root map from location to pending assertion count.
#[derive(Debug, Default)]
pub struct UnevaluatedRegistry {
    entries: Mutex<BTreeMap<LocationKey, (Location, usize)>>,
}

impl UnevaluatedRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly built assertion.
    pub fn insert(&self, location: &Location) {
        let mut entries = self.entries.lock();
        entries
            .entry(location.key())
            .and_modify(|(_, count)| *count += 1)
            .or_insert_with(|| (location.clone(), 1));
    }

    /// Marks one assertion at `location` as evaluated.
    pub fn remove(&self, location: &Location) {
        let mut entries = self.entries.lock();
        let key = location.key();
        if let Some((_, count)) = entries.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                entries.remove(&key);
            }
        }
    }

    /// Returns the number of pending assertions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().values().map(|(_, n)| n).sum()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drains the registry into a report, or `None` if nothing was pending.
    /// `theme` enables ANSI coloring of the source snippets.
    #[must_use]
    pub fn drain_report(&self, theme: Option<Theme>) -> Option<String> {
        let pending = std::mem::take(&mut *self.entries.lock());
        if pending.is_empty() {
            return None;
        }

        let mut report = format!("{UNEVALUATED_HEADER}:\n");
        for (location, count) in pending.into_values() {
            let times = if count > 1 {
                format!(" ({count} times)")
            } else {
                String::new()
            };
            let _ = writeln!(
                report,
                "  {}:{} in {}{times}",
                location.file, location.line, location.function
            );
            let snippet = source::snippet(&location.file, location.line, SNIPPET_CONTEXT);
            if snippet.is_empty() {
                if let Some(src) = &location.source {
                    let _ = writeln!(report, "    > {src}");
                }
                continue;
            }
            let width = snippet.last().map_or(1, |(n, _)| n.to_string().len());
            for (n, text) in snippet {
                let marker = if n == location.line { ">" } else { " " };
                let gutter = format!("{n:>width$} |");
                let _ = match theme {
                    Some(theme) => writeln!(
                        report,
                        "  {} {} {}",
                        theme.marker(marker),
                        theme.gutter(&gutter),
                        theme.highlight(&text)
                    ),
                    None => writeln!(report, "  {marker} {gutter} {text}"),
                };
            }
        }
        Some(report)
    }
}
