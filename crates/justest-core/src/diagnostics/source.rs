//! Source line echo for failure citations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

type Lines = Option<Arc<Vec<String>>>;

static CACHE: LazyLock<Mutex<HashMap<String, Lines>>> = LazyLock::new(|| Mutex::new(HashMap::new()));

/// Outermost ancestor of the working directory holding a `Cargo.toml`.
static WORKSPACE_ROOT: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .filter(|dir| dir.join("Cargo.toml").is_file())
        .last()
        .map(Path::to_path_buf)
});

/// Renders `file` the way the compiler records workspace paths: relative to
/// the workspace root when it lies inside it, unchanged otherwise.
#[must_use]
pub fn display_path(file: &str) -> String {
    let path = Path::new(file);
    if !path.is_absolute() {
        return file.to_string();
    }
    WORKSPACE_ROOT
        .as_deref()
        .and_then(|root| path.strip_prefix(root).ok())
        .map_or_else(|| file.to_string(), |rel| rel.display().to_string())
}

/// Returns the trimmed text of `line` (1-based) in `file`.
#[must_use]
pub fn line(file: &str, line: u32) -> Option<String> {
    let lines = lines(file)?;
    let idx = usize::try_from(line).ok()?.checked_sub(1)?;
    lines.get(idx).map(|l| l.trim().to_string())
}

/// Returns up to `context` lines on each side of `line`, untrimmed, with
/// their 1-based numbers.
#[must_use]
pub fn snippet(file: &str, line: u32, context: u32) -> Vec<(u32, String)> {
    let Some(lines) = lines(file) else {
        return Vec::new();
    };
    let first = line.saturating_sub(context).max(1);
    let last = line.saturating_add(context);
    (first..=last)
        .filter_map(|n| {
            let idx = usize::try_from(n).ok()?.checked_sub(1)?;
            lines.get(idx).map(|l| (n, l.clone()))
        })
        .collect()
}

fn lines(file: &str) -> Lines {
    let mut cache = CACHE.lock();
    if let Some(cached) = cache.get(file) {
        return cached.clone();
    }
    let loaded = resolve(file).and_then(|path| match std::fs::read_to_string(&path) {
        Ok(content) => Some(Arc::new(content.lines().map(str::to_string).collect())),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read source file");
            None
        }
    });
    cache.insert(file.to_string(), loaded.clone());
    loaded
}

/// Compiler paths are relative to the workspace root while tests run from
/// the package directory, so relative paths are tried against every
/// ancestor of the working directory.
fn resolve(file: &str) -> Option<PathBuf> {
    let path = Path::new(file);
    if path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(path))
        .find(|candidate| candidate.is_file())
}
