//! Light/dark syntax themes for unevaluated-assertion snippets.
//!
//! Detection runs once, off-thread, and gives up quickly: a slow or missing
//! OS query falls back to the light theme.

use std::process::Command;
use std::sync::OnceLock;
use std::sync::mpsc;
use std::time::Duration;

use crate::config::{DarkMode, config};

const DETECTION_TIMEOUT: Duration = Duration::from_millis(250);

const RESET: &str = "\x1b[0m";

/// Rust keywords highlighted in snippets.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "else", "enum", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "true", "use", "where", "while", "Some", "None", "Ok",
    "Err",
];

/// Snippet theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Dark text on light background.
    Light,
    /// Light text on dark background.
    Dark,
}

struct Palette {
    keyword: &'static str,
    string: &'static str,
    number: &'static str,
    comment: &'static str,
    gutter: &'static str,
    marker: &'static str,
}

impl Theme {
    const fn palette(self) -> Palette {
        match self {
            Self::Light => Palette {
                keyword: "\x1b[34m",
                string: "\x1b[32m",
                number: "\x1b[35m",
                comment: "\x1b[90m",
                gutter: "\x1b[90m",
                marker: "\x1b[31;1m",
            },
            Self::Dark => Palette {
                keyword: "\x1b[94m",
                string: "\x1b[92m",
                number: "\x1b[95m",
                comment: "\x1b[37m",
                gutter: "\x1b[37m",
                marker: "\x1b[91;1m",
            },
        }
    }

    /// Colors a gutter (line number column).
    #[must_use]
    pub fn gutter(self, text: &str) -> String {
        format!("{}{text}{RESET}", self.palette().gutter)
    }

    /// Colors the marker that points at the offending line.
    #[must_use]
    pub fn marker(self, text: &str) -> String {
        format!("{}{text}{RESET}", self.palette().marker)
    }

    /// Highlights a single line of Rust source.
    #[must_use]
    pub fn highlight(self, line: &str) -> String {
        let p = self.palette();
        let chars: Vec<char> = line.chars().collect();
        let mut out = String::with_capacity(line.len() * 2);
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == '/' && chars.get(i + 1) == Some(&'/') {
                let rest: String = chars[i..].iter().collect();
                out.push_str(&format!("{}{rest}{RESET}", p.comment));
                break;
            }
            if c == '"' {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
                let end = (i + 1).min(chars.len());
                let lit: String = chars[start..end].iter().collect();
                out.push_str(&format!("{}{lit}{RESET}", p.string));
                i = end;
                continue;
            }
            if c.is_ascii_digit() {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
                    i += 1;
                }
                let num: String = chars[start..i].iter().collect();
                out.push_str(&format!("{}{num}{RESET}", p.number));
                continue;
            }
            if c.is_alphabetic() || c == '_' {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if KEYWORDS.contains(&word.as_str()) {
                    out.push_str(&format!("{}{word}{RESET}", p.keyword));
                } else {
                    out.push_str(&word);
                }
                continue;
            }
            out.push(c);
            i += 1;
        }
        out
    }
}

/// Returns the theme selected by configuration.
#[must_use]
pub fn current() -> Theme {
    match config().dark_mode {
        DarkMode::ForceLight => Theme::Light,
        DarkMode::ForceDark => Theme::Dark,
        DarkMode::Auto => detected(),
    }
}

fn detected() -> Theme {
    static DETECTED: OnceLock<Theme> = OnceLock::new();
    *DETECTED.get_or_init(|| {
        let (tx, rx) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("justest-theme".into())
            .spawn(move || {
                let _ = tx.send(query_os_dark_mode());
            });
        if let Err(e) = spawned {
            tracing::debug!(error = %e, "theme detection thread failed to start");
            return Theme::Light;
        }
        match rx.recv_timeout(DETECTION_TIMEOUT) {
            Ok(true) => Theme::Dark,
            Ok(false) => Theme::Light,
            Err(_) => {
                tracing::debug!("theme detection timed out, using light theme");
                Theme::Light
            }
        }
    })
}

#[cfg(target_os = "macos")]
fn query_os_dark_mode() -> bool {
    Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).contains("Dark"))
        .unwrap_or(false)
}

#[cfg(not(target_os = "macos"))]
fn query_os_dark_mode() -> bool {
    Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "color-scheme"])
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).contains("dark"))
        .unwrap_or(false)
}
