//! `[YYYY-MM-DD HH:mm:ss]` line prefixes.

use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;

/// Format of the bracketed prefix (without brackets)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\]")
        .expect("PREFIX_REGEX is a valid regex pattern")
});

/// Returns the content of `line` without a leading timestamp prefix, trimmed
#[must_use]
pub fn strip_prefix(line: &str) -> &str {
    match PREFIX_REGEX.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

/// True when `line` starts with a timestamp prefix
#[must_use]
pub fn has_prefix(line: &str) -> bool {
    PREFIX_REGEX.is_match(line)
}

/// Formats `now` as `[YYYY-MM-DD HH:mm:ss]`
#[must_use]
pub fn format(now: DateTime<Local>) -> String {
    format!("[{}]", now.format(TIMESTAMP_FORMAT))
}
