//! Line post-processing
//!
//! Turns fetched text into rendered lines: control markers first, then per
//! line the ignore rule, timestamp normalization, duplicate filtering and
//! timestamp application. The raw buffer always keeps a timestamped copy so a
//! display flag change can regenerate the view without fetching again.

pub mod control;
pub mod timestamp;

use chrono::{DateTime, Local};

use crate::session::SessionState;

use control::Frame;

/// How the rendered view changed after a pipeline call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewChange {
    /// Nothing was rendered
    Unchanged,
    /// These lines were appended to the view
    Appended(Vec<String>),
    /// The view was rewritten; this is its full new text
    Replaced(String),
}

impl ViewChange {
    /// True when the view did not change
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Applies display policy to fetched content
#[derive(Debug, Clone, Default)]
pub struct LinePipeline {
    ignore_patterns: Vec<String>,
}

impl LinePipeline {
    /// Creates a pipeline dropping lines that contain any of `ignore_patterns`.
    ///
    /// Empty patterns are discarded, they would match every line.
    #[must_use]
    pub fn new(ignore_patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            ignore_patterns: ignore_patterns
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// Configured ignore substrings
    #[must_use]
    pub fn ignore_patterns(&self) -> &[String] {
        &self.ignore_patterns
    }

    fn is_ignored(&self, line: &str) -> bool {
        self.ignore_patterns.iter().any(|p| line.contains(p.as_str()))
    }

    /// Processes a fetched block (or a single stored line).
    ///
    /// With `persist_to_raw` every emitted line is also appended to the raw
    /// buffer with a timestamp, whatever the current timestamp flag.
    pub fn process(
        &self,
        state: &mut SessionState,
        content: &str,
        persist_to_raw: bool,
        now: DateTime<Local>,
    ) -> ViewChange {
        let stamp = timestamp::format(now);
        // the cursor sits where the view ended before this block
        let mut view_mark = state.rendered_view.len();
        let mut raw_mark = state.raw_buffer.len();
        // duplicate keys recorded since the cursor
        let mut marked_seen: Vec<String> = Vec::new();
        let mut appended = Vec::new();
        let mut rewritten = false;

        for frame in control::frames(content) {
            match frame {
                Frame::Clear => {
                    state.rendered_view.clear();
                    state.raw_buffer.clear();
                    state.seen_lines.clear();
                    view_mark = 0;
                    raw_mark = 0;
                    marked_seen.clear();
                    appended.clear();
                    rewritten = true;
                }
                Frame::ClearBottom => {
                    state.rendered_view.truncate(view_mark);
                    state.raw_buffer.truncate(raw_mark);
                    for key in marked_seen.drain(..) {
                        state.seen_lines.remove(&key);
                    }
                    appended.clear();
                    rewritten = true;
                }
                Frame::Text(text) => {
                    for line in text.split('\n') {
                        if self.is_ignored(line) {
                            continue;
                        }
                        if let Some(rendered) = emit_line(state, line, persist_to_raw, &stamp) {
                            if state.display.filter_duplicates {
                                marked_seen.push(timestamp::strip_prefix(line).to_string());
                            }
                            appended.push(rendered);
                        }
                    }
                }
            }
        }

        if rewritten {
            ViewChange::Replaced(state.rendered_view.clone())
        } else if appended.is_empty() {
            ViewChange::Unchanged
        } else {
            ViewChange::Appended(appended)
        }
    }

    /// Regenerates the rendered view from the raw buffer with the current
    /// flags. The raw buffer itself is left untouched.
    pub fn reprocess(&self, state: &mut SessionState, now: DateTime<Local>) -> ViewChange {
        let stamp = timestamp::format(now);
        state.rendered_view.clear();
        state.seen_lines.clear();

        let raw = std::mem::take(&mut state.raw_buffer);
        for line in raw.lines() {
            emit_line(state, line, false, &stamp);
        }
        state.raw_buffer = raw;

        ViewChange::Replaced(state.rendered_view.clone())
    }
}

/// Normalizes, filters and renders one line. Returns the rendered text
/// (without newline) when the line was emitted.
///
/// The raw copy is written before duplicate filtering, so a repeat hidden
/// from the view can come back once filtering is turned off.
fn emit_line(
    state: &mut SessionState,
    line: &str,
    persist_to_raw: bool,
    stamp: &str,
) -> Option<String> {
    let content = timestamp::strip_prefix(line);
    if content.is_empty() {
        return None;
    }
    if persist_to_raw {
        state.raw_buffer.push_str(stamp);
        state.raw_buffer.push(' ');
        state.raw_buffer.push_str(content);
        state.raw_buffer.push('\n');
    }
    if state.display.filter_duplicates && !state.seen_lines.insert(content.to_string()) {
        return None;
    }

    let rendered = if state.display.show_timestamp {
        format!("{stamp} {content}")
    } else {
        content.to_string()
    };
    state.rendered_view.push_str(&rendered);
    state.rendered_view.push('\n');
    Some(rendered)
}
