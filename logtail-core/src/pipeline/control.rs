//! In-band control markers
//!
//! Fetched text may carry two escape sequences that act on the buffers
//! instead of being displayed. They can appear anywhere in a block, so the
//! block is framed before it is split into lines.

/// Wipes the rendered view, the raw buffer and the duplicate set
pub const CLEAR_MARKER: &str = "\x1b[C]";

/// Wipes from the cursor to the end of the rendered view and raw buffer
pub const CLEAR_BOTTOM_MARKER: &str = "\x1b[CB]";

/// One piece of a framed block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// Ordinary text, possibly spanning several lines
    Text(&'a str),
    /// [`CLEAR_MARKER`]
    Clear,
    /// [`CLEAR_BOTTOM_MARKER`]
    ClearBottom,
}

/// Splits `block` into text and markers, in order of appearance.
///
/// Empty text between adjacent markers is not emitted.
#[must_use]
pub fn frames(block: &str) -> Vec<Frame<'_>> {
    let markers = [
        (CLEAR_MARKER, Frame::Clear),
        (CLEAR_BOTTOM_MARKER, Frame::ClearBottom),
    ];
    let mut out = Vec::new();
    let mut rest = block;

    loop {
        let next = markers
            .iter()
            .filter_map(|(marker, frame)| rest.find(marker).map(|idx| (idx, *marker, *frame)))
            .min_by_key(|(idx, _, _)| *idx);

        let Some((idx, marker, frame)) = next else {
            if !rest.is_empty() {
                out.push(Frame::Text(rest));
            }
            return out;
        };
        if idx > 0 {
            out.push(Frame::Text(&rest[..idx]));
        }
        out.push(frame);
        rest = &rest[idx + marker.len()..];
    }
}

/// True when `block` contains either marker
#[must_use]
pub fn has_markers(block: &str) -> bool {
    block.contains(CLEAR_MARKER) || block.contains(CLEAR_BOTTOM_MARKER)
}
