//! Property tests for in-band clear markers

use chrono::{DateTime, Local, TimeZone};
use logtail_core::pipeline::control::{CLEAR_BOTTOM_MARKER, CLEAR_MARKER, Frame, frames};
use logtail_core::{DisplayOptions, LinePipeline, SessionState};
use proptest::prelude::*;

fn at() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,8}", 0..8).prop_map(|lines| {
        lines
            .into_iter()
            .map(|l| format!("{l}\n"))
            .collect::<String>()
    })
}

fn plain() -> SessionState {
    SessionState::new(DisplayOptions {
        filter_duplicates: true,
        show_timestamp: false,
    })
}

proptest! {
    /// Property: a trailing full clear leaves every buffer empty
    #[test]
    fn full_clear_empties_buffers(before in text_strategy(), block in text_strategy()) {
        let pipeline = LinePipeline::default();
        let mut state = plain();
        pipeline.process(&mut state, &before, true, at());
        pipeline.process(&mut state, &format!("{block}{CLEAR_MARKER}"), true, at());

        prop_assert!(state.rendered_view().is_empty());
        prop_assert!(state.raw_buffer().is_empty());
        prop_assert_eq!(state.seen_count(), 0);
        prop_assert_eq!(state.offset(), 0);
    }

    /// Property: after a clear-to-end marker, earlier blocks survive and only
    /// content after the marker is added from the current block
    #[test]
    fn clear_bottom_keeps_prefix_and_tail(
        before in text_strategy(),
        dropped in text_strategy(),
        after in text_strategy(),
    ) {
        let pipeline = LinePipeline::new(Vec::<String>::new());
        let mut state = SessionState::new(DisplayOptions {
            filter_duplicates: false,
            show_timestamp: false,
        });
        pipeline.process(&mut state, &before, true, at());
        pipeline.process(&mut state, &format!("{dropped}{CLEAR_BOTTOM_MARKER}{after}"), true, at());

        prop_assert_eq!(state.rendered_view(), format!("{before}{after}"));
    }

    /// Property: framing removes markers and keeps all other text in order
    #[test]
    fn framing_preserves_text(parts in prop::collection::vec((text_strategy(), 0u8..3), 0..6)) {
        let mut block = String::new();
        let mut expected_text = String::new();
        for (text, marker) in &parts {
            block.push_str(text);
            expected_text.push_str(text);
            match marker {
                1 => block.push_str(CLEAR_MARKER),
                2 => block.push_str(CLEAR_BOTTOM_MARKER),
                _ => {}
            }
        }

        let rebuilt: String = frames(&block)
            .into_iter()
            .filter_map(|frame| match frame {
                Frame::Text(text) => Some(text),
                Frame::Clear | Frame::ClearBottom => None,
            })
            .collect();
        prop_assert_eq!(rebuilt, expected_text);
    }
}
