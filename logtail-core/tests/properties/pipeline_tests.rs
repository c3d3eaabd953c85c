//! Property tests for line rendering and reprocessing

use std::collections::HashSet;

use chrono::{DateTime, Local, TimeZone};
use logtail_core::pipeline::timestamp;
use logtail_core::{DisplayOptions, LinePipeline, SessionState};
use proptest::prelude::*;

fn at(secs: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, 1, 12, 0, secs).unwrap()
}

/// Lines of printable text, some of them blank or carrying an old stamp
fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}( [a-z]{1,6}){0,2}",
        "[a-c]{1,2}".prop_map(|s| format!("[2023-01-01 00:00:00] {s}")),
        Just(String::new()),
        Just("   ".to_string()),
    ]
}

fn block_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(line_strategy(), 0..30).prop_map(|lines| {
        let mut block = lines.join("\n");
        block.push('\n');
        block
    })
}

fn display_strategy() -> impl Strategy<Value = DisplayOptions> {
    (any::<bool>(), any::<bool>()).prop_map(|(filter_duplicates, show_timestamp)| {
        DisplayOptions {
            filter_duplicates,
            show_timestamp,
        }
    })
}

proptest! {
    /// Property: reprocessing twice with the same flags gives the same view
    #[test]
    fn reprocess_is_idempotent(block in block_strategy(), display in display_strategy()) {
        let pipeline = LinePipeline::default();
        let mut state = SessionState::new(display);
        pipeline.process(&mut state, &block, true, at(0));

        pipeline.reprocess(&mut state, at(1));
        let first = state.rendered_view().to_string();
        pipeline.reprocess(&mut state, at(1));
        prop_assert_eq!(state.rendered_view(), first.as_str());
    }

    /// Property: with filtering on, no content is rendered twice and nothing
    /// blank is rendered at all
    #[test]
    fn filtered_view_has_unique_nonblank_content(block in block_strategy()) {
        let pipeline = LinePipeline::default();
        let mut state = SessionState::new(DisplayOptions {
            filter_duplicates: true,
            show_timestamp: true,
        });
        pipeline.process(&mut state, &block, true, at(0));

        let mut seen = HashSet::new();
        for line in state.rendered_lines() {
            let content = timestamp::strip_prefix(line);
            prop_assert!(!content.is_empty());
            prop_assert!(seen.insert(content.to_string()), "duplicate {:?}", content);
        }
        prop_assert_eq!(seen.len(), state.seen_count());
    }

    /// Property: the raw buffer never depends on the display flags, duplicate
    /// filtering included
    #[test]
    fn raw_buffer_ignores_display_flags(
        block in block_strategy(),
        first in display_strategy(),
        second in display_strategy(),
    ) {
        let pipeline = LinePipeline::default();
        let mut shown = SessionState::new(first);
        let mut hidden = SessionState::new(second);
        pipeline.process(&mut shown, &block, true, at(0));
        pipeline.process(&mut hidden, &block, true, at(0));

        prop_assert_eq!(shown.raw_buffer(), hidden.raw_buffer());
        for line in shown.raw_buffer().lines() {
            prop_assert!(timestamp::has_prefix(line));
        }
    }

    /// Property: hiding then showing timestamps stamps every line with the
    /// time of the toggle
    #[test]
    fn timestamp_toggle_round_trip(block in block_strategy()) {
        let pipeline = LinePipeline::default();
        let mut state = SessionState::new(DisplayOptions { filter_duplicates: false, show_timestamp: true });
        pipeline.process(&mut state, &block, true, at(0));
        let count = state.rendered_lines().len();

        state.set_display(DisplayOptions { filter_duplicates: false, show_timestamp: false });
        pipeline.reprocess(&mut state, at(10));
        for line in state.rendered_lines() {
            prop_assert!(!timestamp::has_prefix(line));
        }

        state.set_display(DisplayOptions { filter_duplicates: false, show_timestamp: true });
        pipeline.reprocess(&mut state, at(20));
        prop_assert_eq!(state.rendered_lines().len(), count);
        for line in state.rendered_lines() {
            prop_assert!(line.starts_with("[2024-06-01 12:00:20] "));
        }
    }

    /// Property: the same content arriving with two different stamps is
    /// dropped when filtering, kept when not
    #[test]
    fn duplicates_are_recognized_across_stamps(content in "[a-z]{1,10}", filter in any::<bool>()) {
        let pipeline = LinePipeline::default();
        let mut state = SessionState::new(DisplayOptions { filter_duplicates: filter, show_timestamp: false });
        pipeline.process(&mut state, &format!("[2024-01-01 00:00:00] {content}\n"), true, at(0));
        pipeline.process(&mut state, &format!("[2024-01-01 00:00:09] {content}\n"), true, at(1));

        let expected = if filter { 1 } else { 2 };
        prop_assert_eq!(state.rendered_lines().len(), expected);
    }
}
