//! Property-based tests for filtered view guarantees

use proptest::prelude::*;
use stacksnack::frame::classifier::LibraryPatternSet;
use stacksnack::frame::DisplayFrame;
use stacksnack::views::{build_filtered_view, ViewSummary};

/// A frame with an id and whether it belongs to the project.
type Frame = (u32, bool);

fn is_project(frame: &Frame) -> bool {
    frame.1
}

/// Raw lists mixing frames and existing placeholders.
fn raw_list() -> impl Strategy<Value = Vec<DisplayFrame<Frame>>> {
    prop::collection::vec(
        prop_oneof![
            4 => (any::<u32>(), any::<bool>()).prop_map(DisplayFrame::Frame),
            1 => (1usize..6).prop_map(|count| DisplayFrame::hidden(count).unwrap()),
        ],
        0..40,
    )
}

#[test]
fn test_filtering_is_idempotent() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&raw_list(), |raw| {
            let once = build_filtered_view(&raw, is_project);
            let twice = build_filtered_view(&once, is_project);
            prop_assert_eq!(once, twice);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_project_frames_keep_identity_and_order() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&raw_list(), |raw| {
            let view = build_filtered_view(&raw, is_project);

            let expected: Vec<Frame> = raw
                .iter()
                .filter_map(|entry| entry.as_frame().copied())
                .filter(is_project)
                .collect();
            let retained: Vec<Frame> = view
                .iter()
                .filter_map(|entry| entry.as_frame().copied())
                .collect();
            prop_assert_eq!(retained, expected);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_no_adjacent_placeholders() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&raw_list(), |raw| {
            let view = build_filtered_view(&raw, is_project);
            for pair in view.windows(2) {
                prop_assert!(!(pair[0].is_placeholder() && pair[1].is_placeholder()));
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_frame_count_is_conserved() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&raw_list(), |raw| {
            let view = build_filtered_view(&raw, is_project);
            let before = ViewSummary::of(&raw);
            let after = ViewSummary::of(&view);

            prop_assert_eq!(after.total_frames(), before.total_frames());
            prop_assert_eq!(view.is_empty(), raw.is_empty());
            prop_assert!(after.placeholders <= after.visible_frames + 1);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_pattern_matching_ignores_case() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &("[a-z]{1,8}", "[a-zA-Z/]{0,12}", "[a-z]{1,8}"),
            |(library, prefix, file)| {
                let patterns = LibraryPatternSet::new([format!("{}/", library.to_uppercase())]);
                let path = format!("/{}/{}/{}.py", prefix, library, file);
                prop_assert!(patterns.matches(&path));
                prop_assert!(patterns.matches(&path.to_uppercase()));
                Ok(())
            },
        )
        .unwrap();
}
