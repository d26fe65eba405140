//! Filtered Views
//!
//! Collapses runs of library frames into placeholders. The transformation is
//! idempotent: feeding an already filtered list back in (placeholders and all)
//! yields the same list, which matters because list listeners re-trigger
//! filtering on lists this module produced.

use crate::frame::{DisplayFrame, HiddenFrames};

/// Build the collapsed view of `raw`.
///
/// `is_project` is asked only about real frames; existing placeholders
/// contribute their count and are never re-classified. Retained frames keep
/// their relative order and identity. The output never holds two adjacent
/// placeholders. An empty input yields an empty output, which callers treat
/// as "not ready" rather than as a valid view.
pub fn build_filtered_view<F, P>(raw: &[DisplayFrame<F>], mut is_project: P) -> Vec<DisplayFrame<F>>
where
    F: Clone,
    P: FnMut(&F) -> bool,
{
    let mut view: Vec<DisplayFrame<F>> = Vec::with_capacity(raw.len());
    let mut pending: Option<HiddenFrames> = None;

    for entry in raw {
        let hidden = match entry {
            DisplayFrame::Hidden(hidden) => *hidden,
            DisplayFrame::Frame(frame) if is_project(frame) => {
                if let Some(placeholder) = pending.take() {
                    view.push(DisplayFrame::Hidden(placeholder));
                }
                view.push(DisplayFrame::Frame(frame.clone()));
                continue;
            }
            DisplayFrame::Frame(_) => HiddenFrames::ONE,
        };
        pending = Some(match pending {
            Some(run) => run.merged(hidden),
            None => hidden,
        });
    }

    if let Some(trailing) = pending {
        view.push(DisplayFrame::Hidden(trailing));
    }

    view
}

/// Totals of a built view, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewSummary {
    pub visible_frames: usize,
    pub placeholders: usize,
    pub hidden_frames: usize,
}

impl ViewSummary {
    pub fn of<F>(view: &[DisplayFrame<F>]) -> Self {
        view.iter().fold(Self::default(), |mut summary, entry| {
            match entry {
                DisplayFrame::Frame(_) => summary.visible_frames += 1,
                DisplayFrame::Hidden(hidden) => {
                    summary.placeholders += 1;
                    summary.hidden_frames += hidden.count();
                }
            }
            summary
        })
    }

    /// Total frames represented, hidden or not.
    pub fn total_frames(&self) -> usize {
        self.visible_frames + self.hidden_frames
    }
}
