//! Locating the call-stack list inside the host's component tree.

use super::{Component, ComponentRef, ListElement, ListWidget, WidgetRef};
use crate::frame::StackFrame;
use tracing::trace;

/// Depth-first search for the call-stack list widget
pub struct WidgetLocator;

impl WidgetLocator {
    /// Find the first showing list widget that looks like a call stack.
    ///
    /// Subtrees whose root is not showing are skipped entirely so stale or
    /// hidden panels never match. Only one call-stack list is expected to be
    /// visible per debugger tab, so the first match wins.
    pub fn find<F: StackFrame>(root: &ComponentRef<F>) -> Option<WidgetRef<F>> {
        Self::search(root.as_ref(), 0)
    }

    fn search<F: StackFrame>(component: &dyn Component<F>, depth: usize) -> Option<WidgetRef<F>> {
        if !component.is_showing() {
            return None;
        }

        if let Some(widget) = component.as_list_widget() {
            if is_frames_list(widget.as_ref()) {
                trace!(depth, size = widget.len(), "Found call stack list");
                return Some(widget);
            }
            // A list widget that is not the frame list has nothing below it
            // worth searching.
            return None;
        }

        component
            .children()
            .iter()
            .find_map(|child| Self::search(child.as_ref(), depth + 1))
    }
}

/// Structural check that a list widget holds stack frames.
///
/// Empty lists and lists holding a single null element do not qualify; the
/// first element must be a frame or a placeholder.
pub fn is_frames_list<F>(widget: &dyn ListWidget<F>) -> bool {
    let size = widget.len();
    if size == 0 {
        return false;
    }

    match widget.element_at(0) {
        ListElement::Entry(_) => true,
        ListElement::Null | ListElement::Foreign => false,
    }
}
