//! Non-owning cache of the located call-stack widget.

use super::{ListWidget, WidgetRef};
use crate::frame::StackFrame;
use crate::host::TabId;
use std::rc::{Rc, Weak};

/// Weak reference to the call-stack list plus the list size recorded after
/// the last successful filter pass.
///
/// The cache never keeps the widget alive; a widget that was dropped or is
/// no longer showing reads as absent.
pub struct CachedWidgetRef<F> {
    widget: Weak<dyn ListWidget<F>>,
    tab: Option<TabId>,
    last_filtered_len: Option<usize>,
}

impl<F: StackFrame> CachedWidgetRef<F> {
    pub fn new(widget: &WidgetRef<F>, tab: Option<TabId>) -> Self {
        Self {
            widget: Rc::downgrade(widget),
            tab,
            last_filtered_len: None,
        }
    }

    /// The widget, if it still exists and is on screen.
    pub fn live(&self) -> Option<WidgetRef<F>> {
        self.widget.upgrade().filter(|widget| widget.is_showing())
    }

    /// The widget if it still exists, showing or not.
    pub fn upgrade(&self) -> Option<WidgetRef<F>> {
        self.widget.upgrade()
    }

    pub fn is_same(&self, widget: &WidgetRef<F>) -> bool {
        self.widget
            .upgrade()
            .is_some_and(|cached| Rc::ptr_eq(&cached, widget))
    }

    pub fn tab(&self) -> Option<TabId> {
        self.tab
    }

    pub fn last_filtered_len(&self) -> Option<usize> {
        self.last_filtered_len
    }

    pub fn record_filtered_len(&mut self, len: usize) {
        self.last_filtered_len = Some(len);
    }

    /// Whether the list size differs from what the last pass left behind.
    pub fn size_changed(&self, current_len: usize) -> bool {
        self.last_filtered_len != Some(current_len)
    }
}
