//! Continuous resync.
//!
//! Hosts often fill the call stack incrementally after the pause event, so a
//! pass taken at pause time can miss frames. A change listener on the located
//! widget notices growth and re-filters it directly, debounced.

use super::{Inner, UpdateGuard};
use crate::frame::StackFrame;
use crate::widget::{ListChange, ListWidget, ListenerId, WidgetRef};
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Listener registration on a widget
pub(super) struct AttachedListener<F> {
    widget: Weak<dyn ListWidget<F>>,
    id: ListenerId,
}

/// What a resync asks for afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResyncOutcome {
    Done,
    FullPass,
}

impl<F: StackFrame> Inner<F> {
    pub(super) fn attach_listener(&self, widget: &WidgetRef<F>) {
        self.detach_listener();
        let weak = self.weak_self.clone();
        let id = widget.add_change_listener(Rc::new(move |change| {
            if let Some(inner) = weak.upgrade() {
                inner.on_list_changed(change);
            }
        }));
        self.listener.replace(Some(AttachedListener {
            widget: Rc::downgrade(widget),
            id,
        }));
    }

    pub(super) fn detach_listener(&self) {
        let attached = self.listener.borrow_mut().take();
        if let Some(attached) = attached {
            if let Some(widget) = attached.widget.upgrade() {
                widget.remove_change_listener(attached.id);
            }
        }
    }

    fn on_list_changed(&self, change: ListChange) {
        if self.disposed.get() || !self.config.continuous_resync {
            return;
        }
        self.contained("list change", || {
            let Some(widget) = self.cached_live_widget() else {
                return;
            };
            let len = widget.len();
            let grew = self
                .cache
                .borrow()
                .as_ref()
                .is_some_and(|cache| cache.size_changed(len));
            if !grew {
                trace!(?change, len, "List size unchanged since last filter");
                return;
            }

            debug!(?change, len, "Call stack changed, scheduling resync");
            self.schedule_resync(self.config.resync_debounce());
        });
    }

    fn schedule_resync(&self, delay: std::time::Duration) {
        self.resync_alarm.cancel_all_requests();
        let weak = self.weak_self.clone();
        self.resync_alarm.add_request(delay, move || {
            if let Some(inner) = weak.upgrade() {
                inner.run_resync();
            }
        });
    }

    fn run_resync(&self) {
        if self.disposed.get() {
            return;
        }

        let outcome = {
            let Some(_guard) = UpdateGuard::acquire(&self.is_updating) else {
                debug!("Update in progress, deferring resync");
                self.bump(|stats| stats.deferred += 1);
                self.schedule_resync(self.config.busy_backoff());
                return;
            };
            self.contained("resync", || self.resync_body())
                .unwrap_or(ResyncOutcome::Done)
        };

        if outcome == ResyncOutcome::FullPass {
            self.schedule_pass(self.config.retry_delay());
        }
    }

    fn resync_body(&self) -> ResyncOutcome {
        if !self.settings.hide_enabled() {
            return ResyncOutcome::Done;
        }
        let Some(session) = self.host.active_session() else {
            return ResyncOutcome::Done;
        };
        let Some(widget) = self.cached_live_widget() else {
            return ResyncOutcome::FullPass;
        };

        match self.apply(&widget, session.as_ref()) {
            Ok(summary) => {
                debug!(?summary, "Resynced call stack");
                self.bump(|stats| stats.resyncs += 1);
                ResyncOutcome::Done
            }
            Err(err) => {
                debug!(%err, "Resync failed, falling back to a full pass");
                if err.invalidates_cache() {
                    self.drop_cache();
                }
                ResyncOutcome::FullPass
            }
        }
    }
}
