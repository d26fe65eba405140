//! One reconciliation pass: locate the widget, build the view, write it back.

use super::{Inner, PassStats, UpdateGuard};
use crate::error::ReconcileError;
use crate::frame::classifier::FrameClassifier;
use crate::frame::{DisplayFrame, StackFrame};
use crate::host::{DebugSession, PanelId, TabId, ToolWindowRef};
use crate::views::{build_filtered_view, ViewSummary};
use crate::widget::{
    install_placeholder_renderer, read_entries, CachedWidgetRef, WidgetLocator, WidgetRef,
};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Panel preference order
const PANELS: [PanelId; 2] = [PanelId::Services, PanelId::Debug];

/// What happens after a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PassOutcome {
    Idle,
    Retry,
}

impl<F: StackFrame> Inner<F> {
    pub(super) fn run_pass(&self) {
        if self.disposed.get() {
            return;
        }

        let outcome = {
            let Some(_guard) = UpdateGuard::acquire(&self.is_updating) else {
                // Re-entered from inside a running pass; defers via the busy path.
                self.schedule_pass(self.config.retry_delay());
                return;
            };
            self.bump(|stats| stats.passes += 1);
            self.contained("reconciliation pass", || self.pass_body())
                .unwrap_or(PassOutcome::Idle)
        };

        if outcome == PassOutcome::Retry {
            debug!(
                attempt = self.retry_count.get(),
                "Call stack not ready, retrying"
            );
            self.schedule_pass(self.config.retry_delay());
        }
    }

    fn pass_body(&self) -> PassOutcome {
        if self.host.is_disposed() {
            debug!("Host disposed, skipping update");
            return PassOutcome::Idle;
        }

        let Some(session) = self.host.active_session() else {
            debug!("No active debug session");
            self.retry_count.set(0);
            return PassOutcome::Idle;
        };

        if !self.settings.hide_enabled() {
            debug!("Frame hiding disabled");
            return PassOutcome::Idle;
        }

        let Some(window) = self.resolve_panel() else {
            debug!("Neither services nor debug panel is visible");
            return PassOutcome::Idle;
        };

        let tab = window.selected_tab();
        if let Some(widget) = self.cached_widget_on(tab) {
            match self.apply(&widget, session.as_ref()) {
                Ok(summary) => {
                    debug!(?summary, "Refiltered cached call stack");
                    self.retry_count.set(0);
                    return PassOutcome::Idle;
                }
                Err(err) => {
                    debug!(%err, "Cached call stack failed, searching again");
                    self.drop_cache();
                }
            }
        }

        let found = window
            .selected_content()
            .and_then(|root| WidgetLocator::find(&root));

        let result = match found {
            Some(widget) => {
                self.cache
                    .replace(Some(CachedWidgetRef::new(&widget, tab)));
                self.apply(&widget, session.as_ref())
            }
            None => Err(ReconcileError::NotReady(
                "call stack list not found".to_string(),
            )),
        };

        match result {
            Ok(summary) => {
                info!(
                    visible = summary.visible_frames,
                    hidden = summary.hidden_frames,
                    placeholders = summary.placeholders,
                    "Filtered call stack"
                );
                self.retry_count.set(0);
                PassOutcome::Idle
            }
            Err(err) => self.record_failure(err),
        }
    }

    fn record_failure(&self, err: ReconcileError) -> PassOutcome {
        if err.invalidates_cache() {
            self.drop_cache();
        }

        if !err.is_retryable() {
            warn!(%err, "Call stack update failed, waiting for next trigger");
            self.retry_count.set(0);
            return PassOutcome::Idle;
        }

        self.bump(|stats| stats.failed_attempts += 1);
        let attempts = self.retry_count.get() + 1;
        if attempts >= self.config.max_retries {
            info!(attempts, %err, "Giving up on call stack update");
            self.retry_count.set(0);
            self.bump(|stats: &mut PassStats| stats.gave_up += 1);
            return PassOutcome::Idle;
        }

        self.retry_count.set(attempts);
        PassOutcome::Retry
    }

    fn resolve_panel(&self) -> Option<ToolWindowRef<F>> {
        PANELS.into_iter().find_map(|panel| {
            self.host
                .tool_window(panel)
                .filter(|window| window.is_visible())
        })
    }

    /// The cached widget, provided it was found under the selected `tab`.
    fn cached_widget_on(&self, tab: Option<TabId>) -> Option<WidgetRef<F>> {
        let cached_tab = self.cache.borrow().as_ref().map(|cache| cache.tab())?;
        if cached_tab != tab {
            debug!(?cached_tab, ?tab, "Debugger tab switched, dropping cached call stack");
            self.drop_cache();
            return None;
        }
        self.cached_live_widget()
    }

    pub(super) fn cached_live_widget(&self) -> Option<WidgetRef<F>> {
        let widget = self.cache.borrow().as_ref().and_then(|cache| cache.upgrade())?;
        widget.is_showing().then_some(widget)
    }

    /// Build the filtered view of `widget` and write it back.
    pub(super) fn apply(
        &self,
        widget: &WidgetRef<F>,
        session: &dyn DebugSession<F>,
    ) -> Result<ViewSummary, ReconcileError> {
        let raw = read_entries(widget.as_ref());
        if raw.is_empty() {
            return Err(ReconcileError::NotReady("call stack list is empty".to_string()));
        }

        let project_root = self.host.project_root();
        let classifier =
            FrameClassifier::from_settings(self.settings.as_ref(), project_root.as_deref());
        let view = build_filtered_view(&raw, |frame| classifier.is_project_frame(frame));
        if view.is_empty() {
            return Err(ReconcileError::NotReady("filtered view is empty".to_string()));
        }
        let summary = ViewSummary::of(&view);

        install_placeholder_renderer(widget.as_ref());

        // Placeholders carry no identity, so a placeholder selection stays put.
        let selection = match session.current_frame() {
            Some(DisplayFrame::Frame(current)) => view
                .iter()
                .position(|entry| entry.as_frame() == Some(&current)),
            _ => None,
        };

        self.detach_listener();
        widget
            .replace_contents(view)
            .map_err(ReconcileError::WriteRejected)?;

        let written_len = widget.len();
        let still_cached = {
            let mut cache = self.cache.borrow_mut();
            match cache.as_mut() {
                Some(cached) if cached.is_same(widget) => {
                    cached.record_filtered_len(written_len);
                    true
                }
                _ => false,
            }
        };
        if still_cached && self.config.continuous_resync {
            self.attach_listener(widget);
        }

        if let Some(index) = selection {
            widget.set_selected_index(index);
            widget.scroll_to_visible(index);
        }

        self.bump(|stats| stats.views_written += 1);
        Ok(summary)
    }

    /// Run `body`, turning a panic into a logged failure that drops the cache.
    pub(super) fn contained<T>(&self, what: &str, body: impl FnOnce() -> T) -> Option<T> {
        match panic::catch_unwind(AssertUnwindSafe(body)) {
            Ok(value) => Some(value),
            Err(payload) => {
                let err = ReconcileError::Unexpected(panic_message(payload.as_ref()));
                warn!(what, %err, "Pass aborted, resetting");
                self.bump(|stats| stats.unexpected_failures += 1);
                self.retry_count.set(0);
                let _ = panic::catch_unwind(AssertUnwindSafe(|| self.drop_cache()));
                self.cache.replace(None);
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
