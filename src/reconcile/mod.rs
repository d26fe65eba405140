//! Reconciliation Controller
//!
//! Owns *when* the call-stack view gets filtered. Host lifecycle events
//! schedule a delayed pass; bursts of events collapse into one pass through
//! cancel-and-reschedule. A pass locates (or reuses) the call-stack widget,
//! writes the collapsed view and restores the selection. After a widget is
//! found, a list listener re-filters whenever the host appends more frames.
//!
//! Everything runs on the UI thread. At most one pass runs at a time: the
//! update guard is a plain flag, and triggers that arrive while it is held
//! (re-entrantly, from a host callback) are deferred by a short backoff rather
//! than dropped.
//!
//! States: `Idle -> Scheduled -> Running -> (Idle | Scheduled on retry)`.

mod pass;
mod resync;

use crate::config::ReconcileConfig;
use crate::error::ReconcileError;
use crate::frame::StackFrame;
use crate::host::{DebuggerHost, HostEvent};
use crate::scheduler::{Alarm, UiExecutor};
use crate::settings::SettingsView;
use crate::widget::{CachedWidgetRef, WidgetRef};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::{debug, info};

use resync::AttachedListener;

/// Observable state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Idle,
    Scheduled,
    Running,
}

/// Counters for observability and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Passes that entered `Running`
    pub passes: u64,
    /// Views written successfully (full passes and resyncs)
    pub views_written: u64,
    /// Failed discovery attempts
    pub failed_attempts: u64,
    /// Triggers abandoned after reaching the retry bound
    pub gave_up: u64,
    /// Triggers deferred because a pass was running
    pub deferred: u64,
    /// Re-filters caused by the host appending frames
    pub resyncs: u64,
    /// Passes aborted by an unexpected failure
    pub unexpected_failures: u64,
}

/// Drives filtering of one debugger's call-stack view.
///
/// Create one per debugging context; dropping it (or calling
/// [`Reconciler::dispose`]) cancels pending work and detaches listeners.
pub struct Reconciler<F: StackFrame> {
    inner: Rc<Inner<F>>,
}

struct Inner<F: StackFrame> {
    host: Rc<dyn DebuggerHost<F>>,
    settings: Rc<dyn SettingsView>,
    config: ReconcileConfig,
    alarm: Alarm,
    resync_alarm: Alarm,
    is_updating: Cell<bool>,
    retry_count: Cell<u32>,
    session_tracked: Cell<bool>,
    disposed: Cell<bool>,
    cache: RefCell<Option<CachedWidgetRef<F>>>,
    listener: RefCell<Option<AttachedListener<F>>>,
    stats: Cell<PassStats>,
    weak_self: Weak<Inner<F>>,
}

/// Holds the update guard for the duration of a pass.
struct UpdateGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> UpdateGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.get() {
            return None;
        }
        flag.set(true);
        Some(Self { flag })
    }
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

impl<F: StackFrame> Reconciler<F> {
    pub fn new(
        host: Rc<dyn DebuggerHost<F>>,
        settings: Rc<dyn SettingsView>,
        executor: Rc<dyn UiExecutor>,
        config: ReconcileConfig,
    ) -> Self {
        let inner = Rc::new_cyclic(|weak_self| Inner {
            host,
            settings,
            config,
            alarm: Alarm::new(Rc::clone(&executor)),
            resync_alarm: Alarm::new(executor),
            is_updating: Cell::new(false),
            retry_count: Cell::new(0),
            session_tracked: Cell::new(false),
            disposed: Cell::new(false),
            cache: RefCell::new(None),
            listener: RefCell::new(None),
            stats: Cell::new(PassStats::default()),
            weak_self: weak_self.clone(),
        });
        info!("Stack frame reconciler initialized");
        Self { inner }
    }

    /// Start tracking a debug session (the host's "process started" hook).
    pub fn attach_session(&self) {
        debug!("Debug session attached");
        self.inner.session_tracked.set(true);
    }

    /// React to a host lifecycle event.
    pub fn handle(&self, event: HostEvent) {
        self.inner.handle(event);
    }

    /// Drop every cache and schedule an immediate pass.
    ///
    /// Called after the user flips the hide switch or edits patterns.
    pub fn force_refresh(&self) {
        debug!("Forced refresh requested");
        self.inner.invalidate();
        self.inner.schedule_pass(Duration::ZERO);
    }

    /// Cancel pending work, detach listeners and forget the widget.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    pub fn state(&self) -> PassState {
        self.inner.state()
    }

    pub fn is_updating(&self) -> bool {
        self.inner.is_updating.get()
    }

    pub fn retry_count(&self) -> u32 {
        self.inner.retry_count.get()
    }

    pub fn stats(&self) -> PassStats {
        self.inner.stats.get()
    }

    /// The cached call-stack widget, if still alive.
    pub fn cached_widget(&self) -> Option<WidgetRef<F>> {
        self.inner
            .cache
            .borrow()
            .as_ref()
            .and_then(|cache| cache.upgrade())
    }

    /// Whether a growth listener is attached to the widget.
    pub fn is_listening(&self) -> bool {
        self.inner.listener.borrow().is_some()
    }
}

impl<F: StackFrame> Drop for Reconciler<F> {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

impl<F: StackFrame> Inner<F> {
    fn handle(&self, event: HostEvent) {
        if self.disposed.get() {
            return;
        }
        match event {
            HostEvent::Paused => {
                debug!("Session paused");
                self.session_tracked.set(true);
                self.invalidate();
                self.schedule_pass(self.config.retry_delay());
            }
            HostEvent::StackFrameChanged => {
                let on_placeholder = self
                    .host
                    .active_session()
                    .and_then(|session| session.current_frame())
                    .is_some_and(|frame| frame.is_placeholder());
                if on_placeholder {
                    debug!("Current frame is a placeholder, not refiltering");
                    return;
                }
                debug!("Stack frame changed");
                self.schedule_pass(self.config.retry_delay());
            }
            HostEvent::SettingsChanged => {
                debug!("Settings changed");
                self.invalidate();
                self.schedule_pass(self.config.retry_delay());
            }
            HostEvent::Resumed => {
                debug!("Session resumed");
                self.invalidate();
            }
            HostEvent::Stopped => {
                debug!("Session stopped");
                self.invalidate();
                self.alarm.cancel_all_requests();
                self.session_tracked.set(false);
            }
            HostEvent::PanelShown(panel) => {
                if self.settings.hide_enabled() {
                    debug!(?panel, "Debugger panel shown");
                    self.schedule_pass(self.config.retry_delay());
                }
            }
            HostEvent::TabSelectionChanged(tab) => {
                debug!(?tab, "Debugger tab changed");
                self.invalidate();
                self.schedule_pass(self.config.retry_delay());
            }
        }
    }

    fn state(&self) -> PassState {
        if self.is_updating.get() {
            PassState::Running
        } else if !self.alarm.is_idle() || !self.resync_alarm.is_idle() {
            PassState::Scheduled
        } else {
            PassState::Idle
        }
    }

    /// Schedule a pass after `delay`, replacing any pending one.
    ///
    /// While a pass is running the request is deferred by the busy backoff
    /// and re-issued, so it lands strictly after the running pass.
    fn schedule_pass(&self, delay: Duration) {
        if self.disposed.get() {
            return;
        }
        if !self.session_tracked.get() {
            debug!("No tracked session, skipping update");
            return;
        }

        if self.is_updating.get() {
            debug!(err = %ReconcileError::Busy, "Deferring trigger");
            self.bump(|stats| stats.deferred += 1);
            let weak = self.weak_self.clone();
            let retry_delay = self.config.retry_delay();
            self.alarm.add_request(self.config.busy_backoff(), move || {
                if let Some(inner) = weak.upgrade() {
                    inner.schedule_pass(retry_delay);
                }
            });
            return;
        }

        self.alarm.cancel_all_requests();
        let weak = self.weak_self.clone();
        self.alarm.add_request(delay, move || {
            if let Some(inner) = weak.upgrade() {
                inner.run_pass();
            }
        });
    }

    /// Forget the widget and reset retries.
    fn invalidate(&self) {
        self.retry_count.set(0);
        self.resync_alarm.cancel_all_requests();
        self.drop_cache();
    }

    fn drop_cache(&self) {
        self.detach_listener();
        self.cache.replace(None);
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.alarm.cancel_all_requests();
        self.resync_alarm.cancel_all_requests();
        self.drop_cache();
        self.session_tracked.set(false);
        info!("Stack frame reconciler disposed");
    }

    fn bump(&self, update: impl FnOnce(&mut PassStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}
