//! User actions
//!
//! The two things a user can do from the call-stack panel: flip hiding on and
//! off, and add the library of the inspected frame to the patterns.

use crate::error::ActionError;
use crate::frame::classifier::{extract_library_dir_name, LibraryPatternSet};
use crate::frame::{DisplayFrame, StackFrame};
use crate::host::DebugSession;
use crate::reconcile::Reconciler;
use crate::settings::{SettingsStore, SettingsView};
use tracing::{debug, info};

/// Result of "hide frames from this library"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HideOutcome {
    /// The current frame is a placeholder already standing for `count` frames.
    AlreadyHidden { count: usize },
    /// An existing pattern already covers the library.
    AlreadyListed(String),
    Added(String),
}

/// Actions bound to one reconciler and the settings it reads
pub struct HiderActions<'a, F: StackFrame> {
    settings: &'a SettingsStore,
    reconciler: &'a Reconciler<F>,
}

impl<'a, F: StackFrame> HiderActions<'a, F> {
    pub fn new(settings: &'a SettingsStore, reconciler: &'a Reconciler<F>) -> Self {
        Self {
            settings,
            reconciler,
        }
    }

    /// Turn hiding on or off.
    ///
    /// With a paused session the view is refreshed right away, and switching
    /// off asks the session to rebuild the unfiltered list. Returns whether a
    /// live refresh happened.
    pub fn toggle_hiding(&self, session: Option<&dyn DebugSession<F>>, enabled: bool) -> bool {
        let previous = self.settings.set_hide_enabled(enabled);
        info!(previous, enabled, "Library frame hiding toggled");

        let Some(session) = session.filter(|session| session.is_paused()) else {
            debug!("No paused session, nothing to refresh");
            return false;
        };

        self.reconciler.force_refresh();
        if !enabled {
            session.rebuild_views();
        }
        true
    }

    /// Add the library of the session's current frame to the patterns.
    pub fn hide_frames_from_library(
        &self,
        session: &dyn DebugSession<F>,
    ) -> Result<HideOutcome, ActionError> {
        if !session.is_paused() {
            return Err(ActionError::NotAvailable);
        }

        let frame = match session.current_frame() {
            None => return Err(ActionError::NotAvailable),
            Some(DisplayFrame::Hidden(hidden)) => {
                return Ok(HideOutcome::AlreadyHidden {
                    count: hidden.count(),
                })
            }
            Some(DisplayFrame::Frame(frame)) => frame,
        };

        let position = frame
            .source_position()
            .ok_or(ActionError::NoSourcePosition)?;
        let pattern = extract_library_dir_name(&position.file)
            .ok_or_else(|| ActionError::NoPattern(position.file.display().to_string()))?;

        let existing = LibraryPatternSet::new(self.settings.library_patterns());
        if existing.covers(&pattern) {
            debug!(pattern = %pattern, "Library already covered by a pattern");
            return Ok(HideOutcome::AlreadyListed(pattern));
        }

        if !self.settings.add_pattern(&pattern) {
            return Err(ActionError::InvalidPattern(pattern));
        }
        info!(pattern = %pattern, "Hiding frames from library");

        if self.settings.hide_enabled() {
            self.reconciler.force_refresh();
        }
        Ok(HideOutcome::Added(pattern))
    }
}

/// Whether the frame actions apply: a paused session with a current frame.
pub fn is_available<F>(session: Option<&dyn DebugSession<F>>) -> bool {
    session.is_some_and(|session| session.is_paused() && session.current_frame().is_some())
}
