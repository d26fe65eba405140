//! Debugger host collaborators.
//!
//! What the reconciler needs from the debugger: the active session, the tool
//! windows that may contain the call stack, and the project root. Lifecycle
//! notifications arrive as [`HostEvent`]s.

pub mod memory;

use crate::frame::DisplayFrame;
use crate::widget::ComponentRef;
use std::path::PathBuf;
use std::rc::Rc;

/// Tool windows that can host a call-stack panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    /// The "services" window, preferred when visible
    Services,
    Debug,
}

/// A tab (content) inside a tool window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

/// Lifecycle notifications the reconciler reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Paused,
    StackFrameChanged,
    SettingsChanged,
    Resumed,
    Stopped,
    PanelShown(PanelId),
    TabSelectionChanged(TabId),
}

/// A debugging session
pub trait DebugSession<F> {
    fn is_paused(&self) -> bool;

    /// The frame currently being inspected; a placeholder if the user
    /// selected a collapsed group.
    fn current_frame(&self) -> Option<DisplayFrame<F>>;

    /// Ask the host to rebuild its views from the unfiltered frame list.
    fn rebuild_views(&self);
}

pub type SessionRef<F> = Rc<dyn DebugSession<F>>;

pub trait ToolWindow<F> {
    fn is_visible(&self) -> bool;

    fn selected_tab(&self) -> Option<TabId>;

    /// Root component of the selected tab.
    fn selected_content(&self) -> Option<ComponentRef<F>>;
}

pub type ToolWindowRef<F> = Rc<dyn ToolWindow<F>>;

pub trait DebuggerHost<F> {
    fn active_session(&self) -> Option<SessionRef<F>>;

    fn tool_window(&self, panel: PanelId) -> Option<ToolWindowRef<F>>;

    fn project_root(&self) -> Option<PathBuf>;

    fn is_disposed(&self) -> bool {
        false
    }
}
