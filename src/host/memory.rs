//! In-memory host adapter.
//!
//! A complete, self-contained implementation of the host traits: a component
//! tree, a call-stack list with listeners and renderer slot, tool windows and
//! a session. The CLI drives the reconciler through it, and the tests use it
//! to play the part of the debugger.

use super::{DebugSession, DebuggerHost, PanelId, SessionRef, TabId, ToolWindow, ToolWindowRef};
use crate::frame::{DisplayFrame, SourcePosition, StackFrame};
use crate::widget::{
    CellRenderer, CellState, ChangeListener, Component, ComponentRef, ListChange, ListElement,
    ListPalette, ListWidget, ListenerId, RenderedCell, RendererRef, WidgetRef,
};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

/// A host stack frame. Identity is the `id`.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryFrame {
    pub id: u64,
    pub function: String,
    pub position: Option<SourcePosition>,
}

impl MemoryFrame {
    pub fn new(id: u64, function: impl Into<String>, position: Option<SourcePosition>) -> Self {
        Self {
            id,
            function: function.into(),
            position,
        }
    }

    /// Frame at `path`, named after the file stem.
    pub fn at(id: u64, path: &str, line: u32) -> Self {
        let function = std::path::Path::new(path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("frame{}", id));
        Self::new(id, function, Some(SourcePosition::new(path, Some(line))))
    }

    /// Parse `path[:line]`, or `-` for a frame without source position.
    pub fn parse(id: u64, spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return None;
        }
        if spec == "-" {
            return Some(Self::new(id, format!("<frame {}>", id), None));
        }
        let (path, line) = match spec.rsplit_once(':') {
            Some((path, line)) if !path.is_empty() => match line.parse::<u32>() {
                Ok(line) => (path, Some(line)),
                Err(_) => (spec, None),
            },
            _ => (spec, None),
        };
        let mut frame = Self::at(id, path, line.unwrap_or(0));
        frame.position = Some(SourcePosition::new(path, line));
        Some(frame)
    }
}

impl PartialEq for MemoryFrame {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl StackFrame for MemoryFrame {
    fn source_position(&self) -> Option<&SourcePosition> {
        self.position.as_ref()
    }
}

/// Plain-text renderer for [`MemoryFrame`] lists
pub struct FrameTextRenderer;

impl CellRenderer<MemoryFrame> for FrameTextRenderer {
    fn render(
        &self,
        _palette: &ListPalette,
        value: &ListElement<MemoryFrame>,
        _state: CellState,
    ) -> RenderedCell {
        match value {
            ListElement::Entry(DisplayFrame::Frame(frame)) => match &frame.position {
                Some(position) => RenderedCell::plain(format!("{} ({})", frame.function, position)),
                None => RenderedCell::plain(frame.function.clone()),
            },
            ListElement::Entry(DisplayFrame::Hidden(hidden)) => RenderedCell::plain(hidden.label()),
            ListElement::Null => RenderedCell::plain(""),
            ListElement::Foreign => RenderedCell::plain("<unknown>"),
        }
    }
}

/// The call-stack list widget
pub struct MemoryList<F> {
    items: RefCell<Vec<ListElement<F>>>,
    showing: Cell<bool>,
    listeners: RefCell<Vec<(ListenerId, ChangeListener)>>,
    next_listener: Cell<u64>,
    renderer: RefCell<Option<RendererRef<F>>>,
    selected: Cell<Option<usize>>,
    scrolled_to: Cell<Option<usize>>,
    reject_writes: Cell<bool>,
    poisoned: Cell<bool>,
    writes: Cell<usize>,
    palette: ListPalette,
}

impl<F: StackFrame> MemoryList<F> {
    pub fn new(entries: Vec<DisplayFrame<F>>) -> Self {
        Self::with_elements(entries.into_iter().map(ListElement::Entry).collect())
    }

    pub fn with_elements(items: Vec<ListElement<F>>) -> Self {
        Self {
            items: RefCell::new(items),
            showing: Cell::new(true),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            renderer: RefCell::new(None),
            selected: Cell::new(None),
            scrolled_to: Cell::new(None),
            reject_writes: Cell::new(false),
            poisoned: Cell::new(false),
            writes: Cell::new(0),
            palette: ListPalette::default(),
        }
    }

    pub fn with_renderer(self, renderer: RendererRef<F>) -> Self {
        *self.renderer.borrow_mut() = Some(renderer);
        self
    }

    /// Host-side append, as an asynchronous stack walk would do.
    pub fn push_frame(&self, frame: F) {
        let index = {
            let mut items = self.items.borrow_mut();
            items.push(ListElement::Entry(DisplayFrame::Frame(frame)));
            items.len() - 1
        };
        self.notify(ListChange::IntervalAdded {
            from: index,
            to: index,
        });
    }

    /// Host-side select, without notifying anyone.
    pub fn select(&self, index: Option<usize>) {
        self.selected.set(index);
    }

    pub fn set_showing(&self, showing: bool) {
        self.showing.set(showing);
    }

    /// Make the next writes fail as a read-only model would.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    /// Make every subsequent model access panic, simulating a host bug.
    pub fn poison(&self) {
        self.poisoned.set(true);
    }

    pub fn entries(&self) -> Vec<DisplayFrame<F>> {
        self.items
            .borrow()
            .iter()
            .filter_map(|item| item.as_entry().cloned())
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Number of accepted `replace_contents` calls.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn scrolled_to(&self) -> Option<usize> {
        self.scrolled_to.get()
    }

    /// Render every row with the installed renderer.
    pub fn render_rows(&self) -> Vec<RenderedCell> {
        let Some(renderer) = self.renderer.borrow().clone() else {
            return Vec::new();
        };
        let items = self.items.borrow().clone();
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                renderer.render(
                    &self.palette,
                    item,
                    CellState {
                        index,
                        selected: self.selected.get() == Some(index),
                        focused: false,
                    },
                )
            })
            .collect()
    }

    fn notify(&self, change: ListChange) {
        let listeners: Vec<ChangeListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(change);
        }
    }

    fn check_poison(&self) {
        if self.poisoned.get() {
            panic!("call stack model accessed after host failure");
        }
    }
}

impl<F: StackFrame> ListWidget<F> for MemoryList<F> {
    fn is_showing(&self) -> bool {
        self.showing.get()
    }

    fn len(&self) -> usize {
        self.check_poison();
        self.items.borrow().len()
    }

    fn element_at(&self, index: usize) -> ListElement<F> {
        self.check_poison();
        self.items
            .borrow()
            .get(index)
            .cloned()
            .unwrap_or(ListElement::Null)
    }

    fn replace_contents(&self, contents: Vec<DisplayFrame<F>>) -> Result<(), String> {
        self.check_poison();
        if self.reject_writes.get() {
            return Err("backing model does not support replaceAll".to_string());
        }
        let len = contents.len();
        *self.items.borrow_mut() = contents.into_iter().map(ListElement::Entry).collect();
        if self.selected.get().is_some_and(|index| index >= len) {
            self.selected.set(None);
        }
        self.writes.set(self.writes.get() + 1);
        self.notify(ListChange::ContentsChanged);
        Ok(())
    }

    fn add_change_listener(&self, listener: ChangeListener) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_change_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(listener_id, _)| *listener_id != id);
    }

    fn cell_renderer(&self) -> Option<RendererRef<F>> {
        self.renderer.borrow().clone()
    }

    fn set_cell_renderer(&self, renderer: RendererRef<F>) {
        *self.renderer.borrow_mut() = Some(renderer);
    }

    fn selected_index(&self) -> Option<usize> {
        self.selected.get()
    }

    fn set_selected_index(&self, index: usize) {
        self.selected.set(Some(index));
    }

    fn scroll_to_visible(&self, index: usize) {
        self.scrolled_to.set(Some(index));
    }

    fn palette(&self) -> ListPalette {
        self.palette
    }
}

impl MemoryList<MemoryFrame> {
    /// A frame list with the plain-text renderer installed.
    pub fn of_frames(frames: Vec<MemoryFrame>) -> Self {
        Self::new(frames.into_iter().map(DisplayFrame::Frame).collect())
            .with_renderer(Rc::new(FrameTextRenderer))
    }
}

/// A node of the in-memory component tree
pub struct MemoryComponent<F> {
    showing: Cell<bool>,
    children: RefCell<Vec<ComponentRef<F>>>,
    list: Option<Rc<MemoryList<F>>>,
}

impl<F: StackFrame> MemoryComponent<F> {
    pub fn panel(children: Vec<ComponentRef<F>>) -> Rc<Self> {
        Rc::new(Self {
            showing: Cell::new(true),
            children: RefCell::new(children),
            list: None,
        })
    }

    /// Component wrapping a list widget.
    pub fn list(list: Rc<MemoryList<F>>) -> Rc<Self> {
        Rc::new(Self {
            showing: Cell::new(true),
            children: RefCell::new(Vec::new()),
            list: Some(list),
        })
    }

    pub fn add_child(&self, child: ComponentRef<F>) {
        self.children.borrow_mut().push(child);
    }

    pub fn set_showing(&self, showing: bool) {
        self.showing.set(showing);
    }
}

impl<F: StackFrame> Component<F> for MemoryComponent<F> {
    fn is_showing(&self) -> bool {
        self.showing.get()
            && self
                .list
                .as_ref()
                .map(|list| list.is_showing())
                .unwrap_or(true)
    }

    fn children(&self) -> Vec<ComponentRef<F>> {
        self.children.borrow().clone()
    }

    fn as_list_widget(&self) -> Option<WidgetRef<F>> {
        self.list
            .as_ref()
            .map(|list| Rc::clone(list) as WidgetRef<F>)
    }
}

/// A tool window with tabs
pub struct MemoryToolWindow<F> {
    visible: Cell<bool>,
    tabs: RefCell<Vec<(TabId, ComponentRef<F>)>>,
    selected: Cell<Option<TabId>>,
}

impl<F: StackFrame> MemoryToolWindow<F> {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            visible: Cell::new(true),
            tabs: RefCell::new(Vec::new()),
            selected: Cell::new(None),
        })
    }

    /// Add a tab; the first tab added becomes selected.
    pub fn add_tab(&self, tab: TabId, content: ComponentRef<F>) {
        self.tabs.borrow_mut().push((tab, content));
        if self.selected.get().is_none() {
            self.selected.set(Some(tab));
        }
    }

    pub fn select_tab(&self, tab: TabId) {
        self.selected.set(Some(tab));
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }
}

impl<F: StackFrame> ToolWindow<F> for MemoryToolWindow<F> {
    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn selected_tab(&self) -> Option<TabId> {
        self.selected.get()
    }

    fn selected_content(&self) -> Option<ComponentRef<F>> {
        let selected = self.selected.get()?;
        self.tabs
            .borrow()
            .iter()
            .find(|(tab, _)| *tab == selected)
            .map(|(_, content)| Rc::clone(content))
    }
}

/// A debugging session
pub struct MemorySession<F> {
    paused: Cell<bool>,
    current: RefCell<Option<DisplayFrame<F>>>,
    rebuilds: Cell<usize>,
}

impl<F: StackFrame> MemorySession<F> {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            paused: Cell::new(true),
            current: RefCell::new(None),
            rebuilds: Cell::new(0),
        })
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.set(paused);
    }

    pub fn set_current(&self, frame: Option<DisplayFrame<F>>) {
        *self.current.borrow_mut() = frame;
    }

    /// How many times `rebuild_views` was requested.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds.get()
    }
}

impl<F: StackFrame> DebugSession<F> for MemorySession<F> {
    fn is_paused(&self) -> bool {
        self.paused.get()
    }

    fn current_frame(&self) -> Option<DisplayFrame<F>> {
        self.current.borrow().clone()
    }

    fn rebuild_views(&self) {
        self.rebuilds.set(self.rebuilds.get() + 1);
    }
}

/// The debugger
pub struct MemoryHost<F> {
    session: RefCell<Option<Rc<MemorySession<F>>>>,
    windows: RefCell<HashMap<PanelId, Rc<MemoryToolWindow<F>>>>,
    project_root: RefCell<Option<PathBuf>>,
    disposed: Cell<bool>,
}

impl<F: StackFrame> MemoryHost<F> {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            session: RefCell::new(None),
            windows: RefCell::new(HashMap::new()),
            project_root: RefCell::new(None),
            disposed: Cell::new(false),
        })
    }

    pub fn set_session(&self, session: Option<Rc<MemorySession<F>>>) {
        *self.session.borrow_mut() = session;
    }

    pub fn session(&self) -> Option<Rc<MemorySession<F>>> {
        self.session.borrow().clone()
    }

    pub fn set_tool_window(&self, panel: PanelId, window: Rc<MemoryToolWindow<F>>) {
        self.windows.borrow_mut().insert(panel, window);
    }

    pub fn set_project_root(&self, root: Option<PathBuf>) {
        *self.project_root.borrow_mut() = root;
    }

    pub fn dispose(&self) {
        self.disposed.set(true);
    }
}

impl<F: StackFrame> DebuggerHost<F> for MemoryHost<F> {
    fn active_session(&self) -> Option<SessionRef<F>> {
        self.session
            .borrow()
            .as_ref()
            .map(|session| Rc::clone(session) as SessionRef<F>)
    }

    fn tool_window(&self, panel: PanelId) -> Option<ToolWindowRef<F>> {
        self.windows
            .borrow()
            .get(&panel)
            .map(|window| Rc::clone(window) as ToolWindowRef<F>)
    }

    fn project_root(&self) -> Option<PathBuf> {
        self.project_root.borrow().clone()
    }

    fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}
