//! Host UI abstraction.
//!
//! The host owns a tree of UI components; somewhere in it sits the list widget
//! that shows the call stack. The reconciler sees that tree only through these
//! traits, implemented once per host by an adapter (see `host::memory`).
//! Widgets use interior mutability: all calls happen on the UI thread, and a
//! call may re-enter the reconciler (e.g. a list listener firing on write).

pub mod cache;
pub mod locator;
pub mod render;

pub use cache::CachedWidgetRef;
pub use locator::{is_frames_list, WidgetLocator};
pub use render::{install_placeholder_renderer, PlaceholderRenderer};

use crate::frame::DisplayFrame;
use std::rc::Rc;

pub type ComponentRef<F> = Rc<dyn Component<F>>;
pub type WidgetRef<F> = Rc<dyn ListWidget<F>>;
pub type RendererRef<F> = Rc<dyn CellRenderer<F>>;
pub type ChangeListener = Rc<dyn Fn(ListChange)>;

/// A node of the host's component tree
pub trait Component<F> {
    /// Whether the component is currently rendered on screen.
    fn is_showing(&self) -> bool;

    fn children(&self) -> Vec<ComponentRef<F>>;

    /// Typed capability accessor: `Some` if this component is a list widget.
    fn as_list_widget(&self) -> Option<WidgetRef<F>> {
        None
    }
}

/// One element of a list widget's backing model
#[derive(Debug, Clone, PartialEq)]
pub enum ListElement<F> {
    Entry(DisplayFrame<F>),
    /// A null slot in the model
    Null,
    /// An element of a type this crate does not recognise
    Foreign,
}

impl<F> ListElement<F> {
    pub fn as_entry(&self) -> Option<&DisplayFrame<F>> {
        match self {
            ListElement::Entry(entry) => Some(entry),
            ListElement::Null | ListElement::Foreign => None,
        }
    }
}

/// Kind of mutation reported to change listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    IntervalAdded { from: usize, to: usize },
    IntervalRemoved { from: usize, to: usize },
    ContentsChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Colours and font size of a list, as renderers see them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListPalette {
    pub background: Rgb,
    pub selection_background: Option<Rgb>,
    pub font_size: f32,
}

impl Default for ListPalette {
    fn default() -> Self {
        Self {
            background: Rgb(255, 255, 255),
            selection_background: None,
            font_size: 13.0,
        }
    }
}

/// Per-cell render state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellState {
    pub index: usize,
    pub selected: bool,
    pub focused: bool,
}

/// Output of a cell renderer
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCell {
    pub text: String,
    pub foreground: Option<Rgb>,
    pub background: Option<Rgb>,
    pub font_size: Option<f32>,
    pub opaque: bool,
}

impl RenderedCell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            foreground: None,
            background: None,
            font_size: None,
            opaque: false,
        }
    }
}

pub trait CellRenderer<F> {
    fn render(
        &self,
        palette: &ListPalette,
        value: &ListElement<F>,
        state: CellState,
    ) -> RenderedCell;

    /// True for renderers that already draw placeholders specially.
    fn draws_placeholders(&self) -> bool {
        false
    }
}

/// The list widget holding call-stack entries
pub trait ListWidget<F> {
    fn is_showing(&self) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn element_at(&self, index: usize) -> ListElement<F>;

    /// Replace the whole model. `Err` means the backing collection refused it.
    fn replace_contents(&self, contents: Vec<DisplayFrame<F>>) -> Result<(), String>;

    fn add_change_listener(&self, listener: ChangeListener) -> ListenerId;

    fn remove_change_listener(&self, id: ListenerId);

    fn cell_renderer(&self) -> Option<RendererRef<F>>;

    fn set_cell_renderer(&self, renderer: RendererRef<F>);

    fn selected_index(&self) -> Option<usize>;

    fn set_selected_index(&self, index: usize);

    fn scroll_to_visible(&self, index: usize);

    fn palette(&self) -> ListPalette {
        ListPalette::default()
    }
}

/// Snapshot of the displayable entries of a widget, skipping null and
/// unrecognised elements.
pub fn read_entries<F>(widget: &dyn ListWidget<F>) -> Vec<DisplayFrame<F>> {
    (0..widget.len())
        .filter_map(|index| match widget.element_at(index) {
            ListElement::Entry(entry) => Some(entry),
            ListElement::Null | ListElement::Foreign => None,
        })
        .collect()
}
