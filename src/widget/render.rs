//! Rendering override that draws placeholders muted.

use super::{
    CellRenderer, CellState, ListElement, ListPalette, ListWidget, RenderedCell, RendererRef, Rgb,
};
use crate::frame::{DisplayFrame, StackFrame};
use std::rc::Rc;
use tracing::debug;

const PLACEHOLDER_FOREGROUND: Rgb = Rgb(120, 120, 120);
const PLACEHOLDER_FOREGROUND_SELECTED: Rgb = Rgb(140, 140, 140);
const FALLBACK_SELECTION_BACKGROUND: Rgb = Rgb(75, 110, 175);
const PLACEHOLDER_FONT_SCALE: f32 = 0.92;

/// Draws placeholder entries faded and delegates everything else.
pub struct PlaceholderRenderer<F> {
    original: RendererRef<F>,
}

impl<F> PlaceholderRenderer<F> {
    pub fn new(original: RendererRef<F>) -> Self {
        Self { original }
    }
}

impl<F> CellRenderer<F> for PlaceholderRenderer<F> {
    fn render(
        &self,
        palette: &ListPalette,
        value: &ListElement<F>,
        state: CellState,
    ) -> RenderedCell {
        let ListElement::Entry(DisplayFrame::Hidden(hidden)) = value else {
            return self.original.render(palette, value, state);
        };

        let (foreground, background) = if state.selected {
            (
                PLACEHOLDER_FOREGROUND_SELECTED,
                palette
                    .selection_background
                    .unwrap_or(FALLBACK_SELECTION_BACKGROUND),
            )
        } else {
            (PLACEHOLDER_FOREGROUND, palette.background)
        };

        RenderedCell {
            text: hidden.label(),
            foreground: Some(foreground),
            background: Some(background),
            font_size: Some(palette.font_size * PLACEHOLDER_FONT_SCALE),
            opaque: true,
        }
    }

    fn draws_placeholders(&self) -> bool {
        true
    }
}

/// Wrap the widget's renderer in a [`PlaceholderRenderer`] once.
///
/// Returns true if a renderer was installed by this call. A widget whose
/// renderer already draws placeholders, or that has no renderer to delegate
/// to, is left alone.
pub fn install_placeholder_renderer<F: StackFrame>(widget: &dyn ListWidget<F>) -> bool {
    let Some(current) = widget.cell_renderer() else {
        debug!("List has no cell renderer to wrap");
        return false;
    };
    if current.draws_placeholders() {
        return false;
    }

    widget.set_cell_renderer(Rc::new(PlaceholderRenderer::new(current)));
    debug!("Installed placeholder renderer");
    true
}
