// SPDX-License-Identifier: GPL-3.0-only

//! Row rendering: a horizontal run of keys and spacers.

use cosmic::iced::Length;
use cosmic::widget::{self, Space};
use cosmic::Element;

use crate::keyboard::{Cell, KeyboardUiState, Row};
use crate::renderer::key::render_key;
use crate::renderer::message::RendererMessage;
use crate::renderer::sizing::{CELL_SPACING, KeySizing, fill_portion};
use crate::renderer::state::KeyboardRenderer;

/// Renders a row filling the available width. Cells share the width by
/// weight, with [`CELL_SPACING`] between neighbours.
pub fn render_row<'a>(
    row: &Row,
    ui: &KeyboardUiState,
    renderer: &KeyboardRenderer,
    sizing: &KeySizing,
) -> Element<'a, RendererMessage> {
    let mut row_widget = widget::row::row()
        .spacing(CELL_SPACING)
        .width(Length::Fill);

    for cell in &row.cells {
        row_widget = row_widget.push(render_cell(cell, ui, renderer, sizing));
    }

    row_widget.into()
}

/// Renders a key or an empty spacer of the same height.
pub fn render_cell<'a>(
    cell: &Cell,
    ui: &KeyboardUiState,
    renderer: &KeyboardRenderer,
    sizing: &KeySizing,
) -> Element<'a, RendererMessage> {
    match cell {
        Cell::Key(key) => render_key(key, ui, renderer, sizing),
        Cell::Spacer(weight) => Space::new(
            Length::FillPortion(fill_portion(*weight)),
            Length::Fixed(sizing.key_height),
        )
        .into(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::keyboard::{KeyDescriptor, LayoutMode, rows_for};

    /// Test: The home row with its spacers renders
    #[test]
    fn test_row_with_spacers_renders() {
        let ui = KeyboardUiState::new(&Config::default());
        let rows = rows_for(LayoutMode::Alphabetic);
        assert!(matches!(rows[1].cells.first(), Some(Cell::Spacer(_))));

        let _element = render_row(&rows[1], &ui, &KeyboardRenderer::new(), &KeySizing::default());
    }

    #[test]
    fn test_empty_row_renders() {
        let ui = KeyboardUiState::new(&Config::default());
        let _element = render_row(
            &Row::default(),
            &ui,
            &KeyboardRenderer::new(),
            &KeySizing::default(),
        );
    }

    #[test]
    fn test_single_cell_renders() {
        let ui = KeyboardUiState::new(&Config::default());
        let cell = Cell::Key(KeyDescriptor::wide("espacio", 4.0));
        let _element = render_cell(&cell, &ui, &KeyboardRenderer::new(), &KeySizing::default());
    }
}
