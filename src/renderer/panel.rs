// SPDX-License-Identifier: GPL-3.0-only

//! Whole-surface rendering.
//!
//! The surface is a column of the top padding, the top bar, and, while the
//! keys are shown, the rows of the current table. The background follows
//! the dark-mode flag.

use cosmic::iced::{Background, Length, Padding};
use cosmic::widget::{self, Space, container};
use cosmic::Element;

use crate::app_settings;
use crate::controller::KeyboardController;
use crate::keyboard::{KeyboardUiState, rows_for};
use crate::renderer::message::RendererMessage;
use crate::renderer::row::render_row;
use crate::renderer::sizing::{KeySizing, SIDE_PADDING};
use crate::renderer::state::KeyboardRenderer;
use crate::renderer::theme;
use crate::renderer::top_bar::render_top_bar;

/// Renders the rows of the current layout mode.
pub fn render_keys<'a>(
    ui: &KeyboardUiState,
    renderer: &KeyboardRenderer,
    sizing: &KeySizing,
) -> Element<'a, RendererMessage> {
    let mut column = widget::column::column()
        .spacing(sizing.row_spacing)
        .width(Length::Fill)
        .padding(Padding {
            top: sizing.top_padding,
            right: SIDE_PADDING,
            bottom: 0.0,
            left: SIDE_PADDING,
        });

    for row in rows_for(ui.layout_mode) {
        column = column.push(render_row(&row, ui, renderer, sizing));
    }

    column.into()
}

/// Renders the full keyboard surface for the controller's state.
pub fn render_keyboard<'a>(
    controller: &KeyboardController,
    renderer: &KeyboardRenderer,
) -> Element<'a, RendererMessage> {
    let ui = controller.ui();

    let mut content = widget::column::column()
        .width(Length::Fill)
        .push(Space::new(Length::Fill, Length::Fixed(app_settings::TOP_PADDING)))
        .push(render_top_bar(controller));

    if ui.keys_visible {
        let sizing = KeySizing::for_height(ui.height);
        content = content.push(render_keys(ui, renderer, &sizing));
    }

    let background = theme::keyboard_background_color(ui.dark_mode);
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .clip(true)
        .class(cosmic::style::Container::custom(move |_theme| container::Style {
            background: Some(Background::Color(background)),
            ..Default::default()
        }))
        .into()
}

// ============================================================================
// Tests
// ============================================================================
