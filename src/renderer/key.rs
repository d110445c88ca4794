// SPDX-License-Identifier: GPL-3.0-only

//! Key rendering.
//!
//! A key is a styled container inside a `mouse_area`, so both the press and
//! the release reach the application. Its width is a share of the row
//! proportional to the key weight.

use cosmic::iced::{Alignment, Background, Border, Length};
use cosmic::widget::{self, container, mouse_area};
use cosmic::Element;

use crate::keyboard::{KeyDescriptor, KeyboardUiState};
use crate::renderer::message::RendererMessage;
use crate::renderer::sizing::{KEY_BORDER_WIDTH, KEY_CORNER_RADIUS, KeySizing, fill_portion};
use crate::renderer::state::KeyboardRenderer;
use crate::renderer::theme::KeyColors;

/// Renders a single key.
///
/// # Arguments
///
/// * `key` - The key descriptor from the current table
/// * `ui` - Case and dark mode decide the label and colors
/// * `renderer` - Press tracking for the pressed colors
/// * `sizing` - Resolved sizes for the current keyboard height
pub fn render_key<'a>(
    key: &KeyDescriptor,
    ui: &KeyboardUiState,
    renderer: &KeyboardRenderer,
    sizing: &KeySizing,
) -> Element<'a, RendererMessage> {
    let pressed = renderer.shows_pressed(key, ui.case_mode);
    let colors = KeyColors::for_key(key.special, pressed, ui.dark_mode);

    let label = widget::text(key.display_label(ui.case_mode))
        .size(sizing.font_size)
        .font(cosmic::font::semibold())
        .class(cosmic::theme::Text::Color(colors.text));

    let face = container(label)
        .width(Length::FillPortion(fill_portion(key.weight)))
        .height(Length::Fixed(sizing.key_height))
        .align_x(Alignment::Center)
        .align_y(Alignment::Center)
        .class(cosmic::style::Container::custom(move |_theme| container::Style {
            background: Some(Background::Color(colors.background)),
            border: Border {
                color: colors.border,
                width: KEY_BORDER_WIDTH,
                radius: KEY_CORNER_RADIUS.into(),
            },
            text_color: Some(colors.text),
            ..Default::default()
        }));

    mouse_area(face)
        .on_press(RendererMessage::KeyPressed(key.label.clone()))
        .on_release(RendererMessage::KeyReleased(key.label.clone()))
        .into()
}

// ============================================================================
// Tests
// ============================================================================
