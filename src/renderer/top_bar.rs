// SPDX-License-Identifier: GPL-3.0-only

//! Top bar: keys toggle on the left, drag handle in the middle, dark mode
//! and resize toggles on the right.
//!
//! The right-hand buttons only exist while the keys are shown. The handle
//! only reacts to the pointer in resize mode.

use cosmic::iced::{Alignment, Background, Border, Length, mouse};
use cosmic::widget::{self, Space, container, mouse_area};
use cosmic::Element;

use crate::app_settings;
use crate::controller::KeyboardController;
use crate::renderer::message::RendererMessage;
use crate::renderer::sizing::{BUTTON_CORNER_RADIUS, BUTTON_HEIGHT, BUTTON_WIDTH};
use crate::renderer::theme;

/// Signature drawn on the drag handle.
pub const HANDLE_LABEL: &str = "PLATANITOS";

/// Thickness of the accent bar shown while resizing.
const RESIZE_BAR_HEIGHT: f32 = 4.0;

/// A top bar button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopBarButton {
    Keys,
    DarkMode,
    Resize,
}

impl TopBarButton {
    /// Glyph for the button in the controller's current state.
    #[must_use]
    pub fn icon(self, controller: &KeyboardController) -> &'static str {
        let ui = controller.ui();
        match self {
            TopBarButton::Keys if ui.keys_visible => "⚙",
            TopBarButton::Keys => "⌨",
            TopBarButton::DarkMode if ui.dark_mode => "☀",
            TopBarButton::DarkMode => "🌙",
            TopBarButton::Resize => "⤢",
        }
    }

    /// Whether the button is drawn in the accent color.
    #[must_use]
    pub fn is_active(self, controller: &KeyboardController) -> bool {
        let ui = controller.ui();
        match self {
            TopBarButton::Keys => !ui.keys_visible,
            TopBarButton::DarkMode => ui.dark_mode,
            TopBarButton::Resize => controller.is_resize_mode(),
        }
    }

    #[must_use]
    pub fn message(self) -> RendererMessage {
        match self {
            TopBarButton::Keys => RendererMessage::ToggleKeys,
            TopBarButton::DarkMode => RendererMessage::ToggleDarkMode,
            TopBarButton::Resize => RendererMessage::ToggleResizeMode,
        }
    }
}

/// Buttons right of the handle for the current state.
#[must_use]
pub fn trailing_buttons(controller: &KeyboardController) -> Vec<TopBarButton> {
    if controller.ui().keys_visible {
        vec![TopBarButton::DarkMode, TopBarButton::Resize]
    } else {
        Vec::new()
    }
}

/// Whether the handle shows the accent bar and accepts drags.
#[must_use]
pub fn handle_is_draggable(controller: &KeyboardController) -> bool {
    controller.is_resize_mode() && controller.ui().keys_visible
}

pub fn render_top_bar<'a>(controller: &KeyboardController) -> Element<'a, RendererMessage> {
    let mut bar = widget::row::row()
        .spacing(8)
        .padding([4, 8])
        .align_y(Alignment::Center)
        .width(Length::Fill)
        .height(Length::Fixed(app_settings::TOP_BAR_HEIGHT))
        .push(render_button(TopBarButton::Keys, controller))
        .push(render_handle(controller));

    for button in trailing_buttons(controller) {
        bar = bar.push(render_button(button, controller));
    }

    bar.into()
}

fn render_button<'a>(
    button: TopBarButton,
    controller: &KeyboardController,
) -> Element<'a, RendererMessage> {
    let dark = controller.ui().dark_mode;
    let active = button.is_active(controller);
    let background = theme::top_bar_button_color(active, dark);
    let border = theme::top_bar_button_border_color(active, dark);

    let glyph = widget::text(button.icon(controller))
        .size(18)
        .class(cosmic::theme::Text::Color(theme::top_bar_icon_color()));

    let face = container(glyph)
        .width(Length::Fixed(BUTTON_WIDTH))
        .height(Length::Fixed(BUTTON_HEIGHT))
        .align_x(Alignment::Center)
        .align_y(Alignment::Center)
        .class(cosmic::style::Container::custom(move |_theme| container::Style {
            background: Some(Background::Color(background)),
            border: Border {
                color: border,
                width: 1.5,
                radius: BUTTON_CORNER_RADIUS.into(),
            },
            ..Default::default()
        }));

    mouse_area(face).on_press(button.message()).into()
}

fn render_handle<'a>(controller: &KeyboardController) -> Element<'a, RendererMessage> {
    let draggable = handle_is_draggable(controller);

    let label = widget::text(HANDLE_LABEL)
        .size(10)
        .class(cosmic::theme::Text::Color(theme::top_bar_text_color(
            controller.ui().dark_mode,
        )));

    let mut content = widget::column::column()
        .spacing(2)
        .align_x(Alignment::Center)
        .width(Length::Fill)
        .push(label);

    if draggable {
        let bar_color = theme::resize_bar_color();
        content = content.push(
            container(Space::new(Length::Fill, Length::Fixed(RESIZE_BAR_HEIGHT))).class(
                cosmic::style::Container::custom(move |_theme| container::Style {
                    background: Some(Background::Color(bar_color)),
                    ..Default::default()
                }),
            ),
        );
    }

    let handle = container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(Alignment::Center)
        .align_y(Alignment::Center);

    if draggable {
        mouse_area(handle)
            .on_press(RendererMessage::ResizeDragStart)
            .interaction(mouse::Interaction::ResizingVertically)
            .into()
    } else {
        handle.into()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn controller() -> KeyboardController {
        KeyboardController::new(&Config::default())
    }

    /// Test: Right-hand buttons only exist while the keys are shown
    #[test]
    fn test_trailing_buttons_follow_visibility() {
        let mut controller = controller();
        assert_eq!(
            trailing_buttons(&controller),
            vec![TopBarButton::DarkMode, TopBarButton::Resize]
        );

        controller.toggle_keys_visible();
        assert!(trailing_buttons(&controller).is_empty());
    }

    /// Test: Glyphs follow keys visibility and dark mode
    #[test]
    fn test_button_icons() {
        let mut controller = controller();
        assert_eq!(TopBarButton::Keys.icon(&controller), "⚙");
        assert_eq!(TopBarButton::DarkMode.icon(&controller), "🌙");
        assert_eq!(TopBarButton::Resize.icon(&controller), "⤢");

        controller.toggle_dark_mode();
        assert_eq!(TopBarButton::DarkMode.icon(&controller), "☀");

        controller.toggle_keys_visible();
        assert_eq!(TopBarButton::Keys.icon(&controller), "⌨");
    }

    /// Test: Active buttons mirror the toggled state
    #[test]
    fn test_button_active_state() {
        let mut controller = controller();
        assert!(!TopBarButton::Keys.is_active(&controller));
        assert!(!TopBarButton::Resize.is_active(&controller));

        controller.toggle_resize_mode();
        assert!(TopBarButton::Resize.is_active(&controller));
        assert!(handle_is_draggable(&controller));

        controller.toggle_keys_visible();
        assert!(TopBarButton::Keys.is_active(&controller));
        assert!(!handle_is_draggable(&controller));
    }

    #[test]
    fn test_button_messages() {
        assert_eq!(TopBarButton::Keys.message(), RendererMessage::ToggleKeys);
        assert_eq!(TopBarButton::DarkMode.message(), RendererMessage::ToggleDarkMode);
        assert_eq!(TopBarButton::Resize.message(), RendererMessage::ToggleResizeMode);
    }

    /// Test: The bar renders in every state
    #[test]
    fn test_top_bar_renders() {
        let mut controller = controller();
        let _element = render_top_bar(&controller);

        controller.toggle_resize_mode();
        let _element = render_top_bar(&controller);

        controller.toggle_keys_visible();
        let _element = render_top_bar(&controller);
    }
}
