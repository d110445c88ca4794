// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard colors.
//!
//! The keyboard carries its own light and dark palettes instead of following
//! the desktop theme, since the user switches between them from the top bar.
//! Every color is a pure function of the key kind, its pressed state, and
//! the dark-mode flag.

use cosmic::iced::Color;

fn rgb(hex: u32) -> Color {
    Color::from_rgb8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Background, border and label color of one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyColors {
    pub background: Color,
    pub border: Color,
    pub text: Color,
}

impl KeyColors {
    #[must_use]
    pub fn for_key(special: bool, pressed: bool, dark: bool) -> Self {
        Self {
            background: key_background_color(special, pressed, dark),
            border: key_border_color(pressed, dark),
            text: key_text_color(special, pressed, dark),
        }
    }
}

// ============================================================================
// Keys
// ============================================================================

#[must_use]
pub fn key_background_color(special: bool, pressed: bool, dark: bool) -> Color {
    let hex = match (dark, special, pressed) {
        (false, false, false) => 0xFFFFFF,
        (false, false, true) => 0xD8D8D8,
        (false, true, false) => 0xE0E0E0,
        (false, true, true) => 0x9E9E9E,
        (true, false, false) => 0x2A2A2A,
        (true, false, true) => 0x3A3A3A,
        (true, true, false) => 0x3A3A3A,
        (true, true, true) => 0x4A4A4A,
    };
    rgb(hex)
}

#[must_use]
pub fn key_border_color(pressed: bool, dark: bool) -> Color {
    let hex = match (dark, pressed) {
        (false, false) => 0xE0E0E0,
        (false, true) => 0xB0B0B0,
        (true, false) => 0x3A3A3A,
        (true, true) => 0x4A4A4A,
    };
    rgb(hex)
}

/// Label color. Dark mode ignores the pressed state.
#[must_use]
pub fn key_text_color(special: bool, pressed: bool, dark: bool) -> Color {
    let hex = match (dark, special, pressed) {
        (true, true, _) => 0xFFFFFF,
        (true, false, _) => 0xE0E0E0,
        (false, true, false) => 0xFFFFFF,
        (false, true, true) => 0xE0E0E0,
        (false, false, false) => 0x1A1A1A,
        (false, false, true) => 0x000000,
    };
    rgb(hex)
}

/// Background behind the keys and the top bar.
#[must_use]
pub fn keyboard_background_color(dark: bool) -> Color {
    if dark { rgb(0x1A1A1A) } else { rgb(0xFFFFFF) }
}

// ============================================================================
// Top Bar
// ============================================================================

#[must_use]
pub fn top_bar_button_color(active: bool, dark: bool) -> Color {
    match (active, dark) {
        (true, _) => rgb(0x2196F3),
        (false, false) => rgb(0xE8E8E8),
        (false, true) => rgb(0x2A2A2A),
    }
}

#[must_use]
pub fn top_bar_button_border_color(active: bool, dark: bool) -> Color {
    match (active, dark) {
        (true, _) => rgb(0x1976D2),
        (false, false) => rgb(0xD0D0D0),
        (false, true) => rgb(0x3A3A3A),
    }
}

/// Button glyphs are white on every background.
#[must_use]
pub fn top_bar_icon_color() -> Color {
    Color::WHITE
}

/// Color of the `PLATANITOS` signature on the drag handle.
#[must_use]
pub fn top_bar_text_color(dark: bool) -> Color {
    if dark { rgb(0x808080) } else { rgb(0xB0B0B0) }
}

/// Accent bar drawn across the handle while resizing.
#[must_use]
pub fn resize_bar_color() -> Color {
    rgb(0x2196F3).scale_alpha(0.8)
}

// ============================================================================
// Tests
// ============================================================================
