// SPDX-License-Identifier: GPL-3.0-only

//! Size calculations for the keyboard renderer.
//!
//! Key height, font size, top padding and row spacing are defined for a
//! 320 px keyboard and scaled linearly with the current height:
//!
//! ```text
//! scale = height / 320
//! ```
//!
//! Cell spacing and side padding stay fixed. Horizontal sizes are relative:
//! each cell takes a share of its row proportional to its weight.

/// Keyboard height the base sizes are defined for.
pub const REFERENCE_HEIGHT: f32 = 320.0;

/// Key height at the reference height.
pub const BASE_KEY_HEIGHT: f32 = 48.0;

/// Label font size at the reference height.
pub const BASE_FONT_SIZE: f32 = 18.0;

/// Padding above the first key row at the reference height.
pub const BASE_TOP_PADDING: f32 = 12.0;

/// Vertical gap between key rows at the reference height.
pub const BASE_ROW_SPACING: f32 = 8.0;

/// Horizontal gap between cells of a row.
pub const CELL_SPACING: f32 = 4.0;

/// Padding left and right of the key area.
pub const SIDE_PADDING: f32 = 3.0;

/// Corner radius of a key.
pub const KEY_CORNER_RADIUS: f32 = 12.0;

/// Border width of a key.
pub const KEY_BORDER_WIDTH: f32 = 1.5;

/// Width of a top bar button.
pub const BUTTON_WIDTH: f32 = 55.0;

/// Height of a top bar button.
pub const BUTTON_HEIGHT: f32 = 32.0;

/// Corner radius of a top bar button.
pub const BUTTON_CORNER_RADIUS: f32 = 10.0;

/// Fill-portion units per unit of key weight. Two decimals of weight survive
/// the conversion to integer portions.
const PORTION_PER_WEIGHT: f32 = 100.0;

/// Resolved vertical sizes for one keyboard height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeySizing {
    pub scale: f32,
    pub key_height: f32,
    pub font_size: f32,
    pub top_padding: f32,
    pub row_spacing: f32,
}

impl KeySizing {
    /// Sizes for a keyboard `height` pixels tall.
    #[must_use]
    pub fn for_height(height: f32) -> Self {
        let scale = scale_factor(height);
        Self {
            scale,
            key_height: BASE_KEY_HEIGHT * scale,
            font_size: BASE_FONT_SIZE * scale,
            top_padding: BASE_TOP_PADDING * scale,
            row_spacing: BASE_ROW_SPACING * scale,
        }
    }

    /// Height taken by `rows` rows including the padding above them.
    #[must_use]
    pub fn key_area_height(&self, rows: usize) -> f32 {
        let gaps = rows.saturating_sub(1) as f32;
        self.top_padding + self.key_height * rows as f32 + self.row_spacing * gaps
    }
}

impl Default for KeySizing {
    fn default() -> Self {
        Self::for_height(REFERENCE_HEIGHT)
    }
}

/// Returns `height / 320`. Non-positive heights map to the reference scale.
#[must_use]
pub fn scale_factor(height: f32) -> f32 {
    if height > 0.0 {
        height / REFERENCE_HEIGHT
    } else {
        1.0
    }
}

/// Converts a relative cell weight into a `Length::FillPortion` share.
///
/// Never returns zero, so every cell keeps some width.
#[must_use]
pub fn fill_portion(weight: f32) -> u16 {
    let portion = (weight * PORTION_PER_WEIGHT).round();
    if portion < 1.0 {
        1
    } else if portion > f32::from(u16::MAX) {
        u16::MAX
    } else {
        portion as u16
    }
}

// ============================================================================
// Tests
// ============================================================================
