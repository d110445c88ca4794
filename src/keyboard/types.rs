// SPDX-License-Identifier: GPL-3.0-only

//! Core keyboard types: modes, UI state, and key descriptors.

use crate::config::Config;

// ============================================================================
// Key Labels
// ============================================================================

/// Label of the shift key.
pub const SHIFT: &str = "⇧";
/// Label of the backspace key.
pub const BACKSPACE: &str = "⌫";
/// Label of the space bar.
pub const SPACE: &str = "espacio";
/// Label of the enter key.
pub const ENTER: &str = "⏎";
/// Alternate enter label.
pub const RETURN: &str = "return";
/// Switches to the numeric layout, or back to it from the symbol layout.
pub const NUMERIC_MODE: &str = "123";
/// Switches back to the alphabetic layout.
pub const ALPHABETIC_MODE: &str = "ABC";
/// Switches to the symbol layout.
pub const SYMBOL_MODE: &str = "#+=";

// ============================================================================
// Modes
// ============================================================================

/// Letter case applied to alphabetic keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CaseMode {
    #[default]
    Lower,
    /// One-shot upper case, cleared after the next letter.
    Upper,
    /// Sticky upper case entered by double-tapping shift.
    CapsLock,
}

impl CaseMode {
    /// Returns `true` for `Upper` and `CapsLock`.
    #[must_use]
    pub fn is_upper(self) -> bool {
        matches!(self, CaseMode::Upper | CaseMode::CapsLock)
    }
}

/// Active key table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum LayoutMode {
    #[default]
    Alphabetic,
    Numeric,
    /// Nested inside the numeric layout.
    Symbol,
}

// ============================================================================
// Key Actions
// ============================================================================

/// What a key label does when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Shift,
    Backspace,
    Space,
    Enter,
    NumericMode,
    AlphabeticMode,
    SymbolMode,
    /// Literal text committed to the field.
    Char(String),
}

impl KeyAction {
    /// Parses a key label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            SHIFT => KeyAction::Shift,
            BACKSPACE => KeyAction::Backspace,
            SPACE => KeyAction::Space,
            ENTER | RETURN => KeyAction::Enter,
            NUMERIC_MODE => KeyAction::NumericMode,
            ALPHABETIC_MODE => KeyAction::AlphabeticMode,
            SYMBOL_MODE => KeyAction::SymbolMode,
            other => KeyAction::Char(other.to_string()),
        }
    }

    /// Returns `true` for keys styled as control keys.
    #[must_use]
    pub fn is_control(&self) -> bool {
        !matches!(self, KeyAction::Char(_) | KeyAction::Space)
    }
}

// ============================================================================
// Key Descriptors
// ============================================================================

/// A cell in a keyboard row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Key(KeyDescriptor),
    /// Empty space with a relative width.
    Spacer(f32),
}

impl Cell {
    /// Relative width weight of the cell.
    #[must_use]
    pub fn weight(&self) -> f32 {
        match self {
            Cell::Key(key) => key.weight,
            Cell::Spacer(weight) => *weight,
        }
    }
}

/// A stateless key descriptor rebuilt for every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDescriptor {
    /// Label sent to the dispatcher.
    pub label: String,
    /// Relative width within the row.
    pub weight: f32,
    /// Control keys use the darker special styling.
    pub special: bool,
}

impl KeyDescriptor {
    /// A regular one-unit key.
    #[must_use]
    pub fn char(label: &str) -> Self {
        Self {
            label: label.to_string(),
            weight: 1.0,
            special: false,
        }
    }

    /// A regular key with a custom width.
    #[must_use]
    pub fn wide(label: &str, weight: f32) -> Self {
        Self {
            label: label.to_string(),
            weight,
            special: false,
        }
    }

    /// A control key with a custom width.
    #[must_use]
    pub fn special(label: &str, weight: f32) -> Self {
        Self {
            label: label.to_string(),
            weight,
            special: true,
        }
    }

    /// The text drawn on the key for the given case.
    ///
    /// Control tokens are drawn verbatim except `return`, which shares the
    /// enter glyph. Other labels follow the case mode.
    #[must_use]
    pub fn display_label(&self, case: CaseMode) -> String {
        match self.label.as_str() {
            RETURN => ENTER.to_string(),
            SPACE | BACKSPACE | SHIFT | ENTER | NUMERIC_MODE | ALPHABETIC_MODE | SYMBOL_MODE => {
                self.label.clone()
            }
            other if case.is_upper() => other.to_string(),
            other => other.to_lowercase(),
        }
    }
}

/// A horizontal row of cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    /// Sum of all cell weights.
    #[must_use]
    pub fn total_weight(&self) -> f32 {
        self.cells.iter().map(Cell::weight).sum()
    }

    /// Iterates over the keys, skipping spacers.
    pub fn keys(&self) -> impl Iterator<Item = &KeyDescriptor> {
        self.cells.iter().filter_map(|cell| match cell {
            Cell::Key(key) => Some(key),
            Cell::Spacer(_) => None,
        })
    }
}

// ============================================================================
// UI State
// ============================================================================

/// State of one keyboard view composition. Recreated with the input view.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardUiState {
    pub case_mode: CaseMode,
    pub layout_mode: LayoutMode,
    pub dark_mode: bool,
    pub keys_visible: bool,
    /// Height of the keyboard while the keys are visible.
    pub height: f32,
}

impl KeyboardUiState {
    /// Fresh state for a newly created input view.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            case_mode: CaseMode::Lower,
            layout_mode: LayoutMode::Alphabetic,
            dark_mode: false,
            keys_visible: true,
            height: config.initial_height,
        }
    }
}

impl Default for KeyboardUiState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
