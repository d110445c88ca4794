// SPDX-License-Identifier: GPL-3.0-only

//! Renderer state.
//!
//! Key descriptors are stateless and rebuilt from the tables on every frame,
//! so the only thing the renderer remembers between frames is which key the
//! pointer currently holds down.

use crate::keyboard::{CaseMode, KeyDescriptor, types};

/// Visual press tracking for the keyboard surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardRenderer {
    /// Label of the key under a held pointer.
    pressed_key: Option<String>,
}

impl KeyboardRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `label` as held. A single pointer holds at most one key.
    pub fn press_key(&mut self, label: impl Into<String>) {
        self.pressed_key = Some(label.into());
    }

    /// Releases `label`. Returns `true` if it was the held key, so a release
    /// over a different key can be told apart from a click.
    pub fn release_key(&mut self, label: &str) -> bool {
        if self.is_key_pressed(label) {
            self.pressed_key = None;
            true
        } else {
            false
        }
    }

    /// Drops the held key without a click.
    pub fn clear_pressed(&mut self) -> Option<String> {
        self.pressed_key.take()
    }

    #[must_use]
    pub fn is_key_pressed(&self, label: &str) -> bool {
        self.pressed_key.as_deref() == Some(label)
    }

    #[must_use]
    pub fn pressed_key(&self) -> Option<&str> {
        self.pressed_key.as_deref()
    }

    /// Whether `key` is drawn in its pressed colors. Shift also stays lit
    /// while upper case or caps lock is active.
    #[must_use]
    pub fn shows_pressed(&self, key: &KeyDescriptor, case: CaseMode) -> bool {
        self.is_key_pressed(&key.label) || (key.label == types::SHIFT && case.is_upper())
    }
}

// ============================================================================
// Tests
// ============================================================================
