// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard view controller.
//!
//! Owns the [`KeyboardUiState`] of the current input view plus the resize
//! mode and drag tracking. Heights are not persisted.

use crate::app_settings;
use crate::config::Config;
use crate::keyboard::KeyboardUiState;

/// Pointer tracking for an in-progress resize drag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DragState {
    /// Last pointer y seen during the drag.
    last_y: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct KeyboardController {
    ui: KeyboardUiState,
    resize_mode: bool,
    drag: Option<DragState>,
    screen_height: f32,
    min_height: f32,
    max_height_ratio: f32,
}

impl KeyboardController {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            ui: KeyboardUiState::new(config),
            resize_mode: false,
            drag: None,
            screen_height: app_settings::FALLBACK_SCREEN_HEIGHT,
            min_height: config.min_height,
            max_height_ratio: config.max_height_ratio,
        }
    }

    #[must_use]
    pub fn ui(&self) -> &KeyboardUiState {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut KeyboardUiState {
        &mut self.ui
    }

    #[must_use]
    pub fn is_resize_mode(&self) -> bool {
        self.resize_mode
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Height of the whole surface: the keyboard height while the keys are
    /// shown, the collapsed strip otherwise.
    #[must_use]
    pub fn surface_height(&self) -> f32 {
        if self.ui.keys_visible {
            self.ui.height
        } else {
            app_settings::HIDDEN_KEYBOARD_HEIGHT
        }
    }

    /// Upper drag bound. Never below the minimum height.
    #[must_use]
    pub fn max_height(&self) -> f32 {
        (self.screen_height * self.max_height_ratio).max(self.min_height)
    }

    pub fn set_screen_height(&mut self, height: f32) {
        if height > 0.0 {
            self.screen_height = height;
            self.ui.height = self.ui.height.clamp(self.min_height, self.max_height());
        }
    }

    /// Shows or hides the keys. Hiding also leaves resize mode.
    pub fn toggle_keys_visible(&mut self) {
        self.ui.keys_visible = !self.ui.keys_visible;
        if !self.ui.keys_visible {
            self.resize_mode = false;
            self.drag = None;
        }
        tracing::debug!("Keys visible: {}", self.ui.keys_visible);
    }

    pub fn set_keys_visible(&mut self, visible: bool) {
        if self.ui.keys_visible != visible {
            self.toggle_keys_visible();
        }
    }

    pub fn toggle_dark_mode(&mut self) {
        self.ui.dark_mode = !self.ui.dark_mode;
    }

    /// Toggles resize mode. Has no effect while the keys are hidden.
    pub fn toggle_resize_mode(&mut self) {
        if !self.ui.keys_visible {
            return;
        }
        self.resize_mode = !self.resize_mode;
        if !self.resize_mode {
            self.drag = None;
        }
        tracing::debug!("Resize mode: {}", self.resize_mode);
    }

    /// Starts a drag on the handle. Ignored outside resize mode.
    pub fn begin_drag(&mut self) {
        if self.resize_mode && self.ui.keys_visible {
            self.drag = Some(DragState::default());
        }
    }

    /// Feeds an absolute pointer y. The first position only anchors the drag.
    pub fn drag_to(&mut self, y: f32) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let previous = drag.last_y.replace(y);
        if let Some(previous) = previous {
            self.apply_drag_delta(y - previous);
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Applies a vertical drag delta. Dragging up (negative) grows the
    /// keyboard.
    pub fn apply_drag_delta(&mut self, dy: f32) {
        if !self.resize_mode || !self.ui.keys_visible {
            return;
        }
        self.ui.height = (self.ui.height - dy).clamp(self.min_height, self.max_height());
    }
}
