// SPDX-License-Identifier: GPL-3.0-only

//! Key dispatcher.
//!
//! Maps a pressed key label to either a mode transition on
//! [`KeyboardUiState`] or an editing command on the [`TextConnection`].
//! Double-tap detection lives in an explicit [`InputSession`] owned by the
//! caller.

use std::time::{Duration, Instant};

use crate::config::Config;
use crate::input::{EditorAction, EditorInfo, KeyEvent, TextConnection, keycodes};
use crate::keyboard::types::{CaseMode, KeyAction, KeyboardUiState, LayoutMode};

/// Characters read before the cursor when deleting a word.
pub const WORD_DELETE_WINDOW: usize = 100;

/// Per-session shift tracking. At most one double-tap window is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSession {
    pub last_shift_press: Option<Instant>,
    pub last_key_was_shift: bool,
}

impl InputSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Applies key presses to the UI state and the focused field.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    double_tap_window: Duration,
}

impl Dispatcher {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            double_tap_window: config.double_tap_window,
        }
    }

    /// Handles one key press and returns the parsed action.
    ///
    /// With no connection the mode transitions still apply and editing
    /// commands are dropped.
    pub fn dispatch(
        &self,
        label: &str,
        ui: &mut KeyboardUiState,
        session: &mut InputSession,
        connection: Option<&mut dyn TextConnection>,
        editor: &EditorInfo,
        now: Instant,
    ) -> KeyAction {
        let action = KeyAction::from_label(label);
        tracing::debug!("Dispatching key {:?} as {:?}", label, action);

        if action == KeyAction::Shift {
            self.press_shift(ui, session, now);
            return action;
        }
        session.last_key_was_shift = false;

        match &action {
            KeyAction::NumericMode => ui.layout_mode = LayoutMode::Numeric,
            // Symbol is a submenu of numeric and has no entry from alphabetic.
            KeyAction::SymbolMode => match ui.layout_mode {
                LayoutMode::Numeric => ui.layout_mode = LayoutMode::Symbol,
                LayoutMode::Symbol => ui.layout_mode = LayoutMode::Numeric,
                LayoutMode::Alphabetic => {}
            },
            KeyAction::AlphabeticMode => ui.layout_mode = LayoutMode::Alphabetic,
            KeyAction::Backspace => {
                with_connection(connection, |conn| conn.delete_surrounding_text(1, 0));
            }
            KeyAction::Space => with_connection(connection, |conn| conn.commit_text(" ", 1)),
            KeyAction::Enter => with_connection(connection, |conn| press_enter(conn, editor)),
            KeyAction::Char(text) => {
                let committed = match (ui.layout_mode, ui.case_mode.is_upper()) {
                    (LayoutMode::Alphabetic, true) => text.to_uppercase(),
                    (LayoutMode::Alphabetic, false) => text.to_lowercase(),
                    _ => text.clone(),
                };
                with_connection(connection, |conn| conn.commit_text(&committed, 1));

                if ui.layout_mode == LayoutMode::Alphabetic && ui.case_mode == CaseMode::Upper {
                    ui.case_mode = CaseMode::Lower;
                }
            }
            KeyAction::Shift => {}
        }

        action
    }

    fn press_shift(&self, ui: &mut KeyboardUiState, session: &mut InputSession, now: Instant) {
        let within_window = session
            .last_shift_press
            .is_some_and(|last| now.saturating_duration_since(last) < self.double_tap_window);

        ui.case_mode = if ui.case_mode == CaseMode::CapsLock {
            CaseMode::Lower
        } else if session.last_key_was_shift && within_window {
            CaseMode::CapsLock
        } else if ui.case_mode == CaseMode::Upper {
            CaseMode::Lower
        } else {
            CaseMode::Upper
        };

        session.last_shift_press = Some(now);
        session.last_key_was_shift = true;
    }
}

fn with_connection(
    connection: Option<&mut dyn TextConnection>,
    command: impl FnOnce(&mut dyn TextConnection),
) {
    match connection {
        Some(conn) => command(conn),
        None => tracing::debug!("No text connection, dropping editing command"),
    }
}

fn press_enter(conn: &mut dyn TextConnection, editor: &EditorInfo) {
    if editor.action == EditorAction::None {
        conn.send_key_event(KeyEvent::down(keycodes::KEY_ENTER));
        conn.send_key_event(KeyEvent::up(keycodes::KEY_ENTER));
    } else {
        conn.perform_editor_action(editor.action);
    }
}

// ============================================================================
// Word Delete
// ============================================================================

/// Number of characters removed by a word delete on `before`: the trailing
/// whitespace run plus the preceding non-whitespace run. Never less than one.
#[must_use]
pub fn word_delete_len(before: &str) -> usize {
    let mut chars = before.chars().rev().peekable();
    let mut count = 0;

    while chars.next_if(|c| c.is_whitespace()).is_some() {
        count += 1;
    }
    while chars.next_if(|c| !c.is_whitespace()).is_some() {
        count += 1;
    }

    count.max(1)
}

/// Deletes the word before the cursor through the connection's own word
/// delete.
pub fn delete_word(conn: &mut dyn TextConnection) {
    conn.delete_word_before_cursor();
}
