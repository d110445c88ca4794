// SPDX-License-Identifier: GPL-3.0-only

//! Text connection to the focused editable field.
//!
//! The dispatcher never talks to a widget or a compositor protocol directly.
//! It issues editing commands through [`TextConnection`], which the keyboard
//! binary backs with a [`VirtualKeyboard`](super::VirtualKeyboard) and tests
//! back with a [`TextBuffer`].

// ============================================================================
// Key Events
// ============================================================================

/// Common evdev keycodes.
pub mod keycodes {
    pub const KEY_ESC: u32 = 1;
    pub const KEY_BACKSPACE: u32 = 14;
    pub const KEY_TAB: u32 = 15;
    pub const KEY_ENTER: u32 = 28;
    pub const KEY_LEFTCTRL: u32 = 29;
    pub const KEY_LEFTSHIFT: u32 = 42;
    pub const KEY_SPACE: u32 = 57;
    pub const KEY_DELETE: u32 = 111;
}

/// Direction of a raw key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// A raw key event sent to the field, identified by evdev keycode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub keycode: u32,
    pub state: KeyState,
}

impl KeyEvent {
    #[must_use]
    pub fn down(keycode: u32) -> Self {
        Self {
            keycode,
            state: KeyState::Pressed,
        }
    }

    #[must_use]
    pub fn up(keycode: u32) -> Self {
        Self {
            keycode,
            state: KeyState::Released,
        }
    }
}

// ============================================================================
// Editor Info
// ============================================================================

/// Action the focused field declares for its enter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorAction {
    /// No action. Enter inserts a newline through a raw key event.
    #[default]
    None,
    Go,
    Search,
    Send,
    Next,
    Done,
    Previous,
}

impl EditorAction {
    /// Parses the action name used on the host bus. Unknown names map to
    /// [`EditorAction::None`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "go" => EditorAction::Go,
            "search" => EditorAction::Search,
            "send" => EditorAction::Send,
            "next" => EditorAction::Next,
            "done" => EditorAction::Done,
            "previous" => EditorAction::Previous,
            "" | "none" => EditorAction::None,
            other => {
                tracing::debug!("Unknown editor action '{}', treating as none", other);
                EditorAction::None
            }
        }
    }

    /// Name used on the host bus.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            EditorAction::None => "none",
            EditorAction::Go => "go",
            EditorAction::Search => "search",
            EditorAction::Send => "send",
            EditorAction::Next => "next",
            EditorAction::Done => "done",
            EditorAction::Previous => "previous",
        }
    }
}

/// Description of the field that gained focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditorInfo {
    pub action: EditorAction,
}

impl EditorInfo {
    #[must_use]
    pub fn with_action(action: EditorAction) -> Self {
        Self { action }
    }
}

// ============================================================================
// Text Connection
// ============================================================================

/// Editing commands accepted by the focused field.
pub trait TextConnection {
    /// Inserts `text` at the cursor. A positive `cursor_offset` leaves the
    /// cursor after the inserted text, otherwise it stays before it.
    fn commit_text(&mut self, text: &str, cursor_offset: i32);

    /// Deletes `before` characters before and `after` characters after the
    /// cursor.
    fn delete_surrounding_text(&mut self, before: usize, after: usize);

    /// Sends a raw key event.
    fn send_key_event(&mut self, event: KeyEvent);

    /// Performs the field's declared editor action.
    fn perform_editor_action(&mut self, action: EditorAction);

    /// Returns up to `max_chars` characters preceding the cursor, or `None`
    /// when the field cannot report its content.
    fn text_before_cursor(&self, max_chars: usize) -> Option<String>;

    /// Deletes the word before the cursor as one unit: the trailing
    /// whitespace run plus the word preceding it. Falls back to one
    /// character when the field reports no text.
    fn delete_word_before_cursor(&mut self) {
        let count = match self.text_before_cursor(crate::keyboard::WORD_DELETE_WINDOW) {
            Some(before) if !before.is_empty() => crate::keyboard::word_delete_len(&before),
            _ => 1,
        };
        tracing::debug!("Word delete removes {} characters", count);
        self.delete_surrounding_text(count, 0);
    }

    /// Delivers buffered commands. Connections that apply commands
    /// immediately keep the default.
    fn flush(&mut self) {}
}

// ============================================================================
// In-memory Connection
// ============================================================================

/// An in-memory text field with a cursor.
///
/// Raw `Enter` inserts a newline and raw `Backspace` deletes one character.
/// Editor actions are recorded in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBuffer {
    chars: Vec<char>,
    cursor: usize,
    actions: Vec<EditorAction>,
    key_events: Vec<KeyEvent>,
}

impl TextBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer holding `text` with the cursor at the end.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        Self {
            cursor: chars.len(),
            chars,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Cursor position in characters.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor, clamped to the text length.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.chars.len());
    }

    #[must_use]
    pub fn actions(&self) -> &[EditorAction] {
        &self.actions
    }

    #[must_use]
    pub fn key_events(&self) -> &[KeyEvent] {
        &self.key_events
    }
}

impl TextConnection for TextBuffer {
    fn commit_text(&mut self, text: &str, cursor_offset: i32) {
        let inserted: Vec<char> = text.chars().collect();
        let len = inserted.len();
        self.chars.splice(self.cursor..self.cursor, inserted);
        if cursor_offset > 0 {
            self.cursor += len;
        }
    }

    fn delete_surrounding_text(&mut self, before: usize, after: usize) {
        let end = (self.cursor + after).min(self.chars.len());
        self.chars.drain(self.cursor..end);

        let start = self.cursor.saturating_sub(before);
        self.chars.drain(start..self.cursor);
        self.cursor = start;
    }

    fn send_key_event(&mut self, event: KeyEvent) {
        self.key_events.push(event);
        if event.state != KeyState::Pressed {
            return;
        }
        match event.keycode {
            keycodes::KEY_ENTER => self.commit_text("\n", 1),
            keycodes::KEY_BACKSPACE => self.delete_surrounding_text(1, 0),
            _ => {}
        }
    }

    fn perform_editor_action(&mut self, action: EditorAction) {
        self.actions.push(action);
    }

    fn text_before_cursor(&self, max_chars: usize) -> Option<String> {
        let start = self.cursor.saturating_sub(max_chars);
        Some(self.chars[start..self.cursor].iter().collect())
    }
}
