// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard model: key tables, the key dispatcher, and the backspace repeat
//! timer.
//!
//! Everything here is independent of the widget toolkit. The renderer turns
//! [`tables::rows_for`] into widgets and feeds pressed labels back through
//! [`Dispatcher::dispatch`].

pub mod dispatcher;
pub mod repeat;
pub mod tables;
pub mod types;

pub use dispatcher::{
    Dispatcher, InputSession, WORD_DELETE_WINDOW, delete_word, word_delete_len,
};
pub use repeat::RepeatTimer;
pub use tables::rows_for;
pub use types::{CaseMode, Cell, KeyAction, KeyDescriptor, KeyboardUiState, LayoutMode, Row};
