// SPDX-License-Identifier: GPL-3.0-only

//! Connections to the focused text field.
//!
//! - [`TextConnection`]: editing commands issued by the key dispatcher
//! - [`TextBuffer`]: in-memory field used by tests and previews
//! - [`VirtualKeyboard`]: injects key events through `zwp_virtual_keyboard_v1`
//!
//! # Example
//!
//! ```rust,ignore
//! use platanitos::input::{TextBuffer, TextConnection};
//!
//! let mut field = TextBuffer::with_text("hola");
//! field.commit_text(" mundo", 1);
//! assert_eq!(field.text(), "hola mundo");
//! ```

pub mod connection;
pub mod virtual_keyboard;

pub use connection::{
    EditorAction, EditorInfo, KeyEvent, KeyState, TextBuffer, TextConnection, keycodes,
};
pub use virtual_keyboard::{InputError, ModifierSnapshot, QueuedKey, VirtualKeyboard};
