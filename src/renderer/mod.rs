// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard surface renderer.
//!
//! Turns the fixed key tables and the controller state into libcosmic
//! widgets. Nothing here mutates keyboard state: widgets emit
//! [`RendererMessage`]s and the application feeds them to the service.
//!
//! # Architecture
//!
//! - **state**: `KeyboardRenderer`, the held-key tracking between frames.
//! - **sizing**: Vertical sizes scaled from the 320 px reference height.
//! - **theme**: Light and dark key and top bar palettes.
//! - **key**: One key as a pressable, styled container.
//! - **row**: Keys and spacers sharing a row by weight.
//! - **top_bar**: Keys toggle, drag handle, dark mode and resize buttons.
//! - **panel**: The whole surface.
//! - **message**: Renderer message types.
//!
//! # Usage
//!
//! ```rust,ignore
//! use platanitos::controller::KeyboardController;
//! use platanitos::renderer::{KeyboardRenderer, RendererMessage, render_keyboard};
//!
//! let controller = KeyboardController::new(&Config::default());
//! let mut renderer = KeyboardRenderer::new();
//!
//! // In the view:
//! let element = render_keyboard(&controller, &renderer);
//!
//! // In the update:
//! match message {
//!     RendererMessage::KeyPressed(label) => renderer.press_key(label),
//!     RendererMessage::KeyReleased(label) => {
//!         if renderer.release_key(&label) {
//!             // commit the key
//!         }
//!     }
//!     _ => {}
//! }
//! ```

pub mod key;
pub mod message;
pub mod panel;
pub mod row;
pub mod sizing;
pub mod state;
pub mod theme;
pub mod top_bar;

pub use key::render_key;
pub use message::RendererMessage;
pub use panel::{render_keyboard, render_keys};
pub use row::{render_cell, render_row};
pub use sizing::KeySizing;
pub use state::KeyboardRenderer;
pub use theme::KeyColors;
pub use top_bar::{TopBarButton, render_top_bar};
