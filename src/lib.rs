// SPDX-License-Identifier: GPL-3.0-only

//! Platanitos - a soft keyboard with self-update for COSMIC
//!
//! # Architecture
//!
//! The crate ships two binaries:
//!
//! 1. **Keyboard** (`platanitos`): A layer surface anchored to the bottom of
//!    the screen. It types into the focused field through a Wayland virtual
//!    keyboard and takes focus changes from the host over D-Bus.
//!
//! 2. **Settings** (`platanitos-settings`): A status window that explains
//!    how to enable the keyboard and runs the self-update flow.
//!
//! # Modules
//!
//! - `app`: Keyboard application driving the layer surface
//! - `app_settings`: Centralized application constants
//! - `config`: Tunables passed into the service and update manager
//! - `controller`: Visibility, dark mode and resize state of the view
//! - `dbus`: Host contract service and control client
//! - `haptics`: Per-key haptic pulses
//! - `i18n`: Localization support using fluent translations
//! - `input`: Text connections, including the virtual keyboard
//! - `keyboard`: Key tables, dispatcher and backspace repeat
//! - `layer_shell`: Layer surface placement and output probing
//! - `lifecycle`: Input view lifecycle
//! - `renderer`: Key, row and top bar widgets
//! - `service`: Input-method host entry points
//! - `settings`: Settings and status window
//! - `update`: Manifest check, download and installer hand-off

pub mod app;
pub mod app_settings;
pub mod config;
pub mod controller;
pub mod dbus;
pub mod haptics;
pub mod i18n;
pub mod input;
pub mod keyboard;
pub mod layer_shell;
pub mod lifecycle;
pub mod renderer;
pub mod service;
pub mod settings;
pub mod update;

pub use crate::i18n::LANGUAGE_LOADER;

// ============================================================================
// Integration Tests
// ============================================================================
