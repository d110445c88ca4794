// SPDX-License-Identifier: GPL-3.0-only

//! Centralized application settings and constants.

/// Keyboard application ID in RDNN (reverse domain name notation) format.
pub const APP_ID: &str = "io.github.platanitos.Keyboard";

/// Settings window application ID.
pub const SETTINGS_APP_ID: &str = "io.github.platanitos.Settings";

/// Version code of this build, compared against the update manifest.
pub const APP_VERSION_CODE: i64 = 1;

/// Human-readable version shown on the settings screen.
pub const APP_VERSION_NAME: &str = "ver.1";

/// D-Bus well-known name of the keyboard service.
pub const DBUS_NAME: &str = "io.github.platanitos.Keyboard";

/// D-Bus object path of the keyboard service.
pub const DBUS_PATH: &str = "/io/github/platanitos/Keyboard";

/// D-Bus interface name of the keyboard service.
pub const DBUS_INTERFACE: &str = "io.github.platanitos.Keyboard";

// ============================================================================
// Timing
// ============================================================================

/// Two shift presses closer than this enter caps lock.
pub const DOUBLE_TAP_TIMEOUT_MS: u64 = 500;

/// Hold time before backspace switches to repeated word deletion.
pub const LONG_PRESS_DELAY_MS: u64 = 500;

/// Interval between word deletions while backspace stays held.
pub const BACKSPACE_REPEAT_MS: u64 = 50;

// ============================================================================
// Geometry
// ============================================================================

/// Keyboard height when the input view is created.
pub const INITIAL_HEIGHT: f32 = 320.0;

/// Lower bound for the resize drag.
pub const MIN_HEIGHT: f32 = 320.0;

/// Upper bound for the resize drag as a fraction of the screen height.
pub const MAX_HEIGHT_SCREEN_RATIO: f32 = 0.5;

/// Height of the collapsed strip while the keys are hidden.
pub const HIDDEN_KEYBOARD_HEIGHT: f32 = 88.0;

/// Height of the top bar with the mode toggles and the drag handle.
pub const TOP_BAR_HEIGHT: f32 = 40.0;

/// Padding above the top bar.
pub const TOP_PADDING: f32 = 8.0;

/// Screen height assumed when no output reports a current mode.
pub const FALLBACK_SCREEN_HEIGHT: f32 = 1080.0;

// ============================================================================
// Update
// ============================================================================

/// Base URL hosting the update manifest.
pub const UPDATE_BASE_URL: &str = "https://erickmontes464.github.io/Teclado-Virtual-Android/";

/// Manifest file name under [`UPDATE_BASE_URL`].
pub const UPDATE_MANIFEST_FILE: &str = "version_info.json";

/// File name of the downloaded package.
pub const UPDATE_PACKAGE_FILE: &str = "keyboard_update.pkg";

/// Directory of the application under the user cache directory.
pub const APP_DIR_NAME: &str = "platanitos";

/// Sub-directory of [`APP_DIR_NAME`] holding downloaded updates.
pub const UPDATE_DIR_NAME: &str = "updates";
