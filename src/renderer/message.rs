// SPDX-License-Identifier: GPL-3.0-only

//! Messages emitted by the keyboard widgets.

/// Messages emitted by the keyboard renderer.
///
/// Keys report both edges of a press: the press arms visual feedback and
/// the backspace repeat, the release over the same key commits it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RendererMessage {
    /// A key went down. Contains the key label.
    KeyPressed(String),

    /// The pointer was released over a key. Contains the key label.
    KeyReleased(String),

    /// Left top bar button: collapse or expand the keys.
    ToggleKeys,

    /// Switch between the light and dark palettes.
    ToggleDarkMode,

    /// Enter or leave resize mode.
    ToggleResizeMode,

    /// The drag handle was pressed while resizing.
    ResizeDragStart,

    #[default]
    Noop,
}

// ============================================================================
// Tests
// ============================================================================
