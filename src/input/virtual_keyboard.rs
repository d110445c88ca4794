// SPDX-License-Identifier: GPL-3.0-only

//! Virtual keyboard text connection.
//!
//! The keyboard surface never owns the focused field, so editing commands
//! are translated into evdev key events and injected through Wayland's
//! `zwp_virtual_keyboard_v1` protocol:
//!
//! - Characters are looked up in the system XKB keymap. Characters on the
//!   shifted level are wrapped in a Shift press.
//! - Characters missing from the keymap fall back to the Ctrl+Shift+U hex
//!   input sequence understood by GTK and most Linux toolkits.
//! - Deletions become BackSpace and Delete taps. A word delete is the
//!   Ctrl+BackSpace chord, which toolkits apply to the word before the
//!   cursor.
//!
//! Events are queued first and sent by [`TextConnection::flush`]. Without a
//! protocol binding the queue is still filled, which keeps the translation
//! testable in headless environments.
//!
//! The protocol cannot report surrounding text, so
//! [`text_before_cursor`](TextConnection::text_before_cursor) returns `None`.

use std::io::Write;
use std::os::fd::AsFd;

use wayland_client::globals::{GlobalListContents, registry_queue_init};
use wayland_client::protocol::{wl_keyboard, wl_registry, wl_seat};
use wayland_client::{Connection, Dispatch, EventQueue, QueueHandle};
use wayland_protocols_misc::zwp_virtual_keyboard_v1::client::zwp_virtual_keyboard_manager_v1::ZwpVirtualKeyboardManagerV1;
use wayland_protocols_misc::zwp_virtual_keyboard_v1::client::zwp_virtual_keyboard_v1::ZwpVirtualKeyboardV1;
use xkbcommon::xkb;
use xkbcommon::xkb::Keysym;
use xkbcommon::xkb::keysyms::KEY_NoSymbol;

use crate::input::connection::{
    EditorAction, KeyEvent, KeyState, TextConnection, keycodes,
};

/// Errors raised while setting up the virtual keyboard.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to compile the XKB keymap from system defaults")]
    Keymap,
    #[error("Wayland connection failed: {0}")]
    Connection(String),
    #[error("compositor does not offer {0}")]
    MissingGlobal(&'static str),
    #[error("failed to upload keymap: {0}")]
    KeymapUpload(#[from] std::io::Error),
}

/// A key event stamped with its time and the modifier state after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedKey {
    pub event: KeyEvent,
    /// Milliseconds, wrapping.
    pub time: u32,
    pub mods: ModifierSnapshot,
}

/// Serialized XKB modifier state sent alongside each key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierSnapshot {
    pub depressed: u32,
    pub latched: u32,
    pub locked: u32,
    pub group: u32,
}

// ============================================================================
// Wayland Binding
// ============================================================================

struct ProtocolState;

impl Dispatch<wl_registry::WlRegistry, GlobalListContents> for ProtocolState {
    fn event(
        _: &mut Self,
        _: &wl_registry::WlRegistry,
        _: wl_registry::Event,
        _: &GlobalListContents,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<wl_seat::WlSeat, ()> for ProtocolState {
    fn event(
        _: &mut Self,
        _: &wl_seat::WlSeat,
        _: wl_seat::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<ZwpVirtualKeyboardManagerV1, ()> for ProtocolState {
    fn event(
        _: &mut Self,
        _: &ZwpVirtualKeyboardManagerV1,
        _: <ZwpVirtualKeyboardManagerV1 as wayland_client::Proxy>::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<ZwpVirtualKeyboardV1, ()> for ProtocolState {
    fn event(
        _: &mut Self,
        _: &ZwpVirtualKeyboardV1,
        _: <ZwpVirtualKeyboardV1 as wayland_client::Proxy>::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

/// A bound `zwp_virtual_keyboard_v1` object with its own connection.
struct ProtocolBinding {
    connection: Connection,
    queue: EventQueue<ProtocolState>,
    keyboard: ZwpVirtualKeyboardV1,
}

impl ProtocolBinding {
    fn bind(keymap_text: &str) -> Result<Self, InputError> {
        let connection =
            Connection::connect_to_env().map_err(|e| InputError::Connection(e.to_string()))?;
        let (globals, mut queue) = registry_queue_init::<ProtocolState>(&connection)
            .map_err(|e| InputError::Connection(e.to_string()))?;
        let qh = queue.handle();

        let seat: wl_seat::WlSeat = globals
            .bind(&qh, 1..=8, ())
            .map_err(|_| InputError::MissingGlobal("wl_seat"))?;
        let manager: ZwpVirtualKeyboardManagerV1 = globals
            .bind(&qh, 1..=1, ())
            .map_err(|_| InputError::MissingGlobal("zwp_virtual_keyboard_manager_v1"))?;
        let keyboard = manager.create_virtual_keyboard(&seat, &qh, ());

        // The compositor maps the file, so the keymap must be NUL-terminated.
        let mut file = tempfile::tempfile()?;
        file.write_all(keymap_text.as_bytes())?;
        file.write_all(&[0])?;
        file.flush()?;
        let size = u32::try_from(keymap_text.len() + 1).unwrap_or(u32::MAX);
        keyboard.keymap(wl_keyboard::KeymapFormat::XkbV1.into(), file.as_fd(), size);

        queue
            .roundtrip(&mut ProtocolState)
            .map_err(|e| InputError::Connection(e.to_string()))?;

        Ok(Self {
            connection,
            queue,
            keyboard,
        })
    }

    fn send(&mut self, keys: &[QueuedKey]) {
        for key in keys {
            let state = match key.event.state {
                KeyState::Pressed => wl_keyboard::KeyState::Pressed,
                KeyState::Released => wl_keyboard::KeyState::Released,
            };
            self.keyboard.key(key.time, key.event.keycode, state.into());
            self.keyboard.modifiers(
                key.mods.depressed,
                key.mods.latched,
                key.mods.locked,
                key.mods.group,
            );
        }

        if let Err(e) = self.connection.flush() {
            tracing::warn!("Failed to flush virtual keyboard events: {}", e);
        }
        if let Err(e) = self.queue.dispatch_pending(&mut ProtocolState) {
            tracing::debug!("Virtual keyboard queue dispatch failed: {}", e);
        }
    }
}

// ============================================================================
// Virtual Keyboard
// ============================================================================

/// Text connection backed by injected key events.
///
/// # Lifecycle
///
/// 1. [`VirtualKeyboard::new`] creates an uninitialized instance.
/// 2. [`initialize`](Self::initialize) compiles the system XKB keymap.
/// 3. [`connect`](Self::connect) binds the Wayland protocol (optional).
/// 4. Editing commands queue events, [`TextConnection::flush`] sends them.
pub struct VirtualKeyboard {
    initialized: bool,
    pending_events: Vec<QueuedKey>,
    xkb_keymap: Option<xkb::Keymap>,
    xkb_state: Option<xkb::State>,
    binding: Option<ProtocolBinding>,
}

impl std::fmt::Debug for VirtualKeyboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualKeyboard")
            .field("initialized", &self.initialized)
            .field("pending_events", &self.pending_events.len())
            .field("bound", &self.binding.is_some())
            .finish()
    }
}

impl Default for VirtualKeyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualKeyboard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            initialized: false,
            pending_events: Vec::new(),
            xkb_keymap: None,
            xkb_state: None,
            binding: None,
        }
    }

    /// Compiles the default system keymap (`XKB_DEFAULT_*` or system
    /// defaults). Calling it twice is harmless.
    pub fn initialize(&mut self) -> Result<(), InputError> {
        if self.initialized {
            return Ok(());
        }

        let context = xkb::Context::new(xkb::CONTEXT_NO_FLAGS);
        let keymap = xkb::Keymap::new_from_names(
            &context,
            &"",
            &"",
            &"",
            &"",
            None,
            xkb::KEYMAP_COMPILE_NO_FLAGS,
        )
        .ok_or(InputError::Keymap)?;
        let state = xkb::State::new(&keymap);

        self.xkb_keymap = Some(keymap);
        self.xkb_state = Some(state);
        self.initialized = true;

        tracing::info!("Virtual keyboard initialized with system XKB keymap");
        Ok(())
    }

    /// Binds the compositor's virtual keyboard protocol and uploads the
    /// keymap. Initializes the keymap first if needed.
    pub fn connect(&mut self) -> Result<(), InputError> {
        self.initialize()?;
        let keymap = self.xkb_keymap.as_ref().ok_or(InputError::Keymap)?;
        let text = keymap.get_as_string(xkb::KEYMAP_FORMAT_TEXT_V1);

        self.binding = Some(ProtocolBinding::bind(&text)?);
        tracing::info!("Bound zwp_virtual_keyboard_v1");
        Ok(())
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether flushed events reach a compositor.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.binding.is_some()
    }

    #[must_use]
    pub fn pending_events(&self) -> &[QueuedKey] {
        &self.pending_events
    }

    fn queue(&mut self, event: KeyEvent) {
        if !self.initialized {
            tracing::warn!("Virtual keyboard not initialized, ignoring key event");
            return;
        }

        let direction = match event.state {
            KeyState::Pressed => xkb::KeyDirection::Down,
            KeyState::Released => xkb::KeyDirection::Up,
        };
        let mods = match self.xkb_state.as_mut() {
            Some(state) => {
                state.update_key(xkb::Keycode::new(event.keycode + 8), direction);
                ModifierSnapshot {
                    depressed: state.serialize_mods(xkb::STATE_MODS_DEPRESSED),
                    latched: state.serialize_mods(xkb::STATE_MODS_LATCHED),
                    locked: state.serialize_mods(xkb::STATE_MODS_LOCKED),
                    group: state.serialize_layout(xkb::STATE_LAYOUT_EFFECTIVE),
                }
            }
            None => ModifierSnapshot::default(),
        };

        self.pending_events.push(QueuedKey {
            event,
            time: timestamp(),
            mods,
        });
    }

    fn tap(&mut self, keycode: u32) {
        self.queue(KeyEvent::down(keycode));
        self.queue(KeyEvent::up(keycode));
    }

    fn tap_with_ctrl(&mut self, keycode: u32) {
        self.queue(KeyEvent::down(keycodes::KEY_LEFTCTRL));
        self.tap(keycode);
        self.queue(KeyEvent::up(keycodes::KEY_LEFTCTRL));
    }

    fn tap_shifted(&mut self, keycode: u32) {
        self.queue(KeyEvent::down(keycodes::KEY_LEFTSHIFT));
        self.tap(keycode);
        self.queue(KeyEvent::up(keycodes::KEY_LEFTSHIFT));
    }

    /// Finds the evdev keycode and shift level producing `c`. Only the first
    /// two levels are considered.
    #[must_use]
    pub fn char_to_keycode(&self, c: char) -> Option<(u32, u32)> {
        let keymap = self.xkb_keymap.as_ref()?;
        let code = c as u32;
        let raw = if (0x20..=0x7E).contains(&code) {
            code
        } else {
            0x0100_0000 | code
        };
        find_keycode_for_keysym(keymap, raw.into())
    }

    /// Looks up an XKB keysym name such as `"Return"` or `"BackSpace"`.
    #[must_use]
    pub fn keysym_to_keycode(&self, keysym_name: &str) -> Option<u32> {
        let keymap = self.xkb_keymap.as_ref()?;
        let no_symbol: Keysym = KEY_NoSymbol.into();

        let mut keysym = xkb::keysym_from_name(keysym_name, xkb::KEYSYM_NO_FLAGS);
        if keysym == no_symbol {
            keysym = xkb::keysym_from_name(keysym_name, xkb::KEYSYM_CASE_INSENSITIVE);
        }
        if keysym == no_symbol {
            return None;
        }
        find_keycode_for_keysym(keymap, keysym).map(|(keycode, _)| keycode)
    }

    fn type_char(&mut self, c: char) {
        match c {
            '\n' => self.tap(keycodes::KEY_ENTER),
            '\t' => self.tap(keycodes::KEY_TAB),
            _ => match self.char_to_keycode(c) {
                Some((keycode, 0)) => self.tap(keycode),
                Some((keycode, _)) => self.tap_shifted(keycode),
                None => self.emit_unicode_codepoint(c as u32),
            },
        }
    }

    /// Types a codepoint through Ctrl+Shift+U, the hex digits, and Space.
    pub fn emit_unicode_codepoint(&mut self, codepoint: u32) {
        if !self.initialized {
            tracing::warn!(
                "Virtual keyboard not initialized, ignoring U+{:04X}",
                codepoint
            );
            return;
        }
        tracing::debug!("Using Ctrl+Shift+U fallback for U+{:04X}", codepoint);

        const KEY_U: u32 = 22;
        const HEX_KEYCODES: [u32; 16] = [11, 2, 3, 4, 5, 6, 7, 8, 9, 10, 30, 48, 46, 32, 18, 33];

        self.queue(KeyEvent::down(keycodes::KEY_LEFTCTRL));
        self.queue(KeyEvent::down(keycodes::KEY_LEFTSHIFT));
        self.tap(KEY_U);

        for digit in format!("{:x}", codepoint).chars() {
            if let Some(value) = digit.to_digit(16) {
                self.tap(HEX_KEYCODES[value as usize]);
            }
        }

        self.tap(keycodes::KEY_SPACE);
        self.queue(KeyEvent::up(keycodes::KEY_LEFTSHIFT));
        self.queue(KeyEvent::up(keycodes::KEY_LEFTCTRL));
    }
}

impl TextConnection for VirtualKeyboard {
    fn commit_text(&mut self, text: &str, _cursor_offset: i32) {
        for c in text.chars() {
            self.type_char(c);
        }
    }

    fn delete_surrounding_text(&mut self, before: usize, after: usize) {
        for _ in 0..before {
            self.tap(keycodes::KEY_BACKSPACE);
        }
        for _ in 0..after {
            self.tap(keycodes::KEY_DELETE);
        }
    }

    fn send_key_event(&mut self, event: KeyEvent) {
        self.queue(event);
    }

    fn perform_editor_action(&mut self, action: EditorAction) {
        tracing::debug!("Editor action {:?} via virtual keyboard", action);
        match action {
            EditorAction::Next => self.tap(keycodes::KEY_TAB),
            EditorAction::Previous => self.tap_shifted(keycodes::KEY_TAB),
            _ => self.tap(keycodes::KEY_ENTER),
        }
    }

    fn text_before_cursor(&self, _max_chars: usize) -> Option<String> {
        None
    }

    fn delete_word_before_cursor(&mut self) {
        self.tap_with_ctrl(keycodes::KEY_BACKSPACE);
    }

    /// Sends queued events to the compositor. Without a binding the events
    /// are discarded.
    fn flush(&mut self) {
        let events = std::mem::take(&mut self.pending_events);
        if events.is_empty() {
            return;
        }
        match self.binding.as_mut() {
            Some(binding) => binding.send(&events),
            None => tracing::debug!(
                "Dropping {} key events, virtual keyboard not bound",
                events.len()
            ),
        }
    }
}

fn find_keycode_for_keysym(keymap: &xkb::Keymap, target: Keysym) -> Option<(u32, u32)> {
    for raw in keymap.min_keycode().raw()..=keymap.max_keycode().raw() {
        let keycode = xkb::Keycode::new(raw);
        for layout in 0..keymap.num_layouts_for_key(keycode) {
            let levels = keymap.num_levels_for_key(keycode, layout).min(2);
            for level in 0..levels {
                if keymap
                    .key_get_syms_by_level(keycode, layout, level)
                    .contains(&target)
                {
                    // XKB keycodes are offset by 8 from evdev.
                    return Some((raw - 8, level));
                }
            }
        }
    }
    None
}

fn timestamp() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| (d.as_millis() % u128::from(u32::MAX)) as u32)
        .unwrap_or(0)
}
