// SPDX-License-Identifier: GPL-3.0-only

//! Input-method host service.
//!
//! The host calls these entry points when the keyboard view is created,
//! bound to a focused field, unbound, and destroyed. The service owns the
//! lifecycle, the current text connection, the per-session shift tracking,
//! and the view controller, and routes key presses through the dispatcher.

use std::time::Instant;

use crate::config::Config;
use crate::controller::KeyboardController;
use crate::haptics::Haptics;
use crate::input::{EditorInfo, TextConnection};
use crate::keyboard::{self, Dispatcher, InputSession, KeyAction, RepeatTimer};
use crate::lifecycle::{Lifecycle, LifecycleError, LifecycleEvent, LifecycleState};

pub struct KeyboardService {
    config: Config,
    lifecycle: Lifecycle,
    dispatcher: Dispatcher,
    controller: KeyboardController,
    session: InputSession,
    repeat: RepeatTimer,
    connection: Option<Box<dyn TextConnection>>,
    editor: EditorInfo,
    haptics: Box<dyn Haptics>,
}

impl std::fmt::Debug for KeyboardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardService")
            .field("lifecycle", &self.lifecycle.state())
            .field("ui", self.controller.ui())
            .field("connected", &self.connection.is_some())
            .field("editor", &self.editor)
            .finish_non_exhaustive()
    }
}

impl KeyboardService {
    #[must_use]
    pub fn new(config: Config, haptics: Box<dyn Haptics>) -> Self {
        Self {
            dispatcher: Dispatcher::new(&config),
            controller: KeyboardController::new(&config),
            repeat: RepeatTimer::new(&config),
            session: InputSession::new(),
            lifecycle: Lifecycle::new(),
            connection: None,
            editor: EditorInfo::default(),
            haptics,
            config,
        }
    }

    // ========================================================================
    // Host entry points
    // ========================================================================

    pub fn on_create(&mut self) -> Result<(), LifecycleError> {
        self.lifecycle.perform_restore();
        self.lifecycle.handle_event(LifecycleEvent::Create)?;
        tracing::info!("Keyboard service created");
        Ok(())
    }

    /// Builds a fresh view. UI state and shift tracking start over.
    pub fn on_create_input_view(&mut self) -> Result<(), LifecycleError> {
        self.controller = KeyboardController::new(&self.config);
        self.session = InputSession::new();
        self.repeat.stop();

        self.lifecycle.handle_event(LifecycleEvent::Start)?;
        if self.lifecycle.state() == LifecycleState::Started {
            self.lifecycle.handle_event(LifecycleEvent::Resume)?;
        }
        tracing::info!("Keyboard input view created");
        Ok(())
    }

    /// Binds the focused field.
    pub fn on_start_input_view(&mut self, connection: Box<dyn TextConnection>, editor: EditorInfo) {
        tracing::info!("Input started with editor action {:?}", editor.action);
        self.connection = Some(connection);
        self.editor = editor;
    }

    /// Unbinds the field and stops any backspace repeat.
    pub fn on_finish_input_view(&mut self) -> Result<(), LifecycleError> {
        self.repeat.stop();
        if let Some(mut connection) = self.connection.take() {
            connection.flush();
        }
        self.editor = EditorInfo::default();

        if self.lifecycle.state() == LifecycleState::Resumed {
            self.lifecycle.handle_event(LifecycleEvent::Pause)?;
        }
        self.lifecycle.handle_event(LifecycleEvent::Stop)?;
        tracing::info!("Input finished");
        Ok(())
    }

    pub fn on_destroy(&mut self) -> Result<(), LifecycleError> {
        self.repeat.stop();
        self.connection = None;
        self.lifecycle.handle_event(LifecycleEvent::Destroy)?;
        tracing::info!("Keyboard service destroyed");
        Ok(())
    }

    /// The keyboard view is always shown when input starts.
    #[must_use]
    pub fn evaluate_input_view_shown(&self) -> bool {
        true
    }

    /// The keyboard never takes over the screen.
    #[must_use]
    pub fn evaluate_fullscreen_mode(&self) -> bool {
        false
    }

    // ========================================================================
    // Keys
    // ========================================================================

    /// A key went down. Backspace arms the hold-to-repeat timer.
    pub fn key_down(&mut self, label: &str, now: Instant) {
        if KeyAction::from_label(label) == KeyAction::Backspace {
            self.repeat.start(now);
        }
    }

    /// A key was released over itself: stop any repeat, then handle the
    /// press.
    pub fn key_up(&mut self, label: &str, now: Instant) -> KeyAction {
        self.repeat.stop();
        self.handle_key(label, now)
    }

    /// The pointer left the keyboard or the press was cancelled.
    pub fn cancel_press(&mut self) {
        self.repeat.stop();
    }

    /// Pulses haptics, then dispatches the key.
    pub fn handle_key(&mut self, label: &str, now: Instant) -> KeyAction {
        self.haptics.pulse();

        let connection = self
            .connection
            .as_mut()
            .map(|conn| conn.as_mut() as &mut dyn TextConnection);
        let action = self.dispatcher.dispatch(
            label,
            self.controller.ui_mut(),
            &mut self.session,
            connection,
            &self.editor,
            now,
        );
        self.flush();
        action
    }

    /// Runs every word delete that came due while backspace is held.
    /// Returns the number of deletions performed.
    pub fn backspace_hold_tick(&mut self, now: Instant) -> u32 {
        let due = self.repeat.poll(now);
        if due == 0 {
            return 0;
        }

        match self.connection.as_mut() {
            Some(conn) => {
                for _ in 0..due {
                    keyboard::delete_word(conn.as_mut());
                }
            }
            None => tracing::debug!("No text connection, dropping word delete"),
        }
        self.flush();
        due
    }

    /// Whether the repeat timer needs ticking.
    #[must_use]
    pub fn is_repeating(&self) -> bool {
        self.repeat.is_armed()
    }

    fn flush(&mut self) {
        if let Some(conn) = self.connection.as_mut() {
            conn.flush();
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn controller(&self) -> &KeyboardController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut KeyboardController {
        &mut self.controller
    }

    #[must_use]
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    #[must_use]
    pub fn has_connection(&self) -> bool {
        self.connection.is_some()
    }

    #[must_use]
    pub fn editor(&self) -> &EditorInfo {
        &self.editor
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haptics::CountingHaptics;
    use crate::input::{EditorAction, KeyEvent, TextBuffer};
    use crate::keyboard::{CaseMode, LayoutMode};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    /// Shares a [`TextBuffer`] between the service and the test.
    #[derive(Clone, Default)]
    struct SharedField(Rc<RefCell<TextBuffer>>);

    impl SharedField {
        fn with_text(text: &str) -> Self {
            Self(Rc::new(RefCell::new(TextBuffer::with_text(text))))
        }

        fn text(&self) -> String {
            self.0.borrow().text()
        }
    }

    impl TextConnection for SharedField {
        fn commit_text(&mut self, text: &str, cursor_offset: i32) {
            self.0.borrow_mut().commit_text(text, cursor_offset);
        }

        fn delete_surrounding_text(&mut self, before: usize, after: usize) {
            self.0.borrow_mut().delete_surrounding_text(before, after);
        }

        fn send_key_event(&mut self, event: KeyEvent) {
            self.0.borrow_mut().send_key_event(event);
        }

        fn perform_editor_action(&mut self, action: EditorAction) {
            self.0.borrow_mut().perform_editor_action(action);
        }

        fn text_before_cursor(&self, max_chars: usize) -> Option<String> {
            self.0.borrow().text_before_cursor(max_chars)
        }
    }

    fn service() -> (KeyboardService, CountingHaptics) {
        let haptics = CountingHaptics::new();
        let mut service = KeyboardService::new(Config::default(), Box::new(haptics.clone()));
        service.on_create().unwrap();
        service.on_create_input_view().unwrap();
        (service, haptics)
    }

    /// Test: Creating the input view resumes the lifecycle
    #[test]
    fn test_create_input_view_resumes() {
        let (service, _) = service();
        assert_eq!(service.lifecycle().state(), LifecycleState::Resumed);
        assert!(service.lifecycle().is_restored());
        assert!(service.evaluate_input_view_shown());
        assert!(!service.evaluate_fullscreen_mode());
    }

    /// Test: Finishing input pauses, stops, and drops the connection
    #[test]
    fn test_finish_input_view() {
        let (mut service, _) = service();
        service.on_start_input_view(Box::new(TextBuffer::new()), EditorInfo::default());
        assert!(service.has_connection());

        service.key_down("⌫", Instant::now());
        service.on_finish_input_view().unwrap();

        assert!(!service.has_connection());
        assert!(!service.is_repeating());
        assert_eq!(service.lifecycle().state(), LifecycleState::Created);
    }

    /// Test: Recreating the view resets UI state
    #[test]
    fn test_recreate_resets_state() {
        let (mut service, _) = service();
        service.handle_key("123", Instant::now());
        service.controller_mut().toggle_dark_mode();

        service.on_finish_input_view().unwrap();
        service.on_create_input_view().unwrap();

        let ui = service.controller().ui();
        assert_eq!(ui.layout_mode, LayoutMode::Alphabetic);
        assert_eq!(ui.case_mode, CaseMode::Lower);
        assert!(!ui.dark_mode);
    }

    /// Test: Every key press pulses haptics, even without a field
    #[test]
    fn test_haptics_per_key() {
        let (mut service, haptics) = service();
        let now = Instant::now();
        service.handle_key("Q", now);
        service.handle_key("⇧", now);
        service.key_up("⌫", now);

        assert_eq!(haptics.count(), 3);
    }

    /// Test: Keys reach the bound field
    #[test]
    fn test_typing_into_field() {
        let (mut service, _) = service();
        let field = SharedField::default();
        service.on_start_input_view(Box::new(field.clone()), EditorInfo::default());

        let now = Instant::now();
        for label in ["⇧", "H", "I", "espacio"] {
            service.key_down(label, now);
            service.key_up(label, now);
        }
        assert_eq!(field.text(), "Hi ");
    }

    /// Test: Holding backspace deletes words, releasing deletes one more
    #[test]
    fn test_backspace_hold_deletes_words() {
        let (mut service, _) = service();
        let field = SharedField::with_text("uno dos tres");
        service.on_start_input_view(Box::new(field.clone()), EditorInfo::default());

        let t0 = Instant::now();
        service.key_down("⌫", t0);
        assert_eq!(service.backspace_hold_tick(t0 + Duration::from_millis(100)), 0);
        assert_eq!(field.text(), "uno dos tres");

        assert_eq!(service.backspace_hold_tick(t0 + Duration::from_millis(500)), 1);
        assert_eq!(field.text(), "uno dos ");

        assert_eq!(service.backspace_hold_tick(t0 + Duration::from_millis(550)), 1);
        assert_eq!(field.text(), "uno ");

        service.key_up("⌫", t0 + Duration::from_millis(560));
        assert_eq!(field.text(), "uno");
        assert_eq!(service.backspace_hold_tick(t0 + Duration::from_millis(2000)), 0);
    }

    /// Test: Lifecycle errors surface from invalid host calls
    #[test]
    fn test_destroy_is_terminal() {
        let (mut service, _) = service();
        service.on_destroy().unwrap();
        assert!(service.on_create_input_view().is_err());
    }
}
