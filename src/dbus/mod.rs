// SPDX-License-Identifier: GPL-3.0-only

//! D-Bus host contract of the keyboard.
//!
//! The compositor-side glue tells the keyboard when a text field gains or
//! loses focus, and shells or scripts show and hide it. Both go through a
//! session bus service owned by the keyboard binary.
//!
//! # Architecture
//!
//! - **Server**: The keyboard registers the service and forwards every
//!   method call as a [`DbusCommand`] over an mpsc channel. The application
//!   drains the channel from a subscription.
//! - **Client**: [`DbusClient`] and [`DbusClientBlocking`] drive a running
//!   keyboard from another process.
//!
//! # Interface
//!
//! - Object path: `/io/github/platanitos/Keyboard`
//! - Interface name: `io.github.platanitos.Keyboard`
//! - Methods: `StartInput(action: s)`, `FinishInput()`, `Show()`, `Hide()`,
//!   `Toggle()`, `Quit()`
//! - Signals: `VisibilityChanged(visible: b)`

use crate::app_settings::{DBUS_NAME, DBUS_PATH};
use crate::input::EditorAction;
use futures::SinkExt;
use futures::channel::mpsc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use zbus::interface;
use zbus::object_server::SignalEmitter;

/// Commands forwarded from the bus to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbusCommand {
    /// A field gained focus; the action labels the enter key.
    StartInput(EditorAction),
    /// The focused field lost focus.
    FinishInput,
    Show,
    Hide,
    Toggle,
    Quit,
}

/// Object registered on the bus.
pub struct KeyboardInterface {
    command_tx: mpsc::Sender<DbusCommand>,
    visible: Arc<AtomicBool>,
}

impl KeyboardInterface {
    pub fn new(command_tx: mpsc::Sender<DbusCommand>, visible: Arc<AtomicBool>) -> Self {
        Self {
            command_tx,
            visible,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    async fn forward(&mut self, command: DbusCommand) {
        tracing::debug!("D-Bus: {:?}", command);
        if let Err(e) = self.command_tx.send(command).await {
            tracing::error!("Failed to forward {:?}: {}", command, e);
        }
    }
}

#[interface(name = "io.github.platanitos.Keyboard")]
impl KeyboardInterface {
    /// A text field gained focus. `action` is one of `none`, `go`, `search`,
    /// `send`, `next`, `done` or `previous`.
    async fn start_input(&mut self, action: String) {
        self.forward(DbusCommand::StartInput(EditorAction::from_name(&action)))
            .await;
    }

    async fn finish_input(&mut self) {
        self.forward(DbusCommand::FinishInput).await;
    }

    async fn show(&mut self) {
        self.forward(DbusCommand::Show).await;
    }

    async fn hide(&mut self) {
        self.forward(DbusCommand::Hide).await;
    }

    async fn toggle(&mut self) {
        self.forward(DbusCommand::Toggle).await;
    }

    async fn quit(&mut self) {
        self.forward(DbusCommand::Quit).await;
    }

    /// Current visibility, readable as a property.
    #[zbus(property)]
    async fn visible(&self) -> bool {
        self.is_visible()
    }

    #[zbus(signal)]
    async fn visibility_changed(emitter: &SignalEmitter<'_>, visible: bool) -> zbus::Result<()>;
}

/// Result type for D-Bus operations.
pub type DbusResult<T> = Result<T, DbusError>;

/// Errors raised by the server and the clients.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DbusError {
    #[error("D-Bus connection failed: {0}")]
    ConnectionFailed(String),
    #[error("D-Bus service registration failed: {0}")]
    RegistrationFailed(String),
    #[error("D-Bus method call failed: {0}")]
    MethodCallFailed(String),
}

// ============================================================================
// Server
// ============================================================================

/// Handle on the registered service.
#[derive(Clone)]
pub struct DbusServer {
    connection: zbus::Connection,
    visible: Arc<AtomicBool>,
}

impl std::fmt::Debug for DbusServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbusServer")
            .field("visible", &self.visible.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl DbusServer {
    /// Registers the service on the session bus.
    ///
    /// Method calls are forwarded to `command_tx` in arrival order.
    pub async fn start(command_tx: mpsc::Sender<DbusCommand>) -> DbusResult<Self> {
        let visible = Arc::new(AtomicBool::new(true));
        let interface = KeyboardInterface::new(command_tx, Arc::clone(&visible));

        let connection = zbus::connection::Builder::session()
            .map_err(|e| DbusError::ConnectionFailed(e.to_string()))?
            .name(DBUS_NAME)
            .map_err(|e| DbusError::RegistrationFailed(e.to_string()))?
            .serve_at(DBUS_PATH, interface)
            .map_err(|e| DbusError::RegistrationFailed(e.to_string()))?
            .build()
            .await
            .map_err(|e| DbusError::ConnectionFailed(e.to_string()))?;

        tracing::info!("D-Bus service registered: {} at {}", DBUS_NAME, DBUS_PATH);

        Ok(Self {
            connection,
            visible,
        })
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    /// Records the visibility and emits `VisibilityChanged` when it changed.
    pub async fn set_visible(&self, visible: bool) -> DbusResult<()> {
        let previous = self.visible.swap(visible, Ordering::SeqCst);
        if previous != visible {
            self.emit_visibility_changed(visible).await?;
        }
        Ok(())
    }

    async fn emit_visibility_changed(&self, visible: bool) -> DbusResult<()> {
        let iface_ref = self
            .connection
            .object_server()
            .interface::<_, KeyboardInterface>(DBUS_PATH)
            .await
            .map_err(|e| DbusError::MethodCallFailed(e.to_string()))?;

        KeyboardInterface::visibility_changed(iface_ref.signal_emitter(), visible)
            .await
            .map_err(|e| DbusError::MethodCallFailed(e.to_string()))?;

        tracing::debug!("D-Bus: VisibilityChanged({}) emitted", visible);
        Ok(())
    }
}

// ============================================================================
// Client
// ============================================================================

#[zbus::proxy(
    interface = "io.github.platanitos.Keyboard",
    default_service = "io.github.platanitos.Keyboard",
    default_path = "/io/github/platanitos/Keyboard"
)]
trait Keyboard {
    async fn start_input(&self, action: &str) -> zbus::Result<()>;

    async fn finish_input(&self) -> zbus::Result<()>;

    async fn show(&self) -> zbus::Result<()>;

    async fn hide(&self) -> zbus::Result<()>;

    async fn toggle(&self) -> zbus::Result<()>;

    async fn quit(&self) -> zbus::Result<()>;

    #[zbus(property)]
    fn visible(&self) -> zbus::Result<bool>;

    #[zbus(signal)]
    async fn visibility_changed(&self, visible: bool) -> zbus::Result<()>;
}

/// Async client for a running keyboard.
pub struct DbusClient {
    proxy: KeyboardProxy<'static>,
}

impl DbusClient {
    pub async fn connect() -> DbusResult<Self> {
        let connection = zbus::Connection::session()
            .await
            .map_err(|e| DbusError::ConnectionFailed(e.to_string()))?;

        let proxy = KeyboardProxy::new(&connection)
            .await
            .map_err(|e| DbusError::ConnectionFailed(e.to_string()))?;

        Ok(Self { proxy })
    }

    /// Sends a [`DbusCommand`] as the matching method call.
    pub async fn send(&self, command: DbusCommand) -> DbusResult<()> {
        let result = match command {
            DbusCommand::StartInput(action) => self.proxy.start_input(action.name()).await,
            DbusCommand::FinishInput => self.proxy.finish_input().await,
            DbusCommand::Show => self.proxy.show().await,
            DbusCommand::Hide => self.proxy.hide().await,
            DbusCommand::Toggle => self.proxy.toggle().await,
            DbusCommand::Quit => self.proxy.quit().await,
        };
        result.map_err(|e| DbusError::MethodCallFailed(e.to_string()))
    }

    pub async fn is_visible(&self) -> DbusResult<bool> {
        self.proxy
            .visible()
            .await
            .map_err(|e| DbusError::MethodCallFailed(e.to_string()))
    }
}

// ============================================================================
// Blocking Client API
// ============================================================================

/// Blocking wrapper around [`DbusClient`] for command-line use.
pub struct DbusClientBlocking {
    runtime: tokio::runtime::Runtime,
}

impl DbusClientBlocking {
    pub fn new() -> DbusResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DbusError::ConnectionFailed(e.to_string()))?;
        Ok(Self { runtime })
    }

    pub fn send(&self, command: DbusCommand) -> DbusResult<()> {
        self.runtime.block_on(async {
            let client = DbusClient::connect().await?;
            client.send(command).await
        })
    }
}

/// Parses a command-line verb into a command.
///
/// `start-input` takes an optional editor action name.
#[must_use]
pub fn parse_command(verb: &str, argument: Option<&str>) -> Option<DbusCommand> {
    let command = match verb {
        "start-input" => DbusCommand::StartInput(EditorAction::from_name(argument.unwrap_or(""))),
        "finish-input" => DbusCommand::FinishInput,
        "show" => DbusCommand::Show,
        "hide" => DbusCommand::Hide,
        "toggle" => DbusCommand::Toggle,
        "quit" => DbusCommand::Quit,
        _ => return None,
    };
    Some(command)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    /// Test: D-Bus error types display their cause.
    #[test]
    fn test_dbus_error_display() {
        let conn_err = DbusError::ConnectionFailed("test".to_string());
        let reg_err = DbusError::RegistrationFailed("test".to_string());
        let method_err = DbusError::MethodCallFailed("test".to_string());

        assert!(conn_err.to_string().contains("connection failed"));
        assert!(reg_err.to_string().contains("registration failed"));
        assert!(method_err.to_string().contains("method call failed"));
    }

    /// Test: Interface reads the shared visibility.
    #[test]
    fn test_interface_visibility_tracking() {
        let (tx, _rx) = mpsc::channel::<DbusCommand>(10);
        let visible = Arc::new(AtomicBool::new(true));
        let interface = KeyboardInterface::new(tx, Arc::clone(&visible));

        assert!(interface.is_visible());

        visible.store(false, Ordering::SeqCst);
        assert!(!interface.is_visible());
    }

    /// Test: D-Bus service registers (requires a session bus).
    #[tokio::test]
    async fn test_dbus_service_registration() {
        let (tx, _rx) = mpsc::channel::<DbusCommand>(10);

        match DbusServer::start(tx).await {
            Ok(server) => {
                assert!(server.is_visible(), "Default visibility should be true");
            }
            Err(DbusError::ConnectionFailed(msg)) => {
                // No session bus in CI
                tracing::warn!("D-Bus session not available: {}", msg);
            }
            Err(DbusError::RegistrationFailed(msg)) => {
                // Name already owned by a running keyboard
                tracing::warn!("D-Bus registration issue: {}", msg);
            }
            Err(e) => {
                panic!("Unexpected error during D-Bus registration: {}", e);
            }
        }
    }

    /// Test: Every method forwards its command through the channel.
    #[tokio::test]
    async fn test_dbus_methods_send_commands() {
        let (tx, mut rx) = mpsc::channel::<DbusCommand>(10);
        let mut interface = KeyboardInterface::new(tx, Arc::new(AtomicBool::new(true)));

        interface.start_input("search".to_string()).await;
        assert_eq!(
            rx.next().await,
            Some(DbusCommand::StartInput(EditorAction::Search))
        );

        interface.finish_input().await;
        assert_eq!(rx.next().await, Some(DbusCommand::FinishInput));

        interface.show().await;
        assert_eq!(rx.next().await, Some(DbusCommand::Show));

        interface.hide().await;
        assert_eq!(rx.next().await, Some(DbusCommand::Hide));

        interface.toggle().await;
        assert_eq!(rx.next().await, Some(DbusCommand::Toggle));

        interface.quit().await;
        assert_eq!(rx.next().await, Some(DbusCommand::Quit));
    }

    /// Test: Unknown actions start input without an editor action.
    #[tokio::test]
    async fn test_start_input_unknown_action() {
        let (tx, mut rx) = mpsc::channel::<DbusCommand>(10);
        let mut interface = KeyboardInterface::new(tx, Arc::new(AtomicBool::new(true)));

        interface.start_input("launch-rockets".to_string()).await;
        assert_eq!(
            rx.next().await,
            Some(DbusCommand::StartInput(EditorAction::None))
        );
    }

    /// Test: A closed receiver does not fail the method call.
    #[tokio::test]
    async fn test_forward_with_closed_channel() {
        let (tx, rx) = mpsc::channel::<DbusCommand>(10);
        drop(rx);
        let mut interface = KeyboardInterface::new(tx, Arc::new(AtomicBool::new(true)));

        interface.show().await;
    }

    /// Test: Command-line verbs map to commands.
    #[test]
    fn test_parse_command() {
        assert_eq!(
            parse_command("start-input", Some("done")),
            Some(DbusCommand::StartInput(EditorAction::Done))
        );
        assert_eq!(
            parse_command("start-input", None),
            Some(DbusCommand::StartInput(EditorAction::None))
        );
        assert_eq!(parse_command("finish-input", None), Some(DbusCommand::FinishInput));
        assert_eq!(parse_command("toggle", None), Some(DbusCommand::Toggle));
        assert_eq!(parse_command("quit", None), Some(DbusCommand::Quit));
        assert_eq!(parse_command("explode", None), None);
    }

    /// Test: Interface constants match app_settings.
    #[test]
    fn test_dbus_constants() {
        use crate::app_settings;

        assert_eq!(app_settings::DBUS_PATH, "/io/github/platanitos/Keyboard");
        assert_eq!(app_settings::DBUS_INTERFACE, "io.github.platanitos.Keyboard");
        assert_eq!(app_settings::DBUS_NAME, "io.github.platanitos.Keyboard");
    }
}
