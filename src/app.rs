// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard application.
//!
//! Runs the [`KeyboardService`] inside a libcosmic application with no main
//! window. The keyboard itself is a layer surface that is opened and
//! destroyed as the host shows and hides it.
//!
//! # Event flow
//!
//! - Key widgets report press and release. A key fires on release over the
//!   same key; releasing anywhere else cancels the press.
//! - Host commands arrive from the D-Bus subscription.
//! - While backspace is held a 50 ms tick drives the word-delete repeat.
//! - Pointer motion feeds the resize drag while the handle is held.

use std::time::{Duration, Instant};

use cosmic::app::{Core, Task};
use cosmic::iced::event;
use cosmic::iced::mouse;
use cosmic::iced::time;
use cosmic::iced::touch;
use cosmic::iced::window;
use cosmic::iced::{Event, Length, Subscription};
use cosmic::iced_winit::platform_specific::wayland::commands::layer_surface::{
    destroy_layer_surface, get_layer_surface,
};
use cosmic::widget::Space;
use cosmic::Element;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};

use crate::app_settings;
use crate::config::Config;
use crate::dbus::{DbusCommand, DbusServer};
use crate::haptics::FeedbackdHaptics;
use crate::input::{EditorAction, EditorInfo, VirtualKeyboard};
use crate::layer_shell;
use crate::renderer::{KeyboardRenderer, RendererMessage, render_keyboard};
use crate::service::KeyboardService;

pub struct KeyboardApp {
    core: Core,
    service: KeyboardService,
    renderer: KeyboardRenderer,
    /// The keyboard layer surface, while shown.
    surface: Option<window::Id>,
    /// Last height the compositor configured for the surface.
    surface_height: f32,
    screen_height: f32,
    dbus_server: Option<DbusServer>,
}

/// Messages emitted by the keyboard surface and its subscriptions.
#[derive(Debug, Clone)]
pub enum Message {
    Renderer(RendererMessage),
    /// Pointer y in surface coordinates.
    PointerMoved(f32),
    /// A button or finger went up outside any key.
    PointerReleased,
    SurfaceResized(window::Id, f32),
    SurfaceClosed(window::Id),
    RepeatTick,
    DbusServerStarted(DbusServer),
    DbusServerFailed(String),
    Dbus(DbusCommand),
}

impl KeyboardApp {
    /// Creates the input view. The surface opens on the first show.
    #[must_use]
    pub fn new(core: Core, mut service: KeyboardService, screen_height: f32) -> Self {
        if let Err(e) = service.on_create() {
            tracing::error!("Keyboard service creation failed: {}", e);
        }
        if let Err(e) = service.on_create_input_view() {
            tracing::error!("Input view creation failed: {}", e);
        }
        service.controller_mut().set_screen_height(screen_height);

        let surface_height = service.controller().surface_height();
        Self {
            core,
            service,
            renderer: KeyboardRenderer::new(),
            surface: None,
            surface_height,
            screen_height,
            dbus_server: None,
        }
    }

    #[must_use]
    pub fn service(&self) -> &KeyboardService {
        &self.service
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.surface.is_some()
    }

    #[must_use]
    pub fn surface(&self) -> Option<window::Id> {
        self.surface
    }

    fn open_surface(&mut self) -> Task<Message> {
        let id = window::Id::unique();
        let height = self.service.controller().surface_height();
        self.surface = Some(id);
        self.surface_height = height;

        tracing::info!("Opening keyboard surface {:?} at {}px", id, height);
        get_layer_surface(layer_shell::keyboard_surface_settings(id, height))
    }

    fn set_visible(&mut self, visible: bool) -> Task<Message> {
        let surface_task = match (visible, self.surface) {
            (true, None) => self.open_surface(),
            (false, Some(id)) => {
                self.surface = None;
                self.abandon_press();
                tracing::info!("Closing keyboard surface {:?}", id);
                destroy_layer_surface(id)
            }
            _ => Task::none(),
        };

        Task::batch([surface_task, self.emit_visibility(visible)])
    }

    fn emit_visibility(&self, visible: bool) -> Task<Message> {
        let Some(server) = self.dbus_server.clone() else {
            return Task::none();
        };
        Task::future(async move {
            if let Err(e) = server.set_visible(visible).await {
                tracing::warn!("Failed to emit visibility signal: {}", e);
            }
        })
        .discard()
    }

    /// Drops any held key and ends a drag in progress.
    fn abandon_press(&mut self) {
        if self.renderer.clear_pressed().is_some() {
            self.service.cancel_press();
        }
        self.service.controller_mut().end_drag();
    }

    /// Resizes the surface if the controller's height moved away from
    /// `before`.
    fn sync_surface_height(&mut self, before: f32) -> Task<Message> {
        let after = self.service.controller().surface_height();
        match self.surface {
            Some(id) if (after - before).abs() > f32::EPSILON => {
                layer_shell::resize_surface(id, after)
            }
            _ => Task::none(),
        }
    }

    fn start_input(&mut self, action: EditorAction) -> Task<Message> {
        let mut keyboard = VirtualKeyboard::new();
        if let Err(e) = keyboard.connect() {
            tracing::warn!("Virtual keyboard unavailable, keys will not reach the field: {}", e);
        }
        self.service
            .on_start_input_view(Box::new(keyboard), EditorInfo::with_action(action));

        if self.service.evaluate_input_view_shown() {
            self.set_visible(true)
        } else {
            Task::none()
        }
    }

    fn finish_input(&mut self) -> Task<Message> {
        self.abandon_press();
        if let Err(e) = self.service.on_finish_input_view() {
            tracing::warn!("Finishing input: {}", e);
        }
        self.set_visible(false)
    }

    fn handle_renderer(&mut self, message: RendererMessage) -> Task<Message> {
        let before = self.service.controller().surface_height();

        match message {
            RendererMessage::KeyPressed(label) => {
                self.service.key_down(&label, Instant::now());
                self.renderer.press_key(label);
            }
            RendererMessage::KeyReleased(label) => {
                self.service.controller_mut().end_drag();
                if self.renderer.release_key(&label) {
                    self.service.key_up(&label, Instant::now());
                } else {
                    self.abandon_press();
                }
            }
            RendererMessage::ToggleKeys => self.service.controller_mut().toggle_keys_visible(),
            RendererMessage::ToggleDarkMode => self.service.controller_mut().toggle_dark_mode(),
            RendererMessage::ToggleResizeMode => {
                self.service.controller_mut().toggle_resize_mode();
            }
            RendererMessage::ResizeDragStart => self.service.controller_mut().begin_drag(),
            RendererMessage::Noop => {}
        }

        self.sync_surface_height(before)
    }

    fn handle_dbus(&mut self, command: DbusCommand) -> Task<Message> {
        tracing::info!("Host command: {:?}", command);
        match command {
            DbusCommand::StartInput(action) => self.start_input(action),
            DbusCommand::FinishInput => self.finish_input(),
            DbusCommand::Show => self.set_visible(true),
            DbusCommand::Hide => self.set_visible(false),
            DbusCommand::Toggle => self.set_visible(!self.is_visible()),
            DbusCommand::Quit => {
                if let Err(e) = self.service.on_destroy() {
                    tracing::warn!("Destroying keyboard service: {}", e);
                }
                cosmic::iced::exit()
            }
        }
    }
}

impl cosmic::Application for KeyboardApp {
    type Executor = cosmic::executor::Default;

    type Flags = ();

    type Message = Message;

    const APP_ID: &'static str = app_settings::APP_ID;

    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn init(core: Core, _flags: Self::Flags) -> (Self, Task<Self::Message>) {
        let service = KeyboardService::new(Config::default(), Box::new(FeedbackdHaptics::spawn()));
        let mut app = KeyboardApp::new(core, service, layer_shell::screen_height());
        let task = app.open_surface();
        (app, task)
    }

    fn view(&self) -> Element<'_, Self::Message> {
        Space::new(Length::Shrink, Length::Shrink).into()
    }

    fn view_window(&self, id: window::Id) -> Element<'_, Self::Message> {
        if Some(id) == self.surface {
            render_keyboard(self.service.controller(), &self.renderer).map(Message::Renderer)
        } else {
            Space::new(Length::Shrink, Length::Shrink).into()
        }
    }

    fn subscription(&self) -> Subscription<Self::Message> {
        let mut subscriptions = vec![pointer_subscription(), dbus_subscription()];

        if self.service.is_repeating() {
            subscriptions.push(
                time::every(Duration::from_millis(app_settings::BACKSPACE_REPEAT_MS))
                    .map(|_| Message::RepeatTick),
            );
        }

        Subscription::batch(subscriptions)
    }

    fn update(&mut self, message: Self::Message) -> Task<Self::Message> {
        match message {
            Message::Renderer(message) => return self.handle_renderer(message),
            Message::PointerMoved(y) => {
                if self.service.controller().is_dragging() {
                    let before = self.service.controller().surface_height();
                    // The surface is bottom-anchored, so its top sits at
                    // screen height minus surface height.
                    let absolute = self.screen_height - self.surface_height + y;
                    self.service.controller_mut().drag_to(absolute);
                    return self.sync_surface_height(before);
                }
            }
            Message::PointerReleased => self.abandon_press(),
            Message::SurfaceResized(id, height) => {
                if Some(id) == self.surface {
                    self.surface_height = height;
                }
            }
            Message::SurfaceClosed(id) => {
                if Some(id) == self.surface {
                    tracing::info!("Keyboard surface closed by the compositor");
                    self.surface = None;
                    self.abandon_press();
                    return self.emit_visibility(false);
                }
            }
            Message::RepeatTick => {
                self.service.backspace_hold_tick(Instant::now());
            }
            Message::DbusServerStarted(server) => {
                tracing::info!("D-Bus server started");
                self.dbus_server = Some(server);
                return self.emit_visibility(self.is_visible());
            }
            Message::DbusServerFailed(error) => {
                // The keyboard stays usable from its own surface.
                tracing::error!("Failed to start D-Bus server: {}", error);
            }
            Message::Dbus(command) => return self.handle_dbus(command),
        }

        Task::none()
    }
}

/// Surface, pointer and touch events the widgets do not capture.
fn pointer_subscription() -> Subscription<Message> {
    event::listen_with(|event, status, id| match event {
        Event::Window(window::Event::Closed) => Some(Message::SurfaceClosed(id)),
        Event::Window(window::Event::Resized(size)) => {
            Some(Message::SurfaceResized(id, size.height))
        }
        Event::Mouse(mouse::Event::CursorMoved { position }) => {
            Some(Message::PointerMoved(position.y))
        }
        Event::Touch(touch::Event::FingerMoved { position, .. }) => {
            Some(Message::PointerMoved(position.y))
        }
        Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
        | Event::Touch(touch::Event::FingerLifted { .. })
        | Event::Touch(touch::Event::FingerLost { .. })
            if status == event::Status::Ignored =>
        {
            Some(Message::PointerReleased)
        }
        _ => None,
    })
}

/// Registers the bus service and yields one message per host command.
fn dbus_subscription() -> Subscription<Message> {
    Subscription::run_with_id(
        std::any::TypeId::of::<DbusServer>(),
        cosmic::iced::stream::channel(16, |mut output| async move {
            let (command_tx, mut command_rx) = mpsc::channel::<DbusCommand>(16);

            match DbusServer::start(command_tx).await {
                Ok(server) => {
                    let _ = output.send(Message::DbusServerStarted(server)).await;
                }
                Err(e) => {
                    let _ = output.send(Message::DbusServerFailed(e.to_string())).await;
                    return;
                }
            }

            while let Some(command) = command_rx.next().await {
                if output.send(Message::Dbus(command)).await.is_err() {
                    break;
                }
            }
            tracing::warn!("D-Bus command channel closed");
        }),
    )
}
