// SPDX-License-Identifier: GPL-3.0-only

//! Settings and status window.
//!
//! A small standalone window that tells the user how to enable the
//! keyboard, opens the system input settings, offers a field to try the
//! keyboard in, and runs the self-update flow.
//!
//! The update flow runs on a blocking worker through
//! [`UpdateManager::run_in_background`]. Only its outcome reaches the UI,
//! where it becomes a dismissible notice.

use std::io;
use std::process::Command;

use cosmic::app::{Core, Task};
use cosmic::iced::{Alignment, Background, Color, Length};
use cosmic::widget::{self, container};
use cosmic::Element;

use crate::app_settings;
use crate::config::Config;
use crate::fl;
use crate::renderer::top_bar::HANDLE_LABEL;
use crate::update::{UpdateManager, UpdateOutcome};

/// Program opening the system settings.
pub const SETTINGS_COMMAND: &str = "cosmic-settings";

/// Page of [`SETTINGS_COMMAND`] holding the keyboard settings.
pub const INPUT_SETTINGS_PAGE: &str = "input-devices";

/// Which settings page was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsPage {
    Input,
    General,
}

/// Opens the keyboard settings page, or the general settings if that
/// fails. Failures of both are logged and swallowed.
pub fn open_system_settings() -> Option<SettingsPage> {
    open_system_settings_with(|program, args| Command::new(program).args(args).spawn().map(|_| ()))
}

/// [`open_system_settings`] with a custom process spawner.
pub fn open_system_settings_with<F>(mut spawn: F) -> Option<SettingsPage>
where
    F: FnMut(&str, &[&str]) -> io::Result<()>,
{
    match spawn(SETTINGS_COMMAND, &[INPUT_SETTINGS_PAGE]) {
        Ok(()) => return Some(SettingsPage::Input),
        Err(e) => tracing::debug!("Input settings page unavailable: {}", e),
    }

    match spawn(SETTINGS_COMMAND, &[]) {
        Ok(()) => Some(SettingsPage::General),
        Err(e) => {
            tracing::debug!("System settings unavailable: {}", e);
            None
        }
    }
}

// ============================================================================
// Notices
// ============================================================================

/// Outcome shown in the dialog after an update attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    PermissionRequired,
    Launched {
        version: String,
        newer: bool,
        changelog: String,
    },
}

impl Notice {
    /// Builds the notice for a finished update flow.
    #[must_use]
    pub fn from_result(result: Result<UpdateOutcome, String>) -> Self {
        match result {
            Ok(UpdateOutcome::Launched { info, .. }) => Notice::Launched {
                newer: info.is_newer_than(app_settings::APP_VERSION_CODE),
                version: info.version_name,
                changelog: info.changelog,
            },
            Ok(UpdateOutcome::PermissionRequired { .. }) => Notice::PermissionRequired,
            Err(reason) => Notice::Error(reason),
        }
    }

    fn title(&self) -> String {
        match self {
            Notice::Error(_) => fl!("error-title"),
            Notice::PermissionRequired => fl!("permission-title"),
            Notice::Launched { .. } => fl!("update-title"),
        }
    }

    fn body(&self) -> String {
        match self {
            Notice::Error(reason) => fl!("update-error", reason = reason.as_str()),
            Notice::PermissionRequired => fl!("permission-required"),
            Notice::Launched {
                version,
                newer,
                changelog,
            } => {
                let headline = if *newer {
                    fl!("update-launched", version = version.as_str())
                } else {
                    fl!("update-current", version = version.as_str())
                };
                if changelog.is_empty() {
                    headline
                } else {
                    format!("{headline}\n\n{changelog}")
                }
            }
        }
    }
}

// ============================================================================
// Application
// ============================================================================

pub struct SettingsApp {
    core: Core,
    config: Config,
    test_text: String,
    updating: bool,
    notice: Option<Notice>,
}

#[derive(Debug, Clone)]
pub enum Message {
    OpenSystemSettings,
    TestTextChanged(String),
    CheckForUpdates,
    UpdateFinished(Result<UpdateOutcome, String>),
    DismissNotice,
}

impl SettingsApp {
    fn new(core: Core, config: Config) -> Self {
        Self {
            core,
            config,
            test_text: String::new(),
            updating: false,
            notice: None,
        }
    }

    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.updating
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn start_update(&mut self) -> Task<Message> {
        if self.updating {
            return Task::none();
        }
        self.updating = true;
        self.notice = None;
        tracing::info!("Starting update flow");

        let manager = UpdateManager::system(&self.config);
        Task::perform(
            async move { manager.run_in_background().await.map_err(|e| e.to_string()) },
            |result| cosmic::Action::App(Message::UpdateFinished(result)),
        )
    }
}

const BACKGROUND: Color = Color::BLACK;
const TEXT: Color = Color::WHITE;

fn grey(value: u8) -> Color {
    Color::from_rgb8(value, value, value)
}

impl cosmic::Application for SettingsApp {
    type Executor = cosmic::executor::Default;

    type Flags = ();

    type Message = Message;

    const APP_ID: &'static str = app_settings::SETTINGS_APP_ID;

    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn init(core: Core, _flags: Self::Flags) -> (Self, Task<Self::Message>) {
        (SettingsApp::new(core, Config::default()), Task::none())
    }

    fn view(&self) -> Element<'_, Self::Message> {
        let title = widget::text(fl!("settings-title"))
            .size(32)
            .font(cosmic::font::bold())
            .class(cosmic::theme::Text::Color(TEXT));
        let subtitle = widget::text(fl!("settings-subtitle"))
            .size(24)
            .font(cosmic::font::semibold())
            .class(cosmic::theme::Text::Color(TEXT));
        let version = widget::text(app_settings::APP_VERSION_NAME)
            .size(14)
            .class(cosmic::theme::Text::Color(grey(0x88)));
        let copyright = widget::text(fl!("copyright"))
            .size(12)
            .class(cosmic::theme::Text::Color(grey(0x66)));
        let prompt = widget::text(fl!("enable-prompt"))
            .size(16)
            .class(cosmic::theme::Text::Color(grey(0x88)));

        let open_settings =
            widget::button::standard(fl!("open-settings")).on_press(Message::OpenSystemSettings);

        let instructions = widget::column::column()
            .align_x(Alignment::Center)
            .push(
                widget::text(fl!("instruction-enable", name = HANDLE_LABEL))
                    .size(12)
                    .class(cosmic::theme::Text::Color(grey(0x88))),
            )
            .push(
                widget::text(fl!("instruction-default"))
                    .size(12)
                    .class(cosmic::theme::Text::Color(grey(0x88))),
            );

        let test_field = widget::column::column()
            .spacing(8)
            .width(Length::FillPortion(4))
            .push(
                widget::text(fl!("test-field-label"))
                    .size(14)
                    .class(cosmic::theme::Text::Color(TEXT)),
            )
            .push(
                widget::text_input(fl!("test-field-placeholder"), self.test_text.as_str())
                    .on_input(Message::TestTextChanged)
                    .width(Length::Fill),
            );

        let update_label = if self.updating {
            fl!("downloading")
        } else {
            fl!("check-updates")
        };
        let update_button = widget::button::standard(update_label)
            .on_press_maybe((!self.updating).then_some(Message::CheckForUpdates));

        let content = widget::column::column()
            .spacing(24)
            .padding([16, 0])
            .align_x(Alignment::Center)
            .width(Length::Fill)
            .push(title)
            .push(subtitle)
            .push(version)
            .push(copyright)
            .push(prompt)
            .push(open_settings)
            .push(instructions)
            .push(
                widget::row::row()
                    .push(widget::Space::with_width(Length::FillPortion(1)))
                    .push(test_field)
                    .push(widget::Space::with_width(Length::FillPortion(1))),
            )
            .push(update_button);

        container(widget::scrollable(content))
            .width(Length::Fill)
            .height(Length::Fill)
            .class(cosmic::style::Container::custom(|_theme| container::Style {
                background: Some(Background::Color(BACKGROUND)),
                text_color: Some(TEXT),
                ..Default::default()
            }))
            .into()
    }

    fn dialog(&self) -> Option<Element<'_, Self::Message>> {
        let notice = self.notice.as_ref()?;

        let dialog = widget::dialog()
            .title(notice.title())
            .body(notice.body())
            .primary_action(
                widget::button::suggested(fl!("dialog-accept")).on_press(Message::DismissNotice),
            );

        Some(dialog.into())
    }

    fn update(&mut self, message: Self::Message) -> Task<Self::Message> {
        match message {
            Message::OpenSystemSettings => {
                if let Some(page) = open_system_settings() {
                    tracing::info!("Opened {:?} settings", page);
                }
            }
            Message::TestTextChanged(text) => self.test_text = text,
            Message::CheckForUpdates => return self.start_update(),
            Message::UpdateFinished(result) => {
                self.updating = false;
                if let Err(reason) = &result {
                    tracing::error!("Update failed: {}", reason);
                }
                self.notice = Some(Notice::from_result(result));
            }
            Message::DismissNotice => self.notice = None,
        }

        Task::none()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::{DownloadedPackage, UpdateInfo};
    use cosmic::Application;
    use std::path::PathBuf;

    fn info(code: i64) -> UpdateInfo {
        UpdateInfo {
            version_code: code,
            version_name: format!("ver.{code}"),
            download_url: "https://example.invalid/keyboard.pkg".to_string(),
            changelog: "Teclas más grandes".to_string(),
        }
    }

    fn package() -> DownloadedPackage {
        DownloadedPackage {
            path: PathBuf::from("/tmp/keyboard_update.pkg"),
        }
    }

    fn app() -> SettingsApp {
        SettingsApp::new(Core::default(), Config::default())
    }

    /// Test: The keyboard page is tried first
    #[test]
    fn test_open_settings_prefers_input_page() {
        let mut calls = Vec::new();
        let page = open_system_settings_with(|program, args| {
            calls.push((program.to_string(), args.join(" ")));
            Ok(())
        });

        assert_eq!(page, Some(SettingsPage::Input));
        assert_eq!(calls, vec![(SETTINGS_COMMAND.to_string(), INPUT_SETTINGS_PAGE.to_string())]);
    }

    /// Test: A failing keyboard page falls back to general settings
    #[test]
    fn test_open_settings_falls_back() {
        let mut attempts = 0;
        let page = open_system_settings_with(|_, args| {
            attempts += 1;
            if args.is_empty() {
                Ok(())
            } else {
                Err(io::Error::new(io::ErrorKind::NotFound, "no page"))
            }
        });

        assert_eq!(page, Some(SettingsPage::General));
        assert_eq!(attempts, 2);
    }

    /// Test: Both launches failing is swallowed
    #[test]
    fn test_open_settings_all_fail() {
        let page = open_system_settings_with(|_, _| Err(io::Error::other("missing")));
        assert_eq!(page, None);
    }

    /// Test: Outcomes map to notices
    #[test]
    fn test_notice_from_result() {
        assert_eq!(
            Notice::from_result(Err("HTTP status 404".to_string())),
            Notice::Error("HTTP status 404".to_string())
        );
        assert_eq!(
            Notice::from_result(Ok(UpdateOutcome::PermissionRequired {
                info: info(2),
                package: package(),
            })),
            Notice::PermissionRequired
        );
        assert_eq!(
            Notice::from_result(Ok(UpdateOutcome::Launched {
                info: info(2),
                package: package(),
            })),
            Notice::Launched {
                version: "ver.2".to_string(),
                newer: true,
                changelog: "Teclas más grandes".to_string(),
            }
        );
    }

    /// Test: A same-version manifest is not reported as newer
    #[test]
    fn test_notice_for_current_version() {
        let notice = Notice::from_result(Ok(UpdateOutcome::Launched {
            info: info(app_settings::APP_VERSION_CODE),
            package: package(),
        }));
        assert!(matches!(notice, Notice::Launched { newer: false, .. }));
        assert!(notice.body().contains("Teclas más grandes"));
    }

    /// Test: The button is disabled while the flow runs
    #[test]
    fn test_update_in_progress() {
        let mut app = app();
        let _ = app.update(Message::CheckForUpdates);
        assert!(app.is_updating());

        let _ = app.update(Message::UpdateFinished(Err("boom".to_string())));
        assert!(!app.is_updating());
        assert_eq!(app.notice(), Some(&Notice::Error("boom".to_string())));

        let _ = app.update(Message::DismissNotice);
        assert!(app.notice().is_none());
    }

    #[test]
    fn test_test_field_tracks_text() {
        let mut app = app();
        let _ = app.update(Message::TestTextChanged("hola".to_string()));
        assert_eq!(app.test_text, "hola");
    }

    /// Test: The window and its dialog render
    #[test]
    fn test_view_renders() {
        let mut app = app();
        let _element = app.view();
        assert!(app.dialog().is_none());

        let _ = app.update(Message::UpdateFinished(Ok(UpdateOutcome::PermissionRequired {
            info: info(3),
            package: package(),
        })));
        assert!(app.dialog().is_some());
    }
}
