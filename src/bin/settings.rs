// SPDX-License-Identifier: GPL-3.0-only

//! Platanitos settings window.
//!
//! Explains how to enable the keyboard, opens the system input settings,
//! and checks for updates.

use platanitos::{i18n, settings};

fn main() -> cosmic::iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("platanitos=info".parse().unwrap()),
        )
        .init();

    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();
    i18n::init(&requested_languages);

    let settings = cosmic::app::Settings::default()
        .size(cosmic::iced::Size::new(480.0, 760.0))
        .size_limits(cosmic::iced::Limits::NONE.min_width(360.0).min_height(480.0));

    cosmic::app::run::<settings::SettingsApp>(settings, ())
}
