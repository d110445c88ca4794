// SPDX-License-Identifier: GPL-3.0-only

//! Platanitos keyboard.
//!
//! Without arguments this starts the keyboard and registers its D-Bus
//! service. With a host command verb it forwards that command to the
//! running keyboard and exits:
//!
//! ```bash
//! platanitos start-input search
//! platanitos finish-input
//! platanitos toggle
//! ```

use platanitos::dbus::{self, DbusClientBlocking};
use platanitos::{app, i18n};

fn main() -> cosmic::iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("platanitos=info".parse().unwrap()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    if let Some(verb) = args.next() {
        let argument = args.next();
        std::process::exit(forward_command(&verb, argument.as_deref()));
    }

    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();
    i18n::init(&requested_languages);

    // The keyboard is a layer surface; there is no main window to close.
    let settings = cosmic::app::Settings::default()
        .exit_on_close(false)
        .no_main_window(true);

    cosmic::app::run::<app::KeyboardApp>(settings, ())
}

/// Sends one host command to a running keyboard. Returns the exit code.
fn forward_command(verb: &str, argument: Option<&str>) -> i32 {
    let Some(command) = dbus::parse_command(verb, argument) else {
        eprintln!(
            "unknown command '{verb}', expected one of: start-input [action], finish-input, show, hide, toggle, quit"
        );
        return 2;
    };

    let result = DbusClientBlocking::new().and_then(|client| client.send(command));
    match result {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Failed to send {:?}: {}", command, e);
            1
        }
    }
}
