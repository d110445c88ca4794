// SPDX-License-Identifier: GPL-3.0-only

//! Hand-off of a downloaded package to the platform installer.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::UpdateError;

/// Platform installer seam.
pub trait PackageInstaller: Send {
    /// Whether packages from outside the system repositories may be opened.
    fn can_install(&self) -> bool;

    /// Sends the user to wherever that permission is granted.
    fn request_permission(&self) -> Result<(), UpdateError>;

    /// Opens the installer on `package`. Does not wait for it.
    fn launch(&self, package: &Path) -> Result<(), UpdateError>;
}

/// Opens packages with the desktop's default handler (`xdg-open`).
///
/// Installing is possible when the opener is on `PATH`. Otherwise the user
/// is sent to the system settings to set up a package handler.
#[derive(Debug, Clone)]
pub struct SystemInstaller {
    opener: String,
    settings_command: Vec<String>,
}

impl Default for SystemInstaller {
    fn default() -> Self {
        Self {
            opener: "xdg-open".to_string(),
            settings_command: vec!["cosmic-settings".to_string()],
        }
    }
}

impl SystemInstaller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a different opener program.
    #[must_use]
    pub fn with_opener(mut self, opener: impl Into<String>) -> Self {
        self.opener = opener.into();
        self
    }
}

impl PackageInstaller for SystemInstaller {
    fn can_install(&self) -> bool {
        find_in_path(&self.opener).is_some()
    }

    fn request_permission(&self) -> Result<(), UpdateError> {
        let Some((program, args)) = self.settings_command.split_first() else {
            return Ok(());
        };
        Command::new(program)
            .args(args)
            .spawn()
            .map(|_| ())
            .map_err(|e| UpdateError::Install(format!("{program}: {e}")))
    }

    fn launch(&self, package: &Path) -> Result<(), UpdateError> {
        tracing::info!("Opening {} with {}", package.display(), self.opener);
        Command::new(&self.opener)
            .arg(package)
            .spawn()
            .map(|_| ())
            .map_err(|e| UpdateError::Install(format!("{}: {e}", self.opener)))
    }
}

/// Resolves `program` against `PATH`. Paths containing a separator are
/// checked as-is.
fn find_in_path(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        let path = PathBuf::from(program);
        return path.is_file().then_some(path);
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_opener_cannot_install() {
        let installer = SystemInstaller::new().with_opener("platanitos-no-such-opener");
        assert!(!installer.can_install());
    }

    #[test]
    fn test_absolute_opener() {
        let dir = tempfile::tempdir().unwrap();
        let opener = dir.path().join("opener");
        std::fs::write(&opener, "#!/bin/sh\n").unwrap();

        let installer = SystemInstaller::new().with_opener(opener.to_string_lossy());
        assert!(installer.can_install());
    }

    #[test]
    fn test_launch_failure_is_install_error() {
        let installer = SystemInstaller::new().with_opener("/nonexistent/platanitos-opener");
        let err = installer.launch(Path::new("/tmp/keyboard_update.pkg")).unwrap_err();
        assert!(matches!(err, UpdateError::Install(_)));
    }
}
