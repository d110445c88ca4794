// SPDX-License-Identifier: GPL-3.0-only

//! Runtime configuration assembled from the compiled-in constants.
//!
//! Nothing here is persisted. The controller, the service and the update
//! manager receive their tunables through [`Config`].

use std::path::PathBuf;
use std::time::Duration;

use crate::app_settings;

/// Tunables shared by the keyboard and the settings window.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum gap between two shift presses that enters caps lock.
    pub double_tap_window: Duration,
    /// Hold time before backspace starts deleting words.
    pub long_press_threshold: Duration,
    /// Interval between word deletions while backspace stays held.
    pub repeat_interval: Duration,
    /// Height of a freshly created input view.
    pub initial_height: f32,
    /// Lower bound of the resize drag.
    pub min_height: f32,
    /// Upper bound of the resize drag as a fraction of the screen height.
    pub max_height_ratio: f32,
    /// Full URL of the update manifest.
    pub manifest_url: String,
    /// Directory receiving downloaded packages.
    pub download_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            double_tap_window: Duration::from_millis(app_settings::DOUBLE_TAP_TIMEOUT_MS),
            long_press_threshold: Duration::from_millis(app_settings::LONG_PRESS_DELAY_MS),
            repeat_interval: Duration::from_millis(app_settings::BACKSPACE_REPEAT_MS),
            initial_height: app_settings::INITIAL_HEIGHT,
            min_height: app_settings::MIN_HEIGHT,
            max_height_ratio: app_settings::MAX_HEIGHT_SCREEN_RATIO,
            manifest_url: format!(
                "{}{}",
                app_settings::UPDATE_BASE_URL,
                app_settings::UPDATE_MANIFEST_FILE
            ),
            download_dir: default_download_dir(),
        }
    }
}

impl Config {
    /// Returns the configuration with a different manifest URL.
    #[must_use]
    pub fn with_manifest_url(mut self, url: impl Into<String>) -> Self {
        self.manifest_url = url.into();
        self
    }

    /// Returns the configuration with a different download directory.
    #[must_use]
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }
}

/// `platanitos/updates` under the user cache directory, or under the system
/// temp directory when there is no home.
fn default_download_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(app_settings::APP_DIR_NAME)
        .join(app_settings::UPDATE_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_app_settings() {
        let config = Config::default();

        assert_eq!(config.double_tap_window, Duration::from_millis(500));
        assert_eq!(config.long_press_threshold, Duration::from_millis(500));
        assert_eq!(config.repeat_interval, Duration::from_millis(50));
        assert_eq!(config.initial_height, 320.0);
        assert_eq!(config.min_height, 320.0);
        assert_eq!(config.max_height_ratio, 0.5);
        assert_eq!(
            config.manifest_url,
            "https://erickmontes464.github.io/Teclado-Virtual-Android/version_info.json"
        );
    }

    /// Test: Downloads land in the user cache directory
    #[test]
    fn test_download_dir_under_cache() {
        let config = Config::default();
        assert!(config.download_dir.ends_with("platanitos/updates"));

        let base = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
        assert!(config.download_dir.starts_with(&base));
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::default()
            .with_manifest_url("http://127.0.0.1:1/version_info.json")
            .with_download_dir("/tmp/platanitos-test");

        assert_eq!(config.manifest_url, "http://127.0.0.1:1/version_info.json");
        assert_eq!(config.download_dir, PathBuf::from("/tmp/platanitos-test"));
    }
}
