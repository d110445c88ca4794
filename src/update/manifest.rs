// SPDX-License-Identifier: GPL-3.0-only

//! Remote version manifest.

use serde::{Deserialize, Serialize};

use super::UpdateError;

/// Contents of `version_info.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInfo {
    #[serde(rename = "latest_version_code")]
    pub version_code: i64,
    #[serde(rename = "latest_version_name")]
    pub version_name: String,
    pub download_url: String,
    #[serde(default)]
    pub changelog: String,
}

impl UpdateInfo {
    /// Parses a manifest body.
    pub fn parse(body: &str) -> Result<Self, UpdateError> {
        serde_json::from_str(body).map_err(UpdateError::Parse)
    }

    /// Whether this manifest advertises a build newer than `current`.
    #[must_use]
    pub fn is_newer_than(&self, current: i64) -> bool {
        self.version_code > current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let info = UpdateInfo::parse(
            r#"{
                "latest_version_code": 3,
                "latest_version_name": "ver.3",
                "download_url": "https://example.org/keyboard.pkg",
                "changelog": "Teclas más grandes"
            }"#,
        )
        .unwrap();

        assert_eq!(info.version_code, 3);
        assert_eq!(info.version_name, "ver.3");
        assert_eq!(info.download_url, "https://example.org/keyboard.pkg");
        assert_eq!(info.changelog, "Teclas más grandes");
        assert!(info.is_newer_than(1));
        assert!(!info.is_newer_than(3));
    }

    #[test]
    fn test_changelog_is_optional() {
        let info = UpdateInfo::parse(
            r#"{"latest_version_code":2,"latest_version_name":"ver.2","download_url":"u"}"#,
        )
        .unwrap();
        assert!(info.changelog.is_empty());
    }

    #[test]
    fn test_malformed_manifest() {
        assert!(matches!(
            UpdateInfo::parse("<html>404</html>"),
            Err(UpdateError::Parse(_))
        ));
        assert!(matches!(
            UpdateInfo::parse(r#"{"latest_version_code":"two"}"#),
            Err(UpdateError::Parse(_))
        ));
    }
}
