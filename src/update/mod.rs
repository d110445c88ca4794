// SPDX-License-Identifier: GPL-3.0-only

//! Self-update pipeline.
//!
//! A strictly sequential flow with no retry:
//!
//! 1. GET the manifest (`version_info.json`)
//! 2. Parse it into an [`UpdateInfo`]
//! 3. Stream the package into `keyboard_update.part`, then rename it onto
//!    `keyboard_update.pkg`
//! 4. If the installer refuses unknown packages, request permission and stop
//! 5. Launch the installer on the package
//!
//! Nothing is written before the manifest parses, and a previous complete
//! download is only replaced once a new body has been fully received. The
//! package is not verified beyond what the platform installer does.
//!
//! Every step blocks. [`UpdateManager::run_in_background`] moves the whole
//! flow onto tokio's blocking pool.

mod installer;
mod manifest;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub use installer::{PackageInstaller, SystemInstaller};
pub use manifest::UpdateInfo;

use crate::app_settings;
use crate::config::Config;

/// Name of the in-progress download next to the package.
const PARTIAL_FILE: &str = "keyboard_update.part";

/// Errors surfaced by the update flow.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("network error: {0}")]
    Http(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("malformed manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("could not write the download: {0}")]
    Io(#[from] io::Error),
    #[error("could not start the installer: {0}")]
    Install(String),
}

fn http_error(error: ureq::Error) -> UpdateError {
    match error {
        ureq::Error::StatusCode(code) => UpdateError::Status(code),
        other => UpdateError::Http(other.to_string()),
    }
}

/// A fully downloaded package on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedPackage {
    pub path: PathBuf,
}

/// How a completed flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The installer was started on the package.
    Launched {
        info: UpdateInfo,
        package: DownloadedPackage,
    },
    /// The installer refused. The user was sent to grant permission and
    /// must start the flow again.
    PermissionRequired {
        info: UpdateInfo,
        package: DownloadedPackage,
    },
}

#[derive(Debug)]
pub struct UpdateManager<I: PackageInstaller> {
    manifest_url: String,
    download_dir: PathBuf,
    installer: I,
}

impl UpdateManager<SystemInstaller> {
    /// Manager using the desktop installer.
    #[must_use]
    pub fn system(config: &Config) -> Self {
        Self::new(config, SystemInstaller::new())
    }
}

impl<I: PackageInstaller> UpdateManager<I> {
    #[must_use]
    pub fn new(config: &Config, installer: I) -> Self {
        Self {
            manifest_url: config.manifest_url.clone(),
            download_dir: config.download_dir.clone(),
            installer,
        }
    }

    /// Final location of the downloaded package.
    #[must_use]
    pub fn package_path(&self) -> PathBuf {
        self.download_dir.join(app_settings::UPDATE_PACKAGE_FILE)
    }

    #[must_use]
    pub fn installer(&self) -> &I {
        &self.installer
    }

    /// Fetches and parses the manifest only.
    pub fn check(&self) -> Result<UpdateInfo, UpdateError> {
        tracing::info!("Fetching update manifest from {}", self.manifest_url);
        let body = ureq::get(&self.manifest_url)
            .call()
            .map_err(http_error)?
            .into_body()
            .read_to_string()
            .map_err(http_error)?;
        UpdateInfo::parse(&body)
    }

    /// Downloads the package advertised by `info`.
    pub fn download(&self, info: &UpdateInfo) -> Result<DownloadedPackage, UpdateError> {
        tracing::info!("Downloading {} from {}", info.version_name, info.download_url);
        let response = ureq::get(&info.download_url).call().map_err(http_error)?;

        fs::create_dir_all(&self.download_dir)?;
        let partial = self.download_dir.join(PARTIAL_FILE);
        let mut reader = response.into_body().into_reader();

        if let Err(e) = write_file(&partial, &mut reader) {
            if let Err(cleanup) = fs::remove_file(&partial) {
                tracing::debug!("Could not remove {}: {}", partial.display(), cleanup);
            }
            return Err(e.into());
        }

        let path = self.package_path();
        fs::rename(&partial, &path)?;
        tracing::info!("Package saved to {}", path.display());
        Ok(DownloadedPackage { path })
    }

    /// Runs the whole flow.
    pub fn run(&self) -> Result<UpdateOutcome, UpdateError> {
        let info = self.check()?;
        let package = self.download(&info)?;

        if !self.installer.can_install() {
            tracing::warn!("Installer not permitted, requesting permission");
            self.installer.request_permission()?;
            return Ok(UpdateOutcome::PermissionRequired { info, package });
        }

        self.installer.launch(&package.path)?;
        Ok(UpdateOutcome::Launched { info, package })
    }
}

impl<I: PackageInstaller + 'static> UpdateManager<I> {
    /// Runs the flow on the blocking pool.
    pub async fn run_in_background(self) -> Result<UpdateOutcome, UpdateError> {
        tokio::task::spawn_blocking(move || self.run())
            .await
            .map_err(|e| UpdateError::Io(io::Error::other(e.to_string())))?
    }

    /// Fetches the manifest on the blocking pool.
    pub async fn check_in_background(self) -> Result<UpdateInfo, UpdateError> {
        tokio::task::spawn_blocking(move || self.check())
            .await
            .map_err(|e| UpdateError::Io(io::Error::other(e.to_string())))?
    }
}

fn write_file(path: &Path, reader: &mut impl io::Read) -> io::Result<()> {
    let mut file = File::create(path)?;
    io::copy(reader, &mut file)?;
    file.flush()?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct Route {
        path: &'static str,
        status: u16,
        body: Vec<u8>,
    }

    /// Serves canned responses on a local port until the process exits.
    /// `routes` receives the server's base URL.
    fn serve(routes: impl FnOnce(&str) -> Vec<Route>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let routes = routes(&base);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                loop {
                    let mut header = String::new();
                    match reader.read_line(&mut header) {
                        Ok(0) | Err(_) => break,
                        Ok(_) if header == "\r\n" => break,
                        Ok(_) => {}
                    }
                }

                let path = request_line.split_whitespace().nth(1).unwrap_or("/");
                let (status, body) = routes
                    .iter()
                    .find(|route| route.path == path)
                    .map_or((404, b"not found".to_vec()), |route| {
                        (route.status, route.body.clone())
                    });

                let head = format!(
                    "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&body);
            }
        });

        base
    }

    /// Serves a manifest whose download URL points back at the same server.
    fn serve_with_manifest(
        manifest_status: u16,
        package_status: u16,
        version_code: i64,
        package: &[u8],
    ) -> String {
        let package = package.to_vec();
        serve(move |base| {
            let manifest = format!(
                r#"{{"latest_version_code":{version_code},"latest_version_name":"ver.{version_code}","download_url":"{base}/keyboard.pkg","changelog":"nuevo"}}"#
            );
            vec![
                Route {
                    path: "/version_info.json",
                    status: manifest_status,
                    body: manifest.into_bytes(),
                },
                Route {
                    path: "/keyboard.pkg",
                    status: package_status,
                    body: package,
                },
            ]
        })
    }

    #[derive(Default, Clone)]
    struct RecordingInstaller {
        denied: bool,
        launched: Arc<Mutex<Vec<PathBuf>>>,
        permission_requests: Arc<AtomicUsize>,
    }

    impl PackageInstaller for RecordingInstaller {
        fn can_install(&self) -> bool {
            !self.denied
        }

        fn request_permission(&self) -> Result<(), UpdateError> {
            self.permission_requests.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn launch(&self, package: &Path) -> Result<(), UpdateError> {
            self.launched.lock().unwrap().push(package.to_path_buf());
            Ok(())
        }
    }

    fn manager(
        base: &str,
        dir: &Path,
        installer: RecordingInstaller,
    ) -> UpdateManager<RecordingInstaller> {
        let config = Config::default()
            .with_manifest_url(format!("{base}/version_info.json"))
            .with_download_dir(dir);
        UpdateManager::new(&config, installer)
    }

    /// Test: Manifest, download, and launch succeed end to end
    #[test]
    fn test_run_launches_installer() {
        let dir = tempfile::tempdir().unwrap();
        let installer = RecordingInstaller::default();
        let base = serve_with_manifest(200, 200, 2, b"PKGDATA");

        let outcome = manager(&base, dir.path(), installer.clone()).run().unwrap();

        let package_path = dir.path().join("keyboard_update.pkg");
        match outcome {
            UpdateOutcome::Launched { info, package } => {
                assert_eq!(info.version_code, 2);
                assert_eq!(package.path, package_path);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(fs::read(&package_path).unwrap(), b"PKGDATA");
        assert!(!dir.path().join(PARTIAL_FILE).exists());
        assert_eq!(installer.launched.lock().unwrap().as_slice(), &[package_path]);
    }

    /// Test: A 404 manifest fails and leaves the previous download alone
    #[test]
    fn test_manifest_404_keeps_previous_download() {
        let dir = tempfile::tempdir().unwrap();
        let previous = dir.path().join("keyboard_update.pkg");
        fs::write(&previous, b"OLD").unwrap();

        let base = serve_with_manifest(404, 200, 2, b"NEW");
        let err = manager(&base, dir.path(), RecordingInstaller::default())
            .run()
            .unwrap_err();

        assert!(matches!(err, UpdateError::Status(404)), "got {err:?}");
        assert_eq!(fs::read(&previous).unwrap(), b"OLD");
        assert!(!dir.path().join(PARTIAL_FILE).exists());
    }

    /// Test: A malformed manifest touches no file
    #[test]
    fn test_malformed_manifest_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("updates");
        let base = serve(|_| {
            vec![Route {
                path: "/version_info.json",
                status: 200,
                body: b"{not json".to_vec(),
            }]
        });

        let err = manager(&base, &target, RecordingInstaller::default())
            .run()
            .unwrap_err();

        assert!(matches!(err, UpdateError::Parse(_)), "got {err:?}");
        assert!(!target.exists());
    }

    /// Test: A failed package download keeps the previous package
    #[test]
    fn test_download_404_keeps_previous_download() {
        let dir = tempfile::tempdir().unwrap();
        let previous = dir.path().join("keyboard_update.pkg");
        fs::write(&previous, b"OLD").unwrap();

        let base = serve_with_manifest(200, 404, 2, b"NEW");
        let installer = RecordingInstaller::default();
        let err = manager(&base, dir.path(), installer.clone())
            .run()
            .unwrap_err();

        assert!(matches!(err, UpdateError::Status(404)), "got {err:?}");
        assert_eq!(fs::read(&previous).unwrap(), b"OLD");
        assert!(!dir.path().join(PARTIAL_FILE).exists());
        assert!(installer.launched.lock().unwrap().is_empty());
    }

    /// Test: A refusing installer triggers the permission request
    #[test]
    fn test_permission_required() {
        let dir = tempfile::tempdir().unwrap();
        let installer = RecordingInstaller {
            denied: true,
            ..RecordingInstaller::default()
        };
        let base = serve_with_manifest(200, 200, 5, b"PKG");

        let outcome = manager(&base, dir.path(), installer.clone()).run().unwrap();

        assert!(matches!(outcome, UpdateOutcome::PermissionRequired { .. }));
        assert_eq!(installer.permission_requests.load(Ordering::SeqCst), 1);
        assert!(installer.launched.lock().unwrap().is_empty());
    }

    /// Test: Unreachable servers surface a network error
    #[test]
    fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let err = manager(&base, dir.path(), RecordingInstaller::default())
            .check()
            .unwrap_err();
        assert!(matches!(err, UpdateError::Http(_)), "got {err:?}");
    }

    /// Test: check() only reads the manifest
    #[test]
    fn test_check_reads_manifest_only() {
        let dir = tempfile::tempdir().unwrap();
        let base = serve_with_manifest(200, 200, 7, b"PKG");

        let info = manager(&base, dir.path(), RecordingInstaller::default())
            .check()
            .unwrap();

        assert_eq!(info.version_code, 7);
        assert!(info.is_newer_than(app_settings::APP_VERSION_CODE));
        assert!(!dir.path().join("keyboard_update.pkg").exists());
    }

    /// Test: The flow runs on the blocking pool
    #[tokio::test]
    async fn test_run_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let base = serve_with_manifest(200, 200, 2, b"PKG");

        let outcome = manager(&base, dir.path(), RecordingInstaller::default())
            .run_in_background()
            .await
            .unwrap();
        assert!(matches!(outcome, UpdateOutcome::Launched { .. }));
    }
}
