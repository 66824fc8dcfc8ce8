//! HTTP downloads.
//!
//! Plain GET of a fully-qualified URL into a local file. There is no retry
//! and no checksum verification.

use std::fs::File;
use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::error::ProvisionError;
use crate::util::fs::ensure_dir;

/// Fetches a URL into a local file.
pub trait Downloader {
    /// Download `url` to `dest`, overwriting any existing file.
    fn download(&self, url: &str, dest: &Path) -> Result<(), ProvisionError>;
}

/// Downloader backed by a blocking `reqwest` client.
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
    progress: bool,
}

impl HttpDownloader {
    /// Create a downloader, showing progress when stderr is a terminal.
    pub fn new() -> Result<Self, ProvisionError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("depot/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| ProvisionError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpDownloader {
            client,
            progress: std::io::stderr().is_terminal(),
        })
    }

    fn progress_bar(&self, len: Option<u64>, label: &str) -> ProgressBar {
        if !self.progress {
            return ProgressBar::with_draw_target(len, ProgressDrawTarget::hidden());
        }

        match len {
            Some(len) => {
                let pb = ProgressBar::new(len);
                pb.set_style(
                    ProgressStyle::with_template(
                        "{msg:>12.cyan.bold} [{bar:30}] {bytes}/{total_bytes}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
                );
                pb.set_message(label.to_string());
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_message(format!("{} ...", label));
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
        }
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<(), ProvisionError> {
        tracing::info!("Downloading {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ProvisionError::transfer(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProvisionError::transfer(
                url,
                format!("HTTP {}", response.status()),
            ));
        }

        if let Some(parent) = dest.parent() {
            ensure_dir(parent).map_err(|e| ProvisionError::transfer(url, e.to_string()))?;
        }
        let file = File::create(dest).map_err(|e| {
            ProvisionError::transfer(url, format!("cannot write {}: {}", dest.display(), e))
        })?;

        let label = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string());
        let pb = self.progress_bar(response.content_length(), &label);
        let mut writer = pb.wrap_write(file);

        let bytes = response
            .copy_to(&mut writer)
            .map_err(|e| ProvisionError::transfer(url, e.to_string()));
        pb.finish_and_clear();
        let bytes = bytes?;

        tracing::debug!("wrote {} bytes to {}", bytes, dest.display());
        Ok(())
    }
}
