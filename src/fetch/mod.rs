//! Remote dataset fetching: single files, record manifests, archives.

pub mod archive;
pub mod error;
pub mod progress;
pub mod record;

use anyhow::{bail, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::capability::{self, Capability};
use crate::config::Settings;
use crate::util::human_bytes;

use self::error::FetchError;
use self::progress::Progress;

/// Fixed per-request network timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEFAULT_API_BASE: &str = "https://zenodo.org/api";

const CHUNK_SIZE: usize = 64 * 1024;

pub struct Fetcher {
    agent: ureq::Agent,
    api_base: String,
    progress: bool,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl Fetcher {
    pub fn new(api_base: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("slidekit/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            api_base: api_base.into(),
            progress: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.sources.zenodo_api.clone())
            .with_progress(capability::detected().has(Capability::ProgressReporting))
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Download `url` to `destination`, creating parent directories.
    ///
    /// The body streams into `<destination>.part` and is renamed into place
    /// only when complete, so a failed transfer never leaves `destination`
    /// behind. Any earlier partial file is overwritten. Failures are logged
    /// and reported as `false`.
    pub fn download(&self, url: &str, destination: &Path) -> bool {
        match self.try_download(url, destination) {
            Ok(bytes) => {
                info!("Downloaded {} ({}) to {}", url, human_bytes(bytes), destination.display());
                true
            }
            Err(e) => {
                warn!("Download failed: {}", e);
                false
            }
        }
    }

    fn try_download(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| FetchError::io(parent, e))?;
            }
        }

        let resp = self
            .agent
            .get(url)
            .call()
            .map_err(|e| FetchError::from_ureq(url, e))?;
        let total = resp
            .header("Content-Length")
            .and_then(|v| v.trim().parse::<u64>().ok());

        let label = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());
        let progress = Progress::start(&label, total, self.progress);

        // The destination only appears once the whole body is on disk.
        let partial = partial_path(destination);
        let result = self.stream_body(url, resp, &partial, total, &progress);
        progress.finish();
        let written = match result {
            Ok(n) => n,
            Err(e) => {
                let _ = std::fs::remove_file(&partial);
                return Err(e);
            }
        };
        if let Err(e) = std::fs::rename(&partial, destination) {
            let _ = std::fs::remove_file(&partial);
            return Err(FetchError::io(destination, e));
        }
        Ok(written)
    }

    fn stream_body(
        &self,
        url: &str,
        resp: ureq::Response,
        partial: &Path,
        total: Option<u64>,
        progress: &Progress,
    ) -> Result<u64, FetchError> {
        let mut reader = resp.into_reader();
        let mut file = File::create(partial).map_err(|e| FetchError::io(partial, e))?;
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut written = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(FetchError::Transport {
                        url: url.to_string(),
                        message: e.to_string(),
                    });
                }
            };
            file.write_all(&buf[..n]).map_err(|e| FetchError::io(partial, e))?;
            written += n as u64;
            progress.inc(n as u64);
        }
        if let Some(expected) = total {
            if written < expected {
                return Err(FetchError::Transport {
                    url: url.to_string(),
                    message: format!("body ended after {} of {} bytes", written, expected),
                });
            }
        }
        file.flush().map_err(|e| FetchError::io(partial, e))?;
        Ok(written)
    }
}

/// Sibling `<name>.part` file a download streams into before it is renamed.
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

/// slidekit download URL DEST
pub fn run(url: &str, destination: &Path) -> Result<()> {
    let fetcher = Fetcher::default().with_progress(capability::progress_available());
    if !fetcher.download(url, destination) {
        bail!("Could not download {}", url);
    }
    println!("\u{2705} {} saved to {}", url, destination.display());
    Ok(())
}
