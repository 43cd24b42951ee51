//! Dataset records: look up a record's file manifest and fetch matching files.

use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::archive::{extract_archive, is_archive};
use super::error::FetchError;
use super::Fetcher;

/// Subdirectory that receives the contents of downloaded archives.
pub const EXTRACT_DIR: &str = "tiles";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordResponse {
    Search { hits: Hits },
    Flat { files: Vec<FileEntry> },
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default, rename = "self")]
    self_link: Option<String>,
    #[serde(default)]
    download: Option<String>,
}

impl FileEntry {
    fn into_remote(self) -> Option<RemoteFile> {
        let name = self.key.or(self.filename)?;
        // `self` may point at the file's metadata; `download` is always the content.
        let url = self.links.download.or(self.links.self_link)?;
        Some(RemoteFile { name, url })
    }
}

/// Normalize a record metadata document to a flat file list.
///
/// Both the single-record shape (`{"files": [...]}`) and the search shape
/// (`{"hits": {"hits": [{"files": [...]}]}}`) are accepted. Entries without a
/// name or a link are dropped.
pub fn parse_record_files(body: &serde_json::Value) -> Result<Vec<RemoteFile>, serde_json::Error> {
    let response = RecordResponse::deserialize(body)?;
    let entries = match response {
        RecordResponse::Search { hits } => hits.hits.into_iter().flat_map(|h| h.files).collect(),
        RecordResponse::Flat { files } => files,
    };
    Ok(entries.into_iter().filter_map(FileEntry::into_remote).collect())
}

/// Whether `name` passes `filter`: no filter, a glob match, or a substring match.
pub fn matches_filter(name: &str, filter: Option<&str>) -> bool {
    let Some(filter) = filter.filter(|f| !f.is_empty()) else {
        return true;
    };
    let glob_match = glob::Pattern::new(filter)
        .map(|p| p.matches(name))
        .unwrap_or(false);
    glob_match || name.contains(filter)
}

impl Fetcher {
    fn record_url(&self, record_id: &str) -> String {
        format!("{}/records/{}", self.api_base.trim_end_matches('/'), record_id)
    }

    /// Fetch the file manifest of a record.
    pub fn record_files(&self, record_id: &str) -> Result<Vec<RemoteFile>, FetchError> {
        let url = self.record_url(record_id);
        let resp = self
            .agent
            .get(&url)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| FetchError::from_ureq(&url, e))?;
        let body: serde_json::Value = resp.into_json().map_err(|e| FetchError::Metadata {
            url: url.clone(),
            message: e.to_string(),
        })?;
        parse_record_files(&body).map_err(|e| FetchError::Metadata {
            url,
            message: e.to_string(),
        })
    }

    /// Download every file of `record_id` accepted by `name_filter` into `destination_dir`.
    ///
    /// Files already on disk are kept and reported. Newly downloaded archives
    /// are expanded into `<destination_dir>/tiles/`. Returns the paths present
    /// after the call, not counting extracted members.
    pub fn fetch_record(
        &self,
        record_id: &str,
        destination_dir: &Path,
        name_filter: Option<&str>,
    ) -> Vec<PathBuf> {
        let files = match self.record_files(record_id) {
            Ok(files) => files,
            Err(e) => {
                warn!("Could not list files of record {}: {}", record_id, e);
                return Vec::new();
            }
        };

        let accepted: Vec<RemoteFile> = files
            .into_iter()
            .filter(|f| matches_filter(&f.name, name_filter))
            .collect();
        if accepted.is_empty() {
            info!("No files of record {} matched {:?}", record_id, name_filter);
            return Vec::new();
        }

        let mut present = Vec::new();
        for file in accepted {
            let Some(file_name) = Path::new(&file.name).file_name() else {
                warn!("Skipping record entry with no file name: {:?}", file.name);
                continue;
            };
            let dest = destination_dir.join(file_name);
            if dest.exists() {
                info!("{} already present", dest.display());
                present.push(dest);
                continue;
            }
            if !self.download(&file.url, &dest) {
                continue;
            }
            if is_archive(&file.name) {
                let target = destination_dir.join(EXTRACT_DIR);
                match extract_archive(&dest, &target, |_| true) {
                    Ok(n) => info!("Extracted {} file(s) into {}", n, target.display()),
                    Err(e) => warn!("Could not extract {}: {}", dest.display(), e),
                }
            }
            present.push(dest);
        }
        present
    }
}

/// slidekit fetch-record [RECORD] [--filter PATTERN]
pub fn run(record: Option<&str>, filter: Option<&str>) -> Result<()> {
    let settings = crate::config::settings();
    let sources = &settings.sources;
    let record = match record.or(sources.zenodo_record.as_deref()) {
        Some(r) => r,
        None => bail!("No record id given. Pass RECORD or set ZENODO_RECORD."),
    };
    let filter = filter.or(sources.zenodo_filter.as_deref());

    let fetcher = Fetcher::from_settings(settings);
    let data_dir = &settings.notebook.data_dir;
    let paths = fetcher.fetch_record(record, data_dir, filter);
    if paths.is_empty() {
        println!("No files fetched for record {}.", record);
    }
    for p in &paths {
        println!("\u{2705} {}", p.display());
    }
    Ok(())
}
