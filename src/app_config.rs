//! App-level config file for slidekit.
//!
//! Reads {user_config_dir}/slidekit/config.toml. Every key is optional and
//! only fills in what the environment leaves unset.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::resolve;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub results_dir: Option<String>,
    #[serde(default)]
    pub temp_dir: Option<String>,
    #[serde(default)]
    pub max_image_size: Option<u32>,
    #[serde(default)]
    pub cache_enabled: Option<bool>,
    #[serde(default)]
    pub wsi_url: Option<String>,
    #[serde(default)]
    pub tiles_zip_url: Option<String>,
    #[serde(default)]
    pub zenodo_record: Option<String>,
    #[serde(default)]
    pub zenodo_filter: Option<String>,
    #[serde(default)]
    pub zenodo_api: Option<String>,
}

/// Return the OS-native slidekit config directory.
pub fn app_config_dir() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "slidekit") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        resolve::home_dir().join(".config").join("slidekit")
    }
}

/// Return the path to config.toml.
pub fn app_config_path() -> PathBuf {
    app_config_dir().join("config.toml")
}

/// Read a config file, returning defaults if missing.
pub fn load_from(path: &Path) -> Result<FileSettings> {
    if !path.exists() {
        return Ok(FileSettings::default());
    }
    let content = std::fs::read_to_string(path)?;
    let settings: FileSettings = toml::from_str(&content)?;
    Ok(settings)
}

/// Read the app config file; a broken file is reported and ignored.
pub fn load() -> FileSettings {
    let path = app_config_path();
    match load_from(&path) {
        Ok(s) => s,
        Err(e) => {
            warn!("Ignoring {}: {}", path.display(), e);
            FileSettings::default()
        }
    }
}
