//! Process-wide settings: notebook configuration and dataset sources.
//!
//! Each value comes from the first layer that sets it:
//!   1. command-line flag (data directory only)
//!   2. environment variable
//!   3. app config file (see `app_config`)
//!   4. built-in default

use anyhow::Result;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_config::{self, FileSettings};
use crate::fetch::DEFAULT_API_BASE;
use crate::resolve::{self, expand_tilde, DEFAULT_PREFERRED_SUBDIR, DEFAULT_SUBFOLDER};
use crate::samples::wsi::DEFAULT_WSI_URL;

pub const DEFAULT_MAX_IMAGE_SIZE: u32 = 2048;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotebookConfig {
    pub data_dir: PathBuf,
    pub results_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub max_image_size: u32,
    pub cache_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSources {
    pub wsi_path: Option<PathBuf>,
    pub wsi_url: String,
    pub tiles_zip_url: Option<String>,
    pub zenodo_record: Option<String>,
    pub zenodo_filter: Option<String>,
    pub zenodo_api: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    #[serde(skip)]
    pub data_dir_override: Option<PathBuf>,
    pub notebook: NotebookConfig,
    pub sources: DatasetSources,
}

/// Read an environment variable, treating an empty value as unset.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_max_image_size(raw: &str) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!("Ignoring invalid MAX_IMAGE_SIZE {:?}", raw);
            None
        }
    }
}

/// The data-dir override in precedence order: flag, `DATA_DIR`, config file.
pub fn override_from<F>(lookup: F, file: &FileSettings, cli_data_dir: Option<PathBuf>) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    cli_data_dir
        .or_else(|| lookup("DATA_DIR").map(|v| expand_tilde(&v)))
        .or_else(|| file.data_dir.as_deref().map(expand_tilde))
}

/// The data-dir override for this process, without resolving or creating anything.
pub fn data_dir_override(cli_data_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(dir) = cli_data_dir {
        return Some(dir);
    }
    override_from(env_lookup, &app_config::load(), None)
}

impl Settings {
    /// Build settings from a variable lookup and a config file.
    ///
    /// `resolve_data_dir` receives the data-dir override (flag, `DATA_DIR`,
    /// or file) and returns the directory to use.
    pub fn from_lookup<F, R>(
        lookup: F,
        file: &FileSettings,
        cli_data_dir: Option<PathBuf>,
        resolve_data_dir: R,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
        R: FnOnce(Option<PathBuf>) -> PathBuf,
    {
        let data_dir_override = override_from(&lookup, file, cli_data_dir);
        let data_dir = resolve_data_dir(data_dir_override.clone());

        let results_dir = lookup("RESULTS_DIR")
            .or_else(|| file.results_dir.clone())
            .map(|v| expand_tilde(&v))
            .unwrap_or_else(|| data_dir.join("results"));
        let temp_dir = lookup("TEMP_DIR")
            .or_else(|| file.temp_dir.clone())
            .map(|v| expand_tilde(&v))
            .unwrap_or_else(std::env::temp_dir);
        let max_image_size = lookup("MAX_IMAGE_SIZE")
            .and_then(|v| parse_max_image_size(&v))
            .or(file.max_image_size)
            .unwrap_or(DEFAULT_MAX_IMAGE_SIZE);
        let cache_enabled = lookup("CACHE_ENABLED")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .or(file.cache_enabled)
            .unwrap_or(true);

        let sources = DatasetSources {
            wsi_path: lookup("WSI_PATH").map(|v| expand_tilde(&v)),
            wsi_url: lookup("WSI_URL")
                .or_else(|| file.wsi_url.clone())
                .unwrap_or_else(|| DEFAULT_WSI_URL.to_string()),
            tiles_zip_url: lookup("TILES_ZIP_URL").or_else(|| file.tiles_zip_url.clone()),
            zenodo_record: lookup("ZENODO_RECORD").or_else(|| file.zenodo_record.clone()),
            zenodo_filter: lookup("ZENODO_FILTER").or_else(|| file.zenodo_filter.clone()),
            zenodo_api: file
                .zenodo_api
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        };

        Settings {
            data_dir_override,
            notebook: NotebookConfig {
                data_dir,
                results_dir,
                temp_dir,
                max_image_size,
                cache_enabled,
            },
            sources,
        }
    }

    /// Settings from the real environment and app config file.
    pub fn load(cli_data_dir: Option<PathBuf>) -> Self {
        let file = app_config::load();
        Self::from_lookup(env_lookup, &file, cli_data_dir, |over| {
            resolve::data_dir(over, DEFAULT_PREFERRED_SUBDIR, DEFAULT_SUBFOLDER)
        })
    }
}

static SETTINGS: OnceCell<Settings> = OnceCell::new();

/// Resolve settings once. Later calls return the first result and ignore the argument.
pub fn init(cli_data_dir: Option<PathBuf>) -> &'static Settings {
    SETTINGS.get_or_init(|| Settings::load(cli_data_dir))
}

pub fn settings() -> &'static Settings {
    init(None)
}

/// Ensure the data and results directories exist.
///
/// Returns the directories that could not be created; each is also logged.
pub fn setup_paths(config: &NotebookConfig) -> Vec<PathBuf> {
    let mut failed = Vec::new();
    for dir in [&config.data_dir, &config.results_dir] {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!("Could not create directory '{}': {}", dir.display(), e);
            failed.push(dir.clone());
        }
    }
    failed
}

fn print_dir(label: &str, dir: &Path) {
    println!("  {:<12} {}", label, dir.display());
}

/// slidekit setup
pub fn run_setup() -> Result<()> {
    let config = &settings().notebook;
    let failed = setup_paths(config);
    println!("Directories:");
    print_dir("data", &config.data_dir);
    print_dir("results", &config.results_dir);
    print_dir("temp", &config.temp_dir);
    if !failed.is_empty() {
        anyhow::bail!("{} director(ies) could not be created", failed.len());
    }
    Ok(())
}

/// slidekit config
pub fn run_show() -> Result<()> {
    let json = serde_json::to_string_pretty(settings())?;
    println!("{}", json);
    Ok(())
}
