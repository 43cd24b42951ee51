//! Demo whole-slide image.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::Provisioner;
use crate::config::DatasetSources;

pub const WSI_FILENAME: &str = "CMU-1-Small-Region.svs";

pub const DEFAULT_WSI_URL: &str =
    "https://openslide.cs.cmu.edu/download/openslide-testdata/Aperio/CMU-1-Small-Region.svs";

impl Provisioner<'_> {
    /// Locate the demo slide, downloading it when needed.
    ///
    /// Order: `WSI_PATH` when it names an existing file, then
    /// `<data_dir>/CMU-1-Small-Region.svs`, then a download to that path from
    /// `WSI_URL` (or the OpenSlide test-data default). The expected path is
    /// returned even when the download fails.
    pub fn get_wsi_path(&self, data_dir: &Path, sources: &DatasetSources) -> PathBuf {
        if let Some(p) = &sources.wsi_path {
            if p.is_file() {
                return p.clone();
            }
            warn!("WSI_PATH {} does not exist, ignoring", p.display());
        }

        let candidate = data_dir.join(WSI_FILENAME);
        if candidate.exists() {
            return candidate;
        }

        info!("Downloading demo slide from {}", sources.wsi_url);
        if !self.fetcher.download(&sources.wsi_url, &candidate) {
            warn!(
                "No WSI found. Expected at '{}'. Upload it there or set WSI_PATH.",
                candidate.display()
            );
        }
        candidate
    }
}
