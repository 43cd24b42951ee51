//! Pre-cut image tiles shipped as a zip archive.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::Provisioner;
use crate::fetch::archive::{extract_archive, is_image};
use crate::fetch::record::EXTRACT_DIR;

pub const TILES_ARCHIVE: &str = "tiles.zip";

fn has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

impl Provisioner<'_> {
    /// Ensure `<data_dir>/tiles/` holds the tiles from `archive_url`.
    ///
    /// A non-empty tiles directory counts as done. The archive is kept next
    /// to it so a later call can re-extract without downloading. Returns the
    /// tiles directory, or `None` when nothing could be provided.
    pub fn ensure_tiles(&self, data_dir: &Path, archive_url: Option<&str>) -> Option<PathBuf> {
        let tiles_dir = data_dir.join(EXTRACT_DIR);
        if has_entries(&tiles_dir) {
            return Some(tiles_dir);
        }

        let archive = data_dir.join(TILES_ARCHIVE);
        if !archive.exists() {
            let url = archive_url?;
            if !self.fetcher.download(url, &archive) {
                return None;
            }
        }

        match extract_archive(&archive, &tiles_dir, is_image) {
            Ok(n) => {
                info!("Extracted {} tile(s) into {}", n, tiles_dir.display());
                Some(tiles_dir)
            }
            Err(e) => {
                warn!("Could not extract {}: {}", archive.display(), e);
                None
            }
        }
    }
}
