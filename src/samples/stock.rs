//! Stock images shipped with scikit-image's data package.

use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::util::run_cmd;

/// Probe script printing the directory of scikit-image's bundled data.
const PYTHON_PROBE: &str =
    "import os, skimage.data as d; print(os.path.dirname(d.__file__))";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockImage {
    Astronaut,
    Coffee,
    Camera,
    Chelsea,
}

impl StockImage {
    pub fn file_name(self) -> &'static str {
        match self {
            StockImage::Astronaut => "astronaut.png",
            StockImage::Coffee => "coffee.png",
            StockImage::Camera => "camera.png",
            StockImage::Chelsea => "chelsea.png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLibrary {
    dir: PathBuf,
}

impl StockLibrary {
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Locate the stock image directory.
    ///
    /// `SKIMAGE_DATA_DIR` wins; otherwise ask the local Python for the
    /// installed scikit-image. A directory only counts when it holds at least
    /// one of the catalog images.
    pub fn discover() -> Option<Self> {
        let from_env = std::env::var_os("SKIMAGE_DATA_DIR").map(PathBuf::from);
        let dir = from_env.or_else(python_data_dir)?;
        let lib = Self::at(dir);
        if lib.path(StockImage::Astronaut).is_file() {
            debug!("Stock images found in {}", lib.dir.display());
            Some(lib)
        } else {
            debug!("No stock images in {}", lib.dir.display());
            None
        }
    }

    pub fn path(&self, image: StockImage) -> PathBuf {
        self.dir.join(image.file_name())
    }

    /// Load a stock image, `None` when missing or undecodable.
    pub fn load(&self, image: StockImage) -> Option<DynamicImage> {
        let path = self.path(image);
        if !path.is_file() {
            return None;
        }
        match image::open(&path) {
            Ok(img) => Some(img),
            Err(e) => {
                warn!("Could not decode stock image {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn python_data_dir() -> Option<PathBuf> {
    for python in ["python3", "python"] {
        if let Ok((stdout, _, 0)) = run_cmd(&[python, "-c", PYTHON_PROBE]) {
            let line = stdout.trim();
            if !line.is_empty() {
                return Some(PathBuf::from(line));
            }
        }
    }
    None
}
