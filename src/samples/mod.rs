//! Sample provisioning: make sure tutorial artifacts exist on disk.
//!
//! Each artifact is skipped when already present, otherwise taken from the
//! stock image library, otherwise synthesized. Nothing here returns an error;
//! failures are logged and the artifact stays absent.

pub mod params;
pub mod stock;
pub mod synth;
pub mod tiles;
pub mod wsi;

use anyhow::Result;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::capability::{self, Capabilities, Capability};
use crate::fetch::Fetcher;

use self::params::{write_params, NormalizationParams, NORMALIZATION_PARAMS, PARAMS_FILE};
use self::stock::StockImage;
use self::synth::{PixelKind, Placeholder};

pub const COLOR_DIR: &str = "color_samples";

/// One catalog entry: where it goes, which stock image backs it, and the
/// placeholder used without one.
#[derive(Debug)]
pub struct SampleSpec {
    pub name: &'static str,
    pub stock: StockImage,
    pub placeholder: Placeholder,
}

pub static IMAGE_PROCESSING_SAMPLES: [SampleSpec; 3] = [
    SampleSpec {
        name: "sample_patch_1.jpg",
        stock: StockImage::Astronaut,
        placeholder: Placeholder::rgb(256).with_rect(64..128, 64..128, [200, 150, 200]),
    },
    SampleSpec {
        name: "sample_patch_2.jpg",
        stock: StockImage::Coffee,
        placeholder: Placeholder::rgb(256).with_rect(160..220, 120..220, [220, 180, 190]),
    },
    SampleSpec {
        name: "sample_tissue.png",
        stock: StockImage::Camera,
        placeholder: Placeholder::gray(256),
    },
];

pub static COLOR_SAMPLES: [SampleSpec; 4] = [
    SampleSpec {
        name: "he_stain_1.jpg",
        stock: StockImage::Astronaut,
        placeholder: Placeholder::rgb(512).with_rect(100..200, 100..200, [200, 150, 200]),
    },
    SampleSpec {
        name: "he_stain_2.jpg",
        stock: StockImage::Coffee,
        placeholder: Placeholder::rgb(512).with_rect(250..350, 200..400, [220, 180, 190]),
    },
    SampleSpec {
        name: "reference_normal.png",
        stock: StockImage::Chelsea,
        placeholder: Placeholder::rgb(512),
    },
    SampleSpec {
        name: "target_tissue.png",
        stock: StockImage::Camera,
        placeholder: Placeholder::gray(512),
    },
];

pub struct Provisioner<'a> {
    caps: &'a Capabilities,
    fetcher: &'a Fetcher,
}

impl<'a> Provisioner<'a> {
    pub fn new(caps: &'a Capabilities, fetcher: &'a Fetcher) -> Self {
        Self { caps, fetcher }
    }

    /// Pixels for `spec`: the stock image when available, else a placeholder.
    fn source_image(&self, spec: &SampleSpec) -> DynamicImage {
        let stock = if self.caps.has(Capability::StockImages) {
            self.caps.stock().and_then(|lib| lib.load(spec.stock))
        } else {
            None
        };
        match stock {
            Some(img) => {
                debug!("Using stock {:?} for {}", spec.stock, spec.name);
                match spec.placeholder.kind {
                    PixelKind::Gray => DynamicImage::ImageLuma8(img.to_luma8()),
                    PixelKind::Rgb => DynamicImage::ImageRgb8(img.to_rgb8()),
                }
            }
            None => spec.placeholder.render(&mut rand::thread_rng()),
        }
    }

    /// Write `spec` into `dir` unless it already exists. True when this call created it.
    fn provision(&self, dir: &Path, spec: &SampleSpec) -> bool {
        let out = dir.join(spec.name);
        let created = !out.exists() && save_image(&out, &self.source_image(spec));
        if out.exists() {
            println!("\u{2705} {} available at {}", spec.name, out.display());
        } else {
            println!("\u{26a0}\u{fe0f} {} could not be prepared", spec.name);
        }
        created
    }

    /// Ensure the image-processing samples exist in `data_dir`.
    ///
    /// Returns the names written by this call; artifacts already on disk are
    /// left untouched and not listed.
    pub fn ensure_image_processing_samples(&self, data_dir: &Path) -> Vec<String> {
        IMAGE_PROCESSING_SAMPLES
            .iter()
            .filter(|spec| self.provision(data_dir, spec))
            .map(|spec| spec.name.to_string())
            .collect()
    }

    /// Ensure the color-normalization set and its parameter file exist.
    ///
    /// The parameter file is rewritten on every call.
    pub fn ensure_color_normalization_samples(&self, data_dir: &Path) -> (PathBuf, NormalizationParams) {
        let color_dir = data_dir.join(COLOR_DIR);
        if let Err(e) = std::fs::create_dir_all(&color_dir) {
            warn!("Could not create {}: {}", color_dir.display(), e);
        }
        for spec in &COLOR_SAMPLES {
            self.provision(&color_dir, spec);
        }

        let params = NORMALIZATION_PARAMS;
        let params_file = color_dir.join(PARAMS_FILE);
        match write_params(&params_file, &params) {
            Ok(()) => println!("Saved normalization parameters to {}", params_file.display()),
            Err(e) => warn!("Could not write {}: {}", params_file.display(), e),
        }
        (color_dir, params)
    }
}

/// Save an image, creating parent directories. Failures are logged.
pub fn save_image(path: &Path, img: &DynamicImage) -> bool {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!("Failed to save image {}: {}", path.display(), e);
            return false;
        }
    }
    match img.save(path) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save image {}: {}", path.display(), e);
            false
        }
    }
}

fn provisioner_run<F>(f: F) -> Result<()>
where
    F: FnOnce(&Provisioner, &Path) -> Result<()>,
{
    let settings = crate::config::settings();
    let fetcher = Fetcher::from_settings(settings);
    let provisioner = Provisioner::new(capability::detected(), &fetcher);
    f(&provisioner, &settings.notebook.data_dir)
}

/// slidekit samples
pub fn run_samples() -> Result<()> {
    provisioner_run(|p, data_dir| {
        let created = p.ensure_image_processing_samples(data_dir);
        println!("Created {} new sample(s) in {}", created.len(), data_dir.display());
        Ok(())
    })
}

/// slidekit color-samples
pub fn run_color_samples() -> Result<()> {
    provisioner_run(|p, data_dir| {
        let (dir, _) = p.ensure_color_normalization_samples(data_dir);
        println!("Color samples ready in {}", dir.display());
        Ok(())
    })
}

/// slidekit wsi
pub fn run_wsi() -> Result<()> {
    let settings = crate::config::settings();
    provisioner_run(|p, data_dir| {
        let path = p.get_wsi_path(data_dir, &settings.sources);
        println!("{}", path.display());
        if !path.exists() {
            anyhow::bail!("No slide available at {}", path.display());
        }
        Ok(())
    })
}

/// slidekit tiles
pub fn run_tiles() -> Result<()> {
    let settings = crate::config::settings();
    provisioner_run(|p, data_dir| {
        match p.ensure_tiles(data_dir, settings.sources.tiles_zip_url.as_deref()) {
            Some(dir) => println!("Tiles ready in {}", dir.display()),
            None => println!("No tiles available. Set TILES_ZIP_URL to download a tile archive."),
        }
        Ok(())
    })
}
