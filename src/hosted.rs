//! Hosted-notebook runtime detection (Google Colab and friends).
//!
//! The crate only asks two questions of the runtime: "are we hosted?" and
//! "is the cloud drive mounted at this path?". Mounting itself belongs to the
//! notebook kernel; from outside it we can only observe its effect.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Where a hosted runtime keeps its scratch space and drive mount.
pub const HOSTED_ROOT: &str = "/content";
pub const DRIVE_MOUNT_POINT: &str = "/content/drive";

/// Folder inside a mounted drive that holds the user's files.
pub const DRIVE_USER_FOLDER: &str = "MyDrive";

pub trait HostedRuntime {
    /// True when running inside a hosted notebook service.
    fn is_hosted(&self) -> bool;

    /// Ensure the cloud drive is mounted at `mount_point`.
    fn mount_drive(&self, mount_point: &Path) -> Result<()>;

    /// Root of the runtime's local scratch space.
    fn hosted_root(&self) -> PathBuf {
        PathBuf::from(HOSTED_ROOT)
    }

    fn drive_mount_point(&self) -> PathBuf {
        PathBuf::from(DRIVE_MOUNT_POINT)
    }
}

/// Colab, detected through the environment its kernels run under.
#[derive(Debug, Default, Clone, Copy)]
pub struct Colab;

impl HostedRuntime for Colab {
    fn is_hosted(&self) -> bool {
        std::env::var_os("COLAB_RELEASE_TAG").is_some()
            || std::env::var_os("COLAB_GPU").is_some()
    }

    fn mount_drive(&self, mount_point: &Path) -> Result<()> {
        if mount_point.join(DRIVE_USER_FOLDER).is_dir() {
            return Ok(());
        }
        bail!(
            "Google Drive is not mounted at {}. Run `from google.colab import drive; drive.mount('{}')` in a notebook cell.",
            mount_point.display(),
            mount_point.display()
        );
    }
}

/// A plain machine or container with no hosted services.
#[derive(Debug, Default, Clone, Copy)]
pub struct Local;

impl HostedRuntime for Local {
    fn is_hosted(&self) -> bool {
        false
    }

    fn mount_drive(&self, _mount_point: &Path) -> Result<()> {
        bail!("not running in a hosted notebook environment");
    }
}

/// The runtime this process is running under.
pub fn detect() -> Box<dyn HostedRuntime + Send + Sync> {
    if Colab.is_hosted() {
        Box::new(Colab)
    } else {
        Box::new(Local)
    }
}
