//! Optional runtime capabilities, probed once per process.

use once_cell::sync::OnceCell;
use std::io::IsTerminal;

use crate::hosted::{self, HostedRuntime, DRIVE_USER_FOLDER};
use crate::samples::stock::StockLibrary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    HostedNotebook,
    CloudDrive,
    StockImages,
    ProgressReporting,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::HostedNotebook,
        Capability::CloudDrive,
        Capability::StockImages,
        Capability::ProgressReporting,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Capability::HostedNotebook => "hosted-notebook",
            Capability::CloudDrive => "cloud-drive",
            Capability::StockImages => "stock-images",
            Capability::ProgressReporting => "progress",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    hosted: bool,
    cloud_drive: bool,
    progress: bool,
    stock: Option<StockLibrary>,
}

impl Capabilities {
    /// Nothing optional available: no hosted runtime, no stock images, no progress bars.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn detect(runtime: &dyn HostedRuntime) -> Self {
        let hosted = runtime.is_hosted();
        let cloud_drive = hosted
            && runtime
                .drive_mount_point()
                .join(DRIVE_USER_FOLDER)
                .is_dir();
        Self {
            hosted,
            cloud_drive,
            progress: progress_available(),
            stock: StockLibrary::discover(),
        }
    }

    pub fn with_stock(mut self, stock: StockLibrary) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn has(&self, cap: Capability) -> bool {
        match cap {
            Capability::HostedNotebook => self.hosted,
            Capability::CloudDrive => self.cloud_drive,
            Capability::StockImages => self.stock.is_some(),
            Capability::ProgressReporting => self.progress,
        }
    }

    pub fn stock(&self) -> Option<&StockLibrary> {
        self.stock.as_ref()
    }
}

/// Progress bars need the `progress` feature and a terminal on stderr.
pub fn progress_available() -> bool {
    cfg!(feature = "progress") && std::io::stderr().is_terminal()
}

static DETECTED: OnceCell<Capabilities> = OnceCell::new();

/// Capabilities of the current process, detected on first use.
pub fn detected() -> &'static Capabilities {
    DETECTED.get_or_init(|| {
        let runtime = hosted::detect();
        Capabilities::detect(runtime.as_ref())
    })
}
