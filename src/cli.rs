use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::resolve::{DEFAULT_PREFERRED_SUBDIR, DEFAULT_SUBFOLDER};

#[derive(Parser)]
#[command(name = "slidekit", version, about = "Resolve a writable data directory and provision sample datasets for digital-pathology tutorials")]
pub struct Cli {
    /// Use this data directory instead of resolving one
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the resolved data directory
    DataDir {
        /// Folder under the cloud drive root
        #[arg(long = "subdir", default_value = DEFAULT_PREFERRED_SUBDIR)]
        preferred_subdir: String,

        /// Leaf folder name used by every candidate
        #[arg(long, default_value = DEFAULT_SUBFOLDER)]
        subfolder: String,
    },

    /// Print the resolved configuration as JSON
    Config,

    /// Create the data and results directories
    Setup,

    /// Prepare the image-processing sample images
    Samples,

    /// Prepare the color-normalization samples and parameters
    ColorSamples,

    /// Locate or download the demo whole-slide image
    Wsi,

    /// Download and extract the tile archive from TILES_ZIP_URL
    Tiles,

    /// Download the files of a dataset record
    FetchRecord {
        /// Record id (default: ZENODO_RECORD)
        record: Option<String>,

        /// Glob or substring to select files (default: ZENODO_FILTER)
        #[arg(long)]
        filter: Option<String>,
    },

    /// Download a single file
    Download {
        /// Source URL
        url: String,

        /// Destination file path
        destination: PathBuf,
    },

    /// Report optional capabilities and directory health
    Check,
}

impl Commands {
    /// Whether the command reads the resolved settings. Resolution creates
    /// the data directory, so commands that don't need it skip it.
    pub fn needs_settings(&self) -> bool {
        !matches!(self, Commands::DataDir { .. } | Commands::Download { .. })
    }
}
