use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use slidekit::cli::{Cli, Commands};

fn init_tracing(verbose: u8) {
    let filter = match std::env::var("SLIDEKIT_LOG") {
        Ok(spec) if !spec.is_empty() => EnvFilter::new(spec),
        _ => {
            let level = match verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            };
            EnvFilter::new(format!("slidekit={level}"))
        }
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.command.needs_settings() {
        slidekit::config::init(cli.data_dir.clone());
    }

    match cli.command {
        Commands::DataDir {
            preferred_subdir,
            subfolder,
        } => slidekit::resolve::run(cli.data_dir, &preferred_subdir, &subfolder),
        Commands::Config => slidekit::config::run_show(),
        Commands::Setup => slidekit::config::run_setup(),
        Commands::Samples => slidekit::samples::run_samples(),
        Commands::ColorSamples => slidekit::samples::run_color_samples(),
        Commands::Wsi => slidekit::samples::run_wsi(),
        Commands::Tiles => slidekit::samples::run_tiles(),
        Commands::FetchRecord { record, filter } => {
            slidekit::fetch::record::run(record.as_deref(), filter.as_deref())
        }
        Commands::Download { url, destination } => slidekit::fetch::run(&url, &destination),
        Commands::Check => slidekit::check::run(),
    }
}
