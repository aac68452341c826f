//! Command-line entry point.
//!
//! ```text
//! bkg-update <ai_file> <bkgfile>
//! ```
//!
//! Adds `ai_temp`/`ai_salt` from `ai_file` to `temp`/`salt` in `bkgfile`,
//! in place. Silent on success; set `RUST_LOG=info` (or `debug` for field
//! ranges) to see what was done.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bkg_update::FieldUpdater;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bkg-update")]
#[command(about = "Add analysis increments to temp and salt in a background NetCDF file", long_about = None)]
#[command(version)]
struct Cli {
    /// Analysis increment file with `ai_temp` and `ai_salt` (read-only)
    ai_file: PathBuf,

    /// Background file with `temp` and `salt` (updated in place)
    bkgfile: PathBuf,
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let report = FieldUpdater::default()
        .run(&cli.ai_file, &cli.bkgfile)
        .with_context(|| {
            format!(
                "failed to update {} from {}",
                cli.bkgfile.display(),
                cli.ai_file.display()
            )
        })?;

    tracing::info!(
        temp_reverted = report.temperature.stats.reverted,
        salt_cells = report.salinity.stats.cells,
        "background updated"
    );

    Ok(())
}
