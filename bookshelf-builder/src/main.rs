//! bookshelf-builder - static bookshelf catalog generator
//!
//! Reads `My Library.xlsx` (or the previous `data/books.json`), resolves a cover and
//! spine colors for each book, and writes `data/books.json` and `data/books.js` for
//! the bookshelf page.

use anyhow::Result;
use bookshelf_builder::models::FetchMode;
use bookshelf_builder::services::{BackendPreference, WorkflowOrchestrator};
use bookshelf_builder::{BuilderSettings, CliOverrides};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "bookshelf-builder")]
#[command(about = "Build the bookshelf catalog from a spreadsheet")]
#[command(version)]
struct Args {
    /// Library root folder (contains `My Library.xlsx` and `data/`)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Cover source
    #[arg(short, long, value_enum)]
    mode: Option<FetchMode>,

    /// Download covers again even when a cached file exists
    #[arg(short, long)]
    force: bool,

    /// Image tool for manual cover conversion and spine colors
    #[arg(long, value_enum)]
    image_backend: Option<BackendPreference>,

    /// Config file (default: `<root>/bookshelf.toml`, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl From<Args> for CliOverrides {
    fn from(args: Args) -> Self {
        Self {
            root: args.root,
            mode: args.mode,
            force: args.force,
            image_backend: args.image_backend,
            config: args.config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = BuilderSettings::resolve(&CliOverrides::from(args))?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    info!(
        "Starting bookshelf-builder (version {}, git {}, built {}, profile {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    settings.log_summary();

    let summary = WorkflowOrchestrator::from_settings(&settings)?.run().await?;

    for line in summary.statistics.display_lines() {
        info!("{}", line);
    }
    if summary.final_mode != settings.fetch_mode {
        info!("Fetch mode ended as '{}' (started as '{}')", summary.final_mode, settings.fetch_mode);
    }
    info!("Catalog written to {}", summary.catalog_json.display());

    Ok(())
}
