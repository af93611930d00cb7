//! Catalog build workflow
//!
//! # Phases
//! LOADING → COVERS → WRITING
//!
//! - **LOADING**: read the spreadsheet, or fall back to the previous `books.json`
//! - **COVERS**: resolve each book's cover, then sample its spine palette
//! - **WRITING**: write `books.json` and `books.js`
//!
//! Books are processed strictly one at a time. A provider block downgrades the
//! resolver to offline mode for every book that follows.

use crate::config::BuilderSettings;
use crate::error::{BuildError, BuildResult};
use crate::models::FetchMode;
use crate::services::catalog_store::CatalogStore;
use crate::services::cover_provider::CoverProvider;
use crate::services::cover_resolver::{CoverResolver, ResolverSettings};
use crate::services::goodreads_client::GoodreadsClient;
use crate::services::image_backend::select_backend;
use crate::services::image_downloader::{HttpImageDownloader, ImageDownloader};
use crate::services::open_library_client::OpenLibraryClient;
use crate::services::palette_extractor::PaletteExtractor;
use crate::services::record_normalizer::RecordNormalizer;
use crate::services::xlsx_reader::XlsxReader;
use bookshelf_common::LibraryLayout;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

mod phase_covers;
mod phase_loading;
mod phase_writing;
pub mod statistics;

pub use statistics::{BuildStatistics, CatalogSource};

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub statistics: BuildStatistics,
    pub catalog_json: PathBuf,
    pub catalog_js: PathBuf,
    /// Fetch mode at the end of the run (`Off` after a block)
    pub final_mode: FetchMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives one catalog build
pub struct WorkflowOrchestrator {
    layout: LibraryLayout,
    reader: XlsxReader,
    normalizer: RecordNormalizer,
    resolver: CoverResolver,
    palette: PaletteExtractor,
    store: CatalogStore,
    statistics: BuildStatistics,
}

impl WorkflowOrchestrator {
    /// Orchestrator over explicit collaborators
    pub fn new(layout: LibraryLayout, resolver: CoverResolver, palette: PaletteExtractor) -> Self {
        Self {
            reader: XlsxReader::new(layout.spreadsheet.clone()),
            normalizer: RecordNormalizer::new(),
            store: CatalogStore::new(&layout),
            statistics: BuildStatistics::new(),
            layout,
            resolver,
            palette,
        }
    }

    /// Orchestrator with live network clients and the configured image backend
    pub fn from_settings(settings: &BuilderSettings) -> BuildResult<Self> {
        let layout = LibraryLayout::new(&settings.root_folder);
        let backend = select_backend(settings.image_backend);

        let provider: Option<Arc<dyn CoverProvider>> = match settings.fetch_mode {
            FetchMode::OpenLibrary => Some(Arc::new(OpenLibraryClient::new())),
            FetchMode::Goodreads => Some(Arc::new(
                GoodreadsClient::new(settings.throttle).map_err(|e| BuildError::Http(e.to_string()))?,
            )),
            FetchMode::Off | FetchMode::ManualOnly => None,
        };
        let downloader: Arc<dyn ImageDownloader> =
            Arc::new(HttpImageDownloader::new().map_err(|e| BuildError::Http(e.to_string()))?);

        let resolver = CoverResolver::new(
            layout.clone(),
            ResolverSettings {
                mode: settings.fetch_mode,
                force_rebuild: settings.force_rebuild,
                min_cover_bytes: settings.min_cover_bytes,
            },
            provider,
            downloader,
            backend.clone(),
        );

        Ok(Self::new(layout, resolver, PaletteExtractor::new(backend)))
    }

    /// Replace the record normalizer (tests use a fixed fallback token)
    pub fn with_normalizer(mut self, normalizer: RecordNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Run all phases
    pub async fn run(mut self) -> BuildResult<BuildSummary> {
        let started_at = Utc::now();
        tracing::info!(
            root = %self.layout.root.display(),
            mode = %self.resolver.active_mode(),
            palette = self.palette.is_available(),
            "Starting catalog build"
        );

        self.layout.ensure_directories()?;

        let mut catalog = self.phase_loading()?;
        self.phase_covers(&mut catalog).await;
        self.phase_writing(&catalog)?;

        let finished_at = Utc::now();
        tracing::info!(
            books = catalog.len(),
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "Catalog build complete"
        );

        Ok(BuildSummary {
            statistics: self.statistics,
            catalog_json: self.store.json_path().to_path_buf(),
            catalog_js: self.store.js_path().to_path_buf(),
            final_mode: self.resolver.active_mode(),
            started_at,
            finished_at,
        })
    }
}
