//! Service modules for the catalog build
//!
//! - Input: `xlsx_reader`, `record_normalizer`, `catalog_store` (snapshot fallback)
//! - Covers: `cover_resolver` over `cover_provider` implementations
//!   (`open_library_client`, `goodreads_client`) and `image_downloader`
//! - Palette: `palette_extractor` over an `image_backend`
//! - `workflow_orchestrator` runs the phases in order

pub mod catalog_store;
pub mod cover_provider;
pub mod cover_resolver;
pub mod goodreads_client;
pub mod image_backend;
pub mod image_downloader;
pub mod open_library_client;
pub mod palette_extractor;
pub mod record_normalizer;
pub mod workflow_orchestrator;
pub mod xlsx_reader;

pub use catalog_store::{CatalogStore, CatalogStoreError};
pub use cover_provider::{CoverProvider, LookupOutcome};
pub use cover_resolver::{CoverResolution, CoverResolver, CoverSource, RemoteOutcome, ResolverSettings};
pub use goodreads_client::{GoodreadsClient, Throttle};
pub use image_backend::{select_backend, BackendPreference, ImageBackend, ImageBackendError};
pub use image_downloader::{DownloadError, HttpImageDownloader, ImageDownloader};
pub use open_library_client::OpenLibraryClient;
pub use palette_extractor::{Palette, PaletteExtractor};
pub use record_normalizer::RecordNormalizer;
pub use workflow_orchestrator::{BuildStatistics, BuildSummary, CatalogSource, WorkflowOrchestrator};
pub use xlsx_reader::{RawRecord, XlsxReader};
