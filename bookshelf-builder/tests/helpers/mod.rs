//! Test Helper Utilities
//!
//! Shared utilities for testing bookshelf-builder

#![allow(dead_code)]

pub mod log_capture;
pub mod mocks;
pub mod xlsx_fixture;

pub use log_capture::{capture_logs, LogCapture};
pub use mocks::{DownloadReply, MockDownloader, MockImageBackend, MockProvider};
pub use xlsx_fixture::write_workbook;

use bookshelf_builder::models::FetchMode;
use bookshelf_builder::services::{
    CoverProvider, CoverResolver, ImageBackend, PaletteExtractor, ResolverSettings, WorkflowOrchestrator,
};
use bookshelf_common::LibraryLayout;
use std::path::Path;
use std::sync::Arc;

/// Layout under `root` with its directories created
pub fn test_layout(root: &Path) -> LibraryLayout {
    let layout = LibraryLayout::new(root);
    layout.ensure_directories().unwrap();
    layout
}

/// Resolver over mock collaborators
pub fn mock_resolver(
    layout: &LibraryLayout,
    mode: FetchMode,
    force_rebuild: bool,
    provider: Arc<MockProvider>,
    downloader: Arc<MockDownloader>,
    backend: Option<Arc<MockImageBackend>>,
) -> CoverResolver {
    CoverResolver::new(
        layout.clone(),
        ResolverSettings {
            mode,
            force_rebuild,
            min_cover_bytes: 1000,
        },
        Some(provider as Arc<dyn CoverProvider>),
        downloader,
        backend.map(|b| b as Arc<dyn ImageBackend>),
    )
}

/// Orchestrator over mock collaborators
pub fn mock_orchestrator(
    layout: &LibraryLayout,
    mode: FetchMode,
    provider: Arc<MockProvider>,
    downloader: Arc<MockDownloader>,
    backend: Option<Arc<MockImageBackend>>,
) -> WorkflowOrchestrator {
    let palette_backend = backend.clone().map(|b| b as Arc<dyn ImageBackend>);
    let resolver = mock_resolver(layout, mode, false, provider, downloader, backend);
    WorkflowOrchestrator::new(layout.clone(), resolver, PaletteExtractor::new(palette_backend))
}
