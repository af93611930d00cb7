//! Error types for bookshelf-builder
//!
//! Per-book problems (missing covers, failed downloads, unusable images) are logged
//! and counted, never raised. Only conditions that stop the whole run are errors.

use crate::services::catalog_store::CatalogStoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal build errors
#[derive(Debug, Error)]
pub enum BuildError {
    /// Neither a usable spreadsheet nor a previous catalog exists
    #[error("No input data: {spreadsheet} is missing or empty and {snapshot} does not exist")]
    SourceUnavailable { spreadsheet: PathBuf, snapshot: PathBuf },

    /// Previous catalog exists but cannot be read
    #[error("Previous catalog is unreadable: {0}")]
    SnapshotCorrupt(#[source] CatalogStoreError),

    /// Output could not be written
    #[error("Failed to write catalog: {0}")]
    Output(#[source] CatalogStoreError),

    /// Settings could not be resolved
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Http(String),

    /// bookshelf-common error
    #[error("Common error: {0}")]
    Common(#[from] bookshelf_common::Error),
}

/// Result type for build operations
pub type BuildResult<T> = Result<T, BuildError>;
