//! Phase 1: LOADING
//!
//! The spreadsheet is the primary input. An absent, unreadable or empty spreadsheet
//! falls back to the previous `books.json`, taken verbatim. With neither the run
//! fails.

use super::statistics::CatalogSource;
use super::WorkflowOrchestrator;
use crate::error::{BuildError, BuildResult};
use crate::models::Catalog;

impl WorkflowOrchestrator {
    pub(super) fn phase_loading(&mut self) -> BuildResult<Catalog> {
        tracing::info!("Phase 1: LOADING");

        let records = self.reader.read();
        let mut catalog = if records.is_empty() {
            Catalog::default()
        } else {
            self.normalizer.normalize_all(&records)
        };

        let source = if !catalog.is_empty() {
            tracing::info!(
                rows = records.len(),
                books = catalog.len(),
                path = %self.layout.relative_to_root(&self.layout.spreadsheet).display(),
                "Loaded spreadsheet"
            );
            CatalogSource::Spreadsheet
        } else if self.layout.has_snapshot() {
            tracing::info!("No spreadsheet rows; using previous catalog");
            catalog = self.store.load_snapshot().map_err(BuildError::SnapshotCorrupt)?;
            CatalogSource::Snapshot
        } else {
            return Err(BuildError::SourceUnavailable {
                spreadsheet: self.layout.spreadsheet.clone(),
                snapshot: self.layout.catalog_json.clone(),
            });
        };

        // Spreadsheet catalogs are already unique; this only touches hand-edited snapshots
        let renamed = catalog.ensure_unique_ids();

        let loading = &mut self.statistics.loading;
        loading.source = Some(source);
        loading.rows_read = records.len();
        loading.books = catalog.len();
        loading.ids_renamed = renamed;

        Ok(catalog)
    }
}
