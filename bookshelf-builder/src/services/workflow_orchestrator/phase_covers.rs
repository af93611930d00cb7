//! Phase 2: COVERS
//!
//! One book at a time: resolve the cover, then sample the palette from it. A book
//! without a cover never keeps a palette, and a failed sample clears any palette
//! carried over from a previous catalog.

use super::WorkflowOrchestrator;
use crate::models::Catalog;

impl WorkflowOrchestrator {
    pub(super) async fn phase_covers(&mut self, catalog: &mut Catalog) {
        let total = catalog.len();
        tracing::info!(books = total, mode = %self.resolver.active_mode(), "Phase 2: COVERS");

        for (index, book) in catalog.books_mut().iter_mut().enumerate() {
            tracing::debug!(book = index + 1, total, title = %book.title, "Processing book");

            let was_blocked = self.resolver.blocked_by().is_some();
            let resolution = self.resolver.resolve(book).await;
            self.statistics.record_cover(&resolution);

            if !was_blocked {
                if let Some(provider) = self.resolver.blocked_by() {
                    self.statistics.record_blocked(provider);
                }
            }

            let cover = match &resolution.path {
                Some(path) => path,
                None => continue,
            };

            match self.palette.extract(cover).await {
                Some(palette) => {
                    tracing::debug!(title = %book.title, color = %palette.background, "Spine palette sampled");
                    book.set_palette(palette.background, palette.text);
                    self.statistics.record_palette(true);
                }
                None => {
                    book.clear_palette();
                    self.statistics.record_palette(false);
                }
            }
        }

        tracing::info!(
            covers = %self.statistics.covers.display_string(),
            colors = %self.statistics.palette.display_string(),
            "Cover phase finished"
        );
    }
}
