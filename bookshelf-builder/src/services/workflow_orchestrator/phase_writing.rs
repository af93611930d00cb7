//! Phase 3: WRITING

use super::WorkflowOrchestrator;
use crate::error::{BuildError, BuildResult};
use crate::models::Catalog;

impl WorkflowOrchestrator {
    pub(super) fn phase_writing(&self, catalog: &Catalog) -> BuildResult<()> {
        tracing::info!(
            json = %self.layout.relative_to_root(self.store.json_path()).display(),
            "Phase 3: WRITING"
        );
        self.store.save(catalog).map_err(BuildError::Output)
    }
}
