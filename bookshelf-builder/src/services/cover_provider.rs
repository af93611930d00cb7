//! Remote cover provider seam
//!
//! A provider turns a sanitized ISBN into an image URL. Downloading the image is the
//! separate `ImageDownloader` step.

use async_trait::async_trait;

/// Result of asking a provider for a cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Image URL to download
    Found(String),
    /// Provider has no cover for this ISBN (normal outcome)
    NotFound,
    /// Provider signalled bot detection or throttling; stop using it for this run
    Blocked(String),
}

/// Remote source of cover image URLs
#[async_trait]
pub trait CoverProvider: Send + Sync {
    /// Provider name for logging and statistics
    fn name(&self) -> &'static str;

    /// Locate a cover image for a sanitized ISBN
    async fn locate(&self, isbn: &str) -> LookupOutcome;
}
