//! Open Library covers client
//!
//! Covers are addressed directly by ISBN, so locating one needs no request. With
//! `default=false` the service answers 404 instead of a placeholder image when it
//! has no cover.

use crate::services::cover_provider::{CoverProvider, LookupOutcome};
use async_trait::async_trait;

const OPEN_LIBRARY_COVER_URL: &str = "https://covers.openlibrary.org/b/isbn/{isbn}-L.jpg?default=false";

/// Open Library cover-by-ISBN provider
pub struct OpenLibraryClient {
    url_template: String,
}

impl OpenLibraryClient {
    pub fn new() -> Self {
        Self {
            url_template: OPEN_LIBRARY_COVER_URL.to_string(),
        }
    }

    /// Large cover URL for a sanitized ISBN
    pub fn cover_url(&self, isbn: &str) -> String {
        self.url_template.replace("{isbn}", isbn)
    }
}

impl Default for OpenLibraryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoverProvider for OpenLibraryClient {
    fn name(&self) -> &'static str {
        "Open Library"
    }

    async fn locate(&self, isbn: &str) -> LookupOutcome {
        LookupOutcome::Found(self.cover_url(isbn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cover_url_template() {
        let client = OpenLibraryClient::new();
        assert_eq!(
            client.locate("9780134685991").await,
            LookupOutcome::Found(
                "https://covers.openlibrary.org/b/isbn/9780134685991-L.jpg?default=false".to_string()
            )
        );
    }
}
