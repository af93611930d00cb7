//! Cover image downloader

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "BookshelfBuilder/1.0";
const DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Download errors
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Throttling or service-unavailable response (429/503)
    #[error("Blocked by server (HTTP {0})")]
    Blocked(u16),

    #[error("HTTP status {0}")]
    Status(u16),
}

/// Fetches image bytes by URL
#[async_trait]
pub trait ImageDownloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

/// reqwest-backed downloader
pub struct HttpImageDownloader {
    http_client: reqwest::Client,
}

impl HttpImageDownloader {
    pub fn new() -> Result<Self, DownloadError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| DownloadError::NetworkError(e.to_string()))?;

        Ok(Self { http_client })
    }
}

/// Whether an HTTP status means the server is throttling or refusing us
pub fn is_block_status(status: u16) -> bool {
    status == 429 || status == 503
}

#[async_trait]
impl ImageDownloader for HttpImageDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        tracing::debug!(url = %url, "Downloading cover image");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();
        if is_block_status(status) {
            return Err(DownloadError::Blocked(status));
        }
        if !response.status().is_success() {
            return Err(DownloadError::Status(status));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DownloadError::NetworkError(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
