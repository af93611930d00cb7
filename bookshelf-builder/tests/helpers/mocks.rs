//! In-test collaborators
//!
//! Each mock counts its calls so tests can assert that the network was or was not
//! touched.

use async_trait::async_trait;
use bookshelf_builder::services::{
    CoverProvider, DownloadError, ImageBackend, ImageBackendError, ImageDownloader, LookupOutcome,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Provider answering with a fixed outcome
pub struct MockProvider {
    outcome: Mutex<LookupOutcome>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(outcome: LookupOutcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn found(url: &str) -> Self {
        Self::new(LookupOutcome::Found(url.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CoverProvider for MockProvider {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn locate(&self, _isbn: &str) -> LookupOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.lock().unwrap().clone()
    }
}

/// What the mock downloader returns
#[derive(Debug, Clone)]
pub enum DownloadReply {
    Bytes(usize),
    Blocked(u16),
    Status(u16),
}

/// Downloader returning a fixed reply
pub struct MockDownloader {
    reply: DownloadReply,
    calls: AtomicUsize,
}

impl MockDownloader {
    pub fn new(reply: DownloadReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    /// Replies with `len` bytes of image data
    pub fn bytes(len: usize) -> Self {
        Self::new(DownloadReply::Bytes(len))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageDownloader for MockDownloader {
    async fn download(&self, _url: &str) -> Result<Vec<u8>, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            DownloadReply::Bytes(len) => Ok(vec![0xFF; len]),
            DownloadReply::Blocked(status) => Err(DownloadError::Blocked(status)),
            DownloadReply::Status(status) => Err(DownloadError::Status(status)),
        }
    }
}

/// Image backend that copies on conversion and reports a fixed color
pub struct MockImageBackend {
    color: Option<String>,
    conversions: AtomicUsize,
}

impl MockImageBackend {
    pub fn with_color(hex: &str) -> Self {
        Self {
            color: Some(hex.to_string()),
            conversions: AtomicUsize::new(0),
        }
    }

    /// Sampling always fails
    pub fn without_color() -> Self {
        Self {
            color: None,
            conversions: AtomicUsize::new(0),
        }
    }

    pub fn conversions(&self) -> usize {
        self.conversions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageBackend for MockImageBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn convert_to_jpeg(&self, source: &Path, dest: &Path) -> Result<(), ImageBackendError> {
        self.conversions.fetch_add(1, Ordering::SeqCst);
        std::fs::copy(source, dest).map_err(|e| ImageBackendError::Codec(e.to_string()))?;
        Ok(())
    }

    async fn average_color(&self, image: &Path) -> Result<String, ImageBackendError> {
        if !image.exists() {
            return Err(ImageBackendError::FileNotFound(image.to_path_buf()));
        }
        self.color
            .clone()
            .ok_or_else(|| ImageBackendError::ToolFailed("no color".to_string()))
    }
}
