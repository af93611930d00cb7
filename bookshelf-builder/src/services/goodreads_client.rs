//! Goodreads cover scraper
//!
//! Goodreads has no cover API. The book page for an ISBN is fetched with a browser
//! user agent and the cover URL is pulled out of the HTML. Every request is preceded
//! by a random pause, and bot-detection pages or 429/503 answers are reported as
//! `LookupOutcome::Blocked` so the caller can stop using the network.

use crate::services::cover_provider::{CoverProvider, LookupOutcome};
use crate::services::image_downloader::is_block_status;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::time::Duration;
use thiserror::Error;

const GOODREADS_BOOK_URL: &str = "https://www.goodreads.com/book/isbn";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default pause bounds before each page request
pub const DEFAULT_THROTTLE_MIN_MS: u64 = 1000;
pub const DEFAULT_THROTTLE_MAX_MS: u64 = 3000;

/// Markers of a bot-detection page
const BLOCK_MARKERS: [&str; 2] = ["captcha", "robot check"];

/// Cover URL patterns, tried in order
static COVER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"<meta\s+property="og:image"\s+content="([^"]+)""#,
        r#"<meta\s+content="([^"]+)"\s+property="og:image""#,
        r#"class="bookCover"\s+[^>]*src="([^"]+)""#,
        r#"id="coverImage"[^>]+src="([^"]+)""#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid cover pattern"))
    .collect()
});

/// Resize suffix such as `._SX98_` or `._SY475_`
static RESIZE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\._S[XY]\d+_").expect("valid resize suffix regex"));

/// Goodreads client errors
#[derive(Debug, Error)]
pub enum GoodreadsError {
    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Random pause between page requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    min: Duration,
    max: Duration,
}

impl Throttle {
    /// Bounds in milliseconds; swapped if given in the wrong order
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        let (low, high) = if min_ms <= max_ms { (min_ms, max_ms) } else { (max_ms, min_ms) };
        Self {
            min: Duration::from_millis(low),
            max: Duration::from_millis(high),
        }
    }

    /// No pause at all
    pub fn disabled() -> Self {
        Self::new(0, 0)
    }

    /// Pick a delay uniformly within the bounds
    pub fn next_delay(&self) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }

    /// Sleep for a random delay
    pub async fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::debug!("Goodreads throttle: waiting {:.1}s", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_MIN_MS, DEFAULT_THROTTLE_MAX_MS)
    }
}

/// Whether a page body is a bot-detection page
pub fn is_block_page(body: &str) -> bool {
    BLOCK_MARKERS.iter().any(|marker| body.contains(marker))
}

/// Pull the cover URL out of a book page
///
/// Returns `None` when no pattern matches or the match is the "nophoto" placeholder.
/// Resize suffixes are stripped so the full-size image is downloaded.
pub fn extract_cover_url(html: &str) -> Option<String> {
    let url = COVER_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(html))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())?;

    if url.contains("nophoto") {
        return None;
    }

    Some(RESIZE_SUFFIX.replace_all(url, "").into_owned())
}

/// Goodreads book-page client
pub struct GoodreadsClient {
    http_client: reqwest::Client,
    base_url: String,
    throttle: Throttle,
}

impl GoodreadsClient {
    pub fn new(throttle: Throttle) -> Result<Self, GoodreadsError> {
        Self::with_base_url(GOODREADS_BOOK_URL, throttle)
    }

    /// Client against a different host (tests)
    pub fn with_base_url(base_url: &str, throttle: Throttle) -> Result<Self, GoodreadsError> {
        let http_client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GoodreadsError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            throttle,
        })
    }

    pub fn book_url(&self, isbn: &str) -> String {
        format!("{}/{}", self.base_url, isbn)
    }

    async fn fetch_page(&self, isbn: &str) -> Result<(u16, String), GoodreadsError> {
        let url = self.book_url(isbn);
        tracing::debug!(isbn = %isbn, url = %url, "Fetching Goodreads book page");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| GoodreadsError::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Ok((status, String::new()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GoodreadsError::NetworkError(e.to_string()))?;

        Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
    }
}

#[async_trait]
impl CoverProvider for GoodreadsClient {
    fn name(&self) -> &'static str {
        "Goodreads"
    }

    async fn locate(&self, isbn: &str) -> LookupOutcome {
        self.throttle.pause().await;

        let (status, body) = match self.fetch_page(isbn).await {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!(isbn = %isbn, "Goodreads request failed: {}", e);
                return LookupOutcome::NotFound;
            }
        };

        if is_block_status(status) {
            return LookupOutcome::Blocked(format!("HTTP {}", status));
        }
        if status != 200 {
            return LookupOutcome::NotFound;
        }
        if is_block_page(&body) {
            return LookupOutcome::Blocked("bot check page".to_string());
        }

        match extract_cover_url(&body) {
            Some(url) => LookupOutcome::Found(url),
            None => LookupOutcome::NotFound,
        }
    }
}
