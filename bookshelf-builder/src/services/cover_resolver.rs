//! Cover resolution
//!
//! Decides where each book's cover comes from. Sources are tried in order:
//!
//! 1. A manual override in `data/manual-covers/`, matched by sanitized ISBN or id
//! 2. The existing cached file, unless a rebuild is forced
//! 3. The active remote provider, when the fetch mode allows network access
//!
//! Whatever happens, a book only keeps a cover reference if the cached file exists
//! afterwards. A provider that reports a block switches the resolver to offline mode
//! for the rest of the run.

use crate::models::{Book, FetchMode};
use crate::services::cover_provider::{CoverProvider, LookupOutcome};
use crate::services::image_backend::{ImageBackend, ImageBackendError};
use crate::services::image_downloader::{DownloadError, ImageDownloader};
use bookshelf_common::LibraryLayout;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Manual cover extensions, in lookup order
pub const MANUAL_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "bmp"];

/// Downloads of this many bytes or fewer are treated as "no cover"
pub const DEFAULT_MIN_COVER_BYTES: usize = 1000;

/// Errors while placing an image in the cover cache
#[derive(Debug, Error)]
pub enum CoverAssetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conversion failed: {0}")]
    Conversion(#[from] ImageBackendError),

    #[error("No image backend available to convert {0}")]
    ConverterUnavailable(PathBuf),
}

/// Where a book's cover came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSource {
    /// Copied or converted from the manual override directory
    Manual,
    /// Already present in the cover cache
    Cached,
    /// Fetched from a remote provider during this run
    Downloaded,
}

/// What happened on the remote path for one book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteOutcome {
    /// No request was made
    #[default]
    NotAttempted,
    Downloaded,
    /// Provider has no cover
    NotFound,
    /// Response body too small to be an image
    Undersized,
    /// Download failed (network error or unexpected status)
    Failed,
    /// Provider or download was blocked; network disabled from here on
    Blocked,
}

/// Result of resolving one book's cover
#[derive(Debug, Clone, Default)]
pub struct CoverResolution {
    /// Cached cover path, if the book ends up with a cover
    pub path: Option<PathBuf>,
    pub source: Option<CoverSource>,
    pub remote: RemoteOutcome,
    /// A local file could not be copied, converted or written
    pub asset_failure: bool,
}

impl CoverResolution {
    pub fn has_cover(&self) -> bool {
        self.path.is_some()
    }
}

/// Result of one resolution step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The cached file is in place; stop here
    Hit(CoverSource),
    /// Try the next step
    Miss,
    /// Provider refused service; stop here and stay offline
    Blocked,
}

/// Resolution steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Manual,
    Cache,
    Remote,
}

const STRATEGIES: [Strategy; 3] = [Strategy::Manual, Strategy::Cache, Strategy::Remote];

/// Per-book inputs shared by all steps
struct CoverTarget {
    title: String,
    id: String,
    isbn: Option<String>,
    dest: PathBuf,
}

/// Resolver knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    pub mode: FetchMode,
    pub force_rebuild: bool,
    pub min_cover_bytes: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            mode: FetchMode::Off,
            force_rebuild: false,
            min_cover_bytes: DEFAULT_MIN_COVER_BYTES,
        }
    }
}

/// Cover resolver for one build run
pub struct CoverResolver {
    layout: LibraryLayout,
    settings: ResolverSettings,
    provider: Option<Arc<dyn CoverProvider>>,
    downloader: Arc<dyn ImageDownloader>,
    image_backend: Option<Arc<dyn ImageBackend>>,
    /// Provider that blocked us, if any
    blocked_by: Option<&'static str>,
}

impl CoverResolver {
    /// `provider` is the source for `settings.mode`; it is ignored in offline modes
    pub fn new(
        layout: LibraryLayout,
        settings: ResolverSettings,
        provider: Option<Arc<dyn CoverProvider>>,
        downloader: Arc<dyn ImageDownloader>,
        image_backend: Option<Arc<dyn ImageBackend>>,
    ) -> Self {
        Self {
            layout,
            settings,
            provider,
            downloader,
            image_backend,
            blocked_by: None,
        }
    }

    /// Current fetch mode (drops to `Off` after a block)
    pub fn active_mode(&self) -> FetchMode {
        self.settings.mode
    }

    pub fn blocked_by(&self) -> Option<&'static str> {
        self.blocked_by
    }

    /// Resolve the cover for one book and update its `cover` field
    ///
    /// On return `book.cover` is set iff the cached file exists. When the cover is
    /// missing the palette fields are cleared as well.
    pub async fn resolve(&mut self, book: &mut Book) -> CoverResolution {
        let filename = book.cover_filename();
        let target = CoverTarget {
            title: book.title.clone(),
            id: book.id.clone(),
            isbn: book.sanitized_isbn(),
            dest: self.layout.cover_path(&filename),
        };
        let mut resolution = CoverResolution::default();

        for strategy in STRATEGIES {
            match self.apply(strategy, &target, &mut resolution).await {
                StepOutcome::Hit(source) => {
                    resolution.source = Some(source);
                    break;
                }
                StepOutcome::Miss => continue,
                StepOutcome::Blocked => break,
            }
        }

        if target.dest.is_file() {
            book.cover = Some(self.layout.cover_reference(&filename));
            resolution.source.get_or_insert(CoverSource::Cached);
            resolution.path = Some(target.dest);
        } else {
            book.clear_cover();
            resolution.source = None;
        }

        resolution
    }

    async fn apply(&mut self, strategy: Strategy, target: &CoverTarget, resolution: &mut CoverResolution) -> StepOutcome {
        match strategy {
            Strategy::Manual => self.try_manual(target, resolution).await,
            Strategy::Cache => self.try_cache(target),
            Strategy::Remote => self.try_remote(target, resolution).await,
        }
    }

    async fn try_manual(&self, target: &CoverTarget, resolution: &mut CoverResolution) -> StepOutcome {
        let manual = match self.find_manual_cover(target.isbn.as_deref(), &target.id) {
            Some(path) => path,
            None => return StepOutcome::Miss,
        };

        match self.install_manual_cover(&manual, &target.dest).await {
            Ok(()) => {
                tracing::info!(title = %target.title, source = %manual.display(), "Using manual cover");
                StepOutcome::Hit(CoverSource::Manual)
            }
            Err(e) => {
                tracing::warn!(
                    title = %target.title,
                    source = %manual.display(),
                    "Failed to install manual cover: {}",
                    e
                );
                resolution.asset_failure = true;
                discard_partial_cover(&target.dest).await;
                StepOutcome::Miss
            }
        }
    }

    /// Existing file short-circuits the network unless a rebuild is forced
    fn try_cache(&self, target: &CoverTarget) -> StepOutcome {
        if !self.settings.mode.is_network() || target.isbn.is_none() || self.settings.force_rebuild {
            return StepOutcome::Miss;
        }
        if target.dest.is_file() {
            tracing::debug!(title = %target.title, "Cover already cached");
            StepOutcome::Hit(CoverSource::Cached)
        } else {
            StepOutcome::Miss
        }
    }

    /// First manual override for the book: sanitized ISBN before id, extensions in order
    pub fn find_manual_cover(&self, isbn: Option<&str>, id: &str) -> Option<PathBuf> {
        let dir = &self.layout.manual_covers_dir;
        if !dir.is_dir() {
            return None;
        }

        isbn.into_iter()
            .chain(std::iter::once(id))
            .filter(|stem| !stem.is_empty())
            .flat_map(|stem| MANUAL_EXTENSIONS.iter().map(move |ext| dir.join(format!("{}.{}", stem, ext))))
            .find(|candidate| candidate.is_file())
    }

    /// Copy a JPEG override as-is; convert anything else to JPEG
    async fn install_manual_cover(&self, source: &Path, dest: &Path) -> Result<(), CoverAssetError> {
        let is_jpeg = source
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
            .unwrap_or(false);

        if is_jpeg {
            tokio::fs::copy(source, dest).await?;
            return Ok(());
        }

        match &self.image_backend {
            Some(backend) => Ok(backend.convert_to_jpeg(source, dest).await?),
            None => Err(CoverAssetError::ConverterUnavailable(source.to_path_buf())),
        }
    }

    async fn try_remote(&mut self, target: &CoverTarget, resolution: &mut CoverResolution) -> StepOutcome {
        let (provider, isbn) = match (&self.provider, target.isbn.as_deref()) {
            (Some(provider), Some(isbn)) if self.settings.mode.is_network() => (Arc::clone(provider), isbn),
            _ => return StepOutcome::Miss,
        };
        let title = target.title.as_str();
        let dest = target.dest.as_path();

        tracing::info!(title = %title, isbn = %isbn, provider = provider.name(), "Looking up cover");

        let url = match provider.locate(isbn).await {
            LookupOutcome::Found(url) => url,
            LookupOutcome::NotFound => {
                tracing::info!(title = %title, provider = provider.name(), "No cover found");
                resolution.remote = RemoteOutcome::NotFound;
                return StepOutcome::Miss;
            }
            LookupOutcome::Blocked(reason) => {
                self.disable_network(provider.name(), &reason);
                resolution.remote = RemoteOutcome::Blocked;
                return StepOutcome::Blocked;
            }
        };

        match self.downloader.download(&url).await {
            Ok(bytes) if bytes.len() > self.settings.min_cover_bytes => match tokio::fs::write(dest, &bytes).await {
                Ok(()) => {
                    tracing::info!(title = %title, bytes = bytes.len(), "Downloaded cover");
                    resolution.remote = RemoteOutcome::Downloaded;
                    StepOutcome::Hit(CoverSource::Downloaded)
                }
                Err(e) => {
                    tracing::warn!(title = %title, path = %dest.display(), "Failed to write cover: {}", e);
                    resolution.remote = RemoteOutcome::Failed;
                    resolution.asset_failure = true;
                    discard_partial_cover(dest).await;
                    StepOutcome::Miss
                }
            },
            Ok(bytes) => {
                tracing::info!(title = %title, bytes = bytes.len(), "Downloaded image too small, treating as missing");
                resolution.remote = RemoteOutcome::Undersized;
                if dest.is_file() {
                    if let Err(e) = tokio::fs::remove_file(dest).await {
                        tracing::warn!(path = %dest.display(), "Failed to remove stale cover: {}", e);
                        resolution.asset_failure = true;
                    }
                }
                StepOutcome::Miss
            }
            Err(DownloadError::Blocked(status)) => {
                self.disable_network(provider.name(), &format!("HTTP {}", status));
                resolution.remote = RemoteOutcome::Blocked;
                StepOutcome::Blocked
            }
            Err(DownloadError::Status(404)) => {
                tracing::info!(title = %title, provider = provider.name(), "No cover found");
                resolution.remote = RemoteOutcome::NotFound;
                StepOutcome::Miss
            }
            Err(e) => {
                tracing::warn!(title = %title, url = %url, "Cover download failed: {}", e);
                resolution.remote = RemoteOutcome::Failed;
                StepOutcome::Miss
            }
        }
    }

    fn disable_network(&mut self, provider: &'static str, reason: &str) {
        tracing::warn!(
            provider = provider,
            reason = %reason,
            "Provider blocked further requests; continuing without network"
        );
        self.settings.mode = FetchMode::Off;
        self.provider = None;
        self.blocked_by = Some(provider);
    }
}

/// Remove whatever a failed copy, conversion or write left at `dest`
async fn discard_partial_cover(dest: &Path) {
    if !dest.is_file() {
        return;
    }
    if let Err(e) = tokio::fs::remove_file(dest).await {
        tracing::warn!(path = %dest.display(), "Failed to remove partial cover: {}", e);
    }
}
