//! Image conversion and color sampling backends
//!
//! Two operations are needed from an image tool: converting a manual cover to JPEG
//! and sampling one representative color. `MagickBackend` shells out to the
//! ImageMagick `convert` binary; `NativeBackend` does the same work in-process
//! with the `image` crate and is used when ImageMagick is not installed.

use async_trait::async_trait;
use clap::ValueEnum;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

const MAGICK_BINARY: &str = "convert";

/// Image backend errors
#[derive(Debug, Error)]
pub enum ImageBackendError {
    /// ImageMagick binary not found in PATH
    #[error("ImageMagick binary not found in PATH")]
    BinaryNotFound,

    /// Failed to run the external tool
    #[error("Failed to execute {0}: {1}")]
    ExecutionError(String, String),

    /// External tool ran but reported failure
    #[error("Image tool failed: {0}")]
    ToolFailed(String),

    /// Sampled color was not a hex triplet
    #[error("Unexpected color output: {0:?}")]
    InvalidColor(String),

    /// Decode or encode failure in the in-process backend
    #[error("Image codec error: {0}")]
    Codec(String),

    /// Input image does not exist
    #[error("Image not found: {0}")]
    FileNotFound(PathBuf),
}

/// Image tool used for manual cover conversion and palette sampling
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Convert any supported image to a JPEG at `dest`
    async fn convert_to_jpeg(&self, source: &Path, dest: &Path) -> Result<(), ImageBackendError>;

    /// Representative color of the image as six hex digits (`RRGGBB`, no `#`)
    async fn average_color(&self, image: &Path) -> Result<String, ImageBackendError>;
}

/// Which backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BackendPreference {
    /// ImageMagick when installed, otherwise in-process
    #[default]
    Auto,
    /// ImageMagick only
    Magick,
    /// In-process decoder only
    Native,
    /// No conversion and no palettes
    #[value(name = "none")]
    Disabled,
}

impl FromStr for BackendPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <BackendPreference as ValueEnum>::from_str(s.trim(), true)
            .map_err(|_| format!("unknown image backend '{}' (expected auto, magick, native or none)", s))
    }
}

/// Pick a backend according to preference
///
/// Returns `None` when the backend is disabled or ImageMagick was requested but is
/// not installed; palette extraction and manual conversion are then unavailable.
pub fn select_backend(preference: BackendPreference) -> Option<Arc<dyn ImageBackend>> {
    match preference {
        BackendPreference::Disabled => None,
        BackendPreference::Native => Some(Arc::new(NativeBackend)),
        BackendPreference::Magick => match MagickBackend::detect() {
            Ok(backend) => Some(Arc::new(backend)),
            Err(e) => {
                tracing::warn!("ImageMagick unavailable ({}); color extraction will be skipped", e);
                None
            }
        },
        BackendPreference::Auto => match MagickBackend::detect() {
            Ok(backend) => Some(Arc::new(backend)),
            Err(e) => {
                tracing::info!("ImageMagick unavailable ({}); using in-process image backend", e);
                Some(Arc::new(NativeBackend))
            }
        },
    }
}

/// ImageMagick command-line backend
pub struct MagickBackend {
    binary_path: String,
}

impl MagickBackend {
    /// Check that `convert` is on PATH by running `convert -version`
    pub fn detect() -> Result<Self, ImageBackendError> {
        match Command::new(MAGICK_BINARY).arg("-version").output() {
            Ok(_) => Ok(Self {
                binary_path: MAGICK_BINARY.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ImageBackendError::BinaryNotFound),
            Err(e) => Err(ImageBackendError::ExecutionError(MAGICK_BINARY.to_string(), e.to_string())),
        }
    }

    async fn run(&self, args: Vec<String>) -> Result<std::process::Output, ImageBackendError> {
        let binary = self.binary_path.clone();
        tracing::debug!(binary = %binary, args = ?args, "Running ImageMagick");

        tokio::task::spawn_blocking(move || Command::new(&binary).args(&args).output())
            .await
            .map_err(|e| ImageBackendError::ExecutionError(self.binary_path.clone(), e.to_string()))?
            .map_err(|e| ImageBackendError::ExecutionError(self.binary_path.clone(), e.to_string()))
    }
}

#[async_trait]
impl ImageBackend for MagickBackend {
    fn name(&self) -> &'static str {
        "imagemagick"
    }

    async fn convert_to_jpeg(&self, source: &Path, dest: &Path) -> Result<(), ImageBackendError> {
        if !source.exists() {
            return Err(ImageBackendError::FileNotFound(source.to_path_buf()));
        }

        let output = self
            .run(vec![
                source.to_string_lossy().into_owned(),
                dest.to_string_lossy().into_owned(),
            ])
            .await?;

        if !output.status.success() || !dest.exists() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ImageBackendError::ToolFailed(stderr.trim().to_string()));
        }
        Ok(())
    }

    async fn average_color(&self, image: &Path) -> Result<String, ImageBackendError> {
        if !image.exists() {
            return Err(ImageBackendError::FileNotFound(image.to_path_buf()));
        }

        // Resize to a single pixel and print it as hex
        let output = self
            .run(vec![
                image.to_string_lossy().into_owned(),
                "-resize".to_string(),
                "1x1".to_string(),
                "-format".to_string(),
                "%[hex:u.p{0,0}]".to_string(),
                "info:".to_string(),
            ])
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ImageBackendError::ToolFailed(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let hex = stdout.trim().trim_start_matches('#');
        match hex.get(..6) {
            Some(rgb) if rgb.chars().all(|c| c.is_ascii_hexdigit()) => Ok(rgb.to_string()),
            _ => Err(ImageBackendError::InvalidColor(stdout.trim().to_string())),
        }
    }
}

/// In-process backend built on the `image` crate
pub struct NativeBackend;

#[async_trait]
impl ImageBackend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn convert_to_jpeg(&self, source: &Path, dest: &Path) -> Result<(), ImageBackendError> {
        if !source.exists() {
            return Err(ImageBackendError::FileNotFound(source.to_path_buf()));
        }

        let source = source.to_path_buf();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<(), ImageBackendError> {
            let decoded = image::open(&source).map_err(|e| ImageBackendError::Codec(e.to_string()))?;
            decoded
                .to_rgb8()
                .save_with_format(&dest, ImageFormat::Jpeg)
                .map_err(|e| ImageBackendError::Codec(e.to_string()))
        })
        .await
        .map_err(|e| ImageBackendError::ExecutionError("native".to_string(), e.to_string()))?
    }

    async fn average_color(&self, image: &Path) -> Result<String, ImageBackendError> {
        if !image.exists() {
            return Err(ImageBackendError::FileNotFound(image.to_path_buf()));
        }

        let path = image.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<String, ImageBackendError> {
            let pixels = image::open(&path)
                .map_err(|e| ImageBackendError::Codec(e.to_string()))?
                .to_rgb8();

            let count = u64::from(pixels.width()) * u64::from(pixels.height());
            if count == 0 {
                return Err(ImageBackendError::Codec("image has no pixels".to_string()));
            }

            let mut sums = [0u64; 3];
            for pixel in pixels.pixels() {
                for (sum, channel) in sums.iter_mut().zip(pixel.0.iter()) {
                    *sum += u64::from(*channel);
                }
            }

            let [r, g, b] = sums.map(|sum| ((sum + count / 2) / count) as u8);
            Ok(format!("{:02X}{:02X}{:02X}", r, g, b))
        })
        .await
        .map_err(|e| ImageBackendError::ExecutionError("native".to_string(), e.to_string()))?
    }
}
