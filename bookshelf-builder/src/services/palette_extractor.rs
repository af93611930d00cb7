//! Spine palette extraction
//!
//! Samples one representative color from a cover and pairs it with a readable text
//! color. The threshold and both text colors must stay fixed so catalogs built at
//! different times look the same.

use crate::services::image_backend::ImageBackend;
use std::path::Path;
use std::sync::Arc;

/// Text color on light backgrounds
pub const DARK_TEXT: &str = "#1c1c22";
/// Text color on dark backgrounds
pub const LIGHT_TEXT: &str = "#fdfdfd";
/// Backgrounds with luminance strictly above this get dark text
pub const LUMINANCE_THRESHOLD: f64 = 0.55;

/// Background and text color for a book spine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    /// `#RRGGBB`
    pub background: String,
    /// `#RRGGBB`
    pub text: String,
}

/// Parse the leading six hex digits of a color (optional `#`)
pub fn parse_hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    let rgb = digits.get(..6)?;
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(rgb.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// `(0.2126 R + 0.7152 G + 0.0722 B) / 255`
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    (0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b)) / 255.0
}

/// Text color for a background luminance
///
/// The comparison is strict: exactly 0.55 gets light text.
pub fn text_color_for(luminance: f64) -> &'static str {
    if luminance > LUMINANCE_THRESHOLD {
        DARK_TEXT
    } else {
        LIGHT_TEXT
    }
}

/// Palette for a sampled hex color; `None` if the color is malformed
pub fn palette_from_hex(hex: &str) -> Option<Palette> {
    let (r, g, b) = parse_hex_rgb(hex)?;
    let digits = hex.trim().trim_start_matches('#');
    Some(Palette {
        background: format!("#{}", &digits[..6]),
        text: text_color_for(relative_luminance(r, g, b)).to_string(),
    })
}

/// Palette extractor over an optional image backend
pub struct PaletteExtractor {
    backend: Option<Arc<dyn ImageBackend>>,
}

impl PaletteExtractor {
    pub fn new(backend: Option<Arc<dyn ImageBackend>>) -> Self {
        Self { backend }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Sample a palette from an image
    ///
    /// Any backend failure yields `None`; a missing palette is never an error.
    pub async fn extract(&self, image: &Path) -> Option<Palette> {
        let backend = self.backend.as_ref()?;

        match backend.average_color(image).await {
            Ok(hex) => {
                let palette = palette_from_hex(&hex);
                if palette.is_none() {
                    tracing::debug!(image = %image.display(), color = %hex, "Unusable sampled color");
                }
                palette
            }
            Err(e) => {
                tracing::debug!(
                    image = %image.display(),
                    backend = backend.name(),
                    "Palette unavailable: {}",
                    e
                );
                None
            }
        }
    }
}
