//! Book entity
//!
//! Absent values are serialized as explicit `null` so the display layer can rely on
//! every key being present.

use serde::{Deserialize, Serialize};

/// Extension of every cached cover file
pub const COVER_EXTENSION: &str = "jpg";

/// One catalog entry
///
/// Field order matches the serialized key order of `books.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Stable slug (derived from ISBN, or title and author)
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    /// ISBN as entered in the spreadsheet (not sanitized)
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub translator: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub binding: Option<String>,
    /// Publication year
    #[serde(default)]
    pub published: Option<i32>,
    /// Root-relative path of the cached cover image
    #[serde(default)]
    pub cover: Option<String>,
    /// Spine background color (`#RRGGBB`), set together with `spine_text_color`
    #[serde(default)]
    pub spine_color: Option<String>,
    /// Spine text color (`#RRGGBB`)
    #[serde(default)]
    pub spine_text_color: Option<String>,
}

impl Book {
    /// ISBN reduced to digits and the checksum letter, upper-cased
    ///
    /// Returns `None` when no ISBN is present or nothing survives sanitizing.
    pub fn sanitized_isbn(&self) -> Option<String> {
        self.isbn.as_deref().and_then(sanitize_isbn)
    }

    /// File name of this book's cover in the cover cache
    ///
    /// The sanitized ISBN when available, otherwise the book id. This is the join key
    /// between a book and its image regardless of where the image came from.
    pub fn cover_filename(&self) -> String {
        let stem = self.sanitized_isbn().unwrap_or_else(|| self.id.clone());
        format!("{}.{}", stem, COVER_EXTENSION)
    }

    /// Drop the cover and the palette derived from it
    pub fn clear_cover(&mut self) {
        self.cover = None;
        self.clear_palette();
    }

    pub fn clear_palette(&mut self) {
        self.spine_color = None;
        self.spine_text_color = None;
    }

    pub fn set_palette(&mut self, background: String, text: String) {
        self.spine_color = Some(background);
        self.spine_text_color = Some(text);
    }

    pub fn has_palette(&self) -> bool {
        self.spine_color.is_some() && self.spine_text_color.is_some()
    }
}

/// Strip everything except `[0-9Xx]` and upper-case the result
pub fn sanitize_isbn(raw: &str) -> Option<String> {
    let clean: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'x' || *c == 'X')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if clean.is_empty() {
        None
    } else {
        Some(clean)
    }
}
