//! Spreadsheet record normalization
//!
//! Turns raw header-keyed rows into `Book` entities: trims fields, extracts the
//! publication year and derives the stable slug id.
//!
//! Ids are deterministic for a non-empty seed. When the seed is missing or slugs to
//! nothing, a random token is used instead; such ids change between runs.

use crate::models::{Book, Catalog};
use crate::services::xlsx_reader::{RawRecord, TITLE_HEADER};
use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4}").expect("valid year regex"));

/// Length of the random fallback token
const FALLBACK_TOKEN_LEN: usize = 12;

/// Source of fallback id tokens
pub type TokenSource = fn() -> String;

/// Random short token (first characters of a v4 UUID)
pub fn random_token() -> String {
    uuid::Uuid::new_v4()
        .to_string()
        .chars()
        .take(FALLBACK_TOKEN_LEN)
        .collect()
}

/// Trim a field; empty or whitespace-only values become `None`
pub fn normalize_field(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// First run of four digits, as a year
///
/// "March 2019" → 2019, "2019-03-01" → 2019, "12 3456" → 3456, "unknown" → None.
/// No plausibility check is applied.
pub fn parse_year(value: Option<&str>) -> Option<i32> {
    YEAR.find(value?).and_then(|m| m.as_str().parse().ok())
}

/// Lower-case, collapse every run outside `[a-z0-9]` to `-`, trim hyphens
///
/// Returns an empty string when nothing survives.
pub fn slug_of(seed: &str) -> String {
    NON_SLUG_RUN
        .replace_all(&seed.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Normalizer for spreadsheet rows
pub struct RecordNormalizer {
    token_source: TokenSource,
}

impl RecordNormalizer {
    pub fn new() -> Self {
        Self {
            token_source: random_token,
        }
    }

    /// Use a custom fallback token source (tests)
    pub fn with_token_source(token_source: TokenSource) -> Self {
        Self { token_source }
    }

    /// Slug id for a seed, falling back to a random token
    pub fn slugify(&self, seed: Option<&str>) -> String {
        let slug = seed.map(slug_of).unwrap_or_default();
        if slug.is_empty() {
            (self.token_source)()
        } else {
            slug
        }
    }

    /// Build a book from one row; `None` when the title is missing
    pub fn normalize(&self, record: &RawRecord) -> Option<Book> {
        let field = |name: &str| normalize_field(record.get(name).map(String::as_str));

        let title = field(TITLE_HEADER)?;
        let author = field("Author");
        let isbn = field("ISBN");

        let seed = match &isbn {
            Some(isbn) => isbn.clone(),
            None => format!("{}-{}", title, author.as_deref().unwrap_or("None")),
        };

        Some(Book {
            id: self.slugify(Some(&seed)),
            title,
            author,
            isbn,
            translator: field("Translator"),
            publisher: field("Publisher"),
            binding: field("Binding"),
            published: parse_year(record.get("Published").map(String::as_str)),
            cover: None,
            spine_color: None,
            spine_text_color: None,
        })
    }

    /// Normalize all rows in order and make ids unique
    pub fn normalize_all(&self, records: &[RawRecord]) -> Catalog {
        let books = records
            .iter()
            .filter_map(|record| self.normalize(record))
            .collect();

        let mut catalog = Catalog::new(books);
        catalog.ensure_unique_ids();
        catalog
    }
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
