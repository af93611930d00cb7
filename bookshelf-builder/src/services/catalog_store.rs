//! Catalog persistence
//!
//! `books.json` is both the build output and the fallback input for the next run.
//! `books.js` carries the same JSON as a script assignment so the display page can
//! load it without a fetch.

use crate::models::{Book, Catalog};
use bookshelf_common::LibraryLayout;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};
use thiserror::Error;

const JS_PREFIX: &str = "window.booksData = ";
const JS_SUFFIX: &str = ";";
const JSON_INDENT: &[u8] = b"    ";

/// Catalog store errors
#[derive(Debug, Error)]
pub enum CatalogStoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Serialize books as JSON with four-space indentation and unescaped UTF-8
pub fn to_catalog_json(books: &[Book]) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    books.serialize(&mut serializer)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Script form of the catalog: `window.booksData = [...];`
pub fn to_catalog_script(json: &str) -> String {
    format!("{}{}{}", JS_PREFIX, json, JS_SUFFIX)
}

/// Reads the previous snapshot and writes both output files
pub struct CatalogStore {
    json_path: PathBuf,
    js_path: PathBuf,
}

impl CatalogStore {
    pub fn new(layout: &LibraryLayout) -> Self {
        Self {
            json_path: layout.catalog_json.clone(),
            js_path: layout.catalog_js.clone(),
        }
    }

    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    pub fn js_path(&self) -> &Path {
        &self.js_path
    }

    /// Load books from the previous `books.json`, in stored order
    pub fn load_snapshot(&self) -> Result<Catalog, CatalogStoreError> {
        let content = std::fs::read_to_string(&self.json_path).map_err(|source| CatalogStoreError::Io {
            path: self.json_path.clone(),
            source,
        })?;

        let books: Vec<Book> = serde_json::from_str(&content).map_err(|source| CatalogStoreError::Json {
            path: self.json_path.clone(),
            source,
        })?;

        tracing::info!(books = books.len(), path = %self.json_path.display(), "Loaded catalog snapshot");
        Ok(Catalog::new(books))
    }

    /// Write `books.json` and `books.js`
    pub fn save(&self, catalog: &Catalog) -> Result<(), CatalogStoreError> {
        let json = to_catalog_json(catalog.books())?;
        write_atomic(&self.json_path, &json)?;
        write_atomic(&self.js_path, &to_catalog_script(&json))?;

        tracing::info!(
            books = catalog.len(),
            json = %self.json_path.display(),
            script = %self.js_path.display(),
            "Catalog written"
        );
        Ok(())
    }
}

/// Write through a sibling temp file and rename over the target
fn write_atomic(path: &Path, contents: &str) -> Result<(), CatalogStoreError> {
    let io_err = |source| CatalogStoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, contents).map_err(io_err)?;
    std::fs::rename(&tmp_path, path).map_err(io_err)
}
