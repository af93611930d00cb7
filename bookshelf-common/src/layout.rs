//! On-disk library layout
//!
//! All locations are fixed names relative to the library root folder. The display
//! layer loads `data/books.js` and resolves cover paths relative to the root, so
//! cover references are always written with forward slashes.

use crate::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Spreadsheet input file name
pub const SPREADSHEET_FILE: &str = "My Library.xlsx";
/// Data directory (catalog outputs and covers)
pub const DATA_DIR: &str = "data";
/// Catalog JSON snapshot file name
pub const CATALOG_JSON_FILE: &str = "books.json";
/// Script-embedded catalog file name
pub const CATALOG_JS_FILE: &str = "books.js";
/// Cover cache directory name (inside the data directory)
pub const COVERS_DIR: &str = "covers";
/// Manual cover directory name (inside the data directory)
pub const MANUAL_COVERS_DIR: &str = "manual-covers";

/// Resolved paths for one library root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLayout {
    pub root: PathBuf,
    pub spreadsheet: PathBuf,
    pub catalog_json: PathBuf,
    pub catalog_js: PathBuf,
    pub covers_dir: PathBuf,
    pub manual_covers_dir: PathBuf,
}

impl LibraryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let data = root.join(DATA_DIR);
        Self {
            spreadsheet: root.join(SPREADSHEET_FILE),
            catalog_json: data.join(CATALOG_JSON_FILE),
            catalog_js: data.join(CATALOG_JS_FILE),
            covers_dir: data.join(COVERS_DIR),
            manual_covers_dir: data.join(MANUAL_COVERS_DIR),
            root,
        }
    }

    /// Create the cover cache and manual cover directories if missing
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.covers_dir, &self.manual_covers_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
                info!("Created directory: {}", dir.display());
            }
        }
        Ok(())
    }

    /// Absolute path of a cover file in the cache
    pub fn cover_path(&self, filename: &str) -> PathBuf {
        self.covers_dir.join(filename)
    }

    /// Catalog-relative reference to a cached cover (e.g. `data/covers/123.jpg`)
    pub fn cover_reference(&self, filename: &str) -> String {
        format!("{}/{}/{}", DATA_DIR, COVERS_DIR, filename)
    }

    /// Whether the spreadsheet input exists
    pub fn has_spreadsheet(&self) -> bool {
        self.spreadsheet.is_file()
    }

    /// Whether a previous catalog snapshot exists
    pub fn has_snapshot(&self) -> bool {
        self.catalog_json.is_file()
    }

    pub fn relative_to_root<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}
