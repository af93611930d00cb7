//! # Bookshelf Common Library
//!
//! Shared code for the bookshelf tools including:
//! - Error and result types
//! - TOML configuration loading and root folder resolution
//! - The on-disk library layout (spreadsheet, catalog, cover directories)

pub mod config;
pub mod error;
pub mod layout;

pub use error::{Error, Result};
pub use layout::LibraryLayout;
