//! Data models for the bookshelf builder
//!
//! - `Book`: the persistent catalog entity
//! - `Catalog`: ordered books (order = on-screen shelf order)
//! - `FetchMode`: which cover source, if any, may be contacted

pub mod book;
pub mod catalog;
pub mod fetch_mode;

pub use book::{sanitize_isbn, Book, COVER_EXTENSION};
pub use catalog::Catalog;
pub use fetch_mode::FetchMode;
