//! bookshelf-builder library interface
//!
//! Exposes the build pipeline for the binary and for integration testing

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::config::{BuilderSettings, CliOverrides};
pub use crate::error::{BuildError, BuildResult};
