//! Unit tests for configuration and graceful degradation
//!
//! Covers:
//! - Missing TOML files do not cause termination
//! - Priority order for root folder resolution (CLI → ENV → TOML → default)
//! - Library layout paths and automatic directory creation
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate BOOKSHELF_ROOT are marked with #[serial].

use bookshelf_common::config::{
    load_config, load_toml_config, resolve_root_folder, CompiledDefaults, TomlConfig,
    CONFIG_FILE_NAME, ROOT_ENV_VAR,
};
use bookshelf_common::{Error, LibraryLayout};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_full_config_parses_all_sections() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("full.toml");
    fs::write(
        &path,
        r#"
root_folder = "/srv/shelf"

[logging]
level = "debug"

[fetch]
mode = "goodreads"
force_rebuild = true
min_cover_bytes = 2048
throttle_min_ms = 10
throttle_max_ms = 20

[palette]
backend = "native"
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/shelf")));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.fetch.mode.as_deref(), Some("goodreads"));
    assert_eq!(config.fetch.force_rebuild, Some(true));
    assert_eq!(config.fetch.min_cover_bytes, Some(2048));
    assert_eq!(config.fetch.throttle_min_ms, Some(10));
    assert_eq!(config.fetch.throttle_max_ms, Some(20));
    assert_eq!(config.palette.backend.as_deref(), Some("native"));
}

#[test]
fn test_partial_config_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partial.toml");
    fs::write(&path, "[fetch]\nmode = \"off\"\n").unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.fetch.mode.as_deref(), Some("off"));
    assert_eq!(config.fetch.force_rebuild, None);
    assert_eq!(config.logging.level, "info");
    assert!(config.root_folder.is_none());
}

#[test]
fn test_explicit_missing_config_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let err = load_config(Some(&missing), temp_dir.path()).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_root_config_file_is_discovered() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[palette]\nbackend = \"none\"\n",
    )
    .unwrap();

    let config = load_config(None, temp_dir.path()).unwrap();
    assert_eq!(config.palette.backend.as_deref(), Some("none"));
}

#[test]
fn test_malformed_root_config_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "fetch = [").unwrap();

    let err = load_config(None, temp_dir.path()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_ENV_VAR);

    let root = resolve_root_folder(None, ROOT_ENV_VAR, &TomlConfig::default());
    assert_eq!(root, CompiledDefaults::new().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_beats_toml() {
    env::set_var(ROOT_ENV_VAR, "/tmp/bookshelf-env-root");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/bookshelf-toml-root")),
        ..Default::default()
    };

    let root = resolve_root_folder(None, ROOT_ENV_VAR, &config);
    assert_eq!(root, PathBuf::from("/tmp/bookshelf-env-root"));

    env::remove_var(ROOT_ENV_VAR);
}

#[test]
#[serial]
fn test_resolver_cli_beats_env() {
    env::set_var(ROOT_ENV_VAR, "/tmp/bookshelf-env-root");

    let root = resolve_root_folder(
        Some(Path::new("/tmp/bookshelf-cli-root")),
        ROOT_ENV_VAR,
        &TomlConfig::default(),
    );
    assert_eq!(root, PathBuf::from("/tmp/bookshelf-cli-root"));

    env::remove_var(ROOT_ENV_VAR);
}

#[test]
#[serial]
fn test_resolver_toml_used_without_cli_or_env() {
    env::remove_var(ROOT_ENV_VAR);
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/bookshelf-toml-root")),
        ..Default::default()
    };

    let root = resolve_root_folder(None, ROOT_ENV_VAR, &config);
    assert_eq!(root, PathBuf::from("/tmp/bookshelf-toml-root"));
}

#[test]
fn test_layout_paths() {
    let layout = LibraryLayout::new("/site");

    assert_eq!(layout.spreadsheet, PathBuf::from("/site/My Library.xlsx"));
    assert_eq!(layout.catalog_json, PathBuf::from("/site/data/books.json"));
    assert_eq!(layout.catalog_js, PathBuf::from("/site/data/books.js"));
    assert_eq!(layout.covers_dir, PathBuf::from("/site/data/covers"));
    assert_eq!(layout.manual_covers_dir, PathBuf::from("/site/data/manual-covers"));
    assert_eq!(layout.cover_reference("9780134685991.jpg"), "data/covers/9780134685991.jpg");
}

#[test]
fn test_layout_creates_directories_idempotently() {
    let temp_dir = TempDir::new().unwrap();
    let layout = LibraryLayout::new(temp_dir.path());

    layout.ensure_directories().unwrap();
    layout.ensure_directories().unwrap();

    assert!(layout.covers_dir.is_dir());
    assert!(layout.manual_covers_dir.is_dir());
    assert!(!layout.has_spreadsheet());
    assert!(!layout.has_snapshot());
}
