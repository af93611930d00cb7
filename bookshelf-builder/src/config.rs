//! Build settings resolution
//!
//! Each setting is taken from the first source that provides it:
//! command line → environment → TOML config → compiled default.

use crate::error::{BuildError, BuildResult};
use crate::models::FetchMode;
use crate::services::cover_resolver::DEFAULT_MIN_COVER_BYTES;
use crate::services::goodreads_client::{Throttle, DEFAULT_THROTTLE_MAX_MS, DEFAULT_THROTTLE_MIN_MS};
use crate::services::image_backend::BackendPreference;
use bookshelf_common::config::{load_config, resolve_root_folder, TomlConfig, ROOT_ENV_VAR};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable selecting the fetch mode
pub const FETCH_MODE_ENV_VAR: &str = "BOOKSHELF_FETCH_MODE";

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root: Option<PathBuf>,
    pub mode: Option<FetchMode>,
    pub force: bool,
    pub image_backend: Option<BackendPreference>,
    pub config: Option<PathBuf>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct BuilderSettings {
    pub root_folder: PathBuf,
    pub fetch_mode: FetchMode,
    pub force_rebuild: bool,
    pub min_cover_bytes: usize,
    pub throttle: Throttle,
    pub image_backend: BackendPreference,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl BuilderSettings {
    /// Load the TOML config and resolve every setting
    pub fn resolve(cli: &CliOverrides) -> BuildResult<Self> {
        let root_hint = cli
            .root
            .clone()
            .or_else(|| std::env::var(ROOT_ENV_VAR).ok().filter(|v| !v.trim().is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let toml_config = load_config(cli.config.as_deref(), &root_hint)?;
        Self::from_sources(cli, &toml_config)
    }

    /// Resolve from command line, environment and an already-loaded config
    pub fn from_sources(cli: &CliOverrides, toml_config: &TomlConfig) -> BuildResult<Self> {
        let root_folder = resolve_root_folder(cli.root.as_deref(), ROOT_ENV_VAR, toml_config);
        let fetch_mode = resolve_fetch_mode(cli.mode, toml_config)?;

        let image_backend = match (cli.image_backend, &toml_config.palette.backend) {
            (Some(backend), _) => backend,
            (None, Some(name)) => name.parse().map_err(BuildError::Config)?,
            (None, None) => BackendPreference::default(),
        };

        let fetch = &toml_config.fetch;
        let settings = Self {
            root_folder,
            fetch_mode,
            force_rebuild: cli.force || fetch.force_rebuild.unwrap_or(false),
            min_cover_bytes: fetch.min_cover_bytes.unwrap_or(DEFAULT_MIN_COVER_BYTES),
            throttle: Throttle::new(
                fetch.throttle_min_ms.unwrap_or(DEFAULT_THROTTLE_MIN_MS),
                fetch.throttle_max_ms.unwrap_or(DEFAULT_THROTTLE_MAX_MS),
            ),
            image_backend,
            log_level: toml_config.logging.level.clone(),
        };

        debug!(?settings, "Resolved settings");
        Ok(settings)
    }

    pub fn root(&self) -> &Path {
        &self.root_folder
    }

    /// Log the resolved settings
    ///
    /// Resolution runs before the subscriber is installed, so the binary calls this
    /// once logging is up.
    pub fn log_summary(&self) {
        info!("Root folder: {}", self.root_folder.display());
        info!(
            mode = %self.fetch_mode,
            force = self.force_rebuild,
            image_backend = ?self.image_backend,
            min_cover_bytes = self.min_cover_bytes,
            "Build settings"
        );
        debug!(settings = ?self, "Resolved settings");
    }
}

/// Fetch mode: CLI → `BOOKSHELF_FETCH_MODE` → TOML → `off`
fn resolve_fetch_mode(cli_mode: Option<FetchMode>, toml_config: &TomlConfig) -> BuildResult<FetchMode> {
    if let Some(mode) = cli_mode {
        return Ok(mode);
    }

    if let Ok(value) = std::env::var(FETCH_MODE_ENV_VAR) {
        if !value.trim().is_empty() {
            return value
                .parse()
                .map_err(|e| BuildError::Config(format!("{}: {}", FETCH_MODE_ENV_VAR, e)));
        }
    }

    match &toml_config.fetch.mode {
        Some(value) => value
            .parse()
            .map_err(|e| BuildError::Config(format!("fetch.mode: {}", e))),
        None => Ok(FetchMode::default()),
    }
}
