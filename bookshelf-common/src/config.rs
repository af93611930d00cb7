//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (current working directory)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the library root folder
pub const ROOT_ENV_VAR: &str = "BOOKSHELF_ROOT";

/// Config file name looked up inside the root folder
pub const CONFIG_FILE_NAME: &str = "bookshelf.toml";

/// Tracing level when neither RUST_LOG nor `[logging] level` is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Compiled defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
}

impl CompiledDefaults {
    pub fn new() -> Self {
        Self {
            root_folder: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self::new()
    }
}

/// Logging section of the TOML config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Cover fetching section of the TOML config
///
/// Every field is optional so callers can tell "unset" from an explicit value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Fetch mode name (off, open-library, goodreads, manual-only)
    pub mode: Option<String>,
    /// Redownload covers even when a cached file exists
    pub force_rebuild: Option<bool>,
    /// Downloads at or below this size are treated as "no cover"
    pub min_cover_bytes: Option<usize>,
    /// Lower bound of the randomized delay before each page scrape
    pub throttle_min_ms: Option<u64>,
    /// Upper bound of the randomized delay before each page scrape
    pub throttle_max_ms: Option<u64>,
}

/// Palette extraction section of the TOML config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Image backend name (auto, magick, native, none)
    pub backend: Option<String>,
}

/// TOML configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub fetch: FetchConfig,
    pub palette: PaletteConfig,
}

/// Parse TOML config text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Err(Error::NotFound(format!("Config file not found: {}", path.display())));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    parse_toml_config(&content)
}

/// Per-user config file path (`~/.config/bookshelf/config.toml` on Linux)
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bookshelf").join("config.toml"))
}

/// Load configuration with graceful degradation
///
/// An explicit path must exist. Otherwise `<root_hint>/bookshelf.toml` and then the
/// per-user config file are tried; when neither exists the defaults are returned.
pub fn load_config(explicit: Option<&Path>, root_hint: &Path) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        debug!("Loading config from {}", path.display());
        return load_toml_config(path);
    }

    let candidates = std::iter::once(root_hint.join(CONFIG_FILE_NAME)).chain(user_config_path());
    for candidate in candidates {
        if candidate.exists() {
            debug!("Loading config from {}", candidate.display());
            return load_toml_config(&candidate);
        }
    }

    debug!("No config file found, using defaults");
    Ok(TomlConfig::default())
}

/// Resolve the library root folder
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    // Priority 4: Compiled default
    CompiledDefaults::new().root_folder
}
