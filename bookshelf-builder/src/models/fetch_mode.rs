//! Cover fetch modes

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which cover sources a run may use
///
/// Manual covers are always applied. `Off` and `ManualOnly` never touch the network;
/// they differ only in intent (rebuild the catalog vs. apply manual covers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FetchMode {
    /// No network; rebuild the catalog from covers already on disk
    #[default]
    Off,
    /// Open Library cover-by-ISBN service
    OpenLibrary,
    /// Goodreads page scrape (throttled)
    Goodreads,
    /// Apply manual covers only
    ManualOnly,
}

impl FetchMode {
    /// Whether this mode contacts a remote provider
    pub fn is_network(self) -> bool {
        matches!(self, FetchMode::OpenLibrary | FetchMode::Goodreads)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FetchMode::Off => "off",
            FetchMode::OpenLibrary => "open-library",
            FetchMode::Goodreads => "goodreads",
            FetchMode::ManualOnly => "manual-only",
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <FetchMode as ValueEnum>::from_str(s.trim(), true)
            .map_err(|_| format!("unknown fetch mode '{}' (expected off, open-library, goodreads or manual-only)", s))
    }
}
