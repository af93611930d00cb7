//! Build run statistics
//!
//! Counters are grouped by concern, each with a one-line rendering. The summary
//! printed at the end of a run is `BuildStatistics::display_lines`.

use crate::services::cover_resolver::{CoverResolution, CoverSource, RemoteOutcome};
use serde::{Deserialize, Serialize};

/// Where the catalog came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    /// Parsed from the spreadsheet
    Spreadsheet,
    /// Reloaded from the previous `books.json`
    Snapshot,
}

/// **LOADING** statistics
///
/// Display: "N books from spreadsheet (M rows)"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadingStats {
    pub source: Option<CatalogSource>,
    /// Non-empty rows read from the spreadsheet
    pub rows_read: usize,
    pub books: usize,
    /// Ids changed to keep them unique
    pub ids_renamed: usize,
}

impl LoadingStats {
    pub fn display_string(&self) -> String {
        match self.source {
            Some(CatalogSource::Spreadsheet) => {
                format!("{} books from spreadsheet ({} rows)", self.books, self.rows_read)
            }
            Some(CatalogSource::Snapshot) => format!("{} books from previous catalog", self.books),
            None => "no input loaded".to_string(),
        }
    }
}

/// **COVERS** statistics
///
/// Display: "X manual, Y cached, Z downloaded, W without cover"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverStats {
    pub manual: usize,
    pub cached: usize,
    pub downloaded: usize,
    pub missing: usize,
    /// Provider had nothing, or answered with an undersized image
    pub provider_misses: usize,
    pub download_failures: usize,
    /// Local copy, conversion or write failures
    pub asset_failures: usize,
    /// Provider that blocked the run, if any
    pub blocked_provider: Option<String>,
}

impl CoverStats {
    pub fn display_string(&self) -> String {
        format!(
            "{} manual, {} cached, {} downloaded, {} without cover",
            self.manual, self.cached, self.downloaded, self.missing
        )
    }

    /// Display: "X provider misses, Y download failures, Z asset failures"
    pub fn problems_string(&self) -> String {
        format!(
            "{} provider misses, {} download failures, {} asset failures",
            self.provider_misses, self.download_failures, self.asset_failures
        )
    }
}

/// **PALETTE** statistics
///
/// Display: "N colored, M unavailable"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaletteStats {
    pub extracted: usize,
    /// Book had a cover but sampling failed or no backend was available
    pub unavailable: usize,
}

impl PaletteStats {
    pub fn display_string(&self) -> String {
        format!("{} colored, {} unavailable", self.extracted, self.unavailable)
    }
}

/// All counters for one build run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildStatistics {
    pub loading: LoadingStats,
    pub covers: CoverStats,
    pub palette: PaletteStats,
}

impl BuildStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn books_processed(&self) -> usize {
        self.covers.manual + self.covers.cached + self.covers.downloaded + self.covers.missing
    }

    /// Count one book's cover resolution
    pub fn record_cover(&mut self, resolution: &CoverResolution) {
        match resolution.source {
            Some(CoverSource::Manual) => self.covers.manual += 1,
            Some(CoverSource::Cached) => self.covers.cached += 1,
            Some(CoverSource::Downloaded) => self.covers.downloaded += 1,
            None => self.covers.missing += 1,
        }

        match resolution.remote {
            RemoteOutcome::NotFound | RemoteOutcome::Undersized => self.covers.provider_misses += 1,
            RemoteOutcome::Failed if !resolution.asset_failure => self.covers.download_failures += 1,
            _ => {}
        }

        if resolution.asset_failure {
            self.covers.asset_failures += 1;
        }
    }

    pub fn record_blocked(&mut self, provider: &str) {
        self.covers.blocked_provider = Some(provider.to_string());
    }

    pub fn record_palette(&mut self, extracted: bool) {
        if extracted {
            self.palette.extracted += 1;
        } else {
            self.palette.unavailable += 1;
        }
    }

    /// Summary lines for the end of a run
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Books: {}", self.loading.books),
            format!("Source: {}", self.loading.display_string()),
            format!("Covers: {}", self.covers.display_string()),
            format!("Problems: {}", self.covers.problems_string()),
            format!("Colors: {}", self.palette.display_string()),
        ];
        if self.loading.ids_renamed > 0 {
            lines.push(format!("Duplicate ids renamed: {}", self.loading.ids_renamed));
        }
        if let Some(provider) = &self.covers.blocked_provider {
            lines.push(format!("Blocked by {}; remaining books were processed offline", provider));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolution(source: Option<CoverSource>, remote: RemoteOutcome, asset_failure: bool) -> CoverResolution {
        CoverResolution {
            path: None,
            source,
            remote,
            asset_failure,
        }
    }

    #[test]
    fn test_loading_stats_display() {
        let stats = LoadingStats {
            source: Some(CatalogSource::Spreadsheet),
            rows_read: 12,
            books: 10,
            ids_renamed: 0,
        };
        assert_eq!(stats.display_string(), "10 books from spreadsheet (12 rows)");

        let snapshot = LoadingStats {
            source: Some(CatalogSource::Snapshot),
            books: 3,
            ..Default::default()
        };
        assert_eq!(snapshot.display_string(), "3 books from previous catalog");
    }

    #[test]
    fn test_record_cover_counts_sources_and_problems() {
        let mut stats = BuildStatistics::new();
        stats.record_cover(&resolution(Some(CoverSource::Manual), RemoteOutcome::NotAttempted, false));
        stats.record_cover(&resolution(Some(CoverSource::Downloaded), RemoteOutcome::Downloaded, false));
        stats.record_cover(&resolution(None, RemoteOutcome::NotFound, false));
        stats.record_cover(&resolution(None, RemoteOutcome::Undersized, false));
        stats.record_cover(&resolution(None, RemoteOutcome::Failed, false));
        stats.record_cover(&resolution(None, RemoteOutcome::Failed, true));

        assert_eq!(stats.covers.manual, 1);
        assert_eq!(stats.covers.downloaded, 1);
        assert_eq!(stats.covers.missing, 4);
        assert_eq!(stats.covers.provider_misses, 2);
        assert_eq!(stats.covers.download_failures, 1);
        assert_eq!(stats.covers.asset_failures, 1);
        assert_eq!(stats.books_processed(), 6);
    }

    #[test]
    fn test_display_lines_mention_block() {
        let mut stats = BuildStatistics::new();
        stats.record_palette(true);
        stats.record_palette(false);
        stats.record_blocked("Goodreads");

        let lines = stats.display_lines();
        assert!(lines.contains(&"Colors: 1 colored, 1 unavailable".to_string()));
        assert!(lines.last().unwrap().starts_with("Blocked by Goodreads"));
    }
}
