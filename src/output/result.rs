//! Crawl result aggregate and error records

use crate::output::stats;
use crate::state::{ErrorKind, ScannedUrl};
use crate::SweepError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant};
use termcolor::{ColorChoice, StandardStream, WriteColor};

/// A classified link failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlError {
    /// The failing path, as it was linked
    pub path: String,

    /// Element that referenced the path (`a`, `area`, or `root`)
    pub tag: String,

    /// Status observed for the path (or for its redirect target)
    pub status_code: u16,

    /// Human-readable classification, e.g. `Not Found`
    pub summary: String,

    /// Page that linked to the path; None for the start page
    pub parent: Option<String>,
}

impl CrawlError {
    pub fn new(
        kind: ErrorKind,
        path: impl Into<String>,
        tag: impl Into<String>,
        status_code: u16,
        parent: Option<&str>,
    ) -> Self {
        Self {
            path: path.into(),
            tag: tag.into(),
            status_code,
            summary: kind.summary().to_string(),
            parent: parent.map(str::to_string),
        }
    }

    /// Grouping key used by the summary, e.g. `404 Not Found`
    pub fn category(&self) -> String {
        format!("{} {}", self.status_code, self.summary)
    }
}

/// Accumulated state and outcome of one crawl
///
/// Created once per [`Crawler::run`](crate::Crawler::run), mutated throughout
/// the traversal, then handed back as the final report.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Cache key -> verdict; doubles as the dedup cache
    scanned_urls: BTreeMap<String, ScannedUrl>,

    /// Visits that were not short-circuited by duplicate suppression
    scan_count: u64,

    /// Every recorded error, in discovery order
    errors: Vec<CrawlError>,

    started_at: DateTime<Utc>,
    start_time: Instant,
}

/// Serializable snapshot of a [`CrawlResult`]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport<'a> {
    pub scan_duration: String,
    pub started_at: DateTime<Utc>,
    pub scan_count: u64,
    pub error_count: usize,
    pub scanned_urls: &'a BTreeMap<String, ScannedUrl>,
    pub errors: &'a [CrawlError],
}

impl Default for CrawlResult {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlResult {
    pub fn new() -> Self {
        Self {
            scanned_urls: BTreeMap::new(),
            scan_count: 0,
            errors: Vec::new(),
            started_at: Utc::now(),
            start_time: Instant::now(),
        }
    }

    pub fn scanned_urls(&self) -> &BTreeMap<String, ScannedUrl> {
        &self.scanned_urls
    }

    pub fn cached(&self, cache_key: &str) -> Option<&ScannedUrl> {
        self.scanned_urls.get(cache_key)
    }

    pub fn scan_count(&self) -> u64 {
        self.scan_count
    }

    pub fn errors(&self) -> &[CrawlError] {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn increment_scan_count(&mut self) {
        self.scan_count += 1;
    }

    /// Marks a cache key as successfully scanned
    pub fn mark_ok(&mut self, cache_key: &str) {
        self.scanned_urls.insert(cache_key.to_string(), ScannedUrl::Ok);
    }

    /// Appends an error and caches it under `cache_key`
    pub fn record_error(&mut self, cache_key: &str, error: CrawlError) {
        self.scanned_urls.insert(cache_key.to_string(), ScannedUrl::Failed(error.clone()));
        self.errors.push(error);
    }

    pub fn scan_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Elapsed time in seconds with millisecond precision, e.g. `1.25s`
    pub fn format_scan_duration(&self) -> String {
        format!("{}s", self.scan_duration().as_millis() as f64 / 1000.0)
    }

    pub fn report(&self) -> CrawlReport<'_> {
        CrawlReport {
            scan_duration: self.format_scan_duration(),
            started_at: self.started_at,
            scan_count: self.scan_count,
            error_count: self.error_count(),
            scanned_urls: &self.scanned_urls,
            errors: &self.errors,
        }
    }

    /// Serializes the report as JSON, optionally pretty-printed
    pub fn to_json(&self, pretty: bool) -> Result<String, SweepError> {
        let report = self.report();
        let json = if pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        Ok(json)
    }

    /// Writes the JSON report to `path`
    pub fn write_json(&self, path: &Path, pretty: bool) -> Result<(), SweepError> {
        std::fs::write(path, self.to_json(pretty)?)?;
        Ok(())
    }

    /// Writes the human-readable summary to `out`
    pub fn write_summary<W: WriteColor>(&self, out: &mut W) -> std::io::Result<()> {
        stats::write_summary(self, out)
    }

    /// Prints the human-readable summary to stdout
    pub fn summary_to_console(&self) -> std::io::Result<()> {
        let mut stdout = StandardStream::stdout(ColorChoice::Auto);
        self.write_summary(&mut stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn not_found(path: &str, parent: &str) -> CrawlError {
        CrawlError::new(ErrorKind::NotFound, path, "a", 404, Some(parent))
    }

    #[test]
    fn test_new_result_is_empty() {
        let result = CrawlResult::new();
        assert_eq!(result.scan_count(), 0);
        assert_eq!(result.error_count(), 0);
        assert!(result.scanned_urls().is_empty());
    }

    #[test]
    fn test_record_error_updates_cache_and_list() {
        let mut result = CrawlResult::new();
        result.record_error("/missing/", not_found("/missing", "/"));

        assert_eq!(result.error_count(), 1);
        assert!(matches!(
            result.cached("/missing/"),
            Some(ScannedUrl::Failed(e)) if e.path == "/missing"
        ));
    }

    #[test]
    fn test_errors_keep_discovery_order() {
        let mut result = CrawlResult::new();
        result.record_error("/b/", not_found("/b", "/"));
        result.record_error("/a/", not_found("/a", "/"));

        let paths: Vec<_> = result.errors().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/b", "/a"]);
    }

    #[test]
    fn test_error_category() {
        let error = not_found("/x", "/");
        assert_eq!(error.category(), "404 Not Found");
    }

    #[test]
    fn test_format_scan_duration() {
        let result = CrawlResult::new();
        let formatted = result.format_scan_duration();
        assert!(formatted.ends_with('s'));
        assert!(formatted.trim_end_matches('s').parse::<f64>().is_ok());
    }

    #[test]
    fn test_to_json_shape() {
        let mut result = CrawlResult::new();
        result.increment_scan_count();
        result.increment_scan_count();
        result.mark_ok("/");
        result.record_error("/missing/", not_found("/missing", "/"));

        let json = result.to_json(true).unwrap();
        assert!(json.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["scanCount"], 2);
        assert_eq!(value["errorCount"], 1);
        assert_eq!(value["scannedUrls"]["/"], "OK");
        assert_eq!(value["scannedUrls"]["/missing/"]["statusCode"], 404);
        assert_eq!(value["errors"][0]["path"], "/missing");
        assert_eq!(value["errors"][0]["summary"], "Not Found");
        assert_eq!(value["errors"][0]["parent"], "/");
        assert!(value["scanDuration"].as_str().unwrap().ends_with('s'));
        assert!(value["startedAt"].is_string());
    }

    #[test]
    fn test_to_json_compact() {
        let result = CrawlResult::new();
        let json = result.to_json(false).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_write_json() {
        let mut result = CrawlResult::new();
        result.record_error("/x/", not_found("/x", "/"));

        let file = NamedTempFile::new().unwrap();
        result.write_json(file.path(), false).unwrap();

        let written = std::fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        let errors: Vec<CrawlError> = serde_json::from_value(value["errors"].clone()).unwrap();
        assert_eq!(errors, result.errors());
    }
}
