//! Output module for crawl results and reports
//!
//! This module handles:
//! - Accumulating scan counts, the URL cache, and errors (`CrawlResult`)
//! - Serializing the JSON report consumed by CI
//! - Rendering the console summary and per-error lines

mod result;
pub mod stats;

pub use result::{CrawlError, CrawlReport, CrawlResult};
pub use stats::{error_categories, format_number, write_error_line, write_summary, ErrorCategory};
