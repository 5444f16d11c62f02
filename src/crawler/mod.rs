//! Crawler module for walking a simulated site
//!
//! This module contains the core crawling logic, including:
//! - The depth-first, deduplicating traversal (`Crawler`)
//! - `<body>` extraction and hyperlink detection (`parser`)

mod coordinator;
mod parser;

pub use coordinator::{print_error_line, CrawlOptions, Crawler, ErrorOutput};
pub use parser::{detect_urls, extract_body, DetectedUrl, DetectedUrls, INTERNAL_HOST};
