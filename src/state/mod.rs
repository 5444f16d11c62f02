//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `ScannedUrl`: the cached verdict for a path (`OK` or a recorded error)
//! - `ErrorKind`: the classified failure categories and their summaries
//! - `ScanOutcome`: what a single simulated response means for the crawl

mod outcome;
mod scan_state;

// Re-export main types
pub use outcome::ScanOutcome;
pub use scan_state::{ErrorKind, ScannedUrl};
