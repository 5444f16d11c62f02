//! Link-Sweep: a link-integrity crawler for built static sites
//!
//! This crate walks a site through an in-process request simulator, following
//! every same-origin `<a>`/`<area>` link from `/`, and reports dead links,
//! broken redirects and malformed pages.

pub mod config;
pub mod crawler;
pub mod output;
pub mod server;
pub mod state;

use thiserror::Error;

/// Main error type for Link-Sweep operations
///
/// Classified link failures are never errors of this type; they are recorded
/// as [`output::CrawlError`] entries. These variants are infrastructure faults
/// that abort the crawl.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No handler responded to {path}")]
    HandlersExhausted { path: String },

    #[error("Redirect ({status}) from {path} has no Location header")]
    MissingLocation { path: String, status: u16 },

    #[error("Handler failed for {path}: {message}")]
    Handler { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse hosting config: {0}")]
    Hosting(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid redirect: {0}")]
    InvalidRedirect(String),
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{detect_urls, CrawlOptions, Crawler};
pub use output::{CrawlError, CrawlResult};
pub use server::{Handler, HandlerChain, Simulate, SimulatedRequest, SimulatedResponse};
pub use state::{ErrorKind, ScanOutcome, ScannedUrl};
