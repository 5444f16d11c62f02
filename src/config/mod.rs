//! Configuration module for Link-Sweep
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and importing the `hosting` section of a firebase.json file.
//!
//! # Example
//!
//! ```no_run
//! use link_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("link-sweep.toml")).unwrap();
//! println!("Redirect rules: {}", config.redirects.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HostingConfig, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{
    apply_hosting_config, compute_config_hash, load_config, load_config_with_hash,
    load_hosting_config, HOSTING_CONFIG_FILE,
};
pub use validation::validate;
