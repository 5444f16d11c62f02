use crate::config::types::{Config, HostingConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Name of the hosting file picked up from the working directory
pub const HOSTING_CONFIG_FILE: &str = "firebase.json";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use link_sweep::config::load_config;
///
/// let config = load_config(Path::new("link-sweep.toml")).unwrap();
/// println!("Crawling: {}", config.site.public.display());
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so CI output identifies which configuration ran.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HostingSection {
    Single(HostingConfig),
    // Multi-site projects; only the first site is crawled
    Multiple(Vec<HostingConfig>),
}

#[derive(Deserialize)]
struct HostingFile {
    hosting: Option<HostingSection>,
}

/// Reads the `hosting` section of a firebase.json file
///
/// A file without a `hosting` section yields an empty [`HostingConfig`].
pub fn load_hosting_config(path: &Path) -> Result<HostingConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file: HostingFile = serde_json::from_str(&content)?;

    Ok(match file.hosting {
        Some(HostingSection::Single(hosting)) => hosting,
        Some(HostingSection::Multiple(sites)) => sites.into_iter().next().unwrap_or_default(),
        None => HostingConfig::default(),
    })
}

/// Finds and merges the hosting config, if there is one
///
/// An explicit `site.hosting-config` always wins. Otherwise, when
/// `crawler.detect-hosting-config` is on, `firebase.json` in `working_dir`
/// is used if it exists. The merged configuration is re-validated.
///
/// # Returns
///
/// * `Ok(Some(path))` - The hosting file that was applied
/// * `Ok(None)` - No hosting file applies
/// * `Err(ConfigError)` - The hosting file could not be read or is invalid
pub fn apply_hosting_config(
    config: &mut Config,
    working_dir: &Path,
) -> Result<Option<PathBuf>, ConfigError> {
    let path = match &config.site.hosting_config {
        Some(path) => working_dir.join(path),
        None if config.crawler.detect_hosting_config => {
            let candidate = working_dir.join(HOSTING_CONFIG_FILE);
            if !candidate.is_file() {
                tracing::debug!("No {} found", HOSTING_CONFIG_FILE);
                return Ok(None);
            }
            candidate
        }
        None => return Ok(None),
    };

    let hosting = load_hosting_config(&path)?;
    let base_dir = path.parent().unwrap_or(working_dir).to_path_buf();
    config.merge_hosting(hosting, &base_dir);
    validate(config)?;

    Ok(Some(path))
}
