use crate::crawler::CrawlOptions;
use crate::server::RedirectRule;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure for Link-Sweep
///
/// Every section is optional; an empty file crawls `./dist` with defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub site: SiteConfig,

    /// `[[redirect]]` tables
    #[serde(default, rename = "redirect")]
    pub redirects: Vec<RedirectRule>,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Treat `/foo` and `/foo/` as the same page
    pub normalize_trailing_slash: bool,

    /// Visit each page once, however many pages link to it
    pub disable_duplicate_urls: bool,

    /// Pick up `./firebase.json` when no hosting config is named
    pub detect_hosting_config: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            normalize_trailing_slash: true,
            disable_duplicate_urls: true,
            detect_hosting_config: true,
        }
    }
}

impl CrawlerConfig {
    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            normalize_trailing_slash: self.normalize_trailing_slash,
            disable_duplicate_urls: self.disable_duplicate_urls,
        }
    }
}

/// The built site being crawled
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Directory holding the built site
    pub public: PathBuf,

    /// Serve `/page` from `page.html`
    pub clean_urls: bool,

    /// Path to a firebase.json whose `hosting` section should be applied
    pub hosting_config: Option<PathBuf>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            public: PathBuf::from("dist"),
            clean_urls: false,
            hosting_config: None,
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Where to write the JSON report, if anywhere
    pub json_path: Option<PathBuf>,

    /// Pretty-print the JSON report
    pub pretty: bool,
}

/// The `hosting` section of a firebase.json file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostingConfig {
    pub public: Option<String>,

    pub clean_urls: Option<bool>,

    #[serde(default)]
    pub redirects: Vec<RedirectRule>,
}

impl Config {
    /// Applies a hosting section on top of this configuration
    ///
    /// `public` is resolved against `base_dir` (the directory holding the
    /// hosting file). Hosting redirects take precedence over `[[redirect]]`
    /// entries.
    pub fn merge_hosting(&mut self, hosting: HostingConfig, base_dir: &Path) {
        if let Some(public) = hosting.public {
            self.site.public = base_dir.join(public);
        }

        if let Some(clean_urls) = hosting.clean_urls {
            self.site.clean_urls = clean_urls;
        }

        let mut redirects = hosting.redirects;
        redirects.append(&mut self.redirects);
        self.redirects = redirects;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.crawler.normalize_trailing_slash);
        assert!(config.crawler.disable_duplicate_urls);
        assert!(config.crawler.detect_hosting_config);
        assert_eq!(config.site.public, PathBuf::from("dist"));
        assert!(config.redirects.is_empty());
        assert_eq!(config.output.json_path, None);
    }

    #[test]
    fn test_crawl_options() {
        let crawler = CrawlerConfig {
            disable_duplicate_urls: false,
            ..CrawlerConfig::default()
        };
        let options = crawler.crawl_options();
        assert!(options.normalize_trailing_slash);
        assert!(!options.disable_duplicate_urls);
    }

    #[test]
    fn test_merge_hosting() {
        let mut config = Config {
            redirects: vec![RedirectRule::new("/local", "/x", 301)],
            ..Config::default()
        };

        config.merge_hosting(
            HostingConfig {
                public: Some("public".to_string()),
                clean_urls: Some(true),
                redirects: vec![RedirectRule::new("/hosted", "/y", 302)],
            },
            Path::new("/srv/site"),
        );

        assert_eq!(config.site.public, PathBuf::from("/srv/site/public"));
        assert!(config.site.clean_urls);
        let sources: Vec<_> = config.redirects.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["/hosted", "/local"]);
    }

    #[test]
    fn test_merge_empty_hosting_keeps_site() {
        let mut config = Config::default();
        config.merge_hosting(HostingConfig::default(), Path::new("/srv"));
        assert_eq!(config.site, SiteConfig::default());
    }
}
