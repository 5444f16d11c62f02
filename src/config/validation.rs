use crate::config::types::{Config, SiteConfig};
use crate::server::RedirectRule;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_redirects(&config.redirects)?;
    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.public.as_os_str().is_empty() {
        return Err(ConfigError::Validation("public cannot be empty".to_string()));
    }

    if let Some(hosting) = &config.hosting_config {
        if hosting.as_os_str().is_empty() {
            return Err(ConfigError::Validation("hosting-config cannot be empty".to_string()));
        }
    }

    Ok(())
}

/// Validates redirect rules
fn validate_redirects(rules: &[RedirectRule]) -> Result<(), ConfigError> {
    for rule in rules {
        if !rule.source.starts_with('/') {
            return Err(ConfigError::InvalidRedirect(format!(
                "source must start with '/', got '{}'",
                rule.source
            )));
        }

        if rule.destination.is_empty() {
            return Err(ConfigError::InvalidRedirect(format!(
                "destination for '{}' cannot be empty",
                rule.source
            )));
        }

        // The crawler only follows 301 and 302
        if rule.status != 301 && rule.status != 302 {
            return Err(ConfigError::InvalidRedirect(format!(
                "type for '{}' must be 301 or 302, got {}",
                rule.source, rule.status
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_public() {
        let config = Config {
            site: SiteConfig {
                public: PathBuf::new(),
                ..SiteConfig::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_relative_source() {
        let rules = vec![RedirectRule::new("old", "/new", 301)];
        assert!(matches!(
            validate_redirects(&rules),
            Err(ConfigError::InvalidRedirect(_))
        ));
    }

    #[test]
    fn test_empty_destination() {
        let rules = vec![RedirectRule::new("/old", "", 301)];
        assert!(validate_redirects(&rules).is_err());
    }

    #[test]
    fn test_unsupported_status() {
        let rules = vec![RedirectRule::new("/old", "/new", 307)];
        let err = validate_redirects(&rules).unwrap_err();
        assert!(err.to_string().contains("307"));
    }

    #[test]
    fn test_external_destination_allowed() {
        let rules = vec![
            RedirectRule::new("/gh", "https://github.com/example", 302),
            RedirectRule::new("/old", "/new/", 301),
        ];
        assert!(validate_redirects(&rules).is_ok());
    }
}
