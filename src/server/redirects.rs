//! Configured redirect rules, as a static host would apply them

use super::{Handled, Handler, SimulatedRequest, SimulatedResponse};
use crate::SweepError;
use futures::future::BoxFuture;
use serde::Deserialize;

/// A single `source -> destination` redirect
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RedirectRule {
    /// Path to match, e.g. `/blog/old-post`
    pub source: String,

    /// Redirect target; may be a path or an absolute URL
    pub destination: String,

    /// HTTP status to answer with (301 or 302)
    #[serde(rename = "type", default = "default_redirect_status")]
    pub status: u16,
}

fn default_redirect_status() -> u16 {
    301
}

impl RedirectRule {
    pub fn new(source: impl Into<String>, destination: impl Into<String>, status: u16) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            status,
        }
    }

    /// Returns true if `path` matches the source, ignoring a trailing slash
    pub fn matches(&self, path: &str) -> bool {
        without_trailing_slash(&self.source) == without_trailing_slash(path)
    }
}

fn without_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Handler answering requests that match one of its rules
///
/// Rules are tried in order; the first match wins.
#[derive(Debug, Clone, Default)]
pub struct Redirects {
    rules: Vec<RedirectRule>,
}

impl Redirects {
    pub fn new(rules: Vec<RedirectRule>) -> Self {
        Self { rules }
    }
}

impl Handler for Redirects {
    fn handle<'a>(
        &'a self,
        request: &'a SimulatedRequest,
    ) -> BoxFuture<'a, Result<Handled, SweepError>> {
        let handled = match self.rules.iter().find(|rule| rule.matches(&request.path)) {
            Some(rule) => {
                tracing::trace!("Redirect {} -> {}", request.path, rule.destination);
                Handled::Respond(SimulatedResponse::redirect(
                    rule.status,
                    rule.destination.clone(),
                ))
            }
            None => Handled::Next,
        };

        Box::pin(futures::future::ready(Ok(handled)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_insensitive_match() {
        let rule = RedirectRule::new("/old/", "/new/", 301);
        assert!(rule.matches("/old"));
        assert!(rule.matches("/old/"));
        assert!(!rule.matches("/old/page"));
    }

    #[test]
    fn test_root_only_matches_root() {
        let rule = RedirectRule::new("/", "/en/", 302);
        assert!(rule.matches("/"));
        assert!(!rule.matches("/en/"));
    }

    #[tokio::test]
    async fn test_first_rule_wins() {
        let redirects = Redirects::new(vec![
            RedirectRule::new("/a", "/first", 301),
            RedirectRule::new("/a", "/second", 302),
        ]);

        let Handled::Respond(response) = redirects
            .handle(&SimulatedRequest::get("/a"))
            .await
            .unwrap()
        else {
            panic!("expected a redirect");
        };
        assert_eq!(response.status, 301);
        assert_eq!(response.header("Location"), Some("/first"));
    }

    #[tokio::test]
    async fn test_no_match_delegates() {
        let redirects = Redirects::new(vec![RedirectRule::new("/a", "/b", 301)]);
        let handled = redirects.handle(&SimulatedRequest::get("/c")).await.unwrap();
        assert!(matches!(handled, Handled::Next));
    }

    #[test]
    fn test_deserialize_default_status() {
        let rule: RedirectRule =
            serde_json::from_str(r#"{"source": "/a", "destination": "/b"}"#).unwrap();
        assert_eq!(rule.status, 301);

        let rule: RedirectRule =
            serde_json::from_str(r#"{"source": "/a", "destination": "/b", "type": 302}"#).unwrap();
        assert_eq!(rule.status, 302);
    }
}
