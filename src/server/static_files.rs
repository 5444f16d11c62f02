//! Serves a built site directory the way a static host does
//!
//! Resolution rules, in order:
//! - `/dir/` serves `dir/index.html`
//! - with clean URLs, `/page.html` redirects (301) to `/page`
//! - `/file.ext` serves the file with a content type from its extension
//! - `/dir` redirects (301) to `/dir/` when `dir/index.html` exists
//! - with clean URLs, `/page` serves `page.html`
//!
//! Anything else, including paths with `.`/`..` or empty segments, is passed
//! to the next handler.

use super::{Handled, Handler, SimulatedRequest, SimulatedResponse};
use crate::SweepError;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    clean_urls: bool,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            clean_urls: false,
        }
    }

    /// Enables extensionless `.html` resolution
    pub fn clean_urls(mut self, enabled: bool) -> Self {
        self.clean_urls = enabled;
        self
    }

    async fn lookup(&self, path: &str) -> Result<Option<SimulatedResponse>, SweepError> {
        let Some(relative) = relative_path(path) else {
            return Ok(None);
        };

        if path.ends_with('/') {
            return serve_file(&self.root.join(&relative).join("index.html")).await;
        }

        let target = self.root.join(&relative);

        if self.clean_urls {
            if let Some(stripped) = path.strip_suffix(".html") {
                if is_file(&target).await {
                    let location = match stripped.strip_suffix("/index") {
                        Some(dir) => format!("{}/", dir),
                        None => stripped.to_string(),
                    };
                    return Ok(Some(SimulatedResponse::redirect(301, location)));
                }
            }
        }

        if is_file(&target).await {
            return serve_file(&target).await;
        }

        if is_file(&target.join("index.html")).await {
            return Ok(Some(SimulatedResponse::redirect(301, format!("{}/", path))));
        }

        if self.clean_urls {
            return serve_file(&self.root.join(format!("{}.html", relative))).await;
        }

        Ok(None)
    }
}

impl Handler for StaticFiles {
    fn handle<'a>(
        &'a self,
        request: &'a SimulatedRequest,
    ) -> BoxFuture<'a, Result<Handled, SweepError>> {
        Box::pin(async move {
            if request.method != "GET" {
                return Ok(Handled::Next);
            }

            Ok(match self.lookup(&request.path).await? {
                Some(response) => Handled::Respond(response),
                None => Handled::Next,
            })
        })
    }
}

/// Turns a percent-encoded URL path into a path relative to the site root
///
/// Returns None for paths that could escape the root, are not absolute, or
/// do not decode to UTF-8.
fn relative_path(path: &str) -> Option<String> {
    let rest = path.strip_prefix('/')?;
    let rest = rest.strip_suffix('/').unwrap_or(rest);

    if rest.is_empty() {
        return Some(String::new());
    }

    let mut segments = Vec::new();
    for segment in rest.split('/') {
        let decoded = urlencoding::decode(segment).ok()?;
        if decoded.is_empty()
            || decoded == "."
            || decoded == ".."
            || decoded.contains(['/', '\\'])
        {
            return None;
        }
        segments.push(decoded.into_owned());
    }

    Some(segments.join("/"))
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

async fn serve_file(path: &Path) -> Result<Option<SimulatedResponse>, SweepError> {
    if !is_file(path).await {
        return Ok(None);
    }

    let content_type = content_type_for(path);
    let mut response = SimulatedResponse::new(200).with_header("Content-Type", content_type);

    // Only text is ever inspected by the crawler
    if is_text(content_type) {
        let bytes = tokio::fs::read(path).await?;
        response.body = String::from_utf8_lossy(&bytes).into_owned();
    }

    Ok(Some(response))
}

fn is_text(content_type: &str) -> bool {
    content_type.starts_with("text/")
        || content_type.starts_with("application/json")
        || content_type.starts_with("application/javascript")
        || content_type.starts_with("application/xml")
        || content_type.starts_with("image/svg+xml")
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript; charset=utf-8",
        Some("json") | Some("webmanifest") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("pdf") => "application/pdf",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}
