//! HTML scanning for the crawler
//!
//! This is deliberately a best-effort, regex-based scan rather than a DOM
//! parse. It extracts:
//! - the content of the `<body>` element
//! - the `href` of every `<a>` and `<area>` element, in document order

use crate::SweepError;
use regex::{CaptureMatches, Regex};
use std::sync::LazyLock;
use url::Url;

/// Synthetic origin used to resolve relative links
///
/// Any link that resolves onto this host is same-origin and gets crawled.
pub const INTERNAL_HOST: &str = "internal";

// matches <body>...</body>
static HTML_BODY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<body(?:\s+[^>]+)?>(.*)</body>").expect("body pattern is valid")
});

// matches <a ...>...> or <area ...>...>
static HTML_HREF_ELEMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(a|area)\s.+?>.+?>").expect("element pattern is valid")
});

// matches href="..." / href='...' (backslash escape aware) or a bare href=...
static HTML_HREF_ATTRIBUTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href=("(?:\\["\\]|[^"\\]+)*"|'(?:\\['\\]|[^'\\]+)*'|[^\s>]+)"#)
        .expect("attribute pattern is valid")
});

/// Returns the content between `<body ...>` and the last `</body>`
///
/// # Example
///
/// ```
/// use link_sweep::crawler::extract_body;
///
/// let html = r#"<html><body class="docs"><p>Hi</p></body></html>"#;
/// assert_eq!(extract_body(html), Some("<p>Hi</p>"));
/// assert_eq!(extract_body("<html></html>"), None);
/// ```
pub fn extract_body(html: &str) -> Option<&str> {
    HTML_BODY_REGEX
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str())
}

/// A hyperlink found by [`detect_urls`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedUrl {
    /// The href, resolved against `http://internal{page_url}`
    pub url: Url,

    /// Lower-cased name of the element carrying the href (`a` or `area`)
    pub tag: String,
}

impl DetectedUrl {
    /// Returns true if the link points back into the crawled site
    pub fn is_internal(&self) -> bool {
        self.url.host_str() == Some(INTERNAL_HOST)
    }
}

/// Lazy iterator over the hyperlinks of an HTML fragment
///
/// Created by [`detect_urls`]. Elements are matched one at a time, so a
/// caller that awaits work between items never scans ahead.
pub struct DetectedUrls<'h> {
    elements: CaptureMatches<'static, 'h>,
    base: Url,
}

impl Iterator for DetectedUrls<'_> {
    type Item = DetectedUrl;

    fn next(&mut self) -> Option<Self::Item> {
        for element in self.elements.by_ref() {
            let (Some(markup), Some(tag)) = (element.get(0), element.get(1)) else {
                continue;
            };

            let Some(raw) = HTML_HREF_ATTRIBUTE_REGEX
                .captures(markup.as_str())
                .and_then(|captures| captures.get(1))
            else {
                continue;
            };

            let Some(href) = decode_attribute(raw.as_str()) else {
                continue;
            };

            match self.base.join(&href) {
                Ok(url) => {
                    return Some(DetectedUrl {
                        url,
                        tag: tag.as_str().to_ascii_lowercase(),
                    })
                }
                Err(e) => {
                    tracing::debug!("Failed to resolve href {:?}: {}", href, e);
                }
            }
        }

        None
    }
}

/// Detects the hyperlinks of `<a>` and `<area>` elements in `html`
///
/// # Arguments
///
/// * `html` - The HTML to search
/// * `page_url` - Path of the page containing the HTML, used to resolve
///   relative hrefs
///
/// # Returns
///
/// * `Ok(DetectedUrls)` - Iterator yielding each link in document order
/// * `Err(SweepError)` - `page_url` cannot form a base URL
///
/// Hrefs that cannot be decoded or resolved are skipped (and logged at debug
/// level); they never fail the scan.
///
/// # Example
///
/// ```
/// use link_sweep::crawler::detect_urls;
///
/// let html = r#"<a href="/a">x</a><area href='b'>y</area>"#;
/// let links: Vec<_> = detect_urls(html, "/docs/").unwrap().collect();
///
/// assert_eq!(links[0].url.path(), "/a");
/// assert_eq!(links[1].url.path(), "/docs/b");
/// assert_eq!(links[1].tag, "area");
/// ```
pub fn detect_urls<'h>(html: &'h str, page_url: &str) -> Result<DetectedUrls<'h>, SweepError> {
    let base = Url::parse(&format!("http://{}{}", INTERNAL_HOST, page_url))?;

    Ok(DetectedUrls {
        elements: HTML_HREF_ELEMENT_REGEX.captures_iter(html),
        base,
    })
}

/// Unquotes a raw attribute value
///
/// Double-quoted values are decoded as JSON strings once raw control
/// characters are escaped, so `\"` and `\\` sequences work. Single-quoted
/// values just lose their quotes. Returns None if decoding fails.
fn decode_attribute(raw: &str) -> Option<String> {
    if raw.starts_with('"') {
        let escaped = raw
            .replace('\t', "\\t")
            .replace('\r', "\\r")
            .replace('\n', "\\n")
            .replace('\u{c}', "\\f");

        return match serde_json::from_str::<String>(&escaped) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Failed to parse attribute value {}: {}", raw, e);
                None
            }
        };
    }

    if raw.starts_with('\'') {
        let mut chars = raw.chars();
        chars.next();
        chars.next_back();
        return Some(chars.as_str().to_string());
    }

    Some(raw.to_string())
}
