//! Classification of a single simulated response

use crate::crawler::extract_body;
use crate::server::SimulatedResponse;

/// What one response means for the crawl
///
/// | Outcome | Condition |
/// |---------|-----------|
/// | `NotFound` | status 404 |
/// | `Redirect` | status 301 or 302 |
/// | `Asset` | any other status, content type not `text/html` (or missing) |
/// | `Page` | any other status, HTML with a `<body>` |
/// | `NoBody` | any other status, HTML without a `<body>` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome<'r> {
    NotFound,

    Redirect {
        status_code: u16,
        /// Raw `Location` header, if the response carried one
        location: Option<&'r str>,
    },

    /// Non-HTML content; nothing to parse
    Asset,

    /// HTML page; `body` is the content between `<body>` and `</body>`
    Page { body: &'r str },

    NoBody { status_code: u16 },
}

impl<'r> ScanOutcome<'r> {
    pub fn classify(response: &'r SimulatedResponse) -> Self {
        match response.status {
            404 => Self::NotFound,
            301 | 302 => Self::Redirect {
                status_code: response.status,
                location: response.header("Location"),
            },
            _ => {
                let is_html = response
                    .header("Content-Type")
                    .is_some_and(|content_type| content_type.starts_with("text/html"));

                if !is_html {
                    return Self::Asset;
                }

                match extract_body(&response.body) {
                    Some(body) => Self::Page { body },
                    None => Self::NoBody {
                        status_code: response.status,
                    },
                }
            }
        }
    }
}
