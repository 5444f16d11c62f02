//! Cache entries and failure categories for scanned paths

use crate::output::CrawlError;
use serde::{Serialize, Serializer};
use std::fmt;

/// The verdict stored for a cache key once a path has been scanned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannedUrl {
    /// The page was fetched and its links were followed
    Ok,

    /// The path failed; the stored error is replayed on later visits
    Failed(CrawlError),
}

impl ScannedUrl {
    /// Status code to report when this entry is replayed
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Failed(error) => error.status_code,
        }
    }
}

// Serialized as the "OK" sentinel or the full error object
impl Serialize for ScannedUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ok => serializer.serialize_str("OK"),
            Self::Failed(error) => error.serialize(serializer),
        }
    }
}

/// Classified failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The path answered 404
    NotFound,

    /// The path redirected to a target that itself failed
    Redirected,

    /// The path served HTML without a `<body>` element
    NoBody,
}

impl ErrorKind {
    /// Human-readable summary stored on each error record
    pub fn summary(&self) -> &'static str {
        match self {
            Self::NotFound => "Not Found",
            Self::Redirected => "Redirected",
            Self::NoBody => "No <body>",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summaries() {
        assert_eq!(ErrorKind::NotFound.summary(), "Not Found");
        assert_eq!(ErrorKind::Redirected.to_string(), "Redirected");
        assert_eq!(ErrorKind::NoBody.to_string(), "No <body>");
    }

    #[test]
    fn test_status_code() {
        assert_eq!(ScannedUrl::Ok.status_code(), 200);

        let failed = ScannedUrl::Failed(CrawlError::new(
            ErrorKind::NotFound,
            "/missing",
            "a",
            404,
            Some("/"),
        ));
        assert_eq!(failed.status_code(), 404);
    }

    #[test]
    fn test_serialize_ok_sentinel() {
        let json = serde_json::to_string(&ScannedUrl::Ok).unwrap();
        assert_eq!(json, r#""OK""#);
    }

    #[test]
    fn test_serialize_failure() {
        let failed = ScannedUrl::Failed(CrawlError::new(
            ErrorKind::NoBody,
            "/broken",
            "a",
            200,
            None,
        ));
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["summary"], "No <body>");
        assert_eq!(value["statusCode"], 200);
        assert!(value["parent"].is_null());
    }
}
