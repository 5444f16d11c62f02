//! Console summary of a crawl
//!
//! This module groups recorded errors into categories and renders the
//! end-of-run summary and per-error lines with terminal colours.

use crate::output::{CrawlError, CrawlResult};
use std::io::{self, Write};
use termcolor::{Color, ColorSpec, WriteColor};

/// Errors sharing the same `"{status} {summary}"` key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCategory {
    /// Grouping key, e.g. `404 Not Found`
    pub key: String,

    /// Status code of the first error in the category
    pub status_code: u16,

    /// Number of errors in the category
    pub count: usize,
}

/// Groups errors by category, in order of first appearance
pub fn error_categories(errors: &[CrawlError]) -> Vec<ErrorCategory> {
    let mut categories: Vec<ErrorCategory> = Vec::new();

    for error in errors {
        let key = error.category();
        match categories.iter_mut().find(|category| category.key == key) {
            Some(category) => category.count += 1,
            None => categories.push(ErrorCategory {
                key,
                status_code: error.status_code,
                count: 1,
            }),
        }
    }

    categories
}

/// Formats a number with comma thousands separators (`1234567` -> `1,234,567`)
pub fn format_number(number: u64) -> String {
    let digits = number.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }

    formatted
}

fn status_color(status_code: u16) -> ColorSpec {
    let color = if status_code == 200 {
        Color::Green
    } else {
        Color::Red
    };

    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(true);
    spec
}

/// Writes the end-of-run summary
///
/// ```text
/// === Summary ===
/// Scanned 1,024 URLs in 3.2s
///
/// Error Summary
///   404 Not Found: 3
///
/// Totals
///   Errors: 3
///   Pass: 1,021
/// ```
pub fn write_summary<W: WriteColor>(result: &CrawlResult, out: &mut W) -> io::Result<()> {
    let error_count = result.error_count() as u64;

    writeln!(out)?;
    writeln!(out, "=== Summary ===")?;
    writeln!(
        out,
        "Scanned {} URLs in {}",
        format_number(result.scan_count()),
        result.format_scan_duration()
    )?;
    writeln!(out)?;

    writeln!(out, "Error Summary")?;
    for category in error_categories(result.errors()) {
        write!(out, "  ")?;
        out.set_color(&status_color(category.status_code))?;
        write!(out, "{}", category.key)?;
        out.reset()?;
        writeln!(out, ": {}", format_number(category.count as u64))?;
    }
    writeln!(out)?;

    writeln!(out, "Totals")?;
    writeln!(out, "  Errors: {}", format_number(error_count))?;
    writeln!(
        out,
        "  Pass: {}",
        format_number(result.scan_count().saturating_sub(error_count))
    )?;
    writeln!(out)?;

    Ok(())
}

/// Writes one error as `404 Not Found a[href="/missing"] @ /parent`
pub fn write_error_line<W: WriteColor>(out: &mut W, error: &CrawlError) -> io::Result<()> {
    out.set_color(&status_color(error.status_code))?;
    write!(out, "{} {}", error.status_code, error.summary)?;
    out.reset()?;

    write!(out, " {}[href=\"", error.tag)?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
    write!(out, "{}", error.path)?;
    out.reset()?;

    writeln!(out, "\"] @ {}", error.parent.as_deref().unwrap_or("(root)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ErrorKind;
    use termcolor::Buffer;

    fn error(kind: ErrorKind, path: &str, status_code: u16) -> CrawlError {
        CrawlError::new(kind, path, "a", status_code, Some("/"))
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Buffer) -> io::Result<()>,
    {
        let mut buffer = Buffer::no_color();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_error_categories_first_seen_order() {
        let errors = vec![
            error(ErrorKind::Redirected, "/old", 404),
            error(ErrorKind::NotFound, "/a", 404),
            error(ErrorKind::Redirected, "/older", 404),
            error(ErrorKind::NoBody, "/b", 200),
        ];

        let categories = error_categories(&errors);
        let keys: Vec<_> = categories.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["404 Redirected", "404 Not Found", "200 No <body>"]);
        assert_eq!(categories[0].count, 2);
        assert_eq!(categories[2].status_code, 200);
    }

    #[test]
    fn test_write_summary() {
        let mut result = CrawlResult::new();
        for _ in 0..5 {
            result.increment_scan_count();
        }
        result.record_error("/a/", error(ErrorKind::NotFound, "/a", 404));
        result.record_error("/b/", error(ErrorKind::NotFound, "/b", 404));

        let text = render(|out| write_summary(&result, out));
        assert!(text.contains("=== Summary ==="));
        assert!(text.contains("Scanned 5 URLs in "));
        assert!(text.contains("  404 Not Found: 2\n"));
        assert!(text.contains("  Errors: 2\n"));
        assert!(text.contains("  Pass: 3\n"));
    }

    #[test]
    fn test_pass_count_saturates() {
        let mut result = CrawlResult::new();
        result.record_error("/a/", error(ErrorKind::NoBody, "/a", 200));

        let text = render(|out| write_summary(&result, out));
        assert!(text.contains("  Pass: 0\n"));
    }

    #[test]
    fn test_write_error_line() {
        let text = render(|out| write_error_line(out, &error(ErrorKind::NotFound, "/gone", 404)));
        assert_eq!(text, "404 Not Found a[href=\"/gone\"] @ /\n");
    }

    #[test]
    fn test_write_error_line_root() {
        let root = CrawlError::new(ErrorKind::NoBody, "/", "root", 200, None);
        let text = render(|out| write_error_line(out, &root));
        assert_eq!(text, "200 No <body> root[href=\"/\"] @ (root)\n");
    }
}
