//! Crawler coordinator - the depth-first link walk
//!
//! The crawl is a depth-first traversal starting at `/`:
//! - every visited path is sent through the simulator once
//! - each response is classified (see [`ScanOutcome`])
//! - HTML pages are scanned for links, and same-origin links are visited
//!   before the next link on the same page is considered
//!
//! The walk runs on an explicit stack of frames rather than recursion, so
//! long chains of pages cannot exhaust the thread stack. All state lives in
//! the [`CrawlResult`]; there is no concurrency and nothing to lock.

use crate::crawler::parser::{detect_urls, DetectedUrl};
use crate::output::{write_error_line, CrawlError, CrawlResult};
use crate::server::{Handler, HandlerChain, Simulate, SimulatedRequest};
use crate::state::{ErrorKind, ScanOutcome, ScannedUrl};
use crate::SweepError;
use termcolor::{ColorChoice, StandardStream};

/// Hook invoked once for every newly recorded error
pub type ErrorOutput = Box<dyn Fn(&CrawlError) + Send + Sync>;

/// Crawl behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Cache `/foo` and `/foo/` under the same key
    pub normalize_trailing_slash: bool,

    /// Visit every cache key at most once; repeat visits report 200
    pub disable_duplicate_urls: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            normalize_trailing_slash: true,
            disable_duplicate_urls: true,
        }
    }
}

/// A path waiting to be visited
struct Visit {
    path: String,
    tag: String,
    parent: Option<String>,
    silently_fail: bool,
    /// Paths of the redirects being resolved on the way to this visit
    redirect_chain: Vec<String>,
}

/// Pending work on the traversal stack
enum Frame {
    Visit(Visit),

    /// Remaining same-origin links of a scanned page, in document order
    Links {
        page: String,
        links: std::vec::IntoIter<DetectedUrl>,
    },

    /// A redirect whose target is being resolved; settled by the status the
    /// target resolves to
    Redirect { visit: Visit, cache_key: String },
}

/// Link-integrity crawler over a simulated site
pub struct Crawler<S> {
    options: CrawlOptions,
    simulator: S,
    on_error_output: Option<ErrorOutput>,
}

impl Crawler<HandlerChain> {
    /// Creates a crawler over an ordered list of middleware handlers
    pub fn from_handlers(handlers: Vec<Box<dyn Handler>>) -> Self {
        Self::new(HandlerChain::new(handlers))
    }
}

impl<S: Simulate> Crawler<S> {
    /// Creates a crawler with default options and the default error output
    pub fn new(simulator: S) -> Self {
        Self::with_options(simulator, CrawlOptions::default())
    }

    pub fn with_options(simulator: S, options: CrawlOptions) -> Self {
        Self {
            options,
            simulator,
            on_error_output: Some(Box::new(print_error_line)),
        }
    }

    /// Replaces the error output hook
    pub fn on_error_output(mut self, hook: impl Fn(&CrawlError) + Send + Sync + 'static) -> Self {
        self.on_error_output = Some(Box::new(hook));
        self
    }

    /// Disables per-error output entirely
    pub fn without_error_output(mut self) -> Self {
        self.on_error_output = None;
        self
    }

    /// Runs a complete crawl starting at `/`
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - The crawl finished; classified failures are in
    ///   the result
    /// * `Err(SweepError)` - The simulator failed and the crawl was aborted
    pub async fn run(&self) -> Result<CrawlResult, SweepError> {
        let mut result = CrawlResult::new();

        tracing::info!("Starting crawl at /");
        self.scan_path(&mut result, "/", "root", None, false).await?;

        tracing::info!(
            "Crawl completed: {} URLs scanned, {} errors in {}",
            result.scan_count(),
            result.error_count(),
            result.format_scan_duration()
        );

        Ok(result)
    }

    /// Returns the cache key for `path`
    pub fn cache_key(&self, path: &str) -> String {
        if self.options.normalize_trailing_slash && !path.ends_with('/') {
            format!("{}/", path)
        } else {
            path.to_string()
        }
    }

    /// Loads a path, classifies it, and scans everything it links to
    ///
    /// # Arguments
    ///
    /// * `result` - The crawl state shared by the whole traversal
    /// * `path` - Path to visit
    /// * `tag` - Element that referenced the path (`root` for the start page)
    /// * `parent` - Path of the referring page, None for the start page
    /// * `silently_fail` - Suppress Not Found / Redirected errors for this
    ///   call; used while resolving redirect targets
    ///
    /// # Returns
    ///
    /// The status code the path resolved to. Cache hits short-circuited by
    /// duplicate suppression report 200.
    pub async fn scan_path(
        &self,
        result: &mut CrawlResult,
        path: &str,
        tag: &str,
        parent: Option<&str>,
        silently_fail: bool,
    ) -> Result<u16, SweepError> {
        let mut stack = vec![Frame::Visit(Visit {
            path: path.to_string(),
            tag: tag.to_string(),
            parent: parent.map(str::to_string),
            silently_fail,
            redirect_chain: Vec::new(),
        })];

        // Status of the most recently finished visit
        let mut status = 200;

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit(visit) => {
                    if let Some(resolved) = self.visit(result, visit, &mut stack).await? {
                        status = resolved;
                    }
                }

                Frame::Links { page, mut links } => match links.next() {
                    Some(link) => {
                        let visit = Visit {
                            path: link.url.path().to_string(),
                            tag: link.tag,
                            parent: Some(page.clone()),
                            silently_fail: false,
                            redirect_chain: Vec::new(),
                        };
                        stack.push(Frame::Links { page, links });
                        stack.push(Frame::Visit(visit));
                    }
                    None => status = 200,
                },

                Frame::Redirect { visit, cache_key } => {
                    if status != 200 && !visit.silently_fail {
                        self.handle_error(
                            result,
                            &cache_key,
                            CrawlError::new(
                                ErrorKind::Redirected,
                                visit.path,
                                visit.tag,
                                status,
                                visit.parent.as_deref(),
                            ),
                        );
                    }
                }
            }
        }

        Ok(status)
    }

    /// Performs one visit
    ///
    /// Returns the resolved status, or None when follow-up frames were
    /// pushed and the status is settled once they finish.
    async fn visit(
        &self,
        result: &mut CrawlResult,
        visit: Visit,
        stack: &mut Vec<Frame>,
    ) -> Result<Option<u16>, SweepError> {
        let cache_key = self.cache_key(&visit.path);

        if self.options.disable_duplicate_urls && result.cached(&cache_key).is_some() {
            tracing::trace!("Skipping already scanned {}", cache_key);
            return Ok(Some(200));
        }

        result.increment_scan_count();

        if let Some(cached) = result.cached(&cache_key).cloned() {
            if let ScannedUrl::Failed(error) = &cached {
                if !visit.silently_fail {
                    let replayed = CrawlError {
                        tag: visit.tag,
                        parent: visit.parent,
                        ..error.clone()
                    };
                    self.handle_error(result, &cache_key, replayed);
                }
            }

            return Ok(Some(cached.status_code()));
        }

        tracing::debug!("Simulating request for {}", visit.path);
        let response = self
            .simulator
            .simulate(SimulatedRequest::get(visit.path.as_str()))
            .await?;

        match ScanOutcome::classify(&response) {
            ScanOutcome::NotFound => {
                if !visit.silently_fail {
                    self.handle_error(
                        result,
                        &cache_key,
                        CrawlError::new(
                            ErrorKind::NotFound,
                            visit.path.as_str(),
                            visit.tag.as_str(),
                            response.status,
                            visit.parent.as_deref(),
                        ),
                    );
                }

                Ok(Some(response.status))
            }

            ScanOutcome::Redirect {
                status_code,
                location,
            } => {
                let location = location.ok_or_else(|| SweepError::MissingLocation {
                    path: visit.path.clone(),
                    status: status_code,
                })?;

                // External redirects are not followed
                if location.starts_with("http://") || location.starts_with("https://") {
                    return Ok(Some(200));
                }

                if visit.redirect_chain.contains(&visit.path) {
                    tracing::warn!("Redirect loop at {} -> {}", visit.path, location);
                    return Ok(Some(status_code));
                }

                let mut redirect_chain = visit.redirect_chain.clone();
                redirect_chain.push(visit.path.clone());

                let target = Visit {
                    path: location.to_string(),
                    tag: visit.tag.clone(),
                    parent: visit.parent.clone(),
                    silently_fail: true,
                    redirect_chain,
                };

                stack.push(Frame::Redirect { visit, cache_key });
                stack.push(Frame::Visit(target));

                Ok(None)
            }

            ScanOutcome::Asset => Ok(Some(200)),

            ScanOutcome::NoBody { status_code } => {
                self.handle_error(
                    result,
                    &cache_key,
                    CrawlError::new(
                        ErrorKind::NoBody,
                        visit.path.as_str(),
                        visit.tag.as_str(),
                        status_code,
                        visit.parent.as_deref(),
                    ),
                );

                Ok(Some(status_code))
            }

            ScanOutcome::Page { body } => {
                result.mark_ok(&cache_key);

                let links: Vec<DetectedUrl> = detect_urls(body, &visit.path)?
                    .filter(DetectedUrl::is_internal)
                    .collect();

                stack.push(Frame::Links {
                    page: visit.path,
                    links: links.into_iter(),
                });

                Ok(None)
            }
        }
    }

    /// Reports and records a newly classified failure
    fn handle_error(&self, result: &mut CrawlResult, cache_key: &str, error: CrawlError) {
        tracing::debug!(
            "{} {} {}[href=\"{}\"] @ {:?}",
            error.status_code,
            error.summary,
            error.tag,
            error.path,
            error.parent
        );

        if let Some(hook) = &self.on_error_output {
            hook(&error);
        }

        result.record_error(cache_key, error);
    }
}

/// Default error output: one coloured line per error on stderr
pub fn print_error_line(error: &CrawlError) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    if let Err(e) = write_error_line(&mut stderr, error) {
        tracing::warn!("Failed to write error output: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{MemorySite, NotFound};

    fn crawler(options: CrawlOptions) -> Crawler<HandlerChain> {
        let handlers: Vec<Box<dyn Handler>> = vec![
            Box::new(MemorySite::new().page("/", "<body></body>")),
            Box::new(NotFound),
        ];
        Crawler::with_options(HandlerChain::new(handlers), options).without_error_output()
    }

    #[test]
    fn test_cache_key_normalized() {
        let crawler = crawler(CrawlOptions::default());
        assert_eq!(crawler.cache_key("/foo"), "/foo/");
        assert_eq!(crawler.cache_key("/foo/"), "/foo/");
        assert_eq!(crawler.cache_key("/"), "/");
    }

    #[test]
    fn test_cache_key_verbatim() {
        let crawler = crawler(CrawlOptions {
            normalize_trailing_slash: false,
            ..CrawlOptions::default()
        });
        assert_eq!(crawler.cache_key("/foo"), "/foo");
        assert_eq!(crawler.cache_key("/foo/"), "/foo/");
    }

    #[test]
    fn test_default_options() {
        let options = CrawlOptions::default();
        assert!(options.normalize_trailing_slash);
        assert!(options.disable_duplicate_urls);
    }

    #[tokio::test]
    async fn test_run_empty_page() {
        let result = crawler(CrawlOptions::default()).run().await.unwrap();
        assert_eq!(result.scan_count(), 1);
        assert_eq!(result.error_count(), 0);
        assert_eq!(result.cached("/"), Some(&ScannedUrl::Ok));
    }
}
