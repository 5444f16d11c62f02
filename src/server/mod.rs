//! Request-simulation layer the crawler talks to
//!
//! The crawler never performs network I/O. Every path it visits is handed to a
//! [`Simulate`] implementation, which answers with a [`SimulatedResponse`].
//! The usual simulator is a [`HandlerChain`]: an ordered list of middleware
//! [`Handler`]s, each of which may answer a request or pass it on.

mod chain;
mod memory;
mod redirects;
mod static_files;

pub use chain::{Handled, Handler, HandlerChain, NotFound};
pub use memory::MemorySite;
pub use redirects::{RedirectRule, Redirects};
pub use static_files::StaticFiles;

use crate::SweepError;
use futures::future::BoxFuture;
use std::future::Future;

/// A GET request issued by the crawler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedRequest {
    pub method: String,
    pub path: String,
}

impl SimulatedRequest {
    /// Creates a GET request for `path`
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            path: path.into(),
        }
    }
}

/// A fully buffered response produced by a simulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers in insertion order
    pub headers: Vec<(String, String)>,

    /// Accumulated body text
    pub body: String,
}

impl SimulatedResponse {
    /// Creates an empty response with the given status
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// A 200 `text/html` response
    pub fn html(body: impl Into<String>) -> Self {
        Self::new(200)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(body)
    }

    /// A redirect to `location`
    pub fn redirect(status: u16, location: impl Into<String>) -> Self {
        Self::new(status).with_header("Location", location)
    }

    /// A 404 `text/html` response
    pub fn not_found() -> Self {
        Self {
            status: 404,
            ..Self::html("<!doctype html><html><body><h1>Not Found</h1></body></html>")
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Looks up a header by name, ignoring case
    ///
    /// When a header was set more than once, the last value wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The single request/response exchange the crawler depends on
///
/// Implementations must resolve exactly once per call. Errors are treated as
/// infrastructure faults and abort the crawl.
pub trait Simulate: Send + Sync {
    fn simulate(&self, request: SimulatedRequest)
        -> BoxFuture<'_, Result<SimulatedResponse, SweepError>>;
}

/// Adapter returned by [`simulate_fn`]
pub struct SimulateFn<F> {
    f: F,
}

/// Wraps an async closure as a [`Simulate`] implementation
///
/// # Example
///
/// ```
/// use link_sweep::server::{simulate_fn, SimulatedResponse};
///
/// let simulator = simulate_fn(|request| async move {
///     if request.path == "/" {
///         Ok(SimulatedResponse::html("<body></body>"))
///     } else {
///         Ok(SimulatedResponse::not_found())
///     }
/// });
/// # let _ = simulator;
/// ```
pub fn simulate_fn<F, Fut>(f: F) -> SimulateFn<F>
where
    F: Fn(SimulatedRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<SimulatedResponse, SweepError>> + Send + 'static,
{
    SimulateFn { f }
}

impl<F, Fut> Simulate for SimulateFn<F>
where
    F: Fn(SimulatedRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<SimulatedResponse, SweepError>> + Send + 'static,
{
    fn simulate(
        &self,
        request: SimulatedRequest,
    ) -> BoxFuture<'_, Result<SimulatedResponse, SweepError>> {
        Box::pin((self.f)(request))
    }
}
