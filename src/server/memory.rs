//! In-memory site used for previews and tests

use super::{Handled, Handler, SimulatedRequest, SimulatedResponse};
use crate::SweepError;
use futures::future::BoxFuture;
use std::collections::HashMap;

/// A fixed table of path -> response
///
/// Paths are matched exactly. Unknown paths are passed to the next handler.
#[derive(Debug, Clone, Default)]
pub struct MemorySite {
    routes: HashMap<String, SimulatedResponse>,
}

impl MemorySite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` as a 200 `text/html` page
    pub fn page(self, path: impl Into<String>, html: impl Into<String>) -> Self {
        self.respond(path, SimulatedResponse::html(html))
    }

    /// Serves a non-HTML asset
    pub fn asset(
        self,
        path: impl Into<String>,
        content_type: &str,
        body: impl Into<String>,
    ) -> Self {
        self.respond(
            path,
            SimulatedResponse::new(200)
                .with_header("Content-Type", content_type)
                .with_body(body),
        )
    }

    pub fn redirect(self, path: impl Into<String>, location: impl Into<String>, status: u16) -> Self {
        self.respond(path, SimulatedResponse::redirect(status, location))
    }

    /// Serves an arbitrary response
    pub fn respond(mut self, path: impl Into<String>, response: SimulatedResponse) -> Self {
        self.routes.insert(path.into(), response);
        self
    }
}

impl Handler for MemorySite {
    fn handle<'a>(
        &'a self,
        request: &'a SimulatedRequest,
    ) -> BoxFuture<'a, Result<Handled, SweepError>> {
        let handled = match self.routes.get(&request.path) {
            Some(response) => Handled::Respond(response.clone()),
            None => Handled::Next,
        };

        Box::pin(futures::future::ready(Ok(handled)))
    }
}
