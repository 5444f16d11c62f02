//! Middleware chain that flattens a list of handlers into one simulator

use super::{Simulate, SimulatedRequest, SimulatedResponse};
use crate::SweepError;
use futures::future::BoxFuture;

/// What a handler decided to do with a request
#[derive(Debug)]
pub enum Handled {
    /// The handler answered; the chain stops here
    Respond(SimulatedResponse),

    /// The handler passed; the next one in line gets the request
    Next,
}

/// One link of a [`HandlerChain`]
pub trait Handler: Send + Sync {
    fn handle<'a>(
        &'a self,
        request: &'a SimulatedRequest,
    ) -> BoxFuture<'a, Result<Handled, SweepError>>;
}

/// Ordered list of handlers, invoked in sequence until one responds
#[derive(Default)]
pub struct HandlerChain {
    handlers: Vec<Box<dyn Handler>>,
}

impl HandlerChain {
    pub fn new(handlers: Vec<Box<dyn Handler>>) -> Self {
        Self { handlers }
    }

    /// Appends a handler to the end of the chain
    pub fn push(&mut self, handler: impl Handler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Inserts a handler in front of every existing one
    pub fn prepend(&mut self, handler: impl Handler + 'static) {
        self.handlers.insert(0, Box::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Simulate for HandlerChain {
    fn simulate(
        &self,
        request: SimulatedRequest,
    ) -> BoxFuture<'_, Result<SimulatedResponse, SweepError>> {
        Box::pin(async move {
            for handler in &self.handlers {
                if let Handled::Respond(response) = handler.handle(&request).await? {
                    return Ok(response);
                }
            }

            Err(SweepError::HandlersExhausted { path: request.path })
        })
    }
}

/// Terminal handler that answers every request with a 404 page
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

impl Handler for NotFound {
    fn handle<'a>(
        &'a self,
        _request: &'a SimulatedRequest,
    ) -> BoxFuture<'a, Result<Handled, SweepError>> {
        Box::pin(futures::future::ready(Ok(Handled::Respond(
            SimulatedResponse::not_found(),
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::MemorySite;

    struct Failing;

    impl Handler for Failing {
        fn handle<'a>(
            &'a self,
            request: &'a SimulatedRequest,
        ) -> BoxFuture<'a, Result<Handled, SweepError>> {
            Box::pin(async move {
                Err(SweepError::Handler {
                    path: request.path.clone(),
                    message: "boom".to_string(),
                })
            })
        }
    }

    #[tokio::test]
    async fn test_first_responder_wins() {
        let mut chain = HandlerChain::default();
        chain.push(MemorySite::new().page("/", "<body>first</body>"));
        chain.push(MemorySite::new().page("/", "<body>second</body>"));

        let response = chain.simulate(SimulatedRequest::get("/")).await.unwrap();
        assert_eq!(response.body, "<body>first</body>");
    }

    #[tokio::test]
    async fn test_delegates_to_next_handler() {
        let mut chain = HandlerChain::default();
        chain.push(MemorySite::new().page("/a", "<body>a</body>"));
        chain.push(NotFound);

        let response = chain.simulate(SimulatedRequest::get("/b")).await.unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_an_error() {
        let chain = HandlerChain::new(vec![Box::new(MemorySite::new())]);

        let err = chain
            .simulate(SimulatedRequest::get("/nowhere"))
            .await
            .unwrap_err();
        assert!(matches!(err, SweepError::HandlersExhausted { path } if path == "/nowhere"));
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let mut chain = HandlerChain::default();
        chain.push(Failing);
        chain.push(NotFound);

        let err = chain.simulate(SimulatedRequest::get("/")).await.unwrap_err();
        assert!(matches!(err, SweepError::Handler { .. }));
    }

    #[tokio::test]
    async fn test_prepend() {
        let mut chain = HandlerChain::default();
        chain.push(NotFound);
        chain.prepend(MemorySite::new().page("/", "<body></body>"));

        assert_eq!(chain.len(), 2);
        let response = chain.simulate(SimulatedRequest::get("/")).await.unwrap();
        assert_eq!(response.status, 200);
    }
}
