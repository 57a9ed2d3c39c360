//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler. Unknown paths answer `404`; a known path hit with an
//! unregistered method answers `405` with an `allow` header.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, private};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup and hand it to [`Server::serve`](crate::Server::serve),
/// usually wrapped in [`middleware::logging`](crate::middleware::logging).
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.insert(method, path, handler.into_boxed_handler());
        self
    }

    /// Register `handler` for `GET` and `HEAD` on `path`. hyper drops the body
    /// of a `HEAD` response on the wire.
    pub fn get(mut self, path: &str, handler: impl Handler) -> Self {
        let handler = handler.into_boxed_handler();
        self.insert(Method::HEAD, path, Arc::clone(&handler));
        self.insert(Method::GET, path, handler);
        self
    }

    fn insert(&mut self, method: Method, path: &str, handler: BoxedHandler) {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<BoxedHandler> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        Some(Arc::clone(matched.value))
    }

    /// Methods with a route matching `path`, sorted for a stable `allow` header.
    fn allowed(&self, path: &str) -> Vec<&str> {
        let mut methods: Vec<&str> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(method, _)| method.as_str())
            .collect();
        methods.sort_unstable();
        methods
    }

    fn route(&self, req: Request) -> BoxFuture {
        if let Some(handler) = self.lookup(req.method(), req.path()) {
            return handler.call(req);
        }

        let allowed = self.allowed(req.path());
        let response = if allowed.is_empty() {
            Response::status(StatusCode::NOT_FOUND)
        } else {
            Response::builder()
                .status(StatusCode::METHOD_NOT_ALLOWED)
                .header("allow", &allowed.join(", "))
                .no_body()
        };
        Box::pin(async move { response })
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl private::Sealed for Router {}

impl Handler for Router {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

impl ErasedHandler for Router {
    fn call(&self, req: Request) -> BoxFuture {
        self.route(req)
    }
}
