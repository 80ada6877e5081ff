//! Radix-tree request router and layer stack.
//!
//! One tree per HTTP method. O(path-length) lookup. Layers wrap every route;
//! a miss is itself a [`Failure`] so it travels through the same layers as a
//! handler error and comes out as `{"detail":"Not Found"}`.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use tracing::error;

use crate::error::Failure;
use crate::handler::{BoxedHandler, Handler, Outcome};
use crate::method::Method;
use crate::middleware::{BoxedMiddleware, Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Every builder method returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    pub(crate) layers: Vec<BoxedMiddleware>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), layers: Vec::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics on an invalid or conflicting route. Routes are fixed at
    /// startup, so this surfaces as a boot failure, never mid-request.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self { self.on(Method::Get, path, handler) }
    pub fn post(self, path: &str, handler: impl Handler) -> Self { self.on(Method::Post, path, handler) }
    pub fn put(self, path: &str, handler: impl Handler) -> Self { self.on(Method::Put, path, handler) }
    pub fn patch(self, path: &str, handler: impl Handler) -> Self { self.on(Method::Patch, path, handler) }
    pub fn delete(self, path: &str, handler: impl Handler) -> Self { self.on(Method::Delete, path, handler) }

    /// Append a layer. The first layer added is the outermost.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Runs `req` through every layer and the matched handler.
    ///
    /// The correlation id is assigned here, before the first layer runs, so
    /// the wrappers below reuse it and an escaped failure can still be logged
    /// under it. A failure that escapes all layers means no
    /// [`CatchFailures`] is mounted. It is logged and answered with a bare
    /// `500` so the connection always gets a response.
    ///
    /// [`CatchFailures`]: crate::middleware::CatchFailures
    pub async fn call(self: &Arc<Self>, mut req: Request) -> Response {
        let id = req.context_mut().ensure_request_id().clone();
        match Next::new(Arc::clone(self)).run(req).await {
            Ok(response) => response,
            Err(failure) => {
                error!(request_id = %id, error = ?failure, "unhandled failure reached the server");
                Response::status(Status::InternalServerError)
            }
        }
    }

    /// The innermost stage: route lookup and handler call.
    pub(crate) async fn route(&self, mut req: Request) -> Outcome {
        let method: Method = req.method().parse()
            .map_err(|_| Failure::status(Status::MethodNotAllowed))?;

        let (handler, params) = self.lookup(method, req.path())
            .ok_or_else(|| Failure::status(Status::NotFound))?;
        req.params = params;
        handler.call(req).await
    }

    fn lookup(&self, method: Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
