//! Middleware layer.
//!
//! Middleware intercepts requests and their [`Outcome`]s and is the right
//! place for cross-cutting concerns. warden ships three:
//!
//! - [`CatchFailures`]: assigns a correlation id and is the single place
//!   failures (and handler panics) become JSON responses
//! - [`AssignRequestId`]: assigns a correlation id and nothing else
//! - [`LogRequests`]: writes one structured record per request
//!
//! Layers run in the order they are registered: the first [`Router::layer`]
//! call is the outermost. Put `CatchFailures` first so every layer below it
//! is covered.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use warden::middleware::{CatchFailures, LogRequests, RequestLogger};
//! use warden::sink::TracingSink;
//! use warden::{Request, Response, Router};
//!
//! # async fn hello(_: Request) -> Response { Response::text("hi") }
//! let sink = Arc::new(TracingSink::new("api"));
//! let app = Router::new()
//!     .layer(CatchFailures::new(sink.clone()))
//!     .layer(LogRequests::new(RequestLogger::new(sink)))
//!     .get("/", hello);
//! ```
//!
//! [`Router::layer`]: crate::Router::layer

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, Outcome};
use crate::request::Request;
use crate::router::Router;

pub mod catch;
pub mod logger;
pub mod request_id;

pub use catch::{CatchFailures, Classified, ErrorBody, classify};
pub use logger::{LogRecord, LogRequests, RequestLogger};
pub use request_id::{AssignRequestId, RequestId};

/// A request interceptor.
///
/// Implementations receive the request and the rest of the chain. Calling
/// [`Next::run`] forwards the request; not calling it short-circuits.
///
/// A layer that does not translate failures must hand back whatever `next`
/// produced. Only [`CatchFailures`] turns an `Err` into a response.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture<Outcome>;
}

/// A shared, type-erased layer.
pub(crate) type BoxedMiddleware = Arc<dyn Middleware>;

/// The remainder of the chain below the current layer, ending at the router.
pub struct Next {
    router: Arc<Router>,
    index: usize,
}

impl Next {
    pub(crate) fn new(router: Arc<Router>) -> Self {
        Self { router, index: 0 }
    }

    /// Runs the remaining layers and finally the matched handler.
    pub async fn run(self, req: Request) -> Outcome {
        match self.router.layers.get(self.index).cloned() {
            Some(layer) => {
                let next = Next { router: self.router, index: self.index + 1 };
                layer.handle(req, next).await
            }
            None => self.router.route(req).await,
        }
    }
}

// ── from_fn ───────────────────────────────────────────────────────────────────

/// Wraps an `async fn(Request, Next) -> Outcome` as a [`Middleware`].
///
/// ```rust
/// use warden::middleware::{from_fn, Next};
/// use warden::{Outcome, Request};
///
/// async fn tag_tenant(mut req: Request, next: Next) -> Outcome {
///     let tenant = req.header("x-tenant").unwrap_or("public").to_owned();
///     let _ = req.context_mut().set("tenant", tenant);
///     next.run(req).await
/// }
///
/// let layer = from_fn(tag_tenant);
/// # let _ = layer;
/// ```
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    FromFn(f)
}

/// Returned by [`from_fn`].
pub struct FromFn<F>(F);

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    fn handle(&self, req: Request, next: Next) -> BoxFuture<Outcome> {
        Box::pin((self.0)(req, next))
    }
}
