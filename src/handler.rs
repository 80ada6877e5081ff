//! Handler trait and type erasure.
//!
//! The router holds handlers of different concrete types in one map, so each
//! one is wrapped in an `Arc<dyn ErasedHandler>`:
//!
//! ```text
//! async fn get_user(req: Request) -> Result<Response, Failure> { … }
//!        ↓ router.get("/users/{id}", get_user)
//! Arc::new(FnHandler(get_user))                      ← BoxedHandler
//!        ↓ at request time
//! handler.call(req)                                  ← one vtable dispatch
//!        ↓
//! Box::pin(async { get_user(req).await.into_outcome() })
//! ```
//!
//! Handlers may be infallible (`-> Response`, `-> String`, `-> Status`) or
//! fallible (`-> Result<impl IntoResponse, impl Into<Failure>>`). Either way
//! the layer chain sees an [`Outcome`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Failure;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// A heap-allocated, type-erased future.
///
/// `Send + 'static` let tokio move it across worker threads.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// What every handler and layer produces: a response, or a failure still
/// waiting to be classified.
pub type Outcome = Result<Response, Failure>;

// ── IntoOutcome ───────────────────────────────────────────────────────────────

/// Conversion of a handler's return value into an [`Outcome`].
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoResponse,
    E: Into<Failure>,
{
    fn into_outcome(self) -> Outcome {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

impl IntoOutcome for Response {
    fn into_outcome(self) -> Outcome { Ok(self) }
}

impl IntoOutcome for Status {
    fn into_outcome(self) -> Outcome { Ok(self.into_response()) }
}

impl IntoOutcome for String {
    fn into_outcome(self) -> Outcome { Ok(self.into_response()) }
}

impl IntoOutcome for &'static str {
    fn into_outcome(self) -> Outcome { Ok(self.into_response()) }
}

// ── Erased handlers ───────────────────────────────────────────────────────────

#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<Outcome>;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler:
///
/// ```text
/// async fn name(req: Request) -> impl IntoOutcome
/// ```
///
/// Sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<Outcome> {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_outcome() })
    }
}
