//! Failure translation.
//!
//! [`CatchFailures`] is the one place a [`Failure`] becomes a response. It
//! assigns the correlation id, runs the rest of the chain, and on failure
//! logs the full failure with that id before answering with a
//! `{"detail": ...}` body chosen by [`classify`]:
//!
//! | Failure | Status | `detail` |
//! |---|---|---|
//! | `Http { status, detail }` | `status` | `detail`, verbatim |
//! | `Validation(_)` | 400 | `Invalid request params` |
//! | `Internal(_)` | 500 | `Internal Server Error` |
//! | `Catastrophic { .. }` | 500 | `Call a Developer. NOW!!!` |
//!
//! Handler panics that unwind are caught here and become `Catastrophic`.
//! Aborts (stack overflow, `panic = "abort"`, fatal signals) end the process
//! before any Rust code can answer, so no response is possible for them.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Failure;
use crate::handler::{BoxFuture, Outcome};
use crate::middleware::request_id::{RequestId, echo};
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::sink::{LogSink, TracingSink};

pub const INVALID_PARAMS: &str = "Invalid request params";
pub const INTERNAL_ERROR: &str = "Internal Server Error";
pub const CALL_A_DEVELOPER: &str = "Call a Developer. NOW!!!";

/// The JSON body of every error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// A classified failure: what the client will see.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classified {
    pub status: u16,
    pub body: ErrorBody,
}

impl Classified {
    fn new(status: u16, detail: impl Into<String>) -> Self {
        Self { status, body: ErrorBody { detail: detail.into() } }
    }

    pub fn into_response(self) -> Response {
        match Response::builder().status(self.status).json_value(&self.body) {
            Ok(response) => response,
            Err(e) => {
                warn!("error body serialization failed: {e}");
                Response::status(self.status)
            }
        }
    }
}

/// Maps a failure to the status and body the client receives. Pure and total.
pub fn classify(failure: &Failure) -> Classified {
    match failure {
        Failure::Http { status, detail } => Classified::new(*status, detail.as_str()),
        Failure::Validation(_) => Classified::new(400, INVALID_PARAMS),
        Failure::Internal(_) => Classified::new(500, INTERNAL_ERROR),
        Failure::Catastrophic { .. } => Classified::new(500, CALL_A_DEVELOPER),
    }
}

/// The dispatch wrapper: correlation id plus failure translation.
///
/// Successful responses pass through untouched unless
/// [`echo_header`](CatchFailures::echo_header) is on. The outcome it returns
/// is always `Ok`.
#[derive(Clone)]
pub struct CatchFailures {
    sink: Arc<dyn LogSink>,
    echo_header: bool,
}

impl CatchFailures {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink, echo_header: false }
    }

    /// Also send the id back in an `x-request-id` header, on successes and
    /// on translated failures alike. Off by default.
    pub fn echo_header(mut self) -> Self {
        self.echo_header = true;
        self
    }

    /// Logs `failure` under `id`, then builds the client response.
    pub fn translate(&self, id: &RequestId, failure: Failure) -> Response {
        self.sink.failure(id, &failure);
        classify(&failure).into_response()
    }
}

impl Default for CatchFailures {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink::default()))
    }
}

impl Middleware for CatchFailures {
    fn handle(&self, mut req: Request, next: Next) -> BoxFuture<Outcome> {
        let id = req.context_mut().ensure_request_id().clone();
        let this = self.clone();

        Box::pin(async move {
            let outcome = AssertUnwindSafe(next.run(req))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(Failure::from_panic(panic)));

            let mut response = match outcome {
                Ok(response) => response,
                Err(failure) => this.translate(&id, failure),
            };
            if this.echo_header {
                echo(&mut response, &id);
            }
            Ok(response)
        })
    }
}
