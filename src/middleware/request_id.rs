//! Correlation ids.
//!
//! [`RequestId::generate`] produces one UUID v4 per request. [`AssignRequestId`]
//! is the light wrapper: it stores the id in the request context and forwards,
//! leaving failures to whoever sits above it.

use std::fmt;

use uuid::Uuid;

use crate::handler::{BoxFuture, Outcome};
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Response header used by `echo_header()`.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Opaque per-request identifier used to join log lines from one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// A fresh random id (UUID v4, 122 random bits).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Copies `id` into the `x-request-id` response header.
pub(crate) fn echo(response: &mut Response, id: &RequestId) {
    response.set_header(REQUEST_ID_HEADER, id.as_str());
}

/// Assigns a correlation id and forwards. Does not translate failures.
///
/// Use this when the application handles its own errors but still wants ids
/// in its logs. Whatever the inner chain returns, `Ok` or `Err`, comes back
/// out unchanged, and panics keep unwinding.
#[derive(Default)]
pub struct AssignRequestId {
    echo_header: bool,
}

impl AssignRequestId {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also send the id back in an `x-request-id` header on successful
    /// responses. Off by default.
    pub fn echo_header(mut self) -> Self {
        self.echo_header = true;
        self
    }
}

impl Middleware for AssignRequestId {
    fn handle(&self, mut req: Request, next: Next) -> BoxFuture<Outcome> {
        let id = req.context_mut().ensure_request_id().clone();
        let echo_header = self.echo_header;
        Box::pin(async move {
            let mut outcome = next.run(req).await;
            if echo_header {
                if let Ok(response) = outcome.as_mut() {
                    echo(response, &id);
                }
            }
            outcome
        })
    }
}
