//! Error types.
//!
//! Two families live here and they never mix:
//!
//! - [`Error`] surfaces infrastructure failures (binding a port, accepting a
//!   connection). It is what [`Server::serve`](crate::Server::serve) returns.
//! - [`Failure`] is what a handler or middleware raises while processing a
//!   request. The catch layer turns it into a JSON response; nothing else
//!   should.

use thiserror::Error;

use crate::status::Status;

/// The error type returned by warden's fallible server operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ── Failure ──────────────────────────────────────────────────────────────────

/// A failure raised while handling one request.
///
/// The set is closed: every failure lands in exactly one of four buckets and
/// [`classify`](crate::middleware::catch::classify) matches them exhaustively.
///
/// ```rust
/// use warden::{Failure, Status};
///
/// let not_found = Failure::http(404, "user 42 not found");
/// let conflict = Failure::status(Status::Conflict); // detail: "Conflict"
/// let broken = Failure::msg("pool exhausted");
/// # let _ = (not_found, conflict, broken);
/// ```
#[derive(Debug, Error)]
pub enum Failure {
    /// A failure that already knows its client-facing status and message.
    #[error("http {status}: {detail}")]
    Http { status: u16, detail: String },

    /// Inbound data was rejected before it reached business logic.
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    /// Any other failure. Its contents are logged, never sent to the client.
    #[error("internal: {0:#}")]
    Internal(anyhow::Error),

    /// The handler panicked. `message` is the panic payload when it was a
    /// string, `"<non-string panic payload>"` otherwise.
    #[error("panic: {message}")]
    Catastrophic { message: String },
}

impl Failure {
    /// Declared HTTP failure with an explicit status and detail.
    pub fn http(status: u16, detail: impl Into<String>) -> Self {
        Self::Http { status, detail: detail.into() }
    }

    /// Declared HTTP failure whose detail is the status reason phrase.
    pub fn status(status: Status) -> Self {
        Self::Http { status: status.code(), detail: status.reason().to_owned() }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn msg(message: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Internal(anyhow::Error::msg(message))
    }

    /// Builds the catastrophic variant from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "<non-string panic payload>".to_owned()
        };
        Self::Catastrophic { message }
    }
}

impl From<validator::ValidationErrors> for Failure {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::Validation(ValidationError::Invalid(e))
    }
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e)
    }
}

impl From<std::io::Error> for Failure {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(e.into())
    }
}

// ── ValidationError ──────────────────────────────────────────────────────────

/// Why inbound data was rejected.
///
/// Both variants map to the same generic `400` body. The per-field detail in
/// here is for the logs only.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The body was not valid JSON for the target type.
    #[error("malformed body: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The body parsed but broke one or more field rules.
    #[error("invalid fields: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}
