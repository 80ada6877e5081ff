//! # warden
//!
//! Centralized failure translation and per-request correlation ids for
//! hyper services. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! Handlers return a [`Result`] and let failures propagate with `?`. Exactly
//! one layer, [`CatchFailures`](middleware::CatchFailures), catches them,
//! logs them in full with the request's correlation id, and answers with a
//! stable status and a `{"detail": ...}` body:
//!
//! - declared HTTP failures keep their status and message
//! - validation failures become `400 Invalid request params`
//! - everything else becomes `500 Internal Server Error`
//! - a handler panic becomes `500 Call a Developer. NOW!!!`
//!
//! Clients never see stack traces or per-field validation errors. The logs
//! always do.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use warden::middleware::{CatchFailures, LogRequests, RequestLogger};
//! use warden::sink::TracingSink;
//! use warden::{Failure, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sink = Arc::new(TracingSink::new("users-api"));
//!     let app = Router::new()
//!         .layer(CatchFailures::new(sink.clone()))
//!         .layer(LogRequests::new(RequestLogger::new(sink)))
//!         .get("/users/{id}", get_user);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Result<Response, Failure> {
//!     match req.param("id") {
//!         Some("42") => Ok(Response::json(r#"{"id":"42","name":"alice"}"#)),
//!         _ => Err(Failure::http(404, "user not found")),
//!     }
//! }
//! ```

mod context;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod middleware;
pub mod sink;

pub use context::{Context, REQUEST_ID_KEY, ReservedKey};
pub use error::{Error, Failure, ValidationError};
pub use handler::{BoxFuture, Handler, IntoOutcome, Outcome};
pub use method::{Method, UnknownMethod};
pub use request::{Request, RequestBuilder};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
