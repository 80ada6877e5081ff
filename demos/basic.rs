//! Minimal warden example: JSON endpoints with every kind of failure.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i http://localhost:3000/users/7                     # 404 {"detail":"user 7 not found"}
//!   curl -i -X POST http://localhost:3000/users -d '{"name":""}'  # 400 {"detail":"Invalid request params"}
//!   curl -i http://localhost:3000/flaky                       # 500 {"detail":"Internal Server Error"}
//!   curl -i http://localhost:3000/panic                       # 500 {"detail":"Call a Developer. NOW!!!"}
//!   curl -i http://localhost:3000/nowhere                     # 404 {"detail":"Not Found"}

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use validator::Validate;
use warden::middleware::{CatchFailures, LogRequests, RequestLogger};
use warden::sink::TracingSink;
use warden::{Failure, Request, Response, Router, Server, Status};

#[derive(Deserialize, Serialize, Validate)]
struct NewUser {
    #[validate(length(min = 1, max = 64))]
    name: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let sink = Arc::new(TracingSink::new("basic"));
    let app = Router::new()
        .layer(CatchFailures::new(sink.clone()).echo_header())
        .layer(LogRequests::new(RequestLogger::new(sink)))
        .get("/users/{id}",    get_user)
        .post("/users",        create_user)
        .delete("/users/{id}", delete_user)
        .get("/flaky",         flaky)
        .get("/panic",         explode);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /users/{id}
async fn get_user(req: Request) -> Result<Response, Failure> {
    let id = req.param("id").unwrap_or_default();
    if id != "42" {
        return Err(Failure::http(Status::NotFound.code(), format!("user {id} not found")));
    }
    Ok(Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#)))
}

// POST /users. Malformed or invalid bodies never reach this function's body.
async fn create_user(req: Request) -> Result<Response, Failure> {
    let user: NewUser = req.validated_json()?;
    let response = Response::builder()
        .status(Status::Created)
        .header("location", "/users/99")
        .json_value(&user)
        .map_err(Failure::internal)?;
    Ok(response)
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> Status {
    Status::NoContent
}

async fn flaky(_req: Request) -> Result<Response, Failure> {
    let _config = tokio::fs::read_to_string("/definitely/not/here.toml").await?;
    Ok(Response::text("unreachable"))
}

async fn explode(_req: Request) -> Response {
    panic!("invariant violated: ledger out of balance");
}
