mod support;

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use warden::middleware::{CatchFailures, LogRequests, RequestLogger};
use warden::{Failure, Request, Response, Router, Server};

use support::MemorySink;

async fn get_user(req: Request) -> Result<Response, Failure> {
    match req.param("id") {
        Some("42") => Ok(Response::json(r#"{"id":"42"}"#)),
        Some(id) => Err(Failure::http(404, format!("user {id} not found"))),
        None => Err(Failure::msg("route without id")),
    }
}

/// Sends one HTTP/1.1 request and returns the raw response text.
async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn serves_json_errors_over_tcp() {
    let sink = MemorySink::new();
    let app = Router::new()
        .layer(CatchFailures::new(sink.clone()).echo_header())
        .layer(LogRequests::new(RequestLogger::new(sink.clone())))
        .get("/users/{id}", get_user);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(app, async {
            let _ = stopped.await;
        }),
    );

    let ok = roundtrip(addr, "GET /users/42 HTTP/1.1\r\nHost: api.test\r\nConnection: close\r\n\r\n").await;
    assert!(ok.starts_with("HTTP/1.1 200"), "{ok}");
    assert!(ok.ends_with(r#"{"id":"42"}"#), "{ok}");

    let missing = roundtrip(addr, "GET /users/7 HTTP/1.1\r\nHost: api.test\r\nConnection: close\r\n\r\n").await;
    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");
    assert!(missing.ends_with(r#"{"detail":"user 7 not found"}"#), "{missing}");
    assert!(missing.to_ascii_lowercase().contains("x-request-id: "), "{missing}");

    let records = sink.requests();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].full_path, "http://api.test/users/7");
    assert!(records[1].remote_address.starts_with("127.0.0.1:"));
    assert_eq!(sink.failures().len(), 1);
    assert_eq!(records[1].request_id.as_deref(), Some(sink.failures()[0].request_id.as_str()));

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
