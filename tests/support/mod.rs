//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use warden::middleware::{LogRecord, RequestId};
use warden::sink::LogSink;
use warden::{Failure, Request, Response, Router};

/// A failure as the sink saw it: the id it was logged under and its `Debug`
/// representation.
#[derive(Clone, Debug)]
pub struct LoggedFailure {
    pub request_id: String,
    pub debug: String,
}

/// Sink that keeps everything in memory.
#[derive(Default)]
pub struct MemorySink {
    requests: Mutex<Vec<LogRecord>>,
    failures: Mutex<Vec<LoggedFailure>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<LogRecord> {
        self.requests.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<LoggedFailure> {
        self.failures.lock().unwrap().clone()
    }
}

impl LogSink for MemorySink {
    fn request(&self, record: &LogRecord) {
        self.requests.lock().unwrap().push(record.clone());
    }

    fn failure(&self, request_id: &RequestId, failure: &Failure) {
        self.failures.lock().unwrap().push(LoggedFailure {
            request_id: request_id.to_string(),
            debug: format!("{failure:?}"),
        });
    }
}

pub fn get(uri: &str) -> Request {
    Request::builder().uri(uri).header("host", "test.local").empty()
}

pub fn post(uri: &str, body: &'static str) -> Request {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("host", "test.local")
        .header("content-type", "application/json")
        .body(body)
}

pub async fn call(app: &Arc<Router>, req: Request) -> Response {
    app.call(req).await
}

/// Parses an error response body.
pub fn detail(res: &Response) -> String {
    let body: serde_json::Value = serde_json::from_slice(res.body()).expect("json body");
    body["detail"].as_str().expect("detail field").to_owned()
}

/// Formatted `tracing` output, captured for the installing thread only.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Routes this thread's events here until the guard drops. Pair with a
    /// current-thread `#[tokio::test]` so every task logs on this thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
