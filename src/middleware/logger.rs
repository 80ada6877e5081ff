//! Request logging.
//!
//! [`RequestLogger`] turns a request into one [`LogRecord`] and hands it to a
//! sink. [`LogRequests`] runs it as a layer, once per request, before the
//! handler sees the request.
//!
//! Header capture is off by default. Headers routinely carry credentials and
//! cookies; turn it on per deployment with [`RequestLogger::capture_headers`].

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Serialize, Serializer};

use crate::handler::{BoxFuture, Outcome};
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::sink::LogSink;

const UNKNOWN: &str = "unknown";

/// A structured description of one inbound request.
#[derive(Clone, Debug, Serialize)]
pub struct LogRecord {
    pub method: String,
    pub base_url: String,
    pub endpoint: String,
    pub full_path: String,
    pub remote_address: String,
    #[serde(serialize_with = "lossy_utf8")]
    pub payload: Bytes,
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

fn lossy_utf8<S: Serializer>(bytes: &Bytes, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&String::from_utf8_lossy(bytes))
}

/// Builds and writes request records.
#[derive(Clone)]
pub struct RequestLogger {
    sink: Arc<dyn LogSink>,
    capture_headers: bool,
    trust_forwarded_for: bool,
}

impl RequestLogger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink, capture_headers: false, trust_forwarded_for: false }
    }

    /// Include request headers in every record. Default `false`.
    pub fn capture_headers(mut self, on: bool) -> Self {
        self.capture_headers = on;
        self
    }

    /// Trust the proxy headers: the client host comes from the first
    /// `x-forwarded-for` entry and the URL scheme from `x-forwarded-proto`.
    /// The proxy does not forward the client port, so it is logged as
    /// unknown. Only enable behind a proxy that overwrites both headers.
    /// Default `false`.
    pub fn trust_forwarded_for(mut self, on: bool) -> Self {
        self.trust_forwarded_for = on;
        self
    }

    /// Snapshot of `req`. Reads only; the body stays available downstream.
    pub fn record(&self, req: &Request) -> LogRecord {
        LogRecord {
            method: req.method().to_owned(),
            base_url: req.base_url_from(self.trust_forwarded_for),
            endpoint: req.path().to_owned(),
            full_path: req.full_url_from(self.trust_forwarded_for),
            remote_address: self.remote_address(req),
            payload: req.body.clone(),
            request_id: req.context().request_id().map(|id| id.as_str().to_owned()),
            headers: self.capture_headers.then(|| {
                req.headers().iter().map(|(k, v)| (k.to_ascii_lowercase(), v.clone())).collect()
            }),
        }
    }

    /// Writes one record for `req` to the sink.
    pub fn log(&self, req: &Request) {
        self.sink.request(&self.record(req));
    }

    fn remote_address(&self, req: &Request) -> String {
        if self.trust_forwarded_for {
            let forwarded = req.header("x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|h| !h.is_empty());
            if let Some(host) = forwarded {
                return format!("{host}:{UNKNOWN}");
            }
        }
        match req.peer() {
            Some(addr) => format!("{}:{}", addr.ip(), addr.port()),
            None => format!("{UNKNOWN}:{UNKNOWN}"),
        }
    }
}

/// Layer that logs every request once, then forwards it unchanged.
///
/// Behind [`Router::call`](crate::Router::call) every record carries the
/// request id. [`RequestLogger::record`] used on its own logs it as absent
/// when none was assigned yet.
pub struct LogRequests {
    logger: RequestLogger,
}

impl LogRequests {
    pub fn new(logger: RequestLogger) -> Self {
        Self { logger }
    }
}

impl Middleware for LogRequests {
    fn handle(&self, req: Request, next: Next) -> BoxFuture<Outcome> {
        self.logger.log(&req);
        Box::pin(next.run(req))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::Failure;
    use crate::middleware::request_id::RequestId;

    #[derive(Default)]
    struct Records(Mutex<Vec<LogRecord>>);

    impl LogSink for Records {
        fn request(&self, record: &LogRecord) {
            self.0.lock().unwrap().push(record.clone());
        }
        fn failure(&self, _: &RequestId, _: &Failure) {}
    }

    fn post() -> Request {
        Request::builder()
            .method("POST")
            .uri("/items?dry_run=true")
            .header("Host", "shop.local")
            .header("Authorization", "Bearer secret")
            .peer("10.0.0.7:51234".parse().unwrap())
            .body(r#"{"sku":"A1"}"#)
    }

    #[test]
    fn record_fields() {
        let logger = RequestLogger::new(Arc::new(Records::default()));
        let mut req = post();
        let id = req.context_mut().ensure_request_id().clone();

        let r = logger.record(&req);
        assert_eq!(r.method, "POST");
        assert_eq!(r.base_url, "http://shop.local/");
        assert_eq!(r.endpoint, "/items");
        assert_eq!(r.full_path, "http://shop.local/items?dry_run=true");
        assert_eq!(r.remote_address, "10.0.0.7:51234");
        assert_eq!(&r.payload[..], br#"{"sku":"A1"}"#);
        assert_eq!(r.request_id.as_deref(), Some(id.as_str()));
        assert!(r.headers.is_none());

        // The request is untouched and its body still readable.
        assert_eq!(req.body(), br#"{"sku":"A1"}"#);
    }

    #[test]
    fn unknown_peer_and_missing_id() {
        let logger = RequestLogger::new(Arc::new(Records::default()));
        let req = Request::builder().uri("/ping").empty();
        let r = logger.record(&req);
        assert_eq!(r.remote_address, "unknown:unknown");
        assert_eq!(r.request_id, None);
    }

    #[test]
    fn forwarded_for_host_has_unknown_port() {
        let logger = RequestLogger::new(Arc::new(Records::default())).trust_forwarded_for(true);
        let req = Request::builder()
            .header("X-Forwarded-For", "203.0.113.9, 10.0.0.1")
            .peer("10.0.0.1:8080".parse().unwrap())
            .empty();
        assert_eq!(logger.record(&req).remote_address, "203.0.113.9:unknown");
    }

    #[test]
    fn proxy_headers_ignored_unless_trusted() {
        let req = Request::builder()
            .uri("/items")
            .header("Host", "shop.local")
            .header("X-Forwarded-For", "203.0.113.9")
            .header("X-Forwarded-Proto", "https")
            .peer("10.0.0.1:8080".parse().unwrap())
            .empty();

        let r = RequestLogger::new(Arc::new(Records::default())).record(&req);
        assert_eq!(r.remote_address, "10.0.0.1:8080");
        assert_eq!(r.base_url, "http://shop.local/");
        assert_eq!(r.full_path, "http://shop.local/items");

        let r = RequestLogger::new(Arc::new(Records::default()))
            .trust_forwarded_for(true)
            .record(&req);
        assert_eq!(r.remote_address, "203.0.113.9:unknown");
        assert_eq!(r.base_url, "https://shop.local/");
        assert_eq!(r.full_path, "https://shop.local/items");
    }

    #[test]
    fn headers_only_when_enabled() {
        let logger = RequestLogger::new(Arc::new(Records::default())).capture_headers(true);
        let headers = logger.record(&post()).headers.unwrap();
        assert_eq!(headers.get("authorization").map(String::as_str), Some("Bearer secret"));
        assert_eq!(headers.get("host").map(String::as_str), Some("shop.local"));
    }

    #[test]
    fn log_writes_one_record() {
        let sink = Arc::new(Records::default());
        let logger = RequestLogger::new(sink.clone());
        logger.log(&post());
        assert_eq!(sink.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn record_serializes_payload_as_text() {
        let logger = RequestLogger::new(Arc::new(Records::default()));
        let json = serde_json::to_value(logger.record(&post())).unwrap();
        assert_eq!(json["payload"], r#"{"sku":"A1"}"#);
        assert_eq!(json["request_id"], serde_json::Value::Null);
        assert!(json.get("headers").is_none());
    }
}
