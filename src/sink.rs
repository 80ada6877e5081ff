//! Logging sinks.
//!
//! Components that log take a sink explicitly instead of reaching for a
//! process-wide logger. [`TracingSink`] forwards to `tracing`, which is what a
//! service wants; tests plug in a sink that records into memory.

use tracing::{error, info};

use crate::error::Failure;
use crate::middleware::logger::LogRecord;
use crate::middleware::request_id::RequestId;

/// Destination for the two kinds of record warden writes.
pub trait LogSink: Send + Sync + 'static {
    /// One inbound request, written by [`RequestLogger`](crate::middleware::RequestLogger).
    fn request(&self, record: &LogRecord);

    /// One failure, written by [`CatchFailures`](crate::middleware::CatchFailures)
    /// before the client response is built. The id is never optional here.
    fn failure(&self, request_id: &RequestId, failure: &Failure);
}

/// Emits `tracing` events. `component` is attached to every event so records
/// from several sinks in one process can be told apart.
#[derive(Clone, Debug)]
pub struct TracingSink {
    component: &'static str,
}

impl TracingSink {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new("warden")
    }
}

impl LogSink for TracingSink {
    fn request(&self, r: &LogRecord) {
        info!(
            component = self.component,
            method = %r.method,
            base_url = %r.base_url,
            endpoint = %r.endpoint,
            full_path = %r.full_path,
            remote_address = %r.remote_address,
            payload = %String::from_utf8_lossy(&r.payload),
            request_id = %r.request_id.as_deref().unwrap_or("-"),
            headers = ?r.headers,
            "request"
        );
    }

    fn failure(&self, request_id: &RequestId, failure: &Failure) {
        error!(
            component = self.component,
            request_id = %request_id,
            error = ?failure,
            "{failure}"
        );
    }
}
