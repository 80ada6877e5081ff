//! Per-request context store.
//!
//! Every [`Request`](crate::Request) owns exactly one [`Context`]. It is
//! created with the request and dropped with it, so concurrent requests never
//! see each other's values and nothing here needs a lock.
//!
//! The correlation id has its own slot. It is written once by whichever
//! wrapper sees the request first and is read-only after that.

use std::collections::HashMap;

use crate::middleware::request_id::RequestId;

/// Key under which the correlation id is visible through [`Context::get`].
pub const REQUEST_ID_KEY: &str = "request_id";

/// Request-scoped metadata.
#[derive(Debug, Default)]
pub struct Context {
    request_id: Option<RequestId>,
    values: HashMap<String, String>,
}

/// Returned by [`Context::set`] when a caller tries to overwrite the
/// correlation id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("context key `{0}` is reserved")]
pub struct ReservedKey(pub String);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// `request_id` is reserved: use [`Context::ensure_request_id`].
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<(), ReservedKey> {
        let key = key.into();
        if key == REQUEST_ID_KEY {
            return Err(ReservedKey(key));
        }
        self.values.insert(key, value.into());
        Ok(())
    }

    /// Looks up `key`. Missing keys are `None`, never a panic.
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == REQUEST_ID_KEY {
            return self.request_id.as_ref().map(RequestId::as_str);
        }
        self.values.get(key).map(String::as_str)
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Returns the correlation id, generating it first if this is the first
    /// wrapper to touch the request.
    pub fn ensure_request_id(&mut self) -> &RequestId {
        self.request_id.get_or_insert_with(RequestId::generate)
    }
}
