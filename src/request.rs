//! Incoming HTTP request type.
//!
//! The server buffers the whole body before a request reaches any layer, so
//! the request logger and the handler both read the same bytes.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::context::Context;
use crate::error::{Failure, ValidationError};

/// An incoming HTTP request.
pub struct Request {
    pub(crate) method: String,
    pub(crate) uri: http::Uri,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) peer: Option<SocketAddr>,
    pub(crate) params: HashMap<String, String>,
    pub(crate) context: Context,
}

impl Request {
    /// Starts a request by hand, for tests or for embedding the router behind
    /// another server.
    pub fn builder() -> RequestBuilder {
        RequestBuilder {
            method: "GET".to_owned(),
            uri: http::Uri::from_static("/"),
            headers: Vec::new(),
            body: Bytes::new(),
            peer: None,
        }
    }

    /// Converts a hyper request whose body has already been collected.
    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes, peer: Option<SocketAddr>) -> Self {
        let headers = parts.headers.iter()
            .map(|(k, v)| (k.as_str().to_owned(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        Self {
            method: parts.method.as_str().to_owned(),
            uri: parts.uri,
            headers,
            body,
            peer,
            params: HashMap::new(),
            context: Context::new(),
        }
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn query(&self) -> Option<&str> { self.uri.query() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn peer(&self) -> Option<SocketAddr> { self.peer }

    pub fn context(&self) -> &Context { &self.context }
    pub fn context_mut(&mut self) -> &mut Context { &mut self.context }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// `scheme://host/`, taken from the request target when it is absolute
    /// and from the `host` header otherwise. A missing host renders as
    /// `unknown`. Client-supplied `x-forwarded-proto` is ignored.
    pub fn base_url(&self) -> String {
        self.base_url_from(false)
    }

    /// Base URL joined with the path and query string.
    pub fn full_url(&self) -> String {
        self.full_url_from(false)
    }

    /// As [`Request::base_url`], but with `trust_proxy` set a relative target
    /// takes its scheme from `x-forwarded-proto`.
    pub(crate) fn base_url_from(&self, trust_proxy: bool) -> String {
        let forwarded = || if trust_proxy { self.header("x-forwarded-proto") } else { None };
        let scheme = self.uri.scheme_str()
            .or_else(forwarded)
            .unwrap_or("http");
        let host = self.uri.authority()
            .map(|a| a.as_str())
            .or_else(|| self.header("host"))
            .unwrap_or("unknown");
        format!("{scheme}://{host}/")
    }

    pub(crate) fn full_url_from(&self, trust_proxy: bool) -> String {
        let base = self.base_url_from(trust_proxy);
        let base = base.trim_end_matches('/');
        match self.query() {
            Some(q) => format!("{base}{}?{q}", self.path()),
            None => format!("{base}{}", self.path()),
        }
    }

    /// Deserializes the JSON body. A body that does not fit `T` is a
    /// validation failure (`400`).
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Failure> {
        Ok(serde_json::from_slice(&self.body).map_err(ValidationError::from)?)
    }

    /// Like [`Request::json`], then runs `T`'s `validator` rules.
    pub fn validated_json<T: DeserializeOwned + Validate>(&self) -> Result<T, Failure> {
        let value: T = self.json()?;
        value.validate()?;
        Ok(value)
    }
}

/// Builder for hand-made [`Request`]s. Obtain via [`Request::builder()`].
pub struct RequestBuilder {
    method: String,
    uri: http::Uri,
    headers: Vec<(String, String)>,
    body: Bytes,
    peer: Option<SocketAddr>,
}

impl RequestBuilder {
    pub fn method(mut self, method: &str) -> Self {
        self.method = method.to_owned();
        self
    }

    /// Sets the request target.
    ///
    /// # Panics
    ///
    /// Panics if `uri` is not a valid request target.
    pub fn uri(mut self, uri: &str) -> Self {
        self.uri = uri.parse().unwrap_or_else(|e| panic!("invalid uri `{uri}`: {e}"));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn peer(mut self, addr: SocketAddr) -> Self {
        self.peer = Some(addr);
        self
    }

    pub fn body(self, body: impl Into<Bytes>) -> Request {
        Request { body: body.into(), ..self.empty() }
    }

    pub fn empty(self) -> Request {
        Request {
            method: self.method,
            uri: self.uri,
            headers: self.headers,
            body: self.body,
            peer: self.peer,
            params: HashMap::new(),
            context: Context::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct NewUser {
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn urls_from_host_header() {
        let req = Request::builder()
            .uri("/users/42?verbose=1")
            .header("Host", "api.example.com")
            .empty();
        assert_eq!(req.base_url(), "http://api.example.com/");
        assert_eq!(req.full_url(), "http://api.example.com/users/42?verbose=1");
        assert_eq!(req.path(), "/users/42");
    }

    #[test]
    fn urls_without_host() {
        let req = Request::builder().uri("/ping").empty();
        assert_eq!(req.base_url(), "http://unknown/");
        assert_eq!(req.full_url(), "http://unknown/ping");
    }

    #[test]
    fn forwarded_proto_only_when_trusted() {
        let req = Request::builder()
            .uri("/pay")
            .header("host", "example.com")
            .header("x-forwarded-proto", "https")
            .empty();
        assert_eq!(req.base_url(), "http://example.com/");
        assert_eq!(req.base_url_from(true), "https://example.com/");
        assert_eq!(req.full_url_from(true), "https://example.com/pay");
    }

    #[test]
    fn validated_json_accepts_good_bodies() {
        let req = Request::builder().method("POST").body(r#"{"name":"alice"}"#);
        let user: NewUser = req.validated_json().unwrap();
        assert_eq!(user.name, "alice");
    }

    #[test]
    fn malformed_and_invalid_bodies_are_validation_failures() {
        let req = Request::builder().method("POST").body("{nope");
        assert!(matches!(
            req.json::<NewUser>(),
            Err(Failure::Validation(ValidationError::Malformed(_)))
        ));

        let req = Request::builder().method("POST").body(r#"{"name":""}"#);
        assert!(matches!(
            req.validated_json::<NewUser>(),
            Err(Failure::Validation(ValidationError::Invalid(_)))
        ));
    }
}
