//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.

use bytes::Bytes;
use http_body_util::Full;
use serde::Serialize;
use tracing::warn;

use crate::status::Status;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use warden::{Response, Status};
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(Status::NoContent);
///
/// Response::builder()
///     .status(Status::Created)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub(crate) body: Bytes,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: u16,
}

impl Response {
    /// `200 OK` — `application/json`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: impl Into<u16>) -> Self {
        Self { body: Bytes::new(), headers: Vec::new(), status: code.into() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok.code() }
    }

    pub fn status_code(&self) -> u16 { self.status }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replaces every header called `name` with a single `value`.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    /// Converts into a hyper response. Headers that are not valid HTTP are
    /// dropped with a warning rather than failing the whole response.
    pub(crate) fn into_hyper(self) -> http::Response<Full<Bytes>> {
        // A status outside 100..=999 goes out as 500. Headers and body are
        // kept so an error response still carries its `detail`.
        let status = http::StatusCode::from_u16(self.status).unwrap_or_else(|e| {
            warn!(status = self.status, "invalid response status: {e}");
            http::StatusCode::INTERNAL_SERVER_ERROR
        });
        let mut response = http::Response::new(Full::new(self.body));
        *response.status_mut() = status;
        for (name, value) in &self.headers {
            match (
                http::HeaderName::from_bytes(name.as_bytes()),
                http::HeaderValue::from_str(value),
            ) {
                (Ok(n), Ok(v)) => { response.headers_mut().append(n, v); }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        response
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`]. Defaults to `200 OK`.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, code: impl Into<u16>) -> Self {
        self.status = code.into();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.finish(JSON, body.into())
    }

    /// Serialize `value` with serde and terminate with it as a JSON body.
    pub fn json_value<T: Serialize>(self, value: &T) -> Result<Response, serde_json::Error> {
        Ok(self.finish(JSON, serde_json::to_vec(value)?.into()))
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(TEXT, Bytes::from(body.into()))
    }

    /// Terminate with no body (e.g. `Status::NoContent`).
    pub fn no_body(self) -> Response {
        Response { body: Bytes::new(), headers: self.headers, status: self.status }
    }

    fn finish(self, content_type: &str, body: Bytes) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them from fallible handlers as the
/// `Ok` side of a `Result`.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a [`Status`] directly from a handler: `return Status::NoContent`
impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_puts_content_type_first() {
        let res = Response::builder()
            .status(Status::Created)
            .header("location", "/users/42")
            .json(&b"{}"[..]);
        assert_eq!(res.status_code(), 201);
        assert_eq!(res.headers()[0], ("content-type".to_owned(), JSON.to_owned()));
        assert_eq!(res.header("Location"), Some("/users/42"));
    }

    #[test]
    fn set_header_replaces() {
        let mut res = Response::builder().header("X-Request-Id", "a").no_body();
        res.set_header("x-request-id", "b");
        assert_eq!(res.headers().len(), 1);
        assert_eq!(res.header("x-request-id"), Some("b"));
    }

    #[test]
    fn into_hyper_drops_invalid_headers() {
        let res = Response::builder().header("bad header", "x").header("ok", "y").text("hi");
        let hyper = res.into_hyper();
        assert_eq!(hyper.status(), 200);
        assert!(hyper.headers().get("ok").is_some());
        assert_eq!(hyper.headers().len(), 2);
    }

    #[tokio::test]
    async fn out_of_range_status_keeps_the_body() {
        use http_body_util::BodyExt;

        let res = Response::builder().status(1000_u16).json(&br#"{"detail":"odd"}"#[..]);
        let hyper = res.into_hyper();
        assert_eq!(hyper.status(), 500);
        assert_eq!(hyper.headers().get("content-type").unwrap(), JSON);

        let body = hyper.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"detail":"odd"}"#);
    }
}
