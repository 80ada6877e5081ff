//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted — `Response::status()`,
//! `Response::builder().status()`, [`Failure::status`](crate::Failure::status),
//! or as a bare handler return value.
//!
//! ```rust
//! use warden::{Failure, Response, Status};
//!
//! Response::status(Status::NoContent);
//!
//! // detail defaults to the reason phrase: {"detail":"Conflict"}
//! Failure::status(Status::Conflict);
//! ```

macro_rules! statuses {
    ($( $variant:ident => $code:literal, $reason:literal; )*) => {
        /// The status codes warden names. Anything else can still be sent as a
        /// raw `u16`.
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[allow(clippy::enum_variant_names)]
        pub enum Status {
            $( $variant, )*
        }

        impl Status {
            pub const fn code(self) -> u16 {
                match self {
                    $( Self::$variant => $code, )*
                }
            }

            /// The RFC 9110 reason phrase, e.g. `"Not Found"`.
            pub const fn reason(self) -> &'static str {
                match self {
                    $( Self::$variant => $reason, )*
                }
            }

            pub fn from_code(code: u16) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

statuses! {
    // 2xx
    Ok                  => 200, "OK";
    Created             => 201, "Created";
    Accepted            => 202, "Accepted";
    NoContent           => 204, "No Content";
    // 3xx
    MovedPermanently    => 301, "Moved Permanently";
    Found               => 302, "Found";
    SeeOther            => 303, "See Other";
    NotModified         => 304, "Not Modified";
    TemporaryRedirect   => 307, "Temporary Redirect";
    PermanentRedirect   => 308, "Permanent Redirect";
    // 4xx
    BadRequest          => 400, "Bad Request";
    Unauthorized        => 401, "Unauthorized";
    Forbidden           => 403, "Forbidden";
    NotFound            => 404, "Not Found";
    MethodNotAllowed    => 405, "Method Not Allowed";
    NotAcceptable       => 406, "Not Acceptable";
    RequestTimeout      => 408, "Request Timeout";
    Conflict            => 409, "Conflict";
    Gone                => 410, "Gone";
    PreconditionFailed  => 412, "Precondition Failed";
    ContentTooLarge     => 413, "Content Too Large";
    UnsupportedMediaType => 415, "Unsupported Media Type";
    UnprocessableContent => 422, "Unprocessable Content";
    TooManyRequests     => 429, "Too Many Requests";
    // 5xx
    InternalServerError => 500, "Internal Server Error";
    NotImplemented      => 501, "Not Implemented";
    BadGateway          => 502, "Bad Gateway";
    ServiceUnavailable  => 503, "Service Unavailable";
    GatewayTimeout      => 504, "Gateway Timeout";
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.code()
    }
}
