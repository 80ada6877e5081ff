//! HTTP method as a typed enum.
//!
//! Covers the RFC 9110 methods a JSON API routes on. Any other method string
//! is answered with `405 Method Not Allowed` through the normal failure path,
//! so it still gets a correlation id and a JSON body.

use std::fmt;
use std::str::FromStr;

macro_rules! methods {
    ($( $variant:ident => $wire:literal, )*) => {
        /// A routable HTTP method.
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum Method {
            $( $variant, )*
        }

        impl Method {
            /// Returns the uppercase wire representation (e.g. `"GET"`).
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )*
                }
            }
        }

        /// Parses an uppercase method string. Case-sensitive per RFC 9110 §9.1.
        impl FromStr for Method {
            type Err = UnknownMethod;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Self::$variant), )*
                    _ => Err(UnknownMethod),
                }
            }
        }
    };
}

methods! {
    Connect => "CONNECT",
    Delete  => "DELETE",
    Get     => "GET",
    Head    => "HEAD",
    Options => "OPTIONS",
    Patch   => "PATCH",
    Post    => "POST",
    Put     => "PUT",
    Trace   => "TRACE",
}

/// Returned by [`Method::from_str`] for a method warden cannot route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown http method")]
pub struct UnknownMethod;

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
