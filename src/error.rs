//! Error types

use std::error;
use std::fmt::{self, Display, Formatter};
use std::io;

use crate::types::{BoundingBox, StatusCode};

/// An error occurred while fetching places from the search API.
#[derive(Debug)]
pub enum Error<E = Box<dyn error::Error + Send + Sync>> {
    /// An error occured while decoding gzip stream from the server.
    Gzip(io::Error),
    /// An HTTP error from the search API.
    Http(StatusCode),
    /// The response body was not a valid place listing.
    Json(serde_json::Error),
    /// The bounding box of the request was malformed. No request was sent.
    InvalidBounds(BoundingBox),
    /// The request could not be built.
    Request(http::Error),
    /// An error from the underlying HTTP client.
    Service(E),
}

/// An error occurred while loading a `Config`.
#[derive(Debug)]
pub enum ConfigError {
    /// A required variable is not set.
    Missing(&'static str),
    /// A variable is set to an unusable value.
    Invalid {
        var: &'static str,
        value: String,
    },
}

/// A string did not name any variant of an enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownValue {
    kind: &'static str,
    value: String,
}

impl<E> Error<E> {
    /// Maps the service error of `self` with `f`, leaving the other variants as they are.
    pub fn map_service<F>(self, f: impl FnOnce(E) -> F) -> Error<F> {
        match self {
            Error::Gzip(e) => Error::Gzip(e),
            Error::Http(status) => Error::Http(status),
            Error::Json(e) => Error::Json(e),
            Error::InvalidBounds(bbox) => Error::InvalidBounds(bbox),
            Error::Request(e) => Error::Request(e),
            Error::Service(e) => Error::Service(f(e)),
        }
    }
}

impl<E: error::Error + 'static> error::Error for Error<E> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        use Error::*;

        match *self {
            Gzip(ref e) => Some(e),
            Http(_) | InvalidBounds(_) => None,
            Json(ref e) => Some(e),
            Request(ref e) => Some(e),
            Service(ref e) => Some(e),
        }
    }
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use Error::*;

        match *self {
            Gzip(ref e) => Display::fmt(e, f),
            Http(ref code) => Display::fmt(code, f),
            Json(ref e) => Display::fmt(e, f),
            InvalidBounds(ref bbox) => write!(f, "malformed bounding box: {}", bbox),
            Request(ref e) => Display::fmt(e, f),
            Service(ref e) => Display::fmt(e, f),
        }
    }
}

impl error::Error for ConfigError {}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigError::Missing(var) => write!(f, "`{}` is not set", var),
            ConfigError::Invalid { var, ref value } => {
                write!(f, "`{}` has an invalid value: {:?}", var, value)
            }
        }
    }
}

impl UnknownValue {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        UnknownValue {
            kind,
            value: value.to_owned(),
        }
    }
}

impl error::Error for UnknownValue {}

impl Display for UnknownValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}
