//! Request-side types.
//!
//! - [`Request`] - the request used for I/O, cloneable without consuming its body
//! - [`Event`] - carries the original request as the identity key for tracing
//! - [`MatchingContext`] - opaque data from the rule matcher

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Uri, header::HeaderName};

/// A request being resolved.
///
/// The body is held as [`Bytes`], so cloning the request is cheap and never
/// consumes the body. This matters for the race strategy, which hands one
/// copy to the origin fetcher and keeps another for the store lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Full request URI.
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Bytes,
}

impl Request {
    /// Creates a request with empty headers and body.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Creates a `GET` request.
    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Adds a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces the body.
    pub fn with_body(self, body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            ..self
        }
    }

    /// Path component of the URI, used when asking for a fallback page.
    pub fn path(&self) -> &str {
        self.uri.path()
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        }
    }
}

/// The intercepted event.
///
/// Holds the original, unmodified request. Trace sinks key their records by
/// it; strategies never perform I/O with it. Cloning shares the request.
#[derive(Debug, Clone)]
pub struct Event {
    request: Arc<Request>,
}

impl Event {
    /// Creates an event for the given original request.
    pub fn new(request: Request) -> Self {
        Self {
            request: Arc::new(request),
        }
    }

    /// The original request.
    pub fn request(&self) -> &Request {
        &self.request
    }
}

/// Opaque data produced by the rule matcher.
///
/// Passed unchanged to the content store and origin fetcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchingContext(serde_json::Value);

impl MatchingContext {
    /// Wraps matcher output.
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// The wrapped matcher output.
    pub fn value(&self) -> &serde_json::Value {
        &self.0
    }
}
