//! Response types.
//!
//! - [`Response`] - a response from any source
//! - [`Fetched`] - a fetch outcome normalized into success or failure
//! - [`ResponseSource`] - where a resolved response came from
//!
//! ## Success
//!
//! Status `200` is the only success signal. Every other status, including a
//! transport error converted into a response, is a failure.

use std::fmt;

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Uri};
use smol_str::SmolStr;

use crate::error::FetchError;

/// A response produced by the network, the store or the fallback provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code.
    pub status: StatusCode,
    /// Human readable reason, when it differs from the canonical one.
    pub reason: Option<SmolStr>,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
    /// Final URL of the response, if known.
    pub url: Option<Uri>,
}

impl Response {
    /// Creates an empty response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            reason: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            url: None,
        }
    }

    /// Creates a `200 OK` response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK).with_body(body)
    }

    /// Local failure used when the client is known to be offline.
    ///
    /// Status `404` with reason `"offline"`; the request never reached the
    /// network.
    pub fn offline() -> Self {
        Self::new(StatusCode::NOT_FOUND).with_reason("offline")
    }

    /// Failure response standing in for a fetch that produced no response.
    ///
    /// Status `502` with the error message as reason.
    pub fn transport_failure(error: &FetchError) -> Self {
        Self::new(StatusCode::BAD_GATEWAY).with_reason(error.to_string())
    }

    /// Replaces the body.
    pub fn with_body(self, body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            ..self
        }
    }

    /// Sets the reason.
    pub fn with_reason(self, reason: impl Into<SmolStr>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..self
        }
    }

    /// Sets the final URL.
    pub fn with_url(self, url: Uri) -> Self {
        Self {
            url: Some(url),
            ..self
        }
    }

    /// Returns `true` only for status `200`.
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// The reason, falling back to the canonical reason of the status.
    pub fn reason(&self) -> &str {
        self.reason
            .as_deref()
            .or_else(|| self.status.canonical_reason())
            .unwrap_or_default()
    }
}

/// A fetch outcome normalized before branching.
///
/// Rejected fetches and non-`200` responses take the same path, so both end
/// up in [`Fetched::Failure`] carrying a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// The origin answered with status `200`.
    Success(Response),
    /// The origin answered with another status, or did not answer at all.
    Failure(Response),
}

impl Fetched {
    /// Classifies a response by its status.
    pub fn from_response(response: Response) -> Self {
        if response.is_success() {
            Self::Success(response)
        } else {
            Self::Failure(response)
        }
    }

    /// Normalizes the result of an origin fetch.
    pub fn from_result(result: Result<Response, FetchError>) -> Self {
        match result {
            Ok(response) => Self::from_response(response),
            Err(error) => Self::Failure(Response::transport_failure(&error)),
        }
    }

    /// Returns `true` for [`Fetched::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The carried response.
    pub fn response(&self) -> &Response {
        match self {
            Self::Success(response) | Self::Failure(response) => response,
        }
    }

    /// Consumes the outcome, returning the carried response.
    pub fn into_response(self) -> Response {
        match self {
            Self::Success(response) | Self::Failure(response) => response,
        }
    }
}

impl From<Result<Response, FetchError>> for Fetched {
    fn from(result: Result<Response, FetchError>) -> Self {
        Self::from_result(result)
    }
}

/// Where a resolved response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseSource {
    /// The origin fetcher.
    Network,
    /// The content store.
    Store,
    /// The fallback provider.
    Fallback,
}

impl ResponseSource {
    /// Label used in logs and metrics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Store => "store",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
