//! Error types for collaborator operations.

use http::StatusCode;
use smol_str::SmolStr;
use thiserror::Error;

/// Error type for content store operations.
///
/// A store miss is **not** an error: reads return `Ok(None)` for absent
/// entries. This enum covers failures of the store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Internal store error, state or computation error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),

    /// Network interaction error.
    ///
    /// Errors occurring while the store fetches resources to populate itself
    /// (e.g., while priming a bundle).
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),

    /// A resource could not be stored because its origin answered with a
    /// non-success status.
    #[error("resource `{resource}` rejected with status {status}")]
    Rejected {
        /// Identifier of the rejected resource.
        resource: SmolStr,
        /// Status returned for the resource.
        status: StatusCode,
    },
}

impl StoreError {
    /// Wraps any error as [`StoreError::InternalError`].
    pub fn internal<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::InternalError(error.into())
    }
}

/// Error type for origin fetches.
///
/// Strategies never surface this error: a rejected fetch is normalized into a
/// failing [`Response`](crate::Response) via
/// [`Fetched::from_result`](crate::Fetched::from_result).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The fetcher gave up waiting for the origin.
    #[error("request timed out")]
    Timeout,
}

impl FetchError {
    /// Wraps any error as [`FetchError::Transport`].
    pub fn transport<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Transport(error.into())
    }
}

/// A strategy name that matches none of the known policies or aliases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy `{0}`")]
pub struct UnknownStrategy(pub SmolStr);
