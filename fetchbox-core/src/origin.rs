//! Network origin contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Event, FetchError, MatchingContext, Request, Response, Rule};

/// Performs the network request for a rule.
///
/// This trait is transport-agnostic; any timeout policy belongs to the implementation.
///
/// # Examples
///
/// ```rust,ignore
/// use fetchbox_core::{OriginFetcher, FetchError, Response};
///
/// struct StaticOrigin {
///     response: Response,
/// }
///
/// #[async_trait::async_trait]
/// impl OriginFetcher for StaticOrigin {
///     async fn fetch(&self, _rule: &Rule, _req: Request, _event: &Event, _matching: &MatchingContext)
///         -> Result<Response, FetchError>
///     {
///         Ok(self.response.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait OriginFetcher: Send + Sync {
    /// Sends `request` to the origin.
    ///
    /// The request is taken by value: callers that still need it pass a clone.
    async fn fetch(
        &self,
        rule: &Rule,
        request: Request,
        event: &Event,
        matching: &MatchingContext,
    ) -> Result<Response, FetchError>;
}

#[async_trait]
impl<T> OriginFetcher for Arc<T>
where
    T: OriginFetcher + ?Sized,
{
    async fn fetch(
        &self,
        rule: &Rule,
        request: Request,
        event: &Event,
        matching: &MatchingContext,
    ) -> Result<Response, FetchError> {
        (**self).fetch(rule, request, event, matching).await
    }
}
