//! Content store contract.

use std::sync::Arc;

use async_trait::async_trait;
use smol_str::SmolStr;

use crate::{Event, MatchingContext, Request, Response, Rule, StoreError};

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Options for a raw store lookup.
///
/// Strategies that decide fallback behaviour themselves read with
/// [`ReadOptions::RAW`]: the store returns a value or nothing, without
/// populating itself and without synthesizing a substitute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Fetch and populate the store when the entry is missing.
    pub populate_on_miss: bool,
    /// Synthesize a fallback response when the entry is missing.
    pub fallback_on_miss: bool,
}

impl ReadOptions {
    /// Plain lookup without side effects.
    pub const RAW: ReadOptions = ReadOptions {
        populate_on_miss: false,
        fallback_on_miss: false,
    };
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self::RAW
    }
}

/// Durable local store of prior responses.
///
/// The store is shared by every concurrent strategy invocation and must be
/// safe to call from several tasks at once.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Reads the response for `request`, fetching and populating the store on
    /// a miss. All retry and fallback behaviour for a miss belongs here.
    async fn resolve(
        &self,
        rule: &Rule,
        request: &Request,
        event: &Event,
        matching: &MatchingContext,
    ) -> Response;

    /// Looks up the response for `request`.
    ///
    /// Returns `Ok(None)` on a miss.
    async fn read(
        &self,
        rule: &Rule,
        request: &Request,
        event: &Event,
        matching: &MatchingContext,
        options: ReadOptions,
    ) -> StoreResult<Option<Response>>;

    /// Stores `response` for `request`.
    async fn write(&self, rule: &Rule, request: &Request, response: Response) -> StoreResult<()>;

    /// Fetches and stores every resource of `bundle`.
    async fn prime_all(&self, bundle: &[SmolStr]) -> StoreResult<()>;
}

#[async_trait]
impl<T> ContentStore for Arc<T>
where
    T: ContentStore + ?Sized,
{
    async fn resolve(
        &self,
        rule: &Rule,
        request: &Request,
        event: &Event,
        matching: &MatchingContext,
    ) -> Response {
        (**self).resolve(rule, request, event, matching).await
    }

    async fn read(
        &self,
        rule: &Rule,
        request: &Request,
        event: &Event,
        matching: &MatchingContext,
        options: ReadOptions,
    ) -> StoreResult<Option<Response>> {
        (**self).read(rule, request, event, matching, options).await
    }

    async fn write(&self, rule: &Rule, request: &Request, response: Response) -> StoreResult<()> {
        (**self).write(rule, request, response).await
    }

    async fn prime_all(&self, bundle: &[SmolStr]) -> StoreResult<()> {
        (**self).prime_all(bundle).await
    }
}
