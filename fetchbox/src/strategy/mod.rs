//! Resolution strategies.
//!
//! | Strategy | Sources | On failure |
//! |----------|---------|------------|
//! | [`LocalFirst`] | store read-through | handled by the store |
//! | [`RemoteFirst`] | network, then store | fallback substitute |
//! | [`Race`] | network and store in parallel | fallback substitute |
//!
//! Every strategy primes the rule's bundle in the background, records an
//! informational trace step and resolves to exactly one [`Response`]. No
//! strategy returns an error: failures surface as status codes and trace
//! steps.

mod local_first;
pub mod race;
mod remote_first;

pub use local_first::LocalFirst;
pub use race::Race;
pub use remote_first::RemoteFirst;

use fetchbox_core::{Event, MatchingContext, ReadOptions, Request, Response, Rule, StrategyKind};
use futures::future::BoxFuture;
use serde_json::json;
use tracing::warn;

use crate::Collaborators;

/// A named resolution policy.
pub trait Strategy: Send + Sync {
    /// Which policy this is.
    fn kind(&self) -> StrategyKind;

    /// Resolves `request` to a single response.
    ///
    /// Background side effects (bundle priming, store refresh) are started
    /// here or while the returned future runs, and are never awaited by it.
    fn resolve(
        &self,
        rule: Rule,
        request: Request,
        event: Event,
        matching: MatchingContext,
    ) -> BoxFuture<'static, Response>;
}

/// Metadata attached to the "Using ... strategy" trace step.
pub(crate) fn url_metadata(request: &Request) -> serde_json::Value {
    json!({ "url": request.uri.to_string() })
}

/// Raw store lookup used when the strategy owns the fallback decision.
///
/// A store error counts as a miss.
pub(crate) async fn read_stored(
    collaborators: &Collaborators,
    rule: &Rule,
    request: &Request,
    event: &Event,
    matching: &MatchingContext,
) -> Option<Response> {
    match collaborators
        .store()
        .read(rule, request, event, matching, ReadOptions::RAW)
        .await
    {
        Ok(stored) => stored,
        Err(error) => {
            warn!(%error, uri = %request.uri, "Store lookup failed, treating as miss");
            None
        }
    }
}

/// Asks the fallback provider for a substitute of `failing`, keyed by the
/// path of the original request.
pub(crate) fn substitute(
    collaborators: &Collaborators,
    failing: &Response,
    event: &Event,
) -> Response {
    collaborators
        .fallback()
        .substitute(failing, event.request().path(), event)
}
