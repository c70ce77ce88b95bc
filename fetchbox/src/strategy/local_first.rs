use fetchbox_core::{Event, MatchingContext, Request, Response, ResponseSource, Rule, StrategyKind};
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{Instrument, info_span};

use super::{Strategy, url_metadata};
use crate::metrics::record_resolution;
use crate::{BundlePrimer, Collaborators};

/// Local-first strategy.
///
/// Delegates entirely to [`ContentStore::resolve`](fetchbox_core::ContentStore::resolve):
/// read from the store, and on a miss let the store fetch and populate. The
/// store's response is returned unchanged.
#[derive(Debug, Clone)]
pub struct LocalFirst {
    collaborators: Collaborators,
    primer: BundlePrimer,
}

impl LocalFirst {
    /// Creates the strategy.
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            primer: BundlePrimer::new(collaborators.clone()),
            collaborators,
        }
    }
}

impl Strategy for LocalFirst {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LocalFirst
    }

    fn resolve(
        &self,
        rule: Rule,
        request: Request,
        event: Event,
        matching: MatchingContext,
    ) -> BoxFuture<'static, Response> {
        self.primer.prime(&rule, &event);
        self.collaborators.step(
            &event,
            "Info: Using local first strategy",
            Some(url_metadata(&request)),
        );

        let span = info_span!("strategy.local_first", uri = %request.uri);
        let collaborators = self.collaborators.clone();
        async move {
            let response = collaborators
                .store()
                .resolve(&rule, &request, &event, &matching)
                .await;
            record_resolution(StrategyKind::LocalFirst, ResponseSource::Store);
            response
        }
        .instrument(span)
        .boxed()
    }
}
