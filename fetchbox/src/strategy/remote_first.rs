use fetchbox_core::{
    Event, Fetched, MatchingContext, Request, Response, ResponseSource, Rule, StrategyKind,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{Instrument, debug, info_span};

use super::{Strategy, read_stored, substitute, url_metadata};
use crate::metrics::record_resolution;
use crate::refresh::StoreRefresher;
use crate::{BundlePrimer, Collaborators};

/// Remote-first strategy.
///
/// Fetches from the origin. A `200` is returned as is (and written back to the
/// store in the background when the rule asks for caching). Anything else,
/// including a rejected fetch, falls back to the store and then to the
/// fallback provider.
///
/// When the offline detector reports the client offline, the origin is not
/// called at all: a local `404 offline` response takes the failure path
/// straight away.
#[derive(Debug, Clone)]
pub struct RemoteFirst {
    collaborators: Collaborators,
    primer: BundlePrimer,
    refresher: StoreRefresher,
}

impl RemoteFirst {
    /// Creates the strategy.
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            primer: BundlePrimer::new(collaborators.clone()),
            refresher: StoreRefresher::new(collaborators.clone()),
            collaborators,
        }
    }
}

impl Strategy for RemoteFirst {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RemoteFirst
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
            "Info: Using remote first strategy",
            Some(url_metadata(&request)),
        );

        let offline = self.collaborators.offline().is_offline();
        let span = info_span!("strategy.remote_first", uri = %request.uri, offline);
        let collaborators = self.collaborators.clone();
        let refresher = self.refresher.clone();

        async move {
            let fetched = if offline {
                debug!("Client is offline, skipping the network");
                Fetched::Failure(Response::offline())
            } else {
                let result = collaborators
                    .origin()
                    .fetch(&rule, request.clone(), &event, &matching)
                    .await;
                Fetched::from_result(result)
            };

            let (response, source) = match fetched {
                Fetched::Success(response) => {
                    if rule.action.cache {
                        refresher.refresh(&rule, &request, &event, &response);
                    }
                    (response, ResponseSource::Network)
                }
                Fetched::Failure(failing) => {
                    debug!(status = %failing.status, "Network failed, looking in store");
                    match read_stored(&collaborators, &rule, &request, &event, &matching).await {
                        Some(stored) => (stored, ResponseSource::Store),
                        None => (
                            substitute(&collaborators, &failing, &event),
                            ResponseSource::Fallback,
                        ),
                    }
                }
            };

            record_resolution(StrategyKind::RemoteFirst, source);
            response
        }
        .instrument(span)
        .boxed()
    }
}
