//! Race strategy.
//!
//! The network and the store are queried at the same time and the first
//! usable answer wins:
//!
//! ```text
//!                 ┌─ network 200 ──────────────▶ resolve (network)
//!  resolve() ─────┤
//!                 └─ store hit ────────────────▶ resolve (store)
//!
//!  network != 200 and store miss ──────────────▶ resolve (fallback)
//! ```
//!
//! Exactly one of these resolutions happens per invocation. A successful
//! network response refreshes the store (when the rule caches) whether or
//! not it won.

mod future;
mod state;

pub use future::{NetworkFuture, RaceFuture, StoreFuture};
pub use state::{RaceState, RaceStep};

use fetchbox_core::{Event, Fetched, MatchingContext, Request, Response, Rule, StrategyKind};
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{Instrument, info_span};

use super::{Strategy, read_stored, url_metadata};
use crate::refresh::StoreRefresher;
use crate::{BundlePrimer, Collaborators};
use future::RaceContext;

/// Race strategy, see the [module documentation](self).
#[derive(Debug, Clone)]
pub struct Race {
    collaborators: Collaborators,
    primer: BundlePrimer,
    refresher: StoreRefresher,
}

impl Race {
    /// Creates the strategy.
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            primer: BundlePrimer::new(collaborators.clone()),
            refresher: StoreRefresher::new(collaborators.clone()),
            collaborators,
        }
    }

    /// Builds the race future without instrumenting or boxing it.
    pub fn race(
        &self,
        rule: Rule,
        request: Request,
        event: Event,
        matching: MatchingContext,
    ) -> RaceFuture {
        self.primer.prime(&rule, &event);
        self.collaborators.step(
            &event,
            "Info: Using race strategy",
            Some(url_metadata(&request)),
        );

        let network = {
            let collaborators = self.collaborators.clone();
            let rule = rule.clone();
            let request = request.clone();
            let event = event.clone();
            let matching = matching.clone();
            async move {
                let result = collaborators
                    .origin()
                    .fetch(&rule, request, &event, &matching)
                    .await;
                Fetched::from_result(result)
            }
            .boxed()
        };

        let store = {
            let collaborators = self.collaborators.clone();
            let rule = rule.clone();
            let request = request.clone();
            let event = event.clone();
            async move { read_stored(&collaborators, &rule, &request, &event, &matching).await }
                .boxed()
        };

        RaceFuture::new(
            network,
            store,
            RaceContext {
                collaborators: self.collaborators.clone(),
                refresher: self.refresher.clone(),
                rule,
                request,
                event,
            },
        )
    }
}

impl Strategy for Race {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Race
    }

    fn resolve(
        &self,
        rule: Rule,
        request: Request,
        event: Event,
        matching: MatchingContext,
    ) -> BoxFuture<'static, Response> {
        let span = info_span!("strategy.race", uri = %request.uri);
        self.race(rule, request, event, matching)
            .instrument(span)
            .boxed()
    }
}
