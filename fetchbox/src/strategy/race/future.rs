use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{self, Poll},
};

use fetchbox_core::{Event, Fetched, Request, Response, ResponseSource, Rule, StrategyKind};
use futures::future::BoxFuture;
use http::StatusCode;
use serde_json::json;
use tracing::debug;

use super::state::{RaceState, RaceStep};
use crate::Collaborators;
use crate::metrics::record_resolution;
use crate::refresh::StoreRefresher;
use crate::strategy::substitute;

const POLL_AFTER_READY_ERROR: &str = "RaceFuture can't be polled after finishing";

/// Network branch of a race.
pub type NetworkFuture = BoxFuture<'static, Fetched>;
/// Store branch of a race, `None` on a miss.
pub type StoreFuture = BoxFuture<'static, Option<Response>>;

/// Everything a race needs besides its two branches.
#[derive(Debug)]
pub(crate) struct RaceContext {
    pub(crate) collaborators: Collaborators,
    pub(crate) refresher: StoreRefresher,
    pub(crate) rule: Rule,
    pub(crate) request: Request,
    pub(crate) event: Event,
}

impl RaceContext {
    fn refresh_if_cacheable(&self, fetched: &Fetched) {
        if let Fetched::Success(response) = fetched
            && self.rule.action.cache
        {
            self.refresher
                .refresh(&self.rule, &self.request, &self.event, response);
        }
    }
}

/// Future driving both race branches and resolving exactly once.
///
/// The network branch is polled before the store branch. Once a branch wins
/// the future completes; a network branch still pending at that point is
/// handed to the offload manager so a successful response still refreshes
/// the store.
pub struct RaceFuture {
    network: Option<NetworkFuture>,
    store: Option<StoreFuture>,
    state: RaceState,
    last_failure: Option<Response>,
    ctx: Arc<RaceContext>,
    finished: bool,
}

impl RaceFuture {
    pub(crate) fn new(network: NetworkFuture, store: StoreFuture, ctx: RaceContext) -> Self {
        Self {
            network: Some(network),
            store: Some(store),
            state: RaceState::new(),
            last_failure: None,
            ctx: Arc::new(ctx),
            finished: false,
        }
    }

    /// Current branch bookkeeping.
    pub fn state(&self) -> &RaceState {
        &self.state
    }

    fn on_network(&mut self, fetched: Fetched) -> Option<Response> {
        self.ctx.refresh_if_cacheable(&fetched);

        let success = fetched.is_success();
        let step = self.state.on_network(success);
        debug!(success, ?step, "Race network branch completed");
        match (step, fetched) {
            (RaceStep::Ignore, _) => None,
            (RaceStep::Resolve(source), Fetched::Success(response)) => {
                let url = response
                    .url
                    .as_ref()
                    .unwrap_or(&self.ctx.request.uri)
                    .to_string();
                self.ctx.collaborators.step(
                    &self.ctx.event,
                    "Race resolved from network",
                    Some(json!({ "url": url })),
                );
                Some(self.resolve(response, source))
            }
            (step, fetched) => {
                let failing = fetched.into_response();
                self.ctx.collaborators.step(
                    &self.ctx.event,
                    "Race failed fetching",
                    Some(json!({
                        "status": failing.status.as_u16(),
                        "reason": failing.reason(),
                    })),
                );
                self.last_failure = Some(failing);
                self.after_failure(step)
            }
        }
    }

    fn on_store(&mut self, stored: Option<Response>) -> Option<Response> {
        let step = self.state.on_store(stored.is_some());
        debug!(hit = stored.is_some(), ?step, "Race store branch completed");
        match (step, stored) {
            (RaceStep::Resolve(source), Some(response)) => {
                self.ctx
                    .collaborators
                    .step(&self.ctx.event, "Race resolved from store", None);
                self.detach_network();
                Some(self.resolve(response, source))
            }
            (step, _) => self.after_failure(step),
        }
    }

    fn after_failure(&mut self, step: RaceStep) -> Option<Response> {
        match step {
            RaceStep::Fallback => Some(self.fallback()),
            _ => None,
        }
    }

    fn fallback(&mut self) -> Response {
        self.ctx.collaborators.step(
            &self.ctx.event,
            "Race could not fetch nor find in store",
            None,
        );
        let failing = self
            .last_failure
            .take()
            .unwrap_or_else(|| Response::new(StatusCode::BAD_GATEWAY));
        let response = substitute(&self.ctx.collaborators, &failing, &self.ctx.event);
        self.resolve(response, ResponseSource::Fallback)
    }

    fn resolve(&mut self, response: Response, source: ResponseSource) -> Response {
        self.finished = true;
        self.store = None;
        record_resolution(StrategyKind::Race, source);
        response
    }

    /// Lets a still pending network branch finish in the background. The race
    /// is already decided, so its only remaining duty is the store refresh.
    fn detach_network(&mut self) {
        let Some(network) = self.network.take() else {
            return;
        };
        let ctx = self.ctx.clone();
        self.ctx
            .collaborators
            .offload()
            .spawn("race_network", async move {
                let fetched = network.await;
                debug!(
                    success = fetched.is_success(),
                    "Race network branch completed after store win"
                );
                ctx.refresh_if_cacheable(&fetched);
            });
    }
}

impl Future for RaceFuture {
    type Output = Response;

    fn poll(self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        assert!(!this.finished, "{}", POLL_AFTER_READY_ERROR);

        if let Some(network) = this.network.as_mut()
            && let Poll::Ready(fetched) = network.as_mut().poll(cx)
        {
            this.network = None;
            if let Some(response) = this.on_network(fetched) {
                return Poll::Ready(response);
            }
        }

        if let Some(store) = this.store.as_mut()
            && let Poll::Ready(stored) = store.as_mut().poll(cx)
        {
            this.store = None;
            if let Some(response) = this.on_store(stored) {
                return Poll::Ready(response);
            }
        }

        if this.network.is_none() && this.store.is_none() {
            // Both branches gone without a winner.
            return Poll::Ready(this.fallback());
        }
        Poll::Pending
    }
}

impl std::fmt::Debug for RaceFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaceFuture")
            .field("network_pending", &self.network.is_some())
            .field("store_pending", &self.store.is_some())
            .field("state", &self.state)
            .field("finished", &self.finished)
            .finish()
    }
}
