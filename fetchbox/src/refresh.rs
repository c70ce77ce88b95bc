//! Background store refresh.

use fetchbox_core::{Event, Request, Response, Rule};
use serde_json::json;
use tracing::warn;

use crate::Collaborators;
use crate::metrics::record_store_refresh;

/// Writes successful network responses back to the store without delaying
/// the strategy that produced them.
#[derive(Debug, Clone)]
pub(crate) struct StoreRefresher {
    collaborators: Collaborators,
}

impl StoreRefresher {
    pub(crate) fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    /// Spawns the write of `response` for `request`.
    pub(crate) fn refresh(
        &self,
        rule: &Rule,
        request: &Request,
        event: &Event,
        response: &Response,
    ) {
        let collaborators = self.collaborators.clone();
        let rule = rule.clone();
        let request = request.clone();
        let event = event.clone();
        let response = response.clone();

        self.collaborators.offload().spawn("store_refresh", async move {
            match collaborators.store().write(&rule, &request, response).await {
                Ok(()) => {
                    collaborators.step(&event, "Updated cache", None);
                    record_store_refresh(true);
                }
                Err(error) => {
                    warn!(%error, uri = %request.uri, "Could not update cache");
                    collaborators.step(
                        &event,
                        "Could not update cache",
                        Some(json!({ "error": error.to_string() })),
                    );
                    record_store_refresh(false);
                }
            }
        });
    }
}
