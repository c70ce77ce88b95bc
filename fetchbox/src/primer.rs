//! Background priming of resource bundles.
//!
//! Every strategy calls [`BundlePrimer::prime`] before doing its own work.
//! Priming is fire-and-forget: the strategy never waits for it, and its
//! outcome is visible only through trace steps, a log line and metrics.

use fetchbox_core::{Event, Rule};
use serde_json::json;
use tracing::warn;

use crate::Collaborators;
use crate::metrics::record_bundle_prime;
use crate::offload::OffloadKey;

/// Asks the content store to prime a rule's bundle in the background.
#[derive(Debug, Clone)]
pub struct BundlePrimer {
    collaborators: Collaborators,
}

impl BundlePrimer {
    /// Creates a primer using the store, trace sink and offload manager of
    /// `collaborators`.
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    /// Schedules priming of `rule`'s bundle.
    ///
    /// Does nothing for rules without a bundle. Returns `true` when a priming
    /// task was spawned, `false` when there was nothing to prime or, with
    /// deduplication enabled, the same bundle is already being primed. An
    /// empty bundle is still handed to the store.
    pub fn prime(&self, rule: &Rule, event: &Event) -> bool {
        let Some(bundle) = rule.bundle() else {
            return false;
        };
        let metadata = json!({ "bundle": bundle });

        self.collaborators.step(
            event,
            "Will load and cache bundle in background",
            Some(metadata.clone()),
        );

        let key = OffloadKey::bundle(bundle);
        let bundle = bundle.to_vec();
        let collaborators = self.collaborators.clone();
        let task_event = event.clone();
        let task_metadata = metadata.clone();

        let spawned = self.collaborators.offload().spawn_with_key(key, async move {
            match collaborators.store().prime_all(&bundle).await {
                Ok(()) => {
                    collaborators.step(
                        &task_event,
                        "Bundle loaded and cached in background",
                        Some(task_metadata),
                    );
                    record_bundle_prime(true);
                }
                Err(error) => {
                    warn!(%error, ?bundle, "Could not load and cache all the bundle files");
                    collaborators.step(
                        &task_event,
                        "Could not load and cache bundle",
                        Some(task_metadata),
                    );
                    record_bundle_prime(false);
                }
            }
        });

        if !spawned {
            self.collaborators.step(
                event,
                "Bundle already loading in background",
                Some(metadata),
            );
        }
        spawned
    }
}
