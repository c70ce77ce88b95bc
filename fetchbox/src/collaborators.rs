//! Collaborator wiring.
//!
//! The strategies talk to the outside world only through the traits in
//! `fetchbox-core`. [`Collaborators`] bundles one instance of each, together
//! with the [`OffloadManager`] running background side effects, and is handed
//! to [`Strategies::new`](crate::Strategies::new) once at start-up.

use std::fmt;
use std::sync::Arc;

use fetchbox_core::{
    AlwaysOnline, ContentStore, Event, FallbackProvider, OfflineDetector, OriginFetcher,
    TraceSink,
};

use crate::config::StrategiesConfig;
use crate::error::BuildError;
use crate::offload::OffloadManager;
use crate::trace::TracingSink;

/// Shared collaborator instances.
///
/// Cloning is cheap: every collaborator is reference counted and the offload
/// manager shares its task registry between clones.
#[derive(Clone)]
pub struct Collaborators {
    trace: Arc<dyn TraceSink>,
    store: Arc<dyn ContentStore>,
    origin: Arc<dyn OriginFetcher>,
    fallback: Arc<dyn FallbackProvider>,
    offline: Arc<dyn OfflineDetector>,
    offload: OffloadManager,
}

impl Collaborators {
    /// Creates a new [`CollaboratorsBuilder`].
    pub fn builder() -> CollaboratorsBuilder {
        CollaboratorsBuilder::default()
    }

    /// Trace sink.
    pub fn trace(&self) -> &Arc<dyn TraceSink> {
        &self.trace
    }

    /// Content store.
    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Origin fetcher.
    pub fn origin(&self) -> &Arc<dyn OriginFetcher> {
        &self.origin
    }

    /// Fallback provider.
    pub fn fallback(&self) -> &Arc<dyn FallbackProvider> {
        &self.fallback
    }

    /// Offline detector.
    pub fn offline(&self) -> &Arc<dyn OfflineDetector> {
        &self.offline
    }

    /// Offload manager running background side effects.
    pub fn offload(&self) -> &OffloadManager {
        &self.offload
    }

    pub(crate) fn step(&self, event: &Event, message: &str, data: Option<serde_json::Value>) {
        self.trace.step(event, message, data);
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("trace", &"...")
            .field("store", &"...")
            .field("origin", &"...")
            .field("fallback", &"...")
            .field("offline", &"...")
            .field("offload", &self.offload)
            .finish()
    }
}

/// Builder for [`Collaborators`].
///
/// The content store, origin fetcher and fallback provider are required. The
/// trace sink defaults to [`TracingSink`], the offline detector to
/// [`AlwaysOnline`] and the offload manager to [`OffloadManager::default`].
#[derive(Default)]
pub struct CollaboratorsBuilder {
    trace: Option<Arc<dyn TraceSink>>,
    store: Option<Arc<dyn ContentStore>>,
    origin: Option<Arc<dyn OriginFetcher>>,
    fallback: Option<Arc<dyn FallbackProvider>>,
    offline: Option<Arc<dyn OfflineDetector>>,
    offload: Option<OffloadManager>,
}

impl CollaboratorsBuilder {
    /// Sets the trace sink.
    pub fn trace(mut self, trace: impl TraceSink + 'static) -> Self {
        self.trace = Some(Arc::new(trace));
        self
    }

    /// Sets the content store.
    pub fn store(mut self, store: impl ContentStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Sets the origin fetcher.
    pub fn origin(mut self, origin: impl OriginFetcher + 'static) -> Self {
        self.origin = Some(Arc::new(origin));
        self
    }

    /// Sets the fallback provider.
    pub fn fallback(mut self, fallback: impl FallbackProvider + 'static) -> Self {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Sets the offline detector.
    pub fn offline(mut self, offline: impl OfflineDetector + 'static) -> Self {
        self.offline = Some(Arc::new(offline));
        self
    }

    /// Sets the offload manager.
    pub fn offload(mut self, offload: OffloadManager) -> Self {
        self.offload = Some(offload);
        self
    }

    /// Creates the offload manager from configuration.
    pub fn config(self, config: &StrategiesConfig) -> Self {
        self.offload(OffloadManager::new(config.offload_config()))
    }

    /// Builds the [`Collaborators`].
    pub fn build(self) -> Result<Collaborators, BuildError> {
        Ok(Collaborators {
            trace: self.trace.unwrap_or_else(|| Arc::new(TracingSink)),
            store: self.store.ok_or(BuildError::Missing("content store"))?,
            origin: self.origin.ok_or(BuildError::Missing("origin fetcher"))?,
            fallback: self.fallback.ok_or(BuildError::Missing("fallback provider"))?,
            offline: self.offline.unwrap_or_else(|| Arc::new(AlwaysOnline)),
            offload: self.offload.unwrap_or_default(),
        })
    }
}
