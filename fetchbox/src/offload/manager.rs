//! OffloadManager implementation for background task execution.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use smol_str::SmolStr;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

use super::policy::{OffloadConfig, TimeoutPolicy};

#[cfg(feature = "metrics")]
use crate::metrics::{
    OFFLOAD_TASK_DURATION, OFFLOAD_TASKS_ACTIVE, OFFLOAD_TASKS_COMPLETED,
    OFFLOAD_TASKS_DEDUPLICATED, OFFLOAD_TASKS_SPAWNED, OFFLOAD_TASKS_TIMEOUT,
};

/// Key for identifying offloaded tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OffloadKey {
    /// Key derived from a resource bundle (enables deduplication of priming).
    Bundle(SmolStr),
    /// Auto-generated key with a kind prefix.
    Generated {
        /// Kind of the task (e.g., "store_refresh", "race_network").
        kind: SmolStr,
        /// Unique identifier within the kind.
        id: u64,
    },
}

impl OffloadKey {
    /// Key for priming `bundle`. Equal bundles produce equal keys.
    pub fn bundle(bundle: &[SmolStr]) -> Self {
        Self::Bundle(SmolStr::from(bundle.join("\n")))
    }

    /// Returns the key type for metrics labels and spans.
    ///
    /// For `Bundle` keys returns "bundle_prime".
    /// For `Generated` keys returns the kind.
    pub fn key_type(&self) -> SmolStr {
        match self {
            Self::Bundle(_) => SmolStr::new_static("bundle_prime"),
            Self::Generated { kind, .. } => kind.clone(),
        }
    }
}

/// Handle to a spawned offload task.
///
/// The entry stays registered until the task's future is dropped, whether it
/// completed, timed out, panicked or was aborted.
#[derive(Debug)]
pub struct OffloadHandle {
    handle: JoinHandle<()>,
    serial: u64,
    done: watch::Receiver<()>,
}

impl OffloadHandle {
    /// Check if the task is finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort the task.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// Unregisters a task when its future is dropped. Only removes the entry it
/// was created for, never a later task registered under the same key.
struct Registration {
    inner: Arc<OffloadManagerInner>,
    key: OffloadKey,
    serial: u64,
    _done: watch::Sender<()>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.inner
            .tasks
            .remove_if(&self.key, |_, handle| handle.serial == self.serial);
    }
}

#[derive(Debug)]
struct OffloadManagerInner {
    config: OffloadConfig,
    tasks: DashMap<OffloadKey, OffloadHandle>,
    key_counter: AtomicU64,
    serials: AtomicU64,
    slots: Option<Arc<Semaphore>>,
}

/// Manager for offloading tasks to background execution.
///
/// Cloning is cheap; clones share the task registry. Tasks are spawned on the
/// ambient tokio runtime, so every spawn must happen inside one.
#[derive(Clone, Debug)]
pub struct OffloadManager {
    inner: Arc<OffloadManagerInner>,
}

impl OffloadManager {
    /// Create a new OffloadManager with the given configuration.
    pub fn new(config: OffloadConfig) -> Self {
        let slots = config
            .max_concurrent_tasks
            .map(|max| Arc::new(Semaphore::new(max.max(1))));
        Self {
            inner: Arc::new(OffloadManagerInner {
                config,
                tasks: DashMap::new(),
                key_counter: AtomicU64::new(0),
                serials: AtomicU64::new(0),
                slots,
            }),
        }
    }

    /// Create a new OffloadManager with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(OffloadConfig::default())
    }

    /// The configuration this manager was built with.
    pub fn config(&self) -> &OffloadConfig {
        &self.inner.config
    }

    fn next_key(&self, kind: impl Into<SmolStr>) -> OffloadKey {
        let id = self.inner.key_counter.fetch_add(1, Ordering::Relaxed);
        OffloadKey::Generated {
            kind: kind.into(),
            id,
        }
    }

    /// Spawn a task with auto-generated key and specified kind.
    ///
    /// The kind is used for metrics labels and tracing.
    pub fn spawn<F>(&self, kind: impl Into<SmolStr>, task: F) -> OffloadKey
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = self.next_key(kind);
        // Insert under the entry lock so a fast task cannot unregister itself
        // before it is registered.
        self.inner
            .tasks
            .entry(key.clone())
            .or_insert_with(|| self.spawn_inner(task, key.clone()));
        Self::record_spawned(&key);
        key
    }

    /// Spawn a task with a specific key.
    ///
    /// If deduplication is enabled and a task with the same key is still in
    /// flight, the new task is dropped without running. With deduplication
    /// disabled the task is spawned under a generated key of the same kind.
    ///
    /// Returns `true` if the task was spawned, `false` if it was deduplicated.
    pub fn spawn_with_key<F>(&self, key: OffloadKey, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.inner.config.deduplicate {
            self.spawn(key.key_type(), task);
            return true;
        }

        match self.inner.tasks.entry(key.clone()) {
            Entry::Occupied(_) => {
                debug!(?key, "Task deduplicated - already in flight");
                #[cfg(feature = "metrics")]
                metrics::counter!(*OFFLOAD_TASKS_DEDUPLICATED, "key_type" => key.key_type().to_string())
                    .increment(1);
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(self.spawn_inner(task, key.clone()));
                Self::record_spawned(&key);
                true
            }
        }
    }

    /// Get the number of currently active tasks.
    pub fn active_task_count(&self) -> usize {
        self.inner.tasks.iter().filter(|e| !e.is_finished()).count()
    }

    /// Check if a task with the given key is in flight.
    pub fn is_in_flight(&self, key: &OffloadKey) -> bool {
        self.inner.tasks.get(key).is_some_and(|h| !h.is_finished())
    }

    /// Cancel all running tasks.
    pub fn cancel_all(&self) {
        for entry in self.inner.tasks.iter() {
            entry.abort();
        }
    }

    /// Wait until every tracked task, including tasks spawned by tracked
    /// tasks, has completed.
    ///
    /// Waiting does not touch the registry: a keyed task still counts as in
    /// flight, and still deduplicates, until it has actually finished.
    pub async fn wait_all(&self) {
        loop {
            let pending: Vec<watch::Receiver<()>> = self
                .inner
                .tasks
                .iter()
                .map(|entry| entry.done.clone())
                .collect();
            if pending.is_empty() {
                break;
            }
            for mut done in pending {
                // Nothing is ever sent; this resolves once the task drops its registration.
                let _ = done.changed().await;
            }
        }
    }

    /// Wait for all tasks with a timeout.
    ///
    /// Returns `true` if all tasks completed within the timeout,
    /// `false` if the timeout was reached.
    pub async fn wait_all_timeout(&self, timeout: std::time::Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_all()).await.is_ok()
    }

    fn spawn_inner<F>(&self, task: F, key: OffloadKey) -> OffloadHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let timeout_policy = self.inner.config.timeout_policy;
        let serial = self.inner.serials.fetch_add(1, Ordering::Relaxed);
        let (done_tx, done) = watch::channel(());
        let registration = Registration {
            inner: self.inner.clone(),
            key: key.clone(),
            serial,
            _done: done_tx,
        };
        let slots = self.inner.slots.clone();
        let key_type = key.key_type();

        let span = info_span!(
            "offload_task",
            key_type = %key_type,
            key = ?key,
        );

        let handle = tokio::spawn(
            async move {
                let _registration = registration;
                let _permit = match slots {
                    Some(slots) => slots.acquire_owned().await.ok(),
                    None => None,
                };
                let start = Instant::now();
                match timeout_policy {
                    TimeoutPolicy::None => {
                        task.await;
                        Self::record_completion(start, &key_type);
                    }
                    TimeoutPolicy::Cancel(duration) => {
                        match tokio::time::timeout(duration, task).await {
                            Ok(()) => Self::record_completion(start, &key_type),
                            Err(_) => {
                                warn!(?key, "Offload task cancelled due to timeout");
                                Self::record_timeout(start, &key_type);
                            }
                        }
                    }
                    TimeoutPolicy::Warn(duration) => {
                        task.await;
                        let elapsed = start.elapsed();
                        if elapsed > duration {
                            warn!(
                                ?key,
                                elapsed_ms = elapsed.as_millis(),
                                threshold_ms = duration.as_millis(),
                                "Offload task exceeded timeout threshold"
                            );
                        }
                        Self::record_completion(start, &key_type);
                    }
                }
            }
            .instrument(span),
        );

        OffloadHandle {
            handle,
            serial,
            done,
        }
    }

    #[cfg(feature = "metrics")]
    fn record_spawned(key: &OffloadKey) {
        let key_type = key.key_type().to_string();
        metrics::counter!(*OFFLOAD_TASKS_SPAWNED, "key_type" => key_type.clone()).increment(1);
        metrics::gauge!(*OFFLOAD_TASKS_ACTIVE, "key_type" => key_type).increment(1.0);
    }

    #[cfg(not(feature = "metrics"))]
    #[inline]
    fn record_spawned(_key: &OffloadKey) {}

    #[cfg(feature = "metrics")]
    fn record_completion(start: Instant, key_type: &SmolStr) {
        let duration = start.elapsed().as_secs_f64();
        metrics::counter!(*OFFLOAD_TASKS_COMPLETED, "key_type" => key_type.to_string())
            .increment(1);
        metrics::gauge!(*OFFLOAD_TASKS_ACTIVE, "key_type" => key_type.to_string()).decrement(1.0);
        metrics::histogram!(*OFFLOAD_TASK_DURATION, "key_type" => key_type.to_string())
            .record(duration);
    }

    #[cfg(not(feature = "metrics"))]
    #[inline]
    fn record_completion(_start: Instant, _key_type: &SmolStr) {}

    #[cfg(feature = "metrics")]
    fn record_timeout(start: Instant, key_type: &SmolStr) {
        let duration = start.elapsed().as_secs_f64();
        metrics::counter!(*OFFLOAD_TASKS_TIMEOUT, "key_type" => key_type.to_string()).increment(1);
        metrics::gauge!(*OFFLOAD_TASKS_ACTIVE, "key_type" => key_type.to_string()).decrement(1.0);
        metrics::histogram!(*OFFLOAD_TASK_DURATION, "key_type" => key_type.to_string())
            .record(duration);
    }

    #[cfg(not(feature = "metrics"))]
    #[inline]
    fn record_timeout(_start: Instant, _key_type: &SmolStr) {}
}

impl Default for OffloadManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}
