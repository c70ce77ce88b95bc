//! Metrics declaration and recording helpers.
//!
//! All helpers are no-ops when the `metrics` feature is disabled.

use fetchbox_core::{ResponseSource, StrategyKind};

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    // Resolution metrics

    /// Track number of resolved requests per strategy and source.
    pub static ref RESOLUTIONS_TOTAL: &'static str = {
        metrics::describe_counter!(
            "fetchbox_resolutions_total",
            "Total number of requests resolved, by strategy and response source."
        );
        "fetchbox_resolutions_total"
    };

    // Background side effects

    /// Track number of finished bundle priming tasks.
    pub static ref BUNDLE_PRIME_TOTAL: &'static str = {
        metrics::describe_counter!(
            "fetchbox_bundle_prime_total",
            "Total number of bundle priming tasks, by result."
        );
        "fetchbox_bundle_prime_total"
    };
    /// Track number of finished store refresh tasks.
    pub static ref STORE_REFRESH_TOTAL: &'static str = {
        metrics::describe_counter!(
            "fetchbox_store_refresh_total",
            "Total number of background store writes, by result."
        );
        "fetchbox_store_refresh_total"
    };

    // Offload manager metrics

    /// Track number of offload tasks spawned.
    pub static ref OFFLOAD_TASKS_SPAWNED: &'static str = {
        metrics::describe_counter!(
            "fetchbox_offload_tasks_spawned_total",
            "Total number of offload tasks spawned."
        );
        "fetchbox_offload_tasks_spawned_total"
    };
    /// Track number of offload tasks completed.
    pub static ref OFFLOAD_TASKS_COMPLETED: &'static str = {
        metrics::describe_counter!(
            "fetchbox_offload_tasks_completed_total",
            "Total number of offload tasks completed."
        );
        "fetchbox_offload_tasks_completed_total"
    };
    /// Track number of offload tasks that timed out.
    pub static ref OFFLOAD_TASKS_TIMEOUT: &'static str = {
        metrics::describe_counter!(
            "fetchbox_offload_tasks_timeout_total",
            "Total number of offload tasks that timed out."
        );
        "fetchbox_offload_tasks_timeout_total"
    };
    /// Track number of offload tasks deduplicated (skipped).
    pub static ref OFFLOAD_TASKS_DEDUPLICATED: &'static str = {
        metrics::describe_counter!(
            "fetchbox_offload_tasks_deduplicated_total",
            "Total number of offload tasks skipped because the same key was in flight."
        );
        "fetchbox_offload_tasks_deduplicated_total"
    };
    /// Gauge of currently active offload tasks.
    pub static ref OFFLOAD_TASKS_ACTIVE: &'static str = {
        metrics::describe_gauge!(
            "fetchbox_offload_tasks_active",
            "Number of currently active offload tasks."
        );
        "fetchbox_offload_tasks_active"
    };
    /// Histogram of offload task duration.
    pub static ref OFFLOAD_TASK_DURATION: &'static str = {
        metrics::describe_histogram!(
            "fetchbox_offload_task_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of offload tasks in seconds."
        );
        "fetchbox_offload_task_duration_seconds"
    };
}

/// Record a resolved request.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_resolution(strategy: StrategyKind, source: ResponseSource) {
    metrics::counter!(
        *RESOLUTIONS_TOTAL,
        "strategy" => strategy.name(),
        "source" => source.as_str()
    )
    .increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_resolution(_strategy: StrategyKind, _source: ResponseSource) {}

/// Record the result of a bundle priming task.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_bundle_prime(success: bool) {
    metrics::counter!(*BUNDLE_PRIME_TOTAL, "result" => result_label(success)).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_bundle_prime(_success: bool) {}

/// Record the result of a background store write.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_store_refresh(success: bool) {
    metrics::counter!(*STORE_REFRESH_TOTAL, "result" => result_label(success)).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_store_refresh(_success: bool) {}

#[cfg(feature = "metrics")]
fn result_label(success: bool) -> &'static str {
    if success { "success" } else { "failure" }
}
