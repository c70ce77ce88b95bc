//! Offload task policies and configuration.

use std::time::Duration;

/// Policy for background tasks that run too long.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// No timeout - task runs until completion.
    #[default]
    None,
    /// Cancel task after specified duration.
    Cancel(Duration),
    /// Log warning after duration but let task continue.
    Warn(Duration),
}

/// Configuration for the [`OffloadManager`](super::OffloadManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffloadConfig {
    /// Maximum number of background tasks running at once.
    /// Tasks over the limit wait for a free slot. `None` means unlimited.
    pub max_concurrent_tasks: Option<usize>,
    /// Timeout policy for spawned tasks.
    pub timeout_policy: TimeoutPolicy,
    /// Skip keyed tasks whose key is already in flight (bundle priming).
    /// Off by default, so every request primes its bundle.
    pub deduplicate: bool,
}

impl Default for OffloadConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: None,
            timeout_policy: TimeoutPolicy::None,
            deduplicate: false,
        }
    }
}

impl OffloadConfig {
    /// Create a new builder for OffloadConfig.
    pub fn builder() -> OffloadConfigBuilder {
        OffloadConfigBuilder::default()
    }
}

/// Builder for [`OffloadConfig`].
#[derive(Debug, Clone, Default)]
pub struct OffloadConfigBuilder {
    config: OffloadConfig,
}

impl OffloadConfigBuilder {
    /// Limit the number of background tasks running at once.
    pub fn max_concurrent_tasks(mut self, max: usize) -> Self {
        self.config.max_concurrent_tasks = Some(max);
        self
    }

    /// Set timeout policy.
    pub fn timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.config.timeout_policy = policy;
        self
    }

    /// Cancel tasks running longer than `duration`.
    pub fn timeout(self, duration: Duration) -> Self {
        self.timeout_policy(TimeoutPolicy::Cancel(duration))
    }

    /// Enable or disable deduplication of keyed tasks.
    pub fn deduplicate(mut self, enabled: bool) -> Self {
        self.config.deduplicate = enabled;
        self
    }

    /// Build the OffloadConfig.
    pub fn build(self) -> OffloadConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default() {
        assert_eq!(OffloadConfig::builder().build(), OffloadConfig::default());
        assert!(!OffloadConfig::default().deduplicate);
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = OffloadConfig::builder()
            .max_concurrent_tasks(4)
            .timeout(Duration::from_secs(3))
            .deduplicate(true)
            .build();
        assert_eq!(config.max_concurrent_tasks, Some(4));
        assert_eq!(
            config.timeout_policy,
            TimeoutPolicy::Cancel(Duration::from_secs(3))
        );
        assert!(config.deduplicate);
    }
}
