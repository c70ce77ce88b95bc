//! Runtime configuration for the strategies.
//!
//! Only the background execution of side effects is configurable; which
//! strategy handles a request is decided by rules, not by this file.
//!
//! ```yaml
//! offload:
//!   max_concurrent_tasks: 16
//!   timeout: 30s
//!   on_timeout: cancel
//!   deduplicate: false
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::offload::{OffloadConfig, TimeoutPolicy};

/// What to do with a background task that exceeds [`OffloadSettings::timeout`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutAction {
    /// Cancel the task.
    #[default]
    Cancel,
    /// Log a warning and let the task finish.
    Warn,
}

/// Serializable form of [`OffloadConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffloadSettings {
    /// Maximum number of background tasks running at once.
    #[serde(default)]
    pub max_concurrent_tasks: Option<usize>,
    /// Time limit for a background task (e.g., "5s", "500ms", "1m").
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    /// Action taken when the time limit is exceeded.
    #[serde(default)]
    pub on_timeout: TimeoutAction,
    /// Skip priming a bundle that is already being primed. Off unless set.
    #[serde(default)]
    pub deduplicate: bool,
}

impl From<OffloadSettings> for OffloadConfig {
    fn from(settings: OffloadSettings) -> Self {
        let timeout_policy = match (settings.timeout, settings.on_timeout) {
            (None, _) => TimeoutPolicy::None,
            (Some(duration), TimeoutAction::Cancel) => TimeoutPolicy::Cancel(duration),
            (Some(duration), TimeoutAction::Warn) => TimeoutPolicy::Warn(duration),
        };
        OffloadConfig {
            max_concurrent_tasks: settings.max_concurrent_tasks,
            timeout_policy,
            deduplicate: settings.deduplicate,
        }
    }
}

/// Top-level strategies configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategiesConfig {
    /// Background task execution.
    #[serde(default)]
    pub offload: OffloadSettings,
}

impl StrategiesConfig {
    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_saphyr::from_str(yaml)?)
    }

    /// The offload manager configuration.
    pub fn offload_config(&self) -> OffloadConfig {
        self.offload.clone().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = StrategiesConfig::from_yaml("{}").unwrap();
        assert_eq!(config, StrategiesConfig::default());
        assert_eq!(config.offload_config(), OffloadConfig::default());
    }

    #[test]
    fn test_full_document() {
        let yaml = r#"
offload:
  max_concurrent_tasks: 8
  timeout: 250ms
  on_timeout: warn
  deduplicate: true
"#;
        let config = StrategiesConfig::from_yaml(yaml).unwrap();
        let offload = config.offload_config();
        assert_eq!(offload.max_concurrent_tasks, Some(8));
        assert_eq!(
            offload.timeout_policy,
            TimeoutPolicy::Warn(Duration::from_millis(250))
        );
        assert!(offload.deduplicate);
    }

    #[test]
    fn test_timeout_defaults_to_cancel() {
        let config = StrategiesConfig::from_yaml("offload:\n  timeout: 2s\n").unwrap();
        assert_eq!(
            config.offload_config().timeout_policy,
            TimeoutPolicy::Cancel(Duration::from_secs(2))
        );
        assert!(!config.offload.deduplicate);
    }

    #[test]
    fn test_invalid_document() {
        let err = StrategiesConfig::from_yaml("offload:\n  timeout: soon\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
