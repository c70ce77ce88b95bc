use thiserror::Error;

pub use fetchbox_core::{FetchError, StoreError, UnknownStrategy};

/// Errors raised while wiring [`Collaborators`](crate::Collaborators).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A required collaborator was not supplied to the builder.
    #[error("missing required collaborator: {0}")]
    Missing(&'static str),
}

/// Errors raised while loading [`StrategiesConfig`](crate::config::StrategiesConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document could not be parsed.
    #[error("invalid strategies configuration: {0}")]
    Parse(#[from] serde_saphyr::Error),
}
