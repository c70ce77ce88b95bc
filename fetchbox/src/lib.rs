//! # fetchbox
//!
//! Request resolution strategies reconciling a durable local content store
//! with a remote origin.
//!
//! A dispatcher picks a [`Strategy`] from the rule matched for a request and
//! awaits the single [`Response`] it resolves to:
//!
//! | Strategy | Alias | Sources |
//! |----------|-------|---------|
//! | `local-first` | `offline-first` | store read-through |
//! | `remote-first` | `online-first` | network, then store, then fallback |
//! | `race` | `fastest` | network and store in parallel, then fallback |
//!
//! Every strategy primes the rule's resource bundle in the background
//! ([`BundlePrimer`]) and records trace steps through the configured
//! [`TraceSink`].
//!
//! ## Wiring
//!
//! ```ignore
//! use fetchbox::{Collaborators, Strategies};
//!
//! let collaborators = Collaborators::builder()
//!     .store(my_store)
//!     .origin(my_fetcher)
//!     .fallback(my_error_pages)
//!     .build()?;
//! let strategies = Strategies::new(collaborators);
//!
//! let response = strategies.dispatch(rule, request, event, matching).await;
//! ```
//!
//! ## Feature flags
//!
//! - `metrics` - counters and histograms through the `metrics` crate
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod collaborators;
pub mod config;

/// Error types.
///
/// Strategies never fail: every path resolves to a response. The errors here
/// come from the collaborators ([`StoreError`], [`FetchError`]), from wiring
/// ([`BuildError`]) and from configuration ([`ConfigError`]).
pub mod error;

pub mod metrics;
pub mod offload;
mod primer;
mod refresh;
pub mod registry;
pub mod strategy;
pub mod trace;

pub use collaborators::{Collaborators, CollaboratorsBuilder};
pub use config::StrategiesConfig;
pub use error::{BuildError, ConfigError};
pub use primer::BundlePrimer;
pub use registry::Strategies;
pub use strategy::{LocalFirst, Race, RemoteFirst, Strategy};
pub use trace::TracingSink;

pub use fetchbox_core::{
    AlwaysOnline, ContentStore, Event, FallbackProvider, FetchError, Fetched, MatchingContext,
    NoopTraceSink, OfflineDetector, OriginFetcher, ReadOptions, Request, Response,
    ResponseSource, Rule, RuleAction, StoreError, StoreResult, StrategyKind, TraceSink,
    UnknownStrategy,
};

/// The `fetchbox` prelude.
///
/// ```rust
/// use fetchbox::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Collaborators, ContentStore, Event, FallbackProvider, MatchingContext, OriginFetcher,
        Request, Response, Rule, Strategies, Strategy, StrategyKind,
    };
}
