#![warn(missing_docs)]
//! # fetchbox-core
//!
//! Core types and collaborator traits for the fetchbox request resolution
//! strategies.
//!
//! This crate defines everything the strategies in `fetchbox` **consume**
//! without implementing it: the per-request data model and the contracts of
//! the external collaborators.
//!
//! ## Data model
//!
//! - [`Rule`] - static policy chosen by the rule matcher ([`RuleAction`] holds
//!   the cache flag and the optional resource bundle)
//! - [`Request`] - cloneable request used for I/O
//! - [`Event`] - carries the original request, used as the trace identity key
//! - [`MatchingContext`] - opaque data produced by the matcher
//! - [`Response`] / [`Fetched`] - responses and normalized fetch outcomes
//!
//! ## Collaborators
//!
//! - [`ContentStore`] - durable local store of prior responses
//! - [`OriginFetcher`] - performs the network request
//! - [`FallbackProvider`] - synthesizes a substitute when every source failed
//! - [`OfflineDetector`] - synchronous connectivity check
//! - [`TraceSink`] - per-request instrumentation steps

pub mod error;
pub mod fallback;
pub mod offline;
pub mod origin;
pub mod request;
pub mod response;
pub mod rule;
pub mod store;
pub mod trace;

pub use error::{FetchError, StoreError, UnknownStrategy};
pub use fallback::FallbackProvider;
pub use offline::{AlwaysOnline, OfflineDetector};
pub use origin::OriginFetcher;
pub use request::{Event, MatchingContext, Request};
pub use response::{Fetched, Response, ResponseSource};
pub use rule::{Rule, RuleAction, StrategyKind};
#[doc(hidden)]
pub use smol_str::SmolStr;
pub use store::{ContentStore, ReadOptions, StoreResult};
pub use trace::{NoopTraceSink, TraceSink};
