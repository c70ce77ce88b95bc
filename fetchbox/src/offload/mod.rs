//! Background task execution.
//!
//! Strategies never wait for their side effects. Bundle priming, store
//! refreshes and the losing network branch of a race are handed to an
//! [`OffloadManager`], which runs them as detached tokio tasks.
//!
//! # Example
//!
//! ```ignore
//! use fetchbox::offload::{OffloadConfig, OffloadManager};
//!
//! let manager = OffloadManager::new(OffloadConfig::default());
//!
//! manager.spawn("store_refresh", async {
//!     // write the fresh response into the store
//! });
//! ```

mod manager;
mod policy;

pub use manager::{OffloadHandle, OffloadKey, OffloadManager};
pub use policy::{OffloadConfig, OffloadConfigBuilder, TimeoutPolicy};
