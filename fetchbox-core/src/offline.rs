//! Connectivity check.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Synchronous "is the client offline" check.
///
/// Consulted by the remote-first strategy before calling the origin, so a
/// known-offline client fails fast instead of waiting on the network.
pub trait OfflineDetector: Send + Sync {
    /// Returns `true` when the network is known to be unreachable.
    fn is_offline(&self) -> bool;
}

/// Detector that always reports the client as online.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl OfflineDetector for AlwaysOnline {
    fn is_offline(&self) -> bool {
        false
    }
}

/// An `AtomicBool` holding the offline flag, flipped by whoever watches
/// connectivity.
impl OfflineDetector for AtomicBool {
    fn is_offline(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T> OfflineDetector for Arc<T>
where
    T: OfflineDetector + ?Sized,
{
    fn is_offline(&self) -> bool {
        (**self).is_offline()
    }
}
