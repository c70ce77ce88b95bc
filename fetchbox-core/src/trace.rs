//! Per-request instrumentation contract.

use std::sync::Arc;

use crate::Event;

/// Records named steps of a resolution, keyed by the originating event.
///
/// Steps are fire-and-forget: implementations must not fail observably and
/// should return quickly, since strategies call them inline.
pub trait TraceSink: Send + Sync {
    /// Records `message` with optional structured metadata.
    fn step(&self, event: &Event, message: &str, data: Option<serde_json::Value>);
}

/// Sink that discards every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTraceSink;

impl TraceSink for NoopTraceSink {
    fn step(&self, _event: &Event, _message: &str, _data: Option<serde_json::Value>) {}
}

impl<T> TraceSink for Arc<T>
where
    T: TraceSink + ?Sized,
{
    fn step(&self, event: &Event, message: &str, data: Option<serde_json::Value>) {
        (**self).step(event, message, data)
    }
}
