//! Trace sink backed by `tracing`.

use fetchbox_core::{Event, TraceSink};
use tracing::info;

/// [`TraceSink`] that turns every step into a `tracing` event.
///
/// The event's request method and URI are attached as fields, so steps of one
/// resolution can be correlated in the log output. This is the default sink of
/// [`Collaborators`](crate::Collaborators).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn step(&self, event: &Event, message: &str, data: Option<serde_json::Value>) {
        let request = event.request();
        match data {
            Some(data) => info!(
                target: "fetchbox::trace",
                method = %request.method,
                uri = %request.uri,
                %data,
                "{message}"
            ),
            None => info!(
                target: "fetchbox::trace",
                method = %request.method,
                uri = %request.uri,
                "{message}"
            ),
        }
    }
}
