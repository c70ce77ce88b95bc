//! Fallback provider contract.

use std::sync::Arc;

use crate::{Event, Response};

/// Synthesizes a usable substitute when neither network nor store could answer.
///
/// Called at most once per strategy invocation, and only on total failure.
pub trait FallbackProvider: Send + Sync {
    /// Builds a substitute for `failing`, requested at `path`.
    fn substitute(&self, failing: &Response, path: &str, event: &Event) -> Response;
}

impl<T> FallbackProvider for Arc<T>
where
    T: FallbackProvider + ?Sized,
{
    fn substitute(&self, failing: &Response, path: &str, event: &Event) -> Response {
        (**self).substitute(failing, path, event)
    }
}
