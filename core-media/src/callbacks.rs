//! Application-supplied continuations attached to a media handle.

use crate::status::MediaFailure;
use std::fmt;
use std::sync::Arc;

/// Invoked when the native side reports the Stopped state.
pub type CompletionCallback = Arc<dyn Fn() + Send + Sync>;

/// Invoked with a native failure, including failures of `create`.
pub type ErrorCallback = Arc<dyn Fn(MediaFailure) + Send + Sync>;

/// Invoked with every raw state code the native side reports.
pub type StatusCallback = Arc<dyn Fn(i64) + Send + Sync>;

/// Callback slots of a handle. Empty slots swallow their notifications.
#[derive(Clone, Default)]
pub struct MediaCallbacks {
    pub on_complete: Option<CompletionCallback>,
    pub on_error: Option<ErrorCallback>,
    pub on_status_change: Option<StatusCallback>,
}

impl MediaCallbacks {
    pub(crate) fn complete(&self) {
        if let Some(callback) = &self.on_complete {
            callback();
        }
    }

    pub(crate) fn error(&self, failure: MediaFailure) {
        if let Some(callback) = &self.on_error {
            callback(failure);
        }
    }

    pub(crate) fn status_change(&self, state: i64) {
        if let Some(callback) = &self.on_status_change {
            callback(state);
        }
    }
}

impl fmt::Debug for MediaCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaCallbacks")
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_status_change", &self.on_status_change.is_some())
            .finish()
    }
}
