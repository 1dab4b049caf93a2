//! # Status Dispatcher
//!
//! Routes decoded status messages to the callbacks and cached values of the
//! addressed handle. Messages are processed one at a time, in arrival order,
//! each completely (callbacks included) before the call returns.
//!
//! | update            | effect                                              |
//! |-------------------|-----------------------------------------------------|
//! | `StateChanged`    | `on_status_change(code)`; `on_complete()` if Stopped |
//! | `DurationUpdated` | cached duration                                     |
//! | `PositionUpdated` | cached position                                     |
//! | `ErrorOccurred`   | `on_error(failure)`                                 |
//! | anything else     | diagnostic, no state change                         |
//!
//! Messages for unknown ids are reported and dropped. Every outcome is also
//! mirrored on the event bus when one is attached.

use crate::registry::MediaRegistry;
use crate::state::PlaybackState;
use crate::status::{StatusMessage, StatusUpdate};
use core_runtime::events::{CoreEvent, EventBus, MediaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StatusDispatcher {
    registry: Arc<MediaRegistry>,
    event_bus: Option<EventBus>,
}

impl StatusDispatcher {
    pub fn new(registry: Arc<MediaRegistry>) -> Self {
        Self {
            registry,
            event_bus: None,
        }
    }

    /// Mirrors dispatch outcomes on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn registry(&self) -> &Arc<MediaRegistry> {
        &self.registry
    }

    /// Entry point in wire terms: decodes `value` for `msg_type` and
    /// dispatches it.
    pub fn on_status(&self, id: &str, msg_type: i64, value: Value) {
        self.dispatch(StatusMessage::decode(id, msg_type, value));
    }

    /// Applies one status message. Never fails.
    pub fn dispatch(&self, message: StatusMessage) {
        let StatusMessage { id, update } = message;

        let Some(handle) = self.registry.get(&id) else {
            warn!(media_id = %id, "Status message for unknown media");
            self.emit(MediaEvent::UnknownMedia { media_id: id });
            return;
        };

        match update {
            StatusUpdate::StateChanged(state) => {
                debug!(
                    media_id = %id,
                    state,
                    label = PlaybackState::from_code(state).map_or("Unknown", PlaybackState::label),
                    "State changed"
                );
                handle.callbacks().status_change(state);
                self.emit(MediaEvent::StateChanged {
                    media_id: id.clone(),
                    state,
                });

                if state == PlaybackState::Stopped.code() {
                    handle.callbacks().complete();
                    self.emit(MediaEvent::Completed { media_id: id });
                }
            }
            StatusUpdate::DurationUpdated(duration) => {
                handle.set_duration(duration);
                self.emit(MediaEvent::DurationChanged {
                    media_id: id,
                    duration,
                });
            }
            StatusUpdate::PositionUpdated(position) => {
                handle.set_position(position);
                self.emit(MediaEvent::PositionChanged {
                    media_id: id,
                    position,
                });
            }
            StatusUpdate::ErrorOccurred(failure) => {
                debug!(media_id = %id, payload = %failure.payload(), "Native media error");
                let code = failure.code();
                handle.callbacks().error(failure);
                self.emit(MediaEvent::Error { media_id: id, code });
            }
            StatusUpdate::Unrecognized { msg_type } => {
                warn!(media_id = %id, msg_type, "Unhandled status message");
                self.emit(MediaEvent::UnhandledMessage {
                    media_id: id,
                    msg_type,
                });
            }
            StatusUpdate::Malformed { msg_type, value } => {
                warn!(media_id = %id, msg_type, value = %value, "Status value cannot be interpreted");
                self.emit(MediaEvent::UnhandledMessage {
                    media_id: id,
                    msg_type,
                });
            }
        }
    }

    fn emit(&self, event: MediaEvent) {
        if let Some(bus) = &self.event_bus {
            // No subscribers is fine.
            let _ = bus.emit(CoreEvent::Media(event));
        }
    }
}
