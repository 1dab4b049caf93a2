//! # Inbound Message Router
//!
//! Receives every message the native side pushes through the `messageChannel`
//! subscription and forwards status envelopes to the [`StatusDispatcher`].
//!
//! The native side only ever sends `status` envelopes. Anything else is a
//! contract breach: [`MessageRouter::route`] returns it as an error instead of
//! dropping it, and the channel continuation logs it at `error` level and
//! publishes a [`ChannelEvent::ProtocolViolation`].

use crate::dispatcher::StatusDispatcher;
use crate::error::Result;
use crate::status::decode_envelope;
use bridge_traits::SuccessCallback;
use core_runtime::events::{ChannelEvent, CoreEvent, EventBus};
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

pub struct MessageRouter {
    dispatcher: Arc<StatusDispatcher>,
    event_bus: Option<EventBus>,
}

impl MessageRouter {
    pub fn new(dispatcher: Arc<StatusDispatcher>) -> Self {
        Self {
            dispatcher,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Decodes one inbound message and dispatches it.
    ///
    /// # Errors
    ///
    /// [`MediaError::UnknownAction`](crate::error::MediaError::UnknownAction)
    /// for actions other than `status`,
    /// [`MediaError::MalformedEnvelope`](crate::error::MediaError::MalformedEnvelope)
    /// when the envelope cannot be decoded.
    pub fn route(&self, message: Value) -> Result<()> {
        let status = decode_envelope(message)?;
        self.dispatcher.dispatch(status);
        Ok(())
    }

    /// Continuation for the perpetual `messageChannel` command.
    ///
    /// This is where errors from [`MessageRouter::route`] terminate: the
    /// bridge has no caller to hand them back to, so each one is logged at
    /// error level and published as [`ChannelEvent::ProtocolViolation`]
    /// before the next message is processed.
    pub fn channel_callback(self: &Arc<Self>) -> SuccessCallback {
        let router = Arc::clone(self);
        Arc::new(move |message: Value| {
            if let Err(err) = router.route(message) {
                error!(error = %err, "Media status channel protocol violation");
                if let Some(bus) = &router.event_bus {
                    let _ = bus.emit(CoreEvent::Channel(ChannelEvent::ProtocolViolation {
                        detail: err.to_string(),
                    }));
                }
            }
        })
    }
}
