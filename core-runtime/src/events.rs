//! # Event Bus System
//!
//! Mirrors media notifications onto a `tokio::sync::broadcast` channel so that
//! observers other than the per-handle callbacks (UI layers, analytics, test
//! harnesses) can follow what the native side reports.
//!
//! ## Overview
//!
//! - **Event Types**: [`CoreEvent`] wraps [`MediaEvent`] (per-handle status
//!   notifications) and [`ChannelEvent`] (status channel lifecycle)
//! - **EventBus**: central broadcast channel for publishing events
//! - **EventStream**: receiver wrapper with optional filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   emit    ┌───────────┐   subscribe   ┌────────────┐
//! │ StatusDispatch ├──────────>│ EventBus  ├──────────────>│ Subscriber │
//! └────────────────┘           │ (broadcast│               └────────────┘
//! ┌────────────────┐   emit    │  channel) │   subscribe   ┌────────────┐
//! │ MessageRouter  ├──────────>│           ├──────────────>│ Subscriber │
//! └────────────────┘           └───────────┘               └────────────┘
//! ```
//!
//! Publishing never blocks and never fails the publisher: media components
//! ignore the "no subscribers" error.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, MediaEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut subscriber = bus.subscribe();
//!
//! bus.emit(CoreEvent::Media(MediaEvent::Completed {
//!     media_id: "4f1c".to_string(),
//! }))
//! .ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert_eq!(event.media_id(), Some("4f1c"));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: subscriber fell behind by `n` events; non-fatal.
//! - **`RecvError::Closed`**: all senders dropped; treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Per-handle status notifications
    Media(MediaEvent),
    /// Native status channel lifecycle
    Channel(ChannelEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Media(e) => e.description(),
            CoreEvent::Channel(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Media(MediaEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Channel(ChannelEvent::ProtocolViolation { .. }) => EventSeverity::Error,
            CoreEvent::Media(MediaEvent::UnknownMedia { .. })
            | CoreEvent::Media(MediaEvent::UnhandledMessage { .. }) => EventSeverity::Warning,
            CoreEvent::Media(MediaEvent::Completed { .. })
            | CoreEvent::Channel(ChannelEvent::Opened { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }

    /// Handle id the event refers to, if any.
    pub fn media_id(&self) -> Option<&str> {
        match self {
            CoreEvent::Media(e) => Some(e.media_id()),
            CoreEvent::Channel(_) => None,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Media Events
// ============================================================================

/// Notifications about a single media handle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum MediaEvent {
    /// Native side reported a playback state transition.
    StateChanged {
        media_id: String,
        /// Raw state code (0 = None .. 4 = Stopped).
        state: i64,
    },
    /// Playback or recording finished (state became Stopped).
    Completed { media_id: String },
    /// Duration became known or changed (-1 = unknown).
    DurationChanged { media_id: String, duration: f64 },
    /// Position reported by the native side.
    PositionChanged { media_id: String, position: f64 },
    /// Native side reported an error.
    Error {
        media_id: String,
        /// Media error code when the payload carried one.
        code: Option<i64>,
    },
    /// A status message arrived for an id that is not registered.
    UnknownMedia { media_id: String },
    /// A status message of an unrecognized kind or with an unusable value.
    UnhandledMessage { media_id: String, msg_type: i64 },
}

impl MediaEvent {
    fn description(&self) -> &str {
        match self {
            MediaEvent::StateChanged { .. } => "Playback state changed",
            MediaEvent::Completed { .. } => "Media completed",
            MediaEvent::DurationChanged { .. } => "Duration updated",
            MediaEvent::PositionChanged { .. } => "Position updated",
            MediaEvent::Error { .. } => "Media error",
            MediaEvent::UnknownMedia { .. } => "Status for unknown media",
            MediaEvent::UnhandledMessage { .. } => "Unhandled status message",
        }
    }

    pub fn media_id(&self) -> &str {
        match self {
            MediaEvent::StateChanged { media_id, .. }
            | MediaEvent::Completed { media_id }
            | MediaEvent::DurationChanged { media_id, .. }
            | MediaEvent::PositionChanged { media_id, .. }
            | MediaEvent::Error { media_id, .. }
            | MediaEvent::UnknownMedia { media_id }
            | MediaEvent::UnhandledMessage { media_id, .. } => media_id,
        }
    }
}

// ============================================================================
// Channel Events
// ============================================================================

/// Lifecycle of the native status channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ChannelEvent {
    /// `messageChannel` was issued and the readiness gate satisfied.
    Opened {
        /// Name of the readiness gate that was released.
        gate: String,
    },
    /// The native side sent an envelope the router cannot accept.
    ProtocolViolation {
        /// Offending action tag, or a description of the malformed envelope.
        detail: String,
    },
}

impl ChannelEvent {
    fn description(&self) -> &str {
        match self {
            ChannelEvent::Opened { .. } => "Status channel opened",
            ChannelEvent::ProtocolViolation { .. } => "Status channel protocol violation",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus yields another producer for the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; use
    /// [`CoreConfigBuilder`](crate::config::CoreConfigBuilder) to get a
    /// validated bus.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional filter.
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let only_one_handle = EventStream::new(bus.subscribe()).for_media("4f1c");
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Only events about the given handle will be returned.
    pub fn for_media(self, media_id: impl Into<String>) -> Self {
        let media_id = media_id.into();
        self.filter(move |event| event.media_id() == Some(media_id.as_str()))
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once all senders are gone.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without waiting.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(id: &str) -> CoreEvent {
        CoreEvent::Media(MediaEvent::Completed {
            media_id: id.to_string(),
        })
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(completed("a")).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Media(MediaEvent::StateChanged {
            media_id: "a".to_string(),
            state: 2,
        });
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_for_media() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe()).for_media("b");

        bus.emit(completed("a")).ok();
        bus.emit(CoreEvent::Channel(ChannelEvent::Opened {
            gate: "onMediaPluginReady".to_string(),
        }))
        .ok();
        bus.emit(completed("b")).ok();

        assert_eq!(stream.recv().await.unwrap(), completed("b"));
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(CoreEvent::Media(MediaEvent::PositionChanged {
                media_id: "a".to_string(),
                position: i as f64,
            }))
            .ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let error = CoreEvent::Media(MediaEvent::Error {
            media_id: "a".to_string(),
            code: Some(1),
        });
        assert_eq!(error.severity(), EventSeverity::Error);

        let violation = CoreEvent::Channel(ChannelEvent::ProtocolViolation {
            detail: "bogus".to_string(),
        });
        assert_eq!(violation.severity(), EventSeverity::Error);

        let unknown = CoreEvent::Media(MediaEvent::UnknownMedia {
            media_id: "zzz".to_string(),
        });
        assert_eq!(unknown.severity(), EventSeverity::Warning);

        assert_eq!(completed("a").severity(), EventSeverity::Info);

        let position = CoreEvent::Media(MediaEvent::PositionChanged {
            media_id: "a".to_string(),
            position: 5000.0,
        });
        assert_eq!(position.severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_event_description() {
        assert_eq!(completed("a").description(), "Media completed");
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Media(MediaEvent::DurationChanged {
            media_id: "a".to_string(),
            duration: 182.5,
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Media");
        assert_eq!(json["payload"]["event"], "DurationChanged");

        let decoded: CoreEvent = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
    }

    #[tokio::test]
    async fn test_try_recv_empty_then_event() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());
        assert!(stream.try_recv().is_none());

        bus.emit(completed("a")).ok();
        assert_eq!(stream.try_recv().unwrap().unwrap(), completed("a"));
    }
}
