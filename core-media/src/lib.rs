//! # Media Core
//!
//! Proxy objects for native audio resources.
//!
//! ## Overview
//!
//! A [`MediaHandle`] forwards playback and recording commands to the native
//! media service through a [`CommandBridge`](bridge_traits::CommandBridge).
//! The native side answers asynchronously: command continuations for direct
//! replies, and a single multiplexed status channel for state, duration,
//! position and error notifications.
//!
//! - [`MediaPlugin`] owns the shared context and creates handles
//! - [`MediaRegistry`] maps handle ids to handles
//! - [`StatusDispatcher`] applies status messages to handles
//! - [`MessageRouter`] decodes inbound channel messages
//! - [`ReadinessGate`] holds consumers back until the channel is open
//!
//! ## Data flow
//!
//! ```text
//! app ──create/play/stop──> MediaHandle ──NativeCommand──> CommandBridge ──> native
//!                                                                           │
//! callbacks <── StatusDispatcher <── MessageRouter <── messageChannel <─────┘
//! ```

pub mod callbacks;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod plugin;
pub mod readiness;
pub mod registry;
pub mod router;
pub mod state;
pub mod status;

pub use callbacks::{
    CompletionCallback, ErrorCallback, MediaCallbacks, StatusCallback,
};
pub use config::MediaConfig;
pub use dispatcher::StatusDispatcher;
pub use error::{MediaError, Result};
pub use handle::{MediaHandle, PlayOptions, UNKNOWN};
pub use plugin::{HandleBuilder, MediaPlugin, MESSAGE_CHANNEL_ACTION};
pub use readiness::ReadinessGate;
pub use registry::MediaRegistry;
pub use router::MessageRouter;
pub use state::{MediaErrorCode, MessageKind, PlaybackState, PlayerKind, STATE_LABELS};
pub use status::{decode_envelope, MediaFailure, StatusMessage, StatusUpdate};
