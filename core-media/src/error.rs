//! # Media Error Types

use thiserror::Error;

/// Errors raised locally by the media core.
///
/// Native command failures never appear here; they are delivered to the
/// per-handle error callback as [`MediaFailure`](crate::status::MediaFailure).
#[derive(Error, Debug)]
pub enum MediaError {
    /// The native side sent an inbound message with an action other than
    /// `status`.
    #[error("Unknown media action: {action}")]
    UnknownAction { action: String },

    /// The inbound envelope could not be decoded at all.
    #[error("Malformed status envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Unknown player kind: {0}")]
    UnknownPlayerKind(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MediaError {
    /// Whether the error means the native side broke the channel contract.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            MediaError::UnknownAction { .. } | MediaError::MalformedEnvelope(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MediaError>;
