//! # Wire-level Enumerations
//!
//! Numeric codes shared with the native media layer: playback states,
//! status message kinds, media error codes and player backends.

use crate::error::{MediaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Human-readable labels indexed by state code.
pub const STATE_LABELS: [&str; 5] = ["None", "Starting", "Running", "Paused", "Stopped"];

/// Lifecycle reported by the native side.
///
/// The core only observes these transitions; it never drives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i64)]
pub enum PlaybackState {
    None = 0,
    Starting = 1,
    Running = 2,
    Paused = 3,
    Stopped = 4,
}

impl PlaybackState {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn label(self) -> &'static str {
        STATE_LABELS[self as usize]
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PlaybackState::None),
            1 => Some(PlaybackState::Starting),
            2 => Some(PlaybackState::Running),
            3 => Some(PlaybackState::Paused),
            4 => Some(PlaybackState::Stopped),
            _ => None,
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of a status message (`msgType` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    StateChanged,
    DurationUpdated,
    PositionUpdated,
    ErrorOccurred,
}

impl MessageKind {
    pub fn code(self) -> i64 {
        match self {
            MessageKind::StateChanged => 1,
            MessageKind::DurationUpdated => 2,
            MessageKind::PositionUpdated => 3,
            MessageKind::ErrorOccurred => 9,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(MessageKind::StateChanged),
            2 => Some(MessageKind::DurationUpdated),
            3 => Some(MessageKind::PositionUpdated),
            9 => Some(MessageKind::ErrorOccurred),
            _ => None,
        }
    }
}

/// Error codes carried in native failure payloads (`{"code": n}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaErrorCode {
    NoneActive,
    Aborted,
    Network,
    Decode,
    NoneSupported,
}

impl MediaErrorCode {
    pub fn code(self) -> i64 {
        match self {
            MediaErrorCode::NoneActive => 0,
            MediaErrorCode::Aborted => 1,
            MediaErrorCode::Network => 2,
            MediaErrorCode::Decode => 3,
            MediaErrorCode::NoneSupported => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(MediaErrorCode::NoneActive),
            1 => Some(MediaErrorCode::Aborted),
            2 => Some(MediaErrorCode::Network),
            3 => Some(MediaErrorCode::Decode),
            4 => Some(MediaErrorCode::NoneSupported),
            _ => None,
        }
    }
}

/// Native playback backend.
///
/// Only meaningful on platforms offering more than one backend; others
/// ignore the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerKind {
    #[default]
    #[serde(rename = "androidPlayer")]
    AndroidPlayer,
    #[serde(rename = "streamPlayer")]
    StreamPlayer,
}

impl PlayerKind {
    /// Name sent over the bridge.
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerKind::AndroidPlayer => "androidPlayer",
            PlayerKind::StreamPlayer => "streamPlayer",
        }
    }
}

impl fmt::Display for PlayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerKind {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "androidPlayer" => Ok(PlayerKind::AndroidPlayer),
            "streamPlayer" => Ok(PlayerKind::StreamPlayer),
            other => Err(MediaError::UnknownPlayerKind(other.to_string())),
        }
    }
}
