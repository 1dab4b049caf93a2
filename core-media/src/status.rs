//! # Status Messages
//!
//! Decoding of the notifications the native side pushes through the message
//! channel:
//!
//! ```json
//! { "action": "status", "status": { "id": "…", "msgType": 1, "value": 2.0 } }
//! ```
//!
//! The `value` is decoded according to `msgType` into a closed
//! [`StatusUpdate`]. Kinds the core does not know and values it cannot use
//! become explicit variants instead of errors, so the dispatcher can report
//! and drop them.

use crate::error::{MediaError, Result};
use crate::state::{MediaErrorCode, MessageKind};
use serde::Deserialize;
use serde_json::Value;

/// Failure reported by the native side, passed through verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFailure {
    payload: Value,
}

impl MediaFailure {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// Numeric error code: `payload.code` for object payloads, the payload
    /// itself when the native side sent a bare number.
    pub fn code(&self) -> Option<i64> {
        match &self.payload {
            Value::Object(map) => map.get("code").and_then(integer),
            other => integer(other),
        }
    }

    /// Known error code, if the payload carries one.
    pub fn error_code(&self) -> Option<MediaErrorCode> {
        self.code().and_then(MediaErrorCode::from_code)
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }
}

impl From<Value> for MediaFailure {
    fn from(payload: Value) -> Self {
        Self::new(payload)
    }
}

/// Decoded `value` of a status message.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    /// Raw state code, see [`PlaybackState`](crate::state::PlaybackState).
    StateChanged(i64),
    /// Duration as reported; -1 when the native side sent no value.
    DurationUpdated(f64),
    PositionUpdated(f64),
    ErrorOccurred(MediaFailure),
    /// `msgType` outside the known set.
    Unrecognized { msg_type: i64 },
    /// Known `msgType` whose value cannot be interpreted.
    Malformed { msg_type: i64, value: Value },
}

/// One status notification addressed to a handle.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub id: String,
    pub update: StatusUpdate,
}

impl StatusMessage {
    pub fn new(id: impl Into<String>, update: StatusUpdate) -> Self {
        Self {
            id: id.into(),
            update,
        }
    }

    /// Interprets `value` according to `msg_type`.
    pub fn decode(id: impl Into<String>, msg_type: i64, value: Value) -> Self {
        let update = match MessageKind::from_code(msg_type) {
            Some(MessageKind::StateChanged) => match state_code(&value) {
                Some(state) => StatusUpdate::StateChanged(state),
                None => StatusUpdate::Malformed { msg_type, value },
            },
            Some(MessageKind::DurationUpdated) => match &value {
                Value::Null => StatusUpdate::DurationUpdated(-1.0),
                other => match number(other) {
                    Some(duration) => StatusUpdate::DurationUpdated(duration),
                    None => StatusUpdate::Malformed { msg_type, value },
                },
            },
            Some(MessageKind::PositionUpdated) => match coerce_number(&value) {
                Some(position) => StatusUpdate::PositionUpdated(position),
                None => StatusUpdate::Malformed { msg_type, value },
            },
            Some(MessageKind::ErrorOccurred) => {
                StatusUpdate::ErrorOccurred(MediaFailure::new(value))
            }
            None => StatusUpdate::Unrecognized { msg_type },
        };

        Self::new(id, update)
    }

    /// Wire code of the message kind.
    pub fn msg_type(&self) -> i64 {
        match &self.update {
            StatusUpdate::StateChanged(_) => MessageKind::StateChanged.code(),
            StatusUpdate::DurationUpdated(_) => MessageKind::DurationUpdated.code(),
            StatusUpdate::PositionUpdated(_) => MessageKind::PositionUpdated.code(),
            StatusUpdate::ErrorOccurred(_) => MessageKind::ErrorOccurred.code(),
            StatusUpdate::Unrecognized { msg_type } | StatusUpdate::Malformed { msg_type, .. } => {
                *msg_type
            }
        }
    }
}

/// Action tag of status envelopes.
pub const STATUS_ACTION: &str = "status";

#[derive(Debug, Deserialize)]
struct InboundEnvelope {
    action: String,
    #[serde(default)]
    status: Option<StatusBody>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    id: String,
    #[serde(rename = "msgType")]
    msg_type: Value,
    #[serde(default)]
    value: Value,
}

/// Decodes a raw inbound channel message.
///
/// Fails with [`MediaError::UnknownAction`] for any action other than
/// `status` and with [`MediaError::MalformedEnvelope`] when the envelope
/// shape is unusable.
pub fn decode_envelope(message: Value) -> Result<StatusMessage> {
    let envelope: InboundEnvelope = serde_json::from_value(message)
        .map_err(|e| MediaError::MalformedEnvelope(e.to_string()))?;

    if envelope.action != STATUS_ACTION {
        return Err(MediaError::UnknownAction {
            action: envelope.action,
        });
    }

    let body = envelope
        .status
        .ok_or_else(|| MediaError::MalformedEnvelope("missing status body".to_string()))?;

    let msg_type = integer(&body.msg_type).ok_or_else(|| {
        MediaError::MalformedEnvelope(format!("msgType is not an integer: {}", body.msg_type))
    })?;

    Ok(StatusMessage::decode(body.id, msg_type, body.value))
}

pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Integral number; native layers report states as floats (`4.0`).
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        _ => None,
    }
}

/// State codes also arrive as numeric strings (`"4"`) from some shells.
fn state_code(value: &Value) -> Option<i64> {
    match value {
        Value::String(_) => number(value).and_then(integral),
        other => integer(other),
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f.abs() < i64::MAX as f64).then(|| f as i64)
}

/// Loose numeric conversion: `null` and blank strings are 0, booleans are
/// 0/1, anything else non-numeric is rejected.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        other => number(other),
    }
}
