use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Unsupported action {service}.{action}")]
    UnsupportedAction { service: String, action: String },

    /// The native side rejected the command. `payload` is forwarded verbatim
    /// to the caller's failure continuation.
    #[error("Native command failed: {payload}")]
    CommandFailed { payload: Value },

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BridgeError {
    /// Build a failure carrying a native media error code (`{ "code": n }`).
    pub fn with_code(code: i64) -> Self {
        BridgeError::CommandFailed {
            payload: json!({ "code": code }),
        }
    }

    /// Convert the error into the payload handed to failure continuations.
    ///
    /// Native payloads pass through untouched; every other variant becomes a
    /// `{ "message": ... }` object.
    pub fn into_payload(self) -> Value {
        match self {
            BridgeError::CommandFailed { payload } => payload,
            other => json!({ "message": other.to_string() }),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
