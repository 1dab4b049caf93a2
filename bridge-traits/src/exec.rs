//! Native command execution contracts.
//!
//! The core never talks to the platform audio stack directly. Every operation
//! is expressed as a [`NativeCommand`] addressed to a named service and handed
//! to a [`CommandBridge`], which delivers the outcome later through optional
//! continuations. Hosts that expose an async native layer implement
//! [`NativeExecutor`] instead and wrap it in a bridge adapter (see
//! `bridge-desktop`).

use std::fmt;
use std::sync::Arc;

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Continuation invoked with the payload of a successful reply.
///
/// Most commands call it at most once. Long-lived commands (such as the
/// media message channel) call it once per streamed message.
pub type SuccessCallback = Arc<dyn Fn(Value) + Send + Sync>;

/// Continuation invoked with the native failure payload.
pub type FailureCallback = Arc<dyn Fn(Value) + Send + Sync>;

/// A single command addressed to a native service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeCommand {
    /// Target service name (e.g. `"Mediaac"`).
    pub service: String,
    /// Action name understood by the service.
    pub action: String,
    /// Positional arguments.
    pub args: Vec<Value>,
}

impl NativeCommand {
    pub fn new(service: impl Into<String>, action: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            service: service.into(),
            action: action.into(),
            args,
        }
    }

    /// First argument as a string, which by convention is the correlation id.
    pub fn target_id(&self) -> Option<&str> {
        self.args.first().and_then(Value::as_str)
    }
}

impl fmt::Display for NativeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service, self.action)
    }
}

/// Callback-style transport between the core and the native layer.
///
/// `exec` must return immediately. Implementations invoke `on_success` or
/// `on_failure` later (possibly from another thread) and never both for a
/// single-shot reply. Missing continuations mean the caller is not interested
/// in that outcome.
pub trait CommandBridge: Send + Sync {
    fn exec(
        &self,
        command: NativeCommand,
        on_success: Option<SuccessCallback>,
        on_failure: Option<FailureCallback>,
    );
}

/// Reply produced by a [`NativeExecutor`].
pub enum CommandReply {
    /// Single-shot result.
    Value(Value),
    /// Perpetual subscription; every item is delivered to the success
    /// continuation, in order, until the stream ends.
    Stream(BoxStream<'static, Value>),
}

impl CommandReply {
    pub fn empty() -> Self {
        CommandReply::Value(Value::Null)
    }
}

impl fmt::Debug for CommandReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandReply::Value(value) => f.debug_tuple("Value").field(value).finish(),
            CommandReply::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Async native executor exposed by a host platform.
#[async_trait::async_trait]
pub trait NativeExecutor: Send + Sync {
    /// Perform the command and report its outcome.
    async fn execute(&self, command: NativeCommand) -> Result<CommandReply>;
}
