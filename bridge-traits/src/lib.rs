//! # Host Bridge Traits
//!
//! Contracts between the media core and the host platform.
//!
//! ## Overview
//!
//! The core issues every playback and recording operation as a
//! [`NativeCommand`](exec::NativeCommand) and never blocks on the result. Each
//! host platform ships an adapter that carries those commands to its native
//! audio layer and reports outcomes back through continuations.
//!
//! ## Traits
//!
//! - [`CommandBridge`](exec::CommandBridge) - Callback-style command transport
//! - [`NativeExecutor`](exec::NativeExecutor) - Async native command executor
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Adapter | Status |
//! |----------|---------|--------|
//! | Desktop / tests | `bridge-desktop::AsyncCommandBridge` | ✅ |
//! | Android  | host-provided `CommandBridge` | ✅ |
//! | iOS      | host-provided `CommandBridge` | 📋 Planned |
//!
//! ## Error Handling
//!
//! Adapters convert platform failures into [`BridgeError`](error::BridgeError).
//! Only [`BridgeError::CommandFailed`](error::BridgeError::CommandFailed)
//! carries a native payload; it is forwarded to failure continuations verbatim.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`. Continuations may run on any thread.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::exec::{CommandReply, NativeCommand, NativeExecutor};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct SilentExecutor;
//!
//! #[async_trait]
//! impl NativeExecutor for SilentExecutor {
//!     async fn execute(&self, _command: NativeCommand) -> Result<CommandReply> {
//!         Ok(CommandReply::empty())
//!     }
//! }
//! ```

pub mod error;
pub mod exec;
pub mod logging;

pub use error::BridgeError;

pub use exec::{
    CommandBridge, CommandReply, FailureCallback, NativeCommand, NativeExecutor, SuccessCallback,
};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
