//! # Desktop Bridge Implementations
//!
//! Default bridge adapters for desktop hosts and test harnesses.
//!
//! ## Overview
//!
//! - `AsyncCommandBridge` drives any async `NativeExecutor` on a Tokio
//!   runtime and exposes it as the callback-style `CommandBridge` the media
//!   core talks to.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::AsyncCommandBridge;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let bridge = AsyncCommandBridge::new(Arc::new(MyExecutor::default()))
//!         .expect("runtime available");
//!     // Use in core configuration
//! }
//! ```

mod exec;

pub use exec::AsyncCommandBridge;
