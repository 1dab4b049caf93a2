//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the media core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! Everything here is independent of media semantics. `core-media` builds on
//! these pieces to log diagnostics, read its host wiring and mirror status
//! notifications to observers.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
