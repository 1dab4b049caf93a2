//! Workspace umbrella crate.
//!
//! Re-exports the media service façade so host applications can depend on
//! `mediaac-workspace` alone and pick bridge support through features.

pub use core_service::*;
