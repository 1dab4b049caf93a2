//! One-shot readiness gate.
//!
//! On platforms where the status channel has to be opened explicitly,
//! consumers wait on this gate before using the plugin. Once satisfied it
//! stays satisfied.
//!
//! Opening is two-phase: [`ReadinessGate::claim`] elects the single caller
//! that opens the channel, [`ReadinessGate::mark_ready`] then releases the
//! waiters.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

pub struct ReadinessGate {
    name: String,
    claimed: AtomicBool,
    ready: watch::Sender<bool>,
}

impl ReadinessGate {
    pub fn new(name: impl Into<String>) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            name: name.into(),
            claimed: AtomicBool::new(false),
            ready,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Returns `true` for exactly one caller over the gate's lifetime,
    /// including callers racing on other threads or re-entering.
    pub fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }

    /// Satisfies the gate. Returns `false` if it already was.
    pub fn mark_ready(&self) -> bool {
        !self.ready.send_replace(true)
    }

    /// Resolves once the gate is satisfied; immediately if it already is.
    pub async fn wait(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

impl fmt::Debug for ReadinessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadinessGate")
            .field("name", &self.name)
            .field("claimed", &self.claimed.load(Ordering::Acquire))
            .field("ready", &self.is_ready())
            .finish()
    }
}
