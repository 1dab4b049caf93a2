//! Id → handle mapping shared by the plugin and the status dispatcher.

use crate::handle::MediaHandle;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of live media handles.
///
/// Entries are only removed through [`MediaRegistry::remove`]; releasing a
/// handle keeps it registered so status messages still in flight resolve.
/// Lookups clone the `Arc` and drop the lock, so callbacks never run while
/// the registry is locked.
#[derive(Debug, Default)]
pub struct MediaRegistry {
    handles: RwLock<HashMap<String, Arc<MediaHandle>>>,
}

impl MediaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` under its id, returning any handle it replaced.
    pub fn insert(&self, handle: Arc<MediaHandle>) -> Option<Arc<MediaHandle>> {
        self.handles
            .write()
            .insert(handle.id().to_string(), handle)
    }

    pub fn get(&self, id: &str) -> Option<Arc<MediaHandle>> {
        self.handles.read().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<MediaHandle>> {
        self.handles.write().remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handles.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.read().is_empty()
    }

    /// Ids of all registered handles, in no particular order.
    pub fn ids(&self) -> Vec<String> {
        self.handles.read().keys().cloned().collect()
    }
}
