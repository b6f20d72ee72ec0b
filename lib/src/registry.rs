//! The object reference registry.
//!
//! A stable identity-to-live-transform map so per-frame passes can ask
//! "where is object X right now" without walking a scene graph.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::debug;

use crate::scene::{Transform, TransformHandle};

/// Registry of live transform handles, keyed by object id.
///
/// Lifetime follows the active *system id*, not any particular render:
/// rebinding the same id keeps every entry, rebinding a different id
/// clears them all. Mutated only on mount/unmount lifecycle edges;
/// read during the per-frame update pass.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    system_id: Option<Arc<str>>,
    handles: HashMap<Arc<str>, Weak<RwLock<Transform>>>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the registry to a system. Clears entries only when the id
    /// actually changes; reloading the same system's data by reference
    /// must not drop live handles.
    pub fn bind_system(&mut self, system_id: &Arc<str>) {
        if self.system_id.as_deref() != Some(&**system_id) {
            debug!(system = %system_id, dropped = self.handles.len(), "registry rebound to new system");
            self.handles.clear();
            self.system_id = Some(system_id.clone());
        }
    }

    pub fn system_id(&self) -> Option<&Arc<str>> {
        self.system_id.as_ref()
    }

    pub fn register(&mut self, id: Arc<str>, handle: Weak<RwLock<Transform>>) {
        self.handles.insert(id, handle);
    }

    /// Remove an entry outright. Entries are deleted, never replaced
    /// with placeholders; a stale "present but empty" entry would break
    /// downstream lookups silently.
    pub fn unregister(&mut self, id: &str) {
        self.handles.remove(id);
    }

    /// Resolve an id to its live transform, or `None` when the object
    /// is not mounted (callers skip the frame's update for it).
    pub fn resolve(&self, id: &str) -> Option<TransformHandle> {
        self.handles.get(id)?.upgrade()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handles.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
        self.system_id = None;
    }
}
