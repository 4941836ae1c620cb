use logongraph_core::{GraphError, GraphResult, GraphSnapshot};
use parking_lot::RwLock;
use std::sync::Arc;

/// Holds the most recently published graph.
///
/// Readers clone the `Arc` once and work on that snapshot for the rest of the
/// request. Writers swap the whole snapshot under the write lock, so a reader
/// never observes a half-replaced graph.
#[derive(Debug, Default)]
pub struct GraphStore {
    current: RwLock<Option<Arc<GraphSnapshot>>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<GraphSnapshot>> {
        self.current.read().clone()
    }

    /// Like [`GraphStore::current`], failing with `NoSnapshot` before the
    /// first upload.
    pub fn require(&self) -> GraphResult<Arc<GraphSnapshot>> {
        self.current().ok_or(GraphError::NoSnapshot)
    }

    pub fn replace(&self, snapshot: GraphSnapshot) -> Arc<GraphSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Derive a new snapshot from the current one while holding the write
    /// lock. If `f` fails the current snapshot is kept.
    pub fn update<F>(&self, f: F) -> GraphResult<Arc<GraphSnapshot>>
    where
        F: FnOnce(&GraphSnapshot) -> GraphResult<GraphSnapshot>,
    {
        let mut guard = self.current.write();
        let current = guard.as_ref().ok_or(GraphError::NoSnapshot)?;
        let next = Arc::new(f(current)?);
        *guard = Some(Arc::clone(&next));
        Ok(next)
    }
}
