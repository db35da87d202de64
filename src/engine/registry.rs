// src/engine/registry.rs

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::engine::sink::SinkReader;
use crate::errors::{CmdRunnerError, Result};
use crate::types::InvocationHandle;

/// Table of live invocations: handle -> sink reader.
///
/// An entry exists while a stream adapter may still read from the sink.
/// Removal is final; the launcher never re-registers a handle it has minted.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    entries: Mutex<HashMap<InvocationHandle, SinkReader>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<InvocationHandle, SinkReader>> {
        // A panic while holding the lock cannot leave the map half-updated,
        // so a poisoned lock is still safe to use.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a sink under `handle`. Fails if the handle is already present.
    pub fn create(&self, handle: InvocationHandle, reader: SinkReader) -> Result<()> {
        let mut entries = self.lock();
        if entries.contains_key(&handle) {
            return Err(CmdRunnerError::DuplicateHandle(handle));
        }
        entries.insert(handle, reader);
        debug!(handle = %handle, live = entries.len(), "registered sink");
        Ok(())
    }

    pub fn get(&self, handle: &InvocationHandle) -> Option<SinkReader> {
        self.lock().get(handle).cloned()
    }

    /// Remove the entry for `handle`. Removing an absent handle is a no-op.
    ///
    /// Returns whether an entry was actually removed.
    pub fn remove(&self, handle: &InvocationHandle) -> bool {
        let removed = self.lock().remove(handle).is_some();
        if removed {
            debug!(handle = %handle, "removed sink");
        }
        removed
    }

    pub fn contains(&self, handle: &InvocationHandle) -> bool {
        self.lock().contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every entry, returning how many were live.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let n = entries.len();
        entries.clear();
        n
    }
}
