// src/engine/launcher.rs

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Whitelist;
use crate::engine::registry::TaskRegistry;
use crate::engine::sink::sink;
use crate::errors::{CmdRunnerError, Result};
use crate::exec::ProcessBackend;
use crate::types::InvocationHandle;

/// Turns a whitelist index into a running invocation.
///
/// The whitelist is the only source of command text that ever reaches the
/// backend.
pub struct Launcher<B: ProcessBackend> {
    whitelist: Whitelist,
    registry: Arc<TaskRegistry>,
    backend: B,
}

impl<B: ProcessBackend> Launcher<B> {
    pub fn new(whitelist: Whitelist, registry: Arc<TaskRegistry>, backend: B) -> Self {
        Self {
            whitelist,
            registry,
            backend,
        }
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Start the command at `index` and return its handle without waiting
    /// for it to run.
    ///
    /// - Out-of-range index: `InvalidIndex`, nothing spawned or registered.
    /// - Spawn failure: `Spawn`, nothing registered.
    pub fn launch(&self, index: i64) -> Result<InvocationHandle> {
        let command = self.resolve(index)?;

        let handle = InvocationHandle::new();
        let (writer, reader) = sink(handle);

        if let Err(e) = self.backend.start(command, writer) {
            warn!(index, cmd = %command, error = %e, "failed to start command");
            return Err(e);
        }

        self.registry.create(handle, reader)?;
        info!(handle = %handle, index, cmd = %command, "created queue for task");

        Ok(handle)
    }

    /// Like [`launch`](Self::launch), taking the index as untrusted text
    /// (e.g. a query parameter).
    pub fn launch_str(&self, raw: &str) -> Result<InvocationHandle> {
        self.launch(parse_index(raw)?)
    }

    fn resolve(&self, index: i64) -> Result<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.whitelist.get(i))
            .ok_or_else(|| {
                CmdRunnerError::InvalidIndex(format!(
                    "{index} (whitelist has {} commands)",
                    self.whitelist.len()
                ))
            })
    }
}

/// Parse a command index from text. Non-integers are `InvalidIndex`.
pub fn parse_index(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CmdRunnerError::InvalidIndex(format!("'{raw}' is not an integer")))
}
