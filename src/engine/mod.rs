// src/engine/mod.rs

//! Invocation engine.
//!
//! This module ties together:
//! - per-invocation sinks ([`sink`])
//! - the process-wide table of live sinks ([`registry`])
//! - whitelist-indexed launching ([`launcher`])
//! - draining a sink towards one consumer ([`stream`])
//! - the outbound message format ([`outbound`])
//!
//! [`CommandService`] owns all of it for the lifetime of the program.

pub mod launcher;
pub mod outbound;
pub mod registry;
pub mod sink;
pub mod stream;

use std::sync::Arc;

use tracing::info;

use crate::config::Whitelist;
use crate::errors::Result;
use crate::exec::ProcessBackend;
use crate::types::InvocationHandle;

pub use launcher::{Launcher, parse_index};
pub use outbound::{OutboundMessage, STDERR_PREFIX, WireFormat};
pub use registry::TaskRegistry;
pub use sink::{SinkGuard, SinkReader, SinkWriter, sink};
pub use stream::{Attachment, StreamAdapter, StreamExit};

/// Launch + stream entry points over one shared registry.
///
/// Constructed at startup and torn down with [`shutdown`](Self::shutdown).
pub struct CommandService<B: ProcessBackend> {
    registry: Arc<TaskRegistry>,
    launcher: Launcher<B>,
    streams: StreamAdapter,
}

impl<B: ProcessBackend> CommandService<B> {
    pub fn new(whitelist: Whitelist, backend: B) -> Self {
        let registry = Arc::new(TaskRegistry::new());
        Self {
            launcher: Launcher::new(whitelist, Arc::clone(&registry), backend),
            streams: StreamAdapter::new(Arc::clone(&registry)),
            registry,
        }
    }

    pub fn whitelist(&self) -> &Whitelist {
        self.launcher.whitelist()
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    pub fn launch(&self, index: i64) -> Result<InvocationHandle> {
        self.launcher.launch(index)
    }

    pub fn launch_str(&self, raw: &str) -> Result<InvocationHandle> {
        self.launcher.launch_str(raw)
    }

    pub fn attach(&self, handle: InvocationHandle) -> Result<Attachment> {
        self.streams.attach(handle)
    }

    /// Drop every live sink. Runners still in flight keep draining their
    /// processes but their output is discarded.
    pub fn shutdown(&self) {
        let dropped = self.registry.clear();
        info!(dropped, "command service shut down");
    }
}
