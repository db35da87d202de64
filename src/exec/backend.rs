// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The launcher talks to a `ProcessBackend` instead of spawning processes
//! directly, so tests can swap in a backend that writes scripted events to
//! the sink without touching the OS.

use crate::engine::sink::SinkWriter;
use crate::errors::Result;

use super::runner;
use super::shell::Shell;

/// Starts the work that feeds one sink.
///
/// `start` must not block on the work itself. It returns an error only when
/// the work could not be started at all; in that case nothing has been
/// written to `writer`.
pub trait ProcessBackend: Send + Sync {
    fn start(&self, command: &str, writer: SinkWriter) -> Result<()>;
}

/// Production backend: spawns the command through a shell.
#[derive(Debug, Clone, Default)]
pub struct RealProcessBackend {
    shell: Shell,
}

impl RealProcessBackend {
    /// Backend using the platform shell.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shell(shell: Shell) -> Self {
        Self { shell }
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }
}

impl ProcessBackend for RealProcessBackend {
    fn start(&self, command: &str, writer: SinkWriter) -> Result<()> {
        // Detached: the runner logs its own failures.
        runner::start(&self.shell, command, writer).map(drop)
    }
}
