use std::io;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use cmdrunner::engine::SinkWriter;
use cmdrunner::errors::{CmdRunnerError, Result};
use cmdrunner::exec::ProcessBackend;
use cmdrunner::types::StreamKind;

/// A fake process backend that:
/// - records which commands were started
/// - writes a fixed script of lines and an exit code to each sink, without
///   spawning anything.
///
/// With a gate, the completion is held back until the gate is notified
/// (`notify_one`), so tests can observe a still-running invocation.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    lines: Vec<(StreamKind, String)>,
    exit_code: i32,
    gate: Option<Arc<Notify>>,
    fail_spawn: bool,
    started: Arc<Mutex<Vec<String>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout(mut self, line: &str) -> Self {
        self.lines.push((StreamKind::Stdout, line.to_string()));
        self
    }

    pub fn stderr(mut self, line: &str) -> Self {
        self.lines.push((StreamKind::Stderr, line.to_string()));
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Hold the completion until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Make every `start` fail as if the binary did not exist.
    pub fn failing(mut self) -> Self {
        self.fail_spawn = true;
        self
    }

    /// Shared record of started commands.
    pub fn started(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.started)
    }
}

impl ProcessBackend for ScriptedBackend {
    fn start(&self, command: &str, writer: SinkWriter) -> Result<()> {
        if self.fail_spawn {
            return Err(CmdRunnerError::Spawn {
                command: command.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "scripted spawn failure"),
            });
        }

        self.started.lock().unwrap().push(command.to_string());

        let lines = self.lines.clone();
        let exit_code = self.exit_code;
        let gate = self.gate.clone();

        tokio::spawn(async move {
            for (stream, text) in lines {
                writer.line(stream, text);
            }
            if let Some(gate) = gate {
                gate.notified().await;
            }
            writer.finish(exit_code);
        });

        Ok(())
    }
}
