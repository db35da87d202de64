use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Opaque identifier for one command invocation.
///
/// Minted by the launcher from a random v4 UUID; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvocationHandle(Uuid);

impl InvocationHandle {
    /// Mint a fresh random handle.
    pub fn new() -> Self {
        InvocationHandle(Uuid::new_v4())
    }
}

impl Default for InvocationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for InvocationHandle {
    fn from(id: Uuid) -> Self {
        InvocationHandle(id)
    }
}

impl fmt::Display for InvocationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for InvocationHandle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(InvocationHandle)
            .map_err(|e| format!("invalid invocation handle '{s}': {e}"))
    }
}

/// Which standard output channel a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// Events produced by the process runner into a sink, in observation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    /// One line of output, trailing newline stripped.
    Line {
        handle: InvocationHandle,
        text: String,
        stream: StreamKind,
    },
    /// The process exited. `-1` when no exit code was available.
    Completion {
        handle: InvocationHandle,
        exit_code: i32,
    },
    /// End of stream; nothing follows.
    Terminator,
}

impl OutputEvent {
    /// Human-readable status line for a completion.
    pub fn status_line(exit_code: i32) -> String {
        format!("Process exited with return code {exit_code}")
    }
}
