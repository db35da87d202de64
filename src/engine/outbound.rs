// src/engine/outbound.rs

use std::fmt;

use crate::types::{OutputEvent, StreamKind};

/// Prefix marking lines that came from the error channel.
pub const STDERR_PREFIX: &str = "[stderr] ";

/// A message ready to be relayed to a remote consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Stdout(String),
    Stderr(String),
    Status { exit_code: i32 },
}

impl OutboundMessage {
    /// Translate a sink event. The terminator has no outbound form.
    pub fn from_event(event: OutputEvent) -> Option<Self> {
        match event {
            OutputEvent::Line {
                text,
                stream: StreamKind::Stdout,
                ..
            } => Some(OutboundMessage::Stdout(text)),
            OutputEvent::Line {
                text,
                stream: StreamKind::Stderr,
                ..
            } => Some(OutboundMessage::Stderr(text)),
            OutputEvent::Completion { exit_code, .. } => {
                Some(OutboundMessage::Status { exit_code })
            }
            OutputEvent::Terminator => None,
        }
    }

    pub fn is_status(&self) -> bool {
        matches!(self, OutboundMessage::Status { .. })
    }

    /// Encode as one server-sent-events frame.
    ///
    /// Embedded CR/LF characters split the text over several `data:` fields,
    /// which a client rejoins with `\n`.
    pub fn sse_frame(&self) -> String {
        let text = self.to_string();
        let mut frame = String::with_capacity(text.len() + 8);
        for part in text.split(['\r', '\n']) {
            frame.push_str("data: ");
            frame.push_str(part);
            frame.push('\n');
        }
        frame.push('\n');
        frame
    }
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboundMessage::Stdout(text) => f.write_str(text),
            OutboundMessage::Stderr(text) => write!(f, "{STDERR_PREFIX}{text}"),
            OutboundMessage::Status { exit_code } => {
                f.write_str(&OutputEvent::status_line(*exit_code))
            }
        }
    }
}

/// Output encoding for relayed messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// One text line per message.
    #[default]
    Plain,
    /// `data: ...` frames terminated by a blank line.
    Sse,
}

impl WireFormat {
    pub fn encode(&self, msg: &OutboundMessage) -> String {
        match self {
            WireFormat::Plain => format!("{msg}\n"),
            WireFormat::Sse => msg.sse_frame(),
        }
    }

    /// Encode with a stream label, for several streams sharing one output.
    ///
    /// Plain lines get a `[label] ` prefix; SSE frames get an `event:` field.
    pub fn encode_labeled(&self, label: &str, msg: &OutboundMessage) -> String {
        match self {
            WireFormat::Plain => format!("[{label}] {msg}\n"),
            WireFormat::Sse => format!("event: {label}\n{}", msg.sse_frame()),
        }
    }
}
