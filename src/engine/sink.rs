// src/engine/sink.rs

//! Per-invocation event queue.
//!
//! A sink is an unbounded FIFO split into two halves:
//! - [`SinkWriter`], owned by the process runner (sole writer).
//! - [`SinkReader`], stored in the registry and locked by at most one
//!   stream adapter at a time.
//!
//! Dropping every clone of the reader closes the queue; further pushes are
//! discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, OwnedMutexGuard, mpsc};

use crate::types::{InvocationHandle, OutputEvent, StreamKind};

/// Create an empty sink for `handle`.
pub fn sink(handle: InvocationHandle) -> (SinkWriter, SinkReader) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        SinkWriter {
            handle,
            tx,
            finished: AtomicBool::new(false),
        },
        SinkReader {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Write half of a sink.
#[derive(Debug)]
pub struct SinkWriter {
    handle: InvocationHandle,
    tx: mpsc::UnboundedSender<OutputEvent>,
    finished: AtomicBool,
}

impl SinkWriter {
    pub fn handle(&self) -> InvocationHandle {
        self.handle
    }

    /// Push an event. Returns `false` if no reader remains.
    pub fn push(&self, event: OutputEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn line(&self, stream: StreamKind, text: String) -> bool {
        self.push(OutputEvent::Line {
            handle: self.handle,
            text,
            stream,
        })
    }

    /// Push a completion followed by the terminator.
    ///
    /// Only the first call writes anything; later calls return `false`.
    pub fn finish(&self, exit_code: i32) -> bool {
        if self.finished.swap(true, Ordering::AcqRel) {
            return false;
        }
        let delivered = self.push(OutputEvent::Completion {
            handle: self.handle,
            exit_code,
        });
        delivered && self.push(OutputEvent::Terminator)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Read half of a sink, shared between the registry and the active reader.
#[derive(Debug, Clone)]
pub struct SinkReader {
    rx: Arc<Mutex<mpsc::UnboundedReceiver<OutputEvent>>>,
}

impl SinkReader {
    /// Take exclusive read access without waiting.
    ///
    /// Returns `None` if another reader currently holds the sink.
    pub fn try_acquire(&self) -> Option<SinkGuard> {
        Arc::clone(&self.rx)
            .try_lock_owned()
            .ok()
            .map(|rx| SinkGuard { rx })
    }
}

/// Exclusive read access to a sink.
#[derive(Debug)]
pub struct SinkGuard {
    rx: OwnedMutexGuard<mpsc::UnboundedReceiver<OutputEvent>>,
}

impl SinkGuard {
    /// Next event in FIFO order; `None` once the writer is gone and the queue
    /// is drained.
    pub async fn next(&mut self) -> Option<OutputEvent> {
        self.rx.recv().await
    }
}
