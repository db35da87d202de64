// src/engine/stream.rs

//! Event stream adapter: drains one sink towards one consumer.
//!
//! Lifecycle of an attachment:
//! - `attach` looks the handle up and takes exclusive read access
//!   (fails with `NotFound` / `AlreadyAttached`).
//! - messages are read in sink order until the terminator (completed) or
//!   until the consumer goes away (cancelled).
//! - the registry entry is removed on every exit path, including the
//!   attachment simply being dropped.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::outbound::OutboundMessage;
use crate::engine::registry::TaskRegistry;
use crate::engine::sink::SinkGuard;
use crate::errors::{CmdRunnerError, Result};
use crate::types::{InvocationHandle, OutputEvent};

/// How a stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamExit {
    /// The terminator was reached.
    Completed,
    /// The consumer disconnected first.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct StreamAdapter {
    registry: Arc<TaskRegistry>,
}

impl StreamAdapter {
    pub fn new(registry: Arc<TaskRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve `handle` and take exclusive read access to its sink.
    pub fn attach(&self, handle: InvocationHandle) -> Result<Attachment> {
        let reader = self
            .registry
            .get(&handle)
            .ok_or(CmdRunnerError::NotFound(handle))?;

        let guard = reader
            .try_acquire()
            .ok_or(CmdRunnerError::AlreadyAttached(handle))?;

        // A previous reader may have released the lock while its entry was
        // being removed; a removed entry is never readable again.
        if !self.registry.contains(&handle) {
            return Err(CmdRunnerError::NotFound(handle));
        }

        debug!(handle = %handle, "consumer attached");

        Ok(Attachment {
            handle,
            cleanup: Cleanup {
                handle,
                registry: Some(Arc::clone(&self.registry)),
            },
            guard,
            done: false,
        })
    }
}

/// Removes the registry entry exactly once.
#[derive(Debug)]
struct Cleanup {
    handle: InvocationHandle,
    registry: Option<Arc<TaskRegistry>>,
}

impl Cleanup {
    fn release(&mut self) {
        if let Some(registry) = self.registry.take() {
            registry.remove(&self.handle);
            info!(handle = %self.handle, "terminated queue for task");
        }
    }
}

impl Drop for Cleanup {
    fn drop(&mut self) {
        self.release();
    }
}

/// Exclusive, non-restartable read access to one invocation's output.
///
/// Field order matters: `cleanup` drops before `guard`, so the registry entry
/// is gone before the reader lock is released.
#[derive(Debug)]
pub struct Attachment {
    handle: InvocationHandle,
    cleanup: Cleanup,
    guard: SinkGuard,
    done: bool,
}

impl Attachment {
    pub fn handle(&self) -> InvocationHandle {
        self.handle
    }

    /// Next outbound message, or `None` once the stream has ended.
    ///
    /// The registry entry is released as soon as the end is observed.
    pub async fn next_message(&mut self) -> Option<OutboundMessage> {
        if self.done {
            return None;
        }

        let event = self.guard.next().await;
        match event {
            Some(OutputEvent::Terminator) => {}
            Some(event) => return OutboundMessage::from_event(event),
            None => {
                // Writer dropped without a terminator.
                warn!(handle = %self.handle, "sink closed before terminator");
            }
        }

        self.done = true;
        self.cleanup.release();
        None
    }

    /// Forward every message to `out` until the stream completes or `out`
    /// is closed by the consumer.
    pub async fn pump(mut self, out: mpsc::Sender<OutboundMessage>) -> StreamExit {
        let handle = self.handle;

        loop {
            let next = tokio::select! {
                biased;
                _ = out.closed() => None,
                msg = self.next_message() => Some(msg),
            };

            let msg = match next {
                None => break,
                Some(None) => {
                    debug!(handle = %handle, "stream completed");
                    return StreamExit::Completed;
                }
                Some(Some(msg)) => msg,
            };

            if out.send(msg).await.is_err() {
                break;
            }
        }

        info!(handle = %handle, "consumer disconnected; stream cancelled");
        StreamExit::Cancelled
    }

    /// Run [`pump`](Self::pump) on its own task and hand back the receiving
    /// end. Dropping the receiver counts as a disconnect.
    pub fn spawn(self, capacity: usize) -> (mpsc::Receiver<OutboundMessage>, JoinHandle<StreamExit>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(self.pump(tx));
        (rx, task)
    }
}
