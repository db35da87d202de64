// src/exec/runner.rs

//! Process runner: one child process feeding one sink.

use std::future::Future;
use std::process::ExitStatus;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::engine::sink::SinkWriter;
use crate::errors::{CmdRunnerError, Result};
use crate::exec::shell::Shell;
use crate::types::StreamKind;

/// Spawn `command` through `shell` and start draining its output into
/// `writer`.
///
/// Spawn failures are returned immediately and nothing is written to the
/// sink. On success the rest of the run happens on a detached Tokio task:
/// every stdout/stderr line is pushed as it is read, then one completion and
/// one terminator.
pub fn start(shell: &Shell, command: &str, writer: SinkWriter) -> Result<JoinHandle<()>> {
    let handle = writer.handle();

    let mut child = shell
        .command(command)
        .spawn()
        .map_err(|source| CmdRunnerError::Spawn {
            command: command.to_string(),
            source,
        })?;

    info!(
        handle = %handle,
        shell = %shell.program(),
        cmd = %command,
        pid = child.id(),
        "started process"
    );

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    Ok(detach(writer, move |writer| drive(child, stdout, stderr, writer)))
}

/// Run the future built by `work` on its own task.
///
/// If that task panics, the failure is logged and the sink still receives a
/// completion with exit code `-1` and its terminator, unless `work` already
/// finished it.
pub fn detach<W, F>(writer: SinkWriter, work: W) -> JoinHandle<()>
where
    W: FnOnce(Arc<SinkWriter>) -> F,
    F: Future<Output = ()> + Send + 'static,
{
    let writer = Arc::new(writer);
    let handle = writer.handle();
    let inner = tokio::spawn(work(Arc::clone(&writer)));

    tokio::spawn(async move {
        if let Err(e) = inner.await {
            error!(handle = %handle, error = %e, "process runner task failed");
            if writer.finish(-1) {
                debug!(handle = %handle, "reported failed runner as exit code -1");
            }
        }
    })
}

async fn drive<O, E>(
    mut child: Child,
    stdout: Option<O>,
    stderr: Option<E>,
    writer: Arc<SinkWriter>,
) where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let handle = writer.handle();

    // Same-stream order is preserved; cross-stream order is whatever the
    // two reads happen to complete in.
    tokio::join!(
        read_lines(stdout, StreamKind::Stdout, &writer),
        read_lines(stderr, StreamKind::Stderr, &writer),
    );

    let exit_code = match child.wait().await {
        Ok(status) => {
            let code = exit_code_of(status);
            info!(
                handle = %handle,
                exit_code = code,
                success = status.success(),
                "process exited"
            );
            code
        }
        Err(e) => {
            error!(handle = %handle, error = %e, "waiting for process failed");
            -1
        }
    };

    if !writer.finish(exit_code) {
        debug!(handle = %handle, "no reader left for completion; discarded");
    }
}

/// Numeric exit status as a client sees it.
///
/// A process killed by signal `N` reports `-N`; `-1` when neither a code nor
/// a signal is available.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status
            .code()
            .or_else(|| status.signal().map(|signal| -signal))
            .unwrap_or(-1)
    }
    #[cfg(not(unix))]
    {
        status.code().unwrap_or(-1)
    }
}

/// Read `src` line by line into the sink until end-of-stream.
///
/// Keeps draining after the reader has gone so the child never blocks on a
/// full pipe.
async fn read_lines<R>(src: Option<R>, stream: StreamKind, writer: &SinkWriter)
where
    R: AsyncRead + Unpin,
{
    let Some(src) = src else {
        return;
    };

    let handle = writer.handle();
    let mut reader = BufReader::new(src);
    let mut buf = Vec::new();
    let mut discarding = false;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let text = decode_line(&buf);
                if !writer.line(stream, text) && !discarding {
                    discarding = true;
                    debug!(handle = %handle, %stream, "sink closed; discarding output");
                }
            }
            Err(e) => {
                warn!(handle = %handle, %stream, error = %e, "reading process output failed");
                break;
            }
        }
    }
}

/// Lossy UTF-8 decode with the trailing `\n` or `\r\n` removed.
pub fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && raw[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
