// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use anyhow::{Context, Result};
use tokio::io::{AsyncWriteExt, stdout};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{Whitelist, load_whitelist};
use crate::engine::{CommandService, StreamExit, WireFormat};
use crate::exec::RealProcessBackend;
use crate::types::InvocationHandle;

/// Per-stream buffer between the stream adapter and the stdout writer.
const STREAM_CHANNEL_CAPACITY: usize = 64;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - whitelist loading
/// - the command service (registry, launcher, stream adapter)
/// - one stream per requested index, relayed to stdout
/// - Ctrl-C handling (treated as a consumer disconnect)
pub async fn run(args: CliArgs) -> Result<()> {
    let whitelist = load_whitelist(&args.config)
        .with_context(|| format!("loading whitelist from {}", args.config.display()))?;

    if args.list || args.indices.is_empty() {
        print_whitelist(&whitelist);
        return Ok(());
    }

    let service = CommandService::new(whitelist, RealProcessBackend::new());
    let wire = WireFormat::from(args.format);

    let mut launched: Vec<(String, InvocationHandle)> = Vec::with_capacity(args.indices.len());
    for raw in &args.indices {
        let handle = service
            .launch_str(raw)
            .with_context(|| format!("launching command index {raw}"))?;
        launched.push((raw.trim().to_string(), handle));
    }

    let labeled = launched.len() > 1;
    let (out_tx, mut out_rx) = mpsc::channel::<String>(STREAM_CHANNEL_CAPACITY);
    let mut streams = JoinSet::new();

    for (label, handle) in launched {
        let attachment = service
            .attach(handle)
            .with_context(|| format!("attaching to command index {label}"))?;
        let (mut messages, pump) = attachment.spawn(STREAM_CHANNEL_CAPACITY);
        let out_tx = out_tx.clone();

        streams.spawn(async move {
            loop {
                let msg = tokio::select! {
                    _ = out_tx.closed() => break,
                    msg = messages.recv() => match msg {
                        Some(msg) => msg,
                        None => break,
                    },
                };
                let encoded = if labeled {
                    wire.encode_labeled(&label, &msg)
                } else {
                    wire.encode(&msg)
                };
                if out_tx.send(encoded).await.is_err() {
                    break;
                }
            }
            drop(messages);
            pump.await
        });
    }
    drop(out_tx);

    let writer = async {
        let mut out = stdout();
        while let Some(chunk) = out_rx.recv().await {
            out.write_all(chunk.as_bytes()).await?;
            out.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    };

    tokio::select! {
        res = writer => res.context("writing stream output to stdout")?,
        res = tokio::signal::ctrl_c() => {
            res.context("listening for Ctrl+C")?;
            info!("interrupted; disconnecting all streams");
        }
    }
    drop(out_rx);

    let (mut completed, mut cancelled) = (0usize, 0usize);
    while let Some(joined) = streams.join_next().await {
        match joined {
            Ok(Ok(StreamExit::Completed)) => completed += 1,
            Ok(Ok(StreamExit::Cancelled)) => cancelled += 1,
            Ok(Err(e)) | Err(e) => warn!(error = %e, "stream task failed"),
        }
    }
    debug!(completed, cancelled, "all streams finished");

    service.shutdown();
    Ok(())
}

/// Print the whitelist with the indices clients use to launch commands.
fn print_whitelist(whitelist: &Whitelist) {
    println!("available commands ({}):", whitelist.len());
    for (idx, cmd) in whitelist.iter() {
        println!("  [{idx}] {cmd}");
    }
}
