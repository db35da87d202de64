// src/logging.rs

//! Logging setup for `cmdrunner` using `tracing` + `tracing-subscriber`.
//!
//! Filter resolution:
//! 1. `--log-level` applies one level to everything.
//! 2. otherwise `CMDRUNNER_LOG` is read as an `EnvFilter` directive string
//!    (e.g. `"debug"` or `"cmdrunner::engine=trace,info"`).
//! 3. otherwise `info`.
//!
//! Logs go to STDERR; stdout carries only streamed command output.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "CMDRUNNER_LOG";

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV).ok().as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))
}

/// Resolve the effective filter from the CLI flag and the env directive.
///
/// An unparsable env directive falls back to `info`.
pub fn build_filter(cli_level: Option<LogLevel>, env_directive: Option<&str>) -> EnvFilter {
    if let Some(lvl) = cli_level {
        return EnvFilter::new(level_directive(lvl));
    }

    env_directive
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn level_directive(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
