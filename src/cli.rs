// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;
use crate::engine::WireFormat;

/// Command-line arguments for `cmdrunner`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdrunner",
    version,
    about = "Run whitelisted commands and stream their output live.",
    long_about = None,
    allow_negative_numbers = true
)]
pub struct CliArgs {
    /// Path to the command whitelist (plain text, one command per line, or
    /// TOML with a `commands` array).
    #[arg(
        long,
        value_name = "PATH",
        env = "CMDRUNNER_CONFIG",
        default_value_os_t = default_config_path()
    )]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDRUNNER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// How streamed messages are written to stdout.
    #[arg(long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Print the whitelist with indices and exit.
    #[arg(long)]
    pub list: bool,

    /// Whitelist indices to run. All of them are streamed concurrently.
    #[arg(value_name = "INDEX")]
    pub indices: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Sse,
}

impl From<OutputFormat> for WireFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Plain => WireFormat::Plain,
            OutputFormat::Sse => WireFormat::Sse,
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
