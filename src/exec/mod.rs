// src/exec/mod.rs

//! Process execution layer.
//!
//! Spawns whitelisted commands with `tokio::process::Command` and feeds
//! their output into per-invocation sinks.
//!
//! - [`runner`] spawns one child and drains stdout/stderr into a sink.
//! - [`shell`] builds the shell invocation (platform default or custom).
//! - [`backend`] provides the `ProcessBackend` trait and the production
//!   `RealProcessBackend`; tests can replace it with a scripted backend.

pub mod backend;
pub mod runner;
pub mod shell;

pub use backend::{ProcessBackend, RealProcessBackend};
pub use shell::Shell;
pub use runner::start;
