// src/errors.rs

//! Crate-wide error type and aliases.

use thiserror::Error;

use crate::types::InvocationHandle;

#[derive(Error, Debug)]
pub enum CmdRunnerError {
    /// The requested command index is out of range or not an integer.
    #[error("Invalid command index: {0}")]
    InvalidIndex(String),

    /// No live sink is registered under this handle.
    #[error("Invalid task ID: {0}")]
    NotFound(InvocationHandle),

    /// Another consumer is already attached to this handle.
    #[error("Task {0} already has an attached consumer")]
    AlreadyAttached(InvocationHandle),

    /// The OS refused to create the child process.
    #[error("Failed to spawn command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Handle already registered: {0}")]
    DuplicateHandle(InvocationHandle),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CmdRunnerError {
    /// HTTP-equivalent status for an external transport relaying this error.
    pub fn status_code(&self) -> u16 {
        match self {
            CmdRunnerError::InvalidIndex(_) => 400,
            CmdRunnerError::NotFound(_) => 404,
            CmdRunnerError::AlreadyAttached(_) => 409,
            _ => 500,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CmdRunnerError>;
