// src/config/model.rs

use std::ops::Index;
use std::sync::Arc;

use serde::Deserialize;

/// Whitelist file as read from TOML.
///
/// ```toml
/// commands = [
///     "echo hello",
///     "ls -la",
/// ]
/// ```
///
/// Plain-text whitelists (one command per line) are converted into this
/// shape by the loader.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub commands: Vec<String>,
}

/// The ordered, immutable list of commands that may be executed.
///
/// Commands are only ever referenced by index. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Whitelist {
    commands: Arc<[String]>,
}

impl Whitelist {
    /// Build a whitelist without validation (tests, programmatic setup).
    pub fn new_unchecked(commands: Vec<String>) -> Self {
        Self {
            commands: commands.into(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.commands.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// `(index, command)` pairs in whitelist order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.commands.iter().map(String::as_str).enumerate()
    }
}

impl Index<usize> for Whitelist {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.commands[index]
    }
}
