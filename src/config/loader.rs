// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawConfigFile, Whitelist};
use crate::errors::Result;

/// Load a whitelist file without validation.
///
/// - `*.toml`: a `commands = [...]` array.
/// - anything else: one command per line. Trailing whitespace is stripped;
///   blank lines and `#` comments are skipped.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config = if is_toml {
        toml::from_str(&contents)?
    } else {
        parse_lines(&contents)
    };

    debug!(path = %path.display(), commands = config.commands.len(), "loaded whitelist file");
    Ok(config)
}

/// Parse the plain-text whitelist format.
pub fn parse_lines(contents: &str) -> RawConfigFile {
    let commands = contents
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim_start().is_empty() && !line.trim_start().starts_with('#'))
        .map(str::to_string)
        .collect();
    RawConfigFile { commands }
}

/// Load a whitelist from `path` and validate it.
///
/// This is the recommended entry point for the rest of the application.
pub fn load_whitelist(path: impl AsRef<Path>) -> Result<Whitelist> {
    let raw = load_from_path(&path)?;
    Whitelist::try_from(raw)
}

/// Default whitelist location: `config.txt` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.txt")
}
