// src/config/validate.rs

use crate::config::model::{RawConfigFile, Whitelist};
use crate::errors::{CmdRunnerError, Result};

impl TryFrom<RawConfigFile> for Whitelist {
    type Error = CmdRunnerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(Whitelist::new_unchecked(raw.commands))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_commands(cfg)?;
    validate_commands(cfg)?;
    Ok(())
}

fn ensure_has_commands(cfg: &RawConfigFile) -> Result<()> {
    if cfg.commands.is_empty() {
        return Err(CmdRunnerError::ConfigError(
            "whitelist must contain at least one command".to_string(),
        ));
    }
    Ok(())
}

fn validate_commands(cfg: &RawConfigFile) -> Result<()> {
    for (idx, cmd) in cfg.commands.iter().enumerate() {
        if cmd.trim().is_empty() {
            return Err(CmdRunnerError::ConfigError(format!(
                "command at index {idx} is empty"
            )));
        }
    }
    Ok(())
}
