#![allow(dead_code)]

use cmdrunner::config::{RawConfigFile, Whitelist};

/// Builder for `Whitelist` to simplify test setup.
pub struct WhitelistBuilder {
    config: RawConfigFile,
}

impl WhitelistBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_command(mut self, cmd: &str) -> Self {
        self.config.commands.push(cmd.to_string());
        self
    }

    pub fn with_commands<'a>(mut self, cmds: impl IntoIterator<Item = &'a str>) -> Self {
        self.config
            .commands
            .extend(cmds.into_iter().map(str::to_string));
        self
    }

    pub fn build(self) -> Whitelist {
        Whitelist::try_from(self.config).expect("Failed to build valid whitelist from builder")
    }
}

impl Default for WhitelistBuilder {
    fn default() -> Self {
        Self::new()
    }
}
