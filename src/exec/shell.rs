// src/exec/shell.rs

use std::process::Stdio;

use tokio::process::Command;

/// Shell used to interpret whitelisted command strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    program: String,
    flag: String,
}

impl Shell {
    pub fn new(program: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            flag: flag.into(),
        }
    }

    /// `cmd /C` on Windows, `sh -c` elsewhere.
    pub fn platform() -> Self {
        if cfg!(windows) {
            Self::new("cmd", "/C")
        } else {
            Self::new("sh", "-c")
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Build the command for `cmdline`, with both output streams piped and
    /// stdin closed.
    pub fn command(&self, cmdline: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(&self.flag)
            .arg(cmdline)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::platform()
    }
}
