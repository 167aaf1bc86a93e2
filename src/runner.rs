//! Blocking execution of external programs behind a swappable seam.
//!
//! Everything this tool does to the host goes through [`CommandRunner`]:
//! `virsh`, `getent` and `virt-customize`. Tests substitute a fake that
//! records invocations and returns scripted output.

use std::fmt;
use std::process::Command;

use crate::config::Settings;
use crate::error::InstallError;

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a command that touches libvirt state, wrapped in `sudo` when
    /// the settings ask for it.
    pub fn privileged<I, S>(settings: &Settings, program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if settings.sudo {
            let mut all = vec![program.to_string()];
            all.extend(args.into_iter().map(Into::into));
            Self::new("sudo", all)
        } else {
            Self::new(program, args)
        }
    }

    /// The name of the program doing the actual work, skipping a `sudo` prefix.
    pub fn tool(&self) -> &str {
        match (self.program.as_str(), self.args.first()) {
            ("sudo", Some(first)) => first,
            (program, _) => program,
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '\'') {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&self.stderr));
        text
    }

    pub fn status_text(&self) -> String {
        match self.status {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".into(),
        }
    }
}

pub trait CommandRunner {
    /// Run to completion. `Err` only when the program could not be started;
    /// a non-zero exit is reported through [`CommandOutput::status`].
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, InstallError>;
}

/// Runs commands on the host with `std::process`.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, InstallError> {
        tracing::debug!(command = %invocation, "running");
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()
            .map_err(|source| InstallError::Spawn {
                command: invocation.tool().to_string(),
                source,
            })?;

        let result = CommandOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        };
        tracing::debug!(tool = invocation.tool(), status = ?result.status, "finished");
        Ok(result)
    }
}
