//! External command port.
//!
//! Every OS utility the subsystem shells out to (locate commands, process
//! tables, package managers, disk-image tools, archivers) goes through
//! [`CommandRunner`]. Output parsing lives in one place in the runtime
//! instead of at each call site.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// A program plus its arguments, without shell interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// True when this is `program` invoked with `first` as its first argument.
    pub fn is(&self, program: &str, first: &str) -> bool {
        self.program == program && self.args.first().is_some_and(|a| a == first)
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub const fn success(&self) -> bool {
        matches!(self.status, Some(0))
    }
}

/// Errors from running external commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started (missing, permission denied).
    #[error("failed to launch `{program}`: {reason}")]
    Launch { program: String, reason: String },

    /// The program ran and exited unsuccessfully.
    #[error("`{command}` exited with status {status:?}: {stderr}")]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
}

/// Runs external programs.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion and capture output regardless of exit status.
    async fn output(&self, command: &ExternalCommand) -> Result<CommandOutput, CommandError>;

    /// Start without waiting; returns the child PID when known.
    fn spawn_detached(&self, command: &ExternalCommand) -> Result<Option<u32>, CommandError>;

    /// Run to completion, treating a non-zero exit as an error.
    async fn run(&self, command: &ExternalCommand) -> Result<CommandOutput, CommandError> {
        let output = self.output(command).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(CommandError::Failed {
                command: command.to_string(),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_args_in_order() {
        let cmd = ExternalCommand::new("flatpak")
            .arg("install")
            .args(["--user", "-y"]);
        assert_eq!(cmd.args, vec!["install", "--user", "-y"]);
        assert_eq!(cmd.to_string(), "flatpak install --user -y");
        assert!(cmd.is("flatpak", "install"));
        assert!(!cmd.is("flatpak", "info"));
    }

    #[test]
    fn success_requires_zero_exit() {
        assert!(CommandOutput::ok("").success());
        assert!(!CommandOutput::failed(1, "nope").success());
        assert!(!CommandOutput::default().success());
    }
}
