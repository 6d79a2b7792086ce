//! Process-backed [`CommandRunner`].

use std::process::Stdio;

use async_trait::async_trait;
use streamhost_core::ports::{CommandError, CommandOutput, CommandRunner, ExternalCommand};
use tokio::process::Command;
use tracing::debug;

/// Runs external commands with `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    fn build(command: &ExternalCommand) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).stdin(Stdio::null());
        #[cfg(windows)]
        {
            // CREATE_NO_WINDOW: keep console windows from flashing up
            cmd.creation_flags(0x0800_0000);
        }
        cmd
    }

    fn launch_error(command: &ExternalCommand, err: &std::io::Error) -> CommandError {
        CommandError::Launch {
            program: command.program.clone(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn output(&self, command: &ExternalCommand) -> Result<CommandOutput, CommandError> {
        debug!(command = %command, "Running external command");
        let output = Self::build(command)
            .output()
            .await
            .map_err(|e| Self::launch_error(command, &e))?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn spawn_detached(&self, command: &ExternalCommand) -> Result<Option<u32>, CommandError> {
        debug!(command = %command, "Spawning detached command");
        let child = Self::build(command)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false)
            .spawn()
            .map_err(|e| Self::launch_error(command, &e))?;
        // Dropping the handle leaves the process running; tokio reaps it in the background.
        Ok(child.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[cfg(unix)]
    async fn captures_stdout_and_status() {
        let runner = TokioCommandRunner;
        let out = runner
            .output(&ExternalCommand::new("sh").args(["-c", "echo hello; exit 3"]))
            .await
            .unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.status, Some(3));
        assert!(!out.success());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn run_turns_failure_into_error() {
        let runner = TokioCommandRunner;
        let err = runner
            .run(&ExternalCommand::new("sh").args(["-c", "echo bad >&2; exit 1"]))
            .await
            .unwrap_err();
        match err {
            CommandError::Failed { status, stderr, .. } => {
                assert_eq!(status, Some(1));
                assert_eq!(stderr, "bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_launch_error() {
        let runner = TokioCommandRunner;
        let err = runner
            .output(&ExternalCommand::new("definitely_not_a_real_command_12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Launch { .. }));
    }
}
