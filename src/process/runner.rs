// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Running external commands on the host

use crate::error::{Result, UbikindError};
use crate::process::command::{CommandOutput, ExternalCommand};
use std::future::Future;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Executes external commands. Swapped for a recording fake in tests.
pub trait CommandRunner: Send + Sync {
    /// Run to completion, capturing stdout and stderr
    fn output(&self, cmd: &ExternalCommand) -> impl Future<Output = Result<CommandOutput>> + Send;

    /// Run attached to the current terminal, returning the exit code
    fn interactive(&self, cmd: &ExternalCommand) -> impl Future<Output = Result<Option<i32>>> + Send;

    /// Start in the background and return its pid without waiting
    fn spawn_detached(&self, cmd: &ExternalCommand) -> Result<u32>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn output(&self, cmd: &ExternalCommand) -> impl Future<Output = Result<CommandOutput>> + Send {
        (**self).output(cmd)
    }

    fn interactive(&self, cmd: &ExternalCommand) -> impl Future<Output = Result<Option<i32>>> + Send {
        (**self).interactive(cmd)
    }

    fn spawn_detached(&self, cmd: &ExternalCommand) -> Result<u32> {
        (**self).spawn_detached(cmd)
    }
}

/// Runs commands with `tokio::process`
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(cmd: &ExternalCommand) -> Command {
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        command.envs(cmd.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        command
    }

    fn spawn_error(cmd: &ExternalCommand, source: std::io::Error) -> UbikindError {
        UbikindError::CommandSpawn {
            program: cmd.program.clone(),
            source,
        }
    }
}

impl CommandRunner for SystemRunner {
    #[instrument(skip_all, fields(command = %cmd))]
    async fn output(&self, cmd: &ExternalCommand) -> Result<CommandOutput> {
        let output = Self::command(cmd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Self::spawn_error(cmd, e))?;

        debug!(status = ?output.status.code(), "Command finished");

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    #[instrument(skip_all, fields(command = %cmd))]
    async fn interactive(&self, cmd: &ExternalCommand) -> Result<Option<i32>> {
        let status = Self::command(cmd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Self::spawn_error(cmd, e))?;

        Ok(status.code())
    }

    fn spawn_detached(&self, cmd: &ExternalCommand) -> Result<u32> {
        let mut command = Self::command(cmd);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false);

        // Own process group so the terminal's Ctrl-C does not reach it
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|e| Self::spawn_error(cmd, e))?;
        child.id().ok_or_else(|| UbikindError::CommandFailed {
            command: cmd.command_line(),
            exit_code: None,
            stderr: "process exited before its pid could be read".to_string(),
        })
    }
}

/// Run a command and turn a non-zero exit into `CommandFailed` carrying stderr verbatim
pub async fn run_checked<R: CommandRunner>(runner: &R, cmd: &ExternalCommand) -> Result<CommandOutput> {
    let output = runner.output(cmd).await?;
    if output.success() {
        Ok(output)
    } else {
        Err(UbikindError::CommandFailed {
            command: cmd.command_line(),
            exit_code: output.exit_code,
            stderr: output.stderr,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_runner_captures_output() {
        let cmd = ExternalCommand::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = SystemRunner.output(&cmd).await.unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_system_runner_passes_env() {
        let cmd = ExternalCommand::new("sh")
            .args(["-c", "printf %s \"$UBIKIND_TEST_VALUE\""])
            .env("UBIKIND_TEST_VALUE", "podman");
        let output = SystemRunner.output(&cmd).await.unwrap();

        assert_eq!(output.stdout, "podman");
    }

    #[tokio::test]
    async fn test_run_checked_surfaces_stderr_verbatim() {
        let cmd = ExternalCommand::new("sh").args(["-c", "echo 'boom: no such cluster' >&2; exit 1"]);
        let err = run_checked(&SystemRunner, &cmd).await.unwrap_err();

        match err {
            UbikindError::CommandFailed {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr, "boom: no such cluster\n");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let cmd = ExternalCommand::new("ubikind-definitely-not-installed");
        let err = SystemRunner.output(&cmd).await.unwrap_err();

        assert!(matches!(err, UbikindError::CommandSpawn { program, .. } if program == "ubikind-definitely-not-installed"));
    }
}
