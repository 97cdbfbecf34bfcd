//! Shell subprocess runner - runs commands through `sh -c`

use crate::process::{
    CommandResult, CommandRunner, ExecOptions, OutputCallback, ProcessError, StdioMode, StreamKind,
};
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Runs commands through the platform shell
#[derive(Debug, Clone)]
pub struct ShellRunner {
    /// Shell executable
    shell: String,

    /// Flag that makes the shell read the command from its next argument
    shell_flag: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        if cfg!(windows) {
            Self::with_shell("cmd", "/C")
        } else {
            Self::with_shell("sh", "-c")
        }
    }
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific shell, e.g. `("bash", "-c")`
    pub fn with_shell(shell: impl Into<String>, shell_flag: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            shell_flag: shell_flag.into(),
        }
    }

    fn build_command(&self, command: &str, options: &ExecOptions) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg(&self.shell_flag).arg(command);

        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }

        // Layered over the inherited environment; the caller's map is only read.
        cmd.envs(&options.env);

        match options.stdio {
            StdioMode::Capture => {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped());
            }
            StdioMode::Inherit => {
                cmd.stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
        }

        cmd.kill_on_drop(true);
        cmd
    }

    /// Drain both pipes concurrently, then wait for the exit status
    async fn run_to_completion(
        command: &str,
        mut child: Child,
        callback: Option<&dyn OutputCallback>,
    ) -> Result<(ExitStatus, String, String), ProcessError> {
        let io_err = |source| ProcessError::Io {
            command: command.to_string(),
            source,
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (stdout, stderr) = tokio::try_join!(
            drain(stdout, StreamKind::Stdout, callback),
            drain(stderr, StreamKind::Stderr, callback),
        )
        .map_err(io_err)?;

        let status = child.wait().await.map_err(io_err)?;
        Ok((status, stdout, stderr))
    }
}

/// Read a pipe line by line, forwarding each chunk and buffering all of it
///
/// Chunks end at `\n` only. A `\r`-redrawn progress line is forwarded once the
/// producer writes its next newline or closes the pipe.
async fn drain<R>(
    pipe: Option<R>,
    kind: StreamKind,
    callback: Option<&dyn OutputCallback>,
) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut collected = String::new();
    let Some(pipe) = pipe else {
        return Ok(collected);
    };

    let mut reader = BufReader::new(pipe);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        let chunk = String::from_utf8_lossy(&line);
        if let Some(cb) = callback {
            cb.on_output(kind, &chunk);
        }
        collected.push_str(&chunk);
    }

    Ok(collected)
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn execute(
        &self,
        command: &str,
        options: &ExecOptions,
        callback: Option<&dyn OutputCallback>,
    ) -> Result<CommandResult, ProcessError> {
        debug!(
            "Spawning `{}` in {}",
            command,
            options
                .cwd
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ".".to_string())
        );

        let child = self
            .build_command(command, options)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let run = Self::run_to_completion(command, child, callback);
        let (status, stdout, stderr) = match options.timeout {
            Some(limit) => timeout(limit, run)
                .await
                .map_err(|_| ProcessError::Timeout {
                    command: command.to_string(),
                    secs: limit.as_secs(),
                })??,
            None => run.await?,
        };

        let exit_code = status.code().unwrap_or(-1);
        debug!("`{}` exited with code {}", command, exit_code);

        if exit_code != 0 && !options.ignore_exit_code {
            warn!("`{}` exited with code {}", command, exit_code);
            return Err(ProcessError::CommandFailed {
                command: command.to_string(),
                exit_code,
                stdout,
                stderr,
            });
        }

        Ok(CommandResult {
            stdout,
            stderr,
            exit_code,
        })
    }
}
