// src/exec/command.rs

//! Shell command unit of work used by the `deptask` binary.

use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

use super::context::TaskContext;
use super::work::{Work, WorkFuture};

/// A task that runs a command line through the platform shell.
///
/// - stdout and stderr are forwarded line by line to the log (stdout at
///   `info`, stderr at `warn`).
/// - A non-zero exit status is a failure.
/// - If the context is cancelled while the process runs, the child is killed
///   and the work fails with [`CommandCancelled`].
#[derive(Debug, Clone)]
pub struct ShellCommand {
    name: Arc<str>,
    cmd: Arc<str>,
}

/// Returned by [`ShellCommand`] when its process was killed on cancellation.
#[derive(Debug, thiserror::Error)]
#[error("command for task '{0}' was cancelled")]
pub struct CommandCancelled(pub String);

impl ShellCommand {
    pub fn new(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            cmd: Arc::from(cmd.into()),
        }
    }
}

impl Work for ShellCommand {
    fn run(&self, ctx: TaskContext) -> WorkFuture {
        let name = Arc::clone(&self.name);
        let cmd = Arc::clone(&self.cmd);
        Box::pin(async move { run_shell(&name, &cmd, ctx).await })
    }
}

fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

async fn run_shell(name: &str, cmd: &str, ctx: TaskContext) -> Result<()> {
    info!(task = %name, cmd = %cmd, "starting task process");

    let mut command = shell_command(cmd);
    command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for task '{name}'"))?;

    if let Some(stdout) = child.stdout.take() {
        let task_name = name.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(task = %task_name, "stdout: {}", line);
            }
        });
    }

    // Always consume stderr so buffers don't fill.
    if let Some(stderr) = child.stderr.take() {
        let task_name = name.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!(task = %task_name, "stderr: {}", line);
            }
        });
    }

    tokio::select! {
        status = child.wait() => {
            let status = status.with_context(|| format!("waiting for process of task '{name}'"))?;
            let code = status.code().unwrap_or(-1);

            info!(
                task = %name,
                exit_code = code,
                success = status.success(),
                "task process exited"
            );

            if !status.success() {
                bail!("task '{name}' exited with status {code}");
            }
            Ok(())
        }

        _ = ctx.cancelled() => {
            info!(task = %name, "cancellation requested; killing task process");
            if let Err(e) = child.kill().await {
                warn!(task = %name, error = %e, "failed to kill child process on cancellation");
            }
            Err(CommandCancelled(name.to_string()).into())
        }
    }
}
