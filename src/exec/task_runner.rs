// src/exec/task_runner.rs

//! Individual step process runner.

use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::backend::{CommandOutput, Invocation};
use super::env::resolve_overlay;

/// Run a single step process to completion, capturing stdout and stderr.
///
/// Never returns an error: a process that cannot be started is reported as
/// a failed [`CommandOutput`] just like one that exits non-zero.
pub async fn run_command(invocation: Invocation<'_>) -> CommandOutput {
    let cmd_line = invocation.display();

    match run_command_inner(invocation).await {
        Ok(output) => output,
        Err(err) => {
            warn!(
                cmd = %cmd_line,
                cwd = %invocation.cwd.display(),
                error = %format!("{err:#}"),
                "step process could not be started"
            );
            CommandOutput::failed(format!("{err:#}"))
        }
    }
}

async fn run_command_inner(invocation: Invocation<'_>) -> Result<CommandOutput> {
    let Some((program, args)) = invocation.command.split_first() else {
        return Ok(CommandOutput::failed("empty command"));
    };

    let cmd_line = invocation.display();
    info!(cmd = %cmd_line, cwd = %invocation.cwd.display(), "starting step process");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(invocation.cwd)
        .envs(resolve_overlay(invocation.env, invocation.cwd))
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let output = cmd
        .output()
        .await
        .with_context(|| format!("failed to start '{program}'"))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let error = exit_error(output.status);

    info!(
        cmd = %cmd_line,
        exit_code = output.status.code().unwrap_or(-1),
        success = output.status.success(),
        "step process exited"
    );
    debug!(cmd = %cmd_line, "stdout:\n{}", stdout);
    debug!(cmd = %cmd_line, "stderr:\n{}", stderr);

    Ok(CommandOutput {
        stdout,
        stderr,
        error,
    })
}

/// Describe an unsuccessful exit status, `None` on success.
fn exit_error(status: ExitStatus) -> Option<String> {
    if status.success() {
        return None;
    }
    if let Some(code) = status.code() {
        return Some(format!("exit status {code}"));
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Some(format!("terminated by signal {signal}"));
        }
    }

    Some("terminated abnormally".to_string())
}
