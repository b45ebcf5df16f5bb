//! Build execution
//!
//! Spawns the install+build command and relays its output through the
//! build context, one event per line.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::domain::build::BuildOutcome;

use super::context::BuildContext;

/// 构建执行错误
#[derive(Debug)]
pub enum BuildError {
    /// 命令启动失败（工作目录缺失、sh 不可用）
    Spawn(std::io::Error),
    /// 等待命令结束失败
    Wait(std::io::Error),
    /// 构建被取消
    Cancelled,
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Spawn(e) => write!(f, "Failed to spawn build command: {}", e),
            BuildError::Wait(e) => write!(f, "Failed to wait for build command: {}", e),
            BuildError::Cancelled => write!(f, "Build was cancelled"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Spawn(e) | BuildError::Wait(e) => Some(e),
            BuildError::Cancelled => None,
        }
    }
}

/// Run the build command in `work_dir` and stream its output.
///
/// stdout lines are relayed verbatim; stderr lines get an `error: ` prefix.
/// The relay tasks are drained before returning so completion events
/// published by the caller strictly follow the last output line. The exit
/// code is reported in the outcome, never swallowed.
pub async fn run(
    ctx: &BuildContext,
    work_dir: &Path,
    command: &str,
    cancel: CancellationToken,
    timeout: Duration,
) -> Result<BuildOutcome, BuildError> {
    let mut child = match Command::new("sh")
        .args(["-c", command])
        .current_dir(work_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            error!(project = %ctx.project_id, error = %e, "Failed to spawn build command");
            if let Err(pe) = ctx.publish(&format!("Failed to start build: {}", e)).await {
                warn!(error = %pe, "Failed to publish spawn failure event");
            }
            return Err(BuildError::Spawn(e));
        }
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // A dropped line must not kill a running build, so relay failures
    // only warn.
    let ctx_stdout = ctx.clone();
    let stdout_task = tokio::spawn(async move {
        if let Some(stdout) = stdout {
            let reader = BufReader::new(stdout);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Err(e) = ctx_stdout.publish(&line).await {
                    warn!(error = %e, "Dropped build output line");
                }
            }
        }
    });

    let ctx_stderr = ctx.clone();
    let stderr_task = tokio::spawn(async move {
        if let Some(stderr) = stderr {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Err(e) = ctx_stderr.publish(&format!("error: {}", line)).await {
                    warn!(error = %e, "Dropped build output line");
                }
            }
        }
    });

    let outcome = tokio::select! {
        _ = cancel.cancelled() => {
            warn!(project = %ctx.project_id, "Build cancelled, killing process");
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            return Err(BuildError::Cancelled);
        }
        _ = tokio::time::sleep(timeout) => {
            error!(project = %ctx.project_id, "Build timed out after {:?}", timeout);
            let _ = child.kill().await;
            let _ = child.wait().await;
            BuildOutcome { exit_code: -1, timed_out: true }
        }
        status = child.wait() => {
            let status = status.map_err(BuildError::Wait)?;
            BuildOutcome { exit_code: status.code().unwrap_or(-1), timed_out: false }
        }
    };

    // Drain the relay tasks so no output event can trail the completion
    let _ = stdout_task.await;
    let _ = stderr_task.await;

    Ok(outcome)
}
