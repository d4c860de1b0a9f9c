use async_trait::async_trait;
use std::process::Stdio;
use tokio::net::unix::pipe;
use tokio::process::Command;
use tokio::time::{Duration, Instant, timeout};

use crate::constants::{
    DEFAULT_CLEANUP_WINDOW, DEFAULT_GRACE, DEFAULT_RESIDUAL_WINDOW, TIMED_OUT_STATUS,
};
use crate::supervisor::capture::CaptureTask;
use crate::supervisor::group::{GroupState, ProcessGroup};
use crate::supervisor::traits::{ExecutionRequest, ExecutionResult, Supervisor, SupervisorError};

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub grace: Duration,
    pub cleanup_window: Duration,
    pub residual_window: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            grace: DEFAULT_GRACE,
            cleanup_window: DEFAULT_CLEANUP_WINDOW,
            residual_window: DEFAULT_RESIDUAL_WINDOW,
        }
    }
}

/// Executes engine invocations in their own process group, with a wall-clock
/// deadline and complete combined-output capture.
#[derive(Debug, Default)]
pub struct BasicSupervisor {
    config: SupervisorConfig,
}

impl BasicSupervisor {
    pub fn new() -> Self {
        Self::with_config(SupervisorConfig::default())
    }

    pub fn with_config(config: SupervisorConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Supervisor for BasicSupervisor {
    async fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionResult, SupervisorError> {
        // Fresh log for this run; a rerun must never show stale output.
        if let Some(parent) = request.log_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| SupervisorError::Capture {
                        msg: format!("failed to create log directory: {}", e),
                    })?;
            }
        }
        let log = tokio::fs::File::create(&request.log_path)
            .await
            .map_err(|e| SupervisorError::Capture {
                msg: format!(
                    "failed to create log file {}: {}",
                    request.log_path.display(),
                    e
                ),
            })?;

        // One pipe carries both channels so interleaving survives capture.
        let (pipe_tx, pipe_rx) = pipe::pipe().map_err(|e| SupervisorError::Capture {
            msg: format!("failed to create capture pipe: {}", e),
        })?;
        let stdout_fd = pipe_tx
            .into_blocking_fd()
            .map_err(|e| SupervisorError::Capture {
                msg: format!("failed to prepare capture pipe: {}", e),
            })?;
        let stderr_fd = stdout_fd.try_clone().map_err(|e| SupervisorError::Capture {
            msg: format!("failed to clone capture pipe: {}", e),
        })?;

        let start_time = Instant::now();
        let mut child = {
            let mut cmd = Command::new(&request.executable);
            cmd.args(&request.args)
                .stdin(Stdio::null())
                .stdout(Stdio::from(stdout_fd))
                .stderr(Stdio::from(stderr_fd))
                .process_group(0)
                .kill_on_drop(true);
            cmd.spawn().map_err(|e| SupervisorError::Launch {
                executable: request.executable.display().to_string(),
                msg: e.to_string(),
            })?
            // cmd drops here, closing our copies of the write end; without
            // that the drain task would never see EOF.
        };

        let Some(pid) = child.id() else {
            return Err(SupervisorError::Launch {
                executable: request.executable.display().to_string(),
                msg: "pid unavailable after spawn".to_string(),
            });
        };
        let group = ProcessGroup::new(pid);
        tracing::debug!(
            pgid = group.pgid(),
            state = ?GroupState::Running,
            "spawned {:?}",
            request.executable
        );

        let capture = CaptureTask::spawn(pipe_rx, log);

        // Race the child against the deadline.
        let (exit_status, timed_out) = match timeout(request.timeout, child.wait()).await {
            Ok(waited) => {
                let status = waited.map_err(|e| SupervisorError::Capture {
                    msg: format!("failed to wait for process: {}", e),
                })?;
                (exit_code(&status), false)
            }
            Err(_) => {
                tracing::info!(
                    pgid = group.pgid(),
                    "deadline of {:?} hit, escalating",
                    request.timeout
                );
                match group.escalate(&mut child, self.config.grace).await {
                    Ok(state) => {
                        tracing::debug!(pgid = group.pgid(), state = ?state, "group taken down");
                    }
                    Err(e) => {
                        tracing::error!(pgid = group.pgid(), "takedown signaling failed: {}", e);
                        return Err(SupervisorError::CleanupFailed { pgid: group.pgid() });
                    }
                }
                (TIMED_OUT_STATUS, true)
            }
        };

        // The run is not over until the whole group is gone. Anything the
        // child left behind dies now.
        if group.is_alive() {
            if let Err(e) = group.signal_kill() {
                tracing::error!(pgid = group.pgid(), "group kill failed: {}", e);
                return Err(SupervisorError::CleanupFailed { pgid: group.pgid() });
            }
        }
        if !group.await_death(self.config.cleanup_window).await {
            return Err(SupervisorError::CleanupFailed { pgid: group.pgid() });
        }

        let output = capture.finish(self.config.residual_window).await?;
        let execution_time_ms = start_time.elapsed().as_millis() as u64;
        tracing::debug!(
            pgid = group.pgid(),
            exit_status,
            timed_out,
            bytes = output.len(),
            "run finished in {}ms",
            execution_time_ms
        );

        Ok(ExecutionResult {
            exit_status,
            timed_out,
            output,
            execution_time_ms,
        })
    }
}

fn exit_code(status: &std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .unwrap_or_else(|| status.signal().map(|s| 128 + s).unwrap_or(1))
}
