use std::borrow::Cow;
use std::path::PathBuf;

use tokio::time::Duration;

/// One bounded engine invocation: what to launch, with what argv, how long
/// it may run, and where its combined output log goes.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub executable: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
    pub log_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub exit_status: i32,
    pub timed_out: bool,
    /// stdout and stderr interleaved in emission order, complete up to the
    /// moment the process group died.
    pub output: Vec<u8>,
    pub execution_time_ms: u64,
}

impl ExecutionResult {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SupervisorError {
    #[error("failed to launch `{executable}`: {msg}")]
    Launch { executable: String, msg: String },
    #[error("output capture failed: {msg}")]
    Capture { msg: String },
    #[error("process group {pgid} is still alive after SIGKILL")]
    CleanupFailed { pgid: i32 },
}

#[mockall::automock]
#[async_trait::async_trait]
pub trait Supervisor: std::fmt::Debug + Send + Sync {
    async fn execute(&self, request: &ExecutionRequest)
    -> Result<ExecutionResult, SupervisorError>;
}
