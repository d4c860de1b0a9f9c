use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::pipe;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Duration, timeout};

use crate::supervisor::traits::SupervisorError;

/// Drains the shared stdout/stderr pipe concurrently with the supervised
/// process, teeing every chunk into an in-memory buffer and the run's log
/// file. A single reader on a single pipe is what preserves cross-channel
/// emission order.
#[derive(Debug)]
pub struct CaptureTask {
    buffer: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<Result<(), SupervisorError>>,
}

impl CaptureTask {
    pub fn spawn(reader: pipe::Receiver, log: File) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let handle = tokio::spawn(drain(reader, log, Arc::clone(&buffer)));
        Self { buffer, handle }
    }

    /// Waits for EOF on the pipe and hands back everything captured.
    ///
    /// Called after the process group is confirmed dead, so EOF is normally
    /// already pending; `residual` bounds the wait for the case where some
    /// process outside the group inherited the write end.
    pub async fn finish(mut self, residual: Duration) -> Result<Vec<u8>, SupervisorError> {
        match timeout(residual, &mut self.handle).await {
            Ok(Ok(drained)) => drained?,
            Ok(Err(e)) => {
                return Err(SupervisorError::Capture {
                    msg: format!("capture task failed: {}", e),
                });
            }
            Err(_) => {
                // Someone is still holding the write end. Abandon the pipe
                // and keep what was captured so far.
                self.handle.abort();
            }
        }

        let mut buffer = self.buffer.lock().await;
        Ok(std::mem::take(&mut *buffer))
    }
}

async fn drain(
    mut reader: pipe::Receiver,
    mut log: File,
    buffer: Arc<Mutex<Vec<u8>>>,
) -> Result<(), SupervisorError> {
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader
            .read(&mut chunk)
            .await
            .map_err(|e| SupervisorError::Capture {
                msg: format!("pipe read failed: {}", e),
            })?;
        if n == 0 {
            break;
        }
        buffer.lock().await.extend_from_slice(&chunk[..n]);
        log.write_all(&chunk[..n])
            .await
            .map_err(|e| SupervisorError::Capture {
                msg: format!("log write failed: {}", e),
            })?;
    }
    log.flush().await.map_err(|e| SupervisorError::Capture {
        msg: format!("log flush failed: {}", e),
    })?;
    Ok(())
}
