use async_trait::async_trait;
use tokio::time::{Duration, sleep};

use crate::supervisor::traits::{ExecutionRequest, ExecutionResult, Supervisor, SupervisorError};

/// Supervisor that returns a fixed result after a fixed delay.
#[derive(Debug, Clone)]
pub struct SupervisorStub {
    pub result: Result<ExecutionResult, SupervisorError>,
    pub delay: Duration,
}

impl SupervisorStub {
    pub fn new(result: Result<ExecutionResult, SupervisorError>, delay: Duration) -> Self {
        Self { result, delay }
    }
}

#[async_trait]
impl Supervisor for SupervisorStub {
    #[tracing::instrument]
    async fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionResult, SupervisorError> {
        tracing::debug!("SupervisorStub::execute called with request: {:?}", request);
        sleep(self.delay).await;
        self.result.clone()
    }
}
