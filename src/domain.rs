use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::Backend;
use crate::scenario::Scenario;
use crate::supervisor::traits::{ExecutionRequest, SupervisorError};
use crate::verify::CheckFailure;

/// A scenario×backend pair the suite intends to run.
#[derive(Debug, Clone)]
pub struct PlannedRun {
    pub scenario: Arc<dyn Scenario>,
    pub backend: Backend,
}

/// A planned run that survived dispatch and is ready for the supervisor.
#[derive(Debug, Clone)]
pub struct RunnableUnit {
    pub scenario: Arc<dyn Scenario>,
    pub backend: Backend,
    pub request: ExecutionRequest,
}

/// Terminal outcome of one scenario×backend unit. There is no retry: every
/// unit produces exactly one record.
#[derive(Debug, Clone)]
pub enum RunStatus {
    /// Declared not applicable before any process was spawned.
    Skipped { reason: String },
    Passed,
    Failed(Vec<CheckFailure>),
    /// The supervisor could not produce a result at all. Launch failures are
    /// reported here, never conflated with a non-zero engine exit.
    Error(SupervisorError),
}

#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: Uuid,
    pub scenario: String,
    pub backend: Backend,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub log_path: Option<PathBuf>,
}

impl RunRecord {
    pub fn skipped(scenario: &str, backend: Backend, reason: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            scenario: scenario.to_string(),
            backend,
            status: RunStatus::Skipped { reason },
            started_at: Utc::now(),
            duration_ms: 0,
            log_path: None,
        }
    }

    /// Skipped runs do not count against the suite.
    pub fn acceptable(&self) -> bool {
        matches!(self.status, RunStatus::Passed | RunStatus::Skipped { .. })
    }

    /// A group that survives SIGKILL poisons every run that would follow.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.status,
            RunStatus::Error(SupervisorError::CleanupFailed { .. })
        )
    }
}

/// Everything the suite produced, in completion order.
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub records: Vec<RunRecord>,
}

impl SuiteReport {
    pub fn success(&self) -> bool {
        !self.records.is_empty() && self.records.iter().all(|r| r.acceptable())
    }

    pub fn passed(&self) -> usize {
        self.count(|r| matches!(r.status, RunStatus::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|r| matches!(r.status, RunStatus::Failed(_) | RunStatus::Error(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r.status, RunStatus::Skipped { .. }))
    }

    fn count(&self, pred: impl Fn(&&RunRecord) -> bool) -> usize {
        self.records.iter().filter(pred).count()
    }
}
