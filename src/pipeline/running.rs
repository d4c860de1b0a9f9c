use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::{
    constants::RECORD_TX_ERR,
    domain::{RunRecord, RunStatus, RunnableUnit},
    supervisor::traits::Supervisor,
    verify::{Verdict, verify},
};

/// Executes dispatched units, at most `jobs` concurrently, and emits one
/// terminal record per unit. An unrecoverable supervisor failure stops the
/// stage: its record is still sent, but nothing queued after it runs.
#[tracing::instrument]
pub fn handle_running(
    rec_tx: Sender<RunRecord>,
    run_rx: Receiver<RunnableUnit>,
    supervisor: Arc<dyn Supervisor>,
    jobs: usize,
) {
    tokio::spawn(async move {
        let mut records = ReceiverStream::new(run_rx)
            .map(|unit| {
                let supervisor = supervisor.clone();
                execute_unit(unit, supervisor)
            })
            .buffer_unordered(jobs.max(1));

        while let Some(record) = records.next().await {
            let fatal = record.is_fatal();
            rec_tx.send(record).await.expect(RECORD_TX_ERR);
            if fatal {
                tracing::error!("Stopping the run sequence: supervisor state is unrecoverable");
                break;
            }
        }
    });
}

async fn execute_unit(unit: RunnableUnit, supervisor: Arc<dyn Supervisor>) -> RunRecord {
    tracing::debug!("Running {:?}", unit);
    let started_at = chrono::Utc::now();
    let started = Instant::now();

    let status = match supervisor.execute(&unit.request).await {
        Ok(result) => {
            tracing::debug!(
                scenario = unit.scenario.name(),
                backend = %unit.backend,
                exit_status = result.exit_status,
                timed_out = result.timed_out,
                "Engine finished"
            );
            match verify(&result, unit.scenario.expectation()) {
                Verdict::Pass => RunStatus::Passed,
                Verdict::Fail(failures) => RunStatus::Failed(failures),
            }
        }
        Err(error) => {
            tracing::error!(
                scenario = unit.scenario.name(),
                backend = %unit.backend,
                "Supervisor error: {:?}",
                error
            );
            RunStatus::Error(error)
        }
    };

    RunRecord {
        id: Uuid::new_v4(),
        scenario: unit.scenario.name().to_string(),
        backend: unit.backend,
        status,
        started_at,
        duration_ms: started.elapsed().as_millis() as u64,
        log_path: Some(unit.request.log_path.clone()),
    }
}
