use std::sync::Arc;

use tokio::sync::mpsc::{Receiver, Sender};

use crate::{
    constants::{RECORD_TX_ERR, RUN_TX_ERR},
    dispatch::{Dispatch, Dispatcher},
    domain::{PlannedRun, RunRecord, RunnableUnit},
};

#[tracing::instrument]
pub fn handle_dispatching(
    run_tx: Sender<RunnableUnit>,
    rec_tx: Sender<RunRecord>,
    mut plan_rx: Receiver<PlannedRun>,
    dispatcher: Arc<Dispatcher>,
) {
    tokio::spawn(async move {
        while let Some(planned) = plan_rx.recv().await {
            tracing::debug!("Dispatching {:?}", planned);

            match dispatcher.resolve(planned.scenario.as_ref(), planned.backend) {
                Dispatch::Run(request) => {
                    run_tx
                        .send(RunnableUnit {
                            scenario: planned.scenario,
                            backend: planned.backend,
                            request,
                        })
                        .await
                        .expect(RUN_TX_ERR);
                }
                Dispatch::Skip { reason } => {
                    tracing::info!(
                        "Skipping {} on {}: {}",
                        planned.scenario.name(),
                        planned.backend,
                        reason
                    );
                    rec_tx
                        .send(RunRecord::skipped(
                            planned.scenario.name(),
                            planned.backend,
                            reason,
                        ))
                        .await
                        .expect(RECORD_TX_ERR);
                }
            }
        }
    });
}
