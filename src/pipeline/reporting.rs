use tokio::sync::mpsc::Receiver;

use crate::domain::{RunRecord, RunStatus, SuiteReport};

/// Collects records until every producing stage is done and prints one line
/// per run as it lands, then the suite summary.
pub async fn collect_report(mut rec_rx: Receiver<RunRecord>) -> SuiteReport {
    let mut report = SuiteReport::default();
    while let Some(record) = rec_rx.recv().await {
        print_record(&record);
        report.records.push(record);
    }

    println!(
        "suite: {} passed, {} failed, {} skipped ({} runs)",
        report.passed(),
        report.failed(),
        report.skipped(),
        report.records.len()
    );
    report
}

fn print_record(record: &RunRecord) {
    let seconds = record.duration_ms as f64 / 1000.0;
    match &record.status {
        RunStatus::Passed => {
            println!(
                "PASS  {:<12} {:<12} {:>8.1}s",
                record.scenario,
                record.backend.id(),
                seconds
            );
        }
        RunStatus::Skipped { reason } => {
            println!(
                "SKIP  {:<12} {:<12} {}",
                record.scenario,
                record.backend.id(),
                reason
            );
        }
        RunStatus::Failed(failures) => {
            println!(
                "FAIL  {:<12} {:<12} {:>8.1}s",
                record.scenario,
                record.backend.id(),
                seconds
            );
            for failure in failures {
                println!("      - {}", failure);
            }
            if let Some(log_path) = &record.log_path {
                println!("      log: {}", log_path.display());
            }
        }
        RunStatus::Error(error) => {
            println!(
                "ERROR {:<12} {:<12} {}",
                record.scenario,
                record.backend.id(),
                error
            );
        }
    }
}
