//! End to end suite runs against a stand-in engine binary.
//!
//! The stand-in (`graybox-mock`) speaks the real engine's command line and
//! output format for the stock fleet targets, so these tests drive the whole
//! pipeline: dispatch, supervised execution, output checks, and the report.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Duration;
use uuid::Uuid;

use graybox_harness::backend::Backend;
use graybox_harness::dispatch::Dispatcher;
use graybox_harness::domain::{PlannedRun, RunStatus, SuiteReport};
use graybox_harness::pipeline::dispatching::handle_dispatching;
use graybox_harness::pipeline::reporting::collect_report;
use graybox_harness::pipeline::running::handle_running;
use graybox_harness::scenario::{fleet, Scenario, ScenarioDef};
use graybox_harness::supervisor::basic::{BasicSupervisor, SupervisorConfig};
use graybox_harness::supervisor::traits::Supervisor;
use graybox_harness::verify::{CheckFailure, Expectation};

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("graybox-e2e-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("Failed to create scratch dir");
    dir
}

/// Installs the stand-in engine under the conventional name for each backend
/// and returns the engine prefix to dispatch against.
fn install_engines(dir: &Path, backends: &[Backend]) -> PathBuf {
    let mock = PathBuf::from(env!("CARGO_BIN_EXE_graybox-mock"));
    let prefix = dir.join("graybox");
    for backend in backends {
        std::fs::copy(&mock, backend.executable(&prefix))
            .expect("Failed to install the stand-in engine");
    }
    prefix
}

fn create_dispatcher(prefix: PathBuf, dir: &Path) -> Dispatcher {
    Dispatcher::new(prefix, PathBuf::from("targets"), dir.join("logs"))
}

fn quick_supervisor() -> Arc<dyn Supervisor> {
    Arc::new(BasicSupervisor::with_config(SupervisorConfig {
        grace: Duration::from_millis(200),
        cleanup_window: Duration::from_secs(2),
        residual_window: Duration::from_millis(200),
    }))
}

async fn run_suite(
    scenarios: Vec<Arc<dyn Scenario>>,
    backends: &[Backend],
    dispatcher: Dispatcher,
    supervisor: Arc<dyn Supervisor>,
) -> SuiteReport {
    let (plan_tx, plan_rx) = mpsc::channel(64);
    let (run_tx, run_rx) = mpsc::channel(64);
    let (rec_tx, rec_rx) = mpsc::channel(64);

    handle_dispatching(run_tx, rec_tx.clone(), plan_rx, Arc::new(dispatcher));
    handle_running(rec_tx, run_rx, supervisor, 4);

    for scenario in scenarios {
        for backend in backends {
            plan_tx
                .send(PlannedRun {
                    scenario: Arc::clone(&scenario),
                    backend: *backend,
                })
                .await
                .expect("Failed to feed the plan");
        }
    }
    drop(plan_tx);

    collect_report(rec_rx).await
}

fn only(name: &str) -> Vec<Arc<dyn Scenario>> {
    fleet().into_iter().filter(|s| s.name() == name).collect()
}

#[tokio::test]
async fn test_stock_fleet_passes_on_the_builtin_backend() {
    let dir = scratch_dir();
    let prefix = install_engines(&dir, &[Backend::Builtin]);

    let report = run_suite(
        fleet(),
        &[Backend::Builtin],
        create_dispatcher(prefix, &dir),
        Arc::new(BasicSupervisor::new()),
    )
    .await;

    assert!(report.success());
    assert_eq!(report.passed(), 12);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.skipped(), 0);
    assert!(report.records.iter().all(|r| r.log_path.is_some()));
}

#[tokio::test]
async fn test_frontend_backend_resolves_the_suffixed_engine() {
    let dir = scratch_dir();
    let prefix = install_engines(&dir, &[Backend::Afl]);

    let report = run_suite(
        only("fixture"),
        &[Backend::Afl],
        create_dispatcher(prefix, &dir),
        Arc::new(BasicSupervisor::new()),
    )
    .await;

    assert!(report.success());
    assert_eq!(report.passed(), 1);
}

#[tokio::test]
async fn test_fleet_wide_rules_skip_without_spawning() {
    let dir = scratch_dir();
    // Only the builtin engine exists on disk; a figurative spawn would error.
    let prefix = install_engines(&dir, &[Backend::Builtin]);

    let report = run_suite(
        only("lists"),
        &[Backend::Builtin, Backend::Figurative],
        create_dispatcher(prefix, &dir),
        Arc::new(BasicSupervisor::new()),
    )
    .await;

    assert!(report.success());
    assert_eq!(report.passed(), 1);
    assert_eq!(report.skipped(), 1);

    let skip = report
        .records
        .iter()
        .find(|r| matches!(r.status, RunStatus::Skipped { .. }))
        .expect("Should contain the figurative skip record");
    assert_eq!(skip.backend, Backend::Figurative);
    assert!(skip.log_path.is_none());
}

#[tokio::test]
async fn test_missed_expectations_produce_check_failures() {
    let dir = scratch_dir();
    let prefix = install_engines(&dir, &[Backend::Builtin]);

    let scenario = ScenarioDef {
        name: "mismatch",
        target: "Fixture",
        args: Vec::new(),
        timeout: Duration::from_secs(10),
        expectation: Expectation {
            exit_status: 0,
            require: vec!["this line is never printed".to_string()],
            forbid: vec!["Setting up!".to_string()],
            ..Default::default()
        },
        skips: Vec::new(),
    };

    let report = run_suite(
        vec![Arc::new(scenario) as Arc<dyn Scenario>],
        &[Backend::Builtin],
        create_dispatcher(prefix, &dir),
        Arc::new(BasicSupervisor::new()),
    )
    .await;

    assert!(!report.success());
    let RunStatus::Failed(failures) = &report.records[0].status else {
        panic!("Expected a failed run");
    };
    assert_eq!(failures.len(), 2);
    assert!(failures
        .iter()
        .any(|f| matches!(f, CheckFailure::MissingText { .. })));
    assert!(failures
        .iter()
        .any(|f| matches!(f, CheckFailure::ForbiddenText { .. })));
}

#[tokio::test]
async fn test_hanging_engine_times_out_and_fails_the_run() {
    let dir = scratch_dir();
    let prefix = install_engines(&dir, &[Backend::Builtin]);

    let scenario = ScenarioDef {
        name: "hang",
        target: "Hang",
        args: Vec::new(),
        timeout: Duration::from_millis(300),
        expectation: Expectation::default(),
        skips: Vec::new(),
    };

    let report = run_suite(
        vec![Arc::new(scenario) as Arc<dyn Scenario>],
        &[Backend::Builtin],
        create_dispatcher(prefix, &dir),
        quick_supervisor(),
    )
    .await;

    assert!(!report.success());
    let RunStatus::Failed(failures) = &report.records[0].status else {
        panic!("Expected a failed run");
    };
    assert!(failures
        .iter()
        .any(|f| matches!(f, CheckFailure::ExitStatus { timed_out: true, .. })));
}

#[tokio::test]
async fn test_expected_nonzero_exit_is_a_pass() {
    let dir = scratch_dir();
    let prefix = install_engines(&dir, &[Backend::Builtin]);

    let scenario = ScenarioDef {
        name: "gives-up",
        target: "ExitThree",
        args: Vec::new(),
        timeout: Duration::from_secs(10),
        expectation: Expectation {
            exit_status: 3,
            ..Default::default()
        },
        skips: Vec::new(),
    };

    let report = run_suite(
        vec![Arc::new(scenario) as Arc<dyn Scenario>],
        &[Backend::Builtin],
        create_dispatcher(prefix, &dir),
        Arc::new(BasicSupervisor::new()),
    )
    .await;

    assert!(report.success());
    assert_eq!(report.passed(), 1);
}

#[tokio::test]
async fn test_combined_output_lands_in_the_per_run_log() {
    let dir = scratch_dir();
    let prefix = install_engines(&dir, &[Backend::Builtin]);

    let scenario = ScenarioDef {
        name: "interleave",
        target: "Interleave",
        args: Vec::new(),
        timeout: Duration::from_secs(10),
        expectation: Expectation {
            exit_status: 0,
            require: vec![
                "first on stdout".to_string(),
                "second on stderr".to_string(),
                "third on stdout".to_string(),
            ],
            ..Default::default()
        },
        skips: Vec::new(),
    };

    let report = run_suite(
        vec![Arc::new(scenario) as Arc<dyn Scenario>],
        &[Backend::Builtin],
        create_dispatcher(prefix, &dir),
        Arc::new(BasicSupervisor::new()),
    )
    .await;

    assert!(report.success());
    let record = &report.records[0];
    let log = record.log_path.as_ref().expect("Run should carry a log path");
    let logged = std::fs::read_to_string(log).expect("Log file should exist");
    // stdout and stderr share one descriptor, so emission order survives.
    assert_eq!(
        logged,
        "first on stdout\nsecond on stderr\nthird on stdout\n"
    );
}
