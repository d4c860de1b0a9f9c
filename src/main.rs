use std::panic;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use itertools::Itertools;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use graybox_harness::backend::Backend;
use graybox_harness::constants::{DEFAULT_ENGINE_PREFIX, DEFAULT_LOG_DIR};
use graybox_harness::dispatch::Dispatcher;
use graybox_harness::domain::PlannedRun;
use graybox_harness::pipeline::dispatching::handle_dispatching;
use graybox_harness::pipeline::reporting::collect_report;
use graybox_harness::pipeline::running::handle_running;
use graybox_harness::scenario::{Scenario, fleet};
use graybox_harness::supervisor::basic::BasicSupervisor;

#[derive(Debug, Parser)]
#[command(
    name = "graybox-harness",
    about = "Release-verification suite for the graybox engine family"
)]
struct Cli {
    /// Backend to drive; repeat the flag to drive several.
    #[arg(long = "backend", value_enum, default_values_t = vec![Backend::Builtin])]
    backends: Vec<Backend>,

    /// Run only the named scenarios; repeat the flag for several.
    #[arg(long = "scenario")]
    scenarios: Vec<String>,

    /// Directory holding the compiled example artifacts.
    #[arg(long, default_value = "build/examples")]
    build_root: PathBuf,

    /// Directory for per-run engine logs.
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    /// Engine executable prefix: a bare name resolved via PATH, or a path.
    #[arg(long, default_value = DEFAULT_ENGINE_PREFIX)]
    engine_prefix: PathBuf,

    /// How many runs may execute concurrently.
    #[arg(long, default_value_t = 1)]
    jobs: usize,

    /// List the scenario fleet and exit.
    #[arg(long)]
    list: bool,
}

#[tokio::main]
#[tracing::instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    set_panic_hook();

    let cli = Cli::parse();
    let fleet = fleet();

    if cli.list {
        for scenario in &fleet {
            println!(
                "{:<12} target={:<24} timeout={}s args=[{}]",
                scenario.name(),
                scenario.target(),
                scenario.timeout().as_secs(),
                scenario.args().join(" ")
            );
        }
        return Ok(());
    }

    let scenarios = select_scenarios(fleet, &cli.scenarios)?;
    let backends: Vec<Backend> = cli.backends.into_iter().unique().collect();

    let dispatcher = Arc::new(Dispatcher::new(
        cli.engine_prefix,
        cli.build_root,
        cli.log_dir,
    ));
    let supervisor = Arc::new(BasicSupervisor::new());

    let (rec_tx, rec_rx) = mpsc::channel(64);
    let (run_tx, run_rx) = mpsc::channel(64);
    let (plan_tx, plan_rx) = mpsc::channel(64);

    handle_dispatching(run_tx, rec_tx.clone(), plan_rx, dispatcher);
    handle_running(rec_tx, run_rx, supervisor, cli.jobs);

    for scenario in scenarios {
        for backend in &backends {
            plan_tx
                .send(PlannedRun {
                    scenario: scenario.clone(),
                    backend: *backend,
                })
                .await?;
        }
    }
    // Closing the plan channel lets the stages drain and shut down in order.
    drop(plan_tx);

    let report = collect_report(rec_rx).await;
    if !report.success() {
        std::process::exit(1);
    }
    Ok(())
}

fn select_scenarios(
    fleet: Vec<Arc<dyn Scenario>>,
    names: &[String],
) -> Result<Vec<Arc<dyn Scenario>>, Box<dyn std::error::Error>> {
    if names.is_empty() {
        return Ok(fleet);
    }
    let names: Vec<&String> = names.iter().unique().collect();
    let mut selected = Vec::new();
    for name in names {
        let scenario = fleet
            .iter()
            .find(|s| s.name() == name.as_str())
            .ok_or_else(|| format!("unknown scenario: {}", name))?;
        selected.push(scenario.clone());
    }
    Ok(selected)
}

fn set_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        tracing::error!(
            message = "panic occurred",
            panic = %panic_info
        );
    }));
}
