use std::path::PathBuf;

use crate::backend::Backend;
use crate::scenario::{Scenario, SkipTable};
use crate::supervisor::traits::ExecutionRequest;

/// Resolution of one scenario×backend pair: either a concrete request for
/// the supervisor or a declared skip. Decided before anything is spawned.
#[derive(Debug, Clone)]
pub enum Dispatch {
    Run(ExecutionRequest),
    Skip { reason: String },
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    engine_prefix: PathBuf,
    build_root: PathBuf,
    log_dir: PathBuf,
    skip_table: SkipTable,
}

impl Dispatcher {
    pub fn new(engine_prefix: PathBuf, build_root: PathBuf, log_dir: PathBuf) -> Self {
        Self {
            engine_prefix,
            build_root,
            log_dir,
            skip_table: SkipTable::stock(),
        }
    }

    pub fn with_skip_table(mut self, skip_table: SkipTable) -> Self {
        self.skip_table = skip_table;
        self
    }

    pub fn resolve(&self, scenario: &dyn Scenario, backend: Backend) -> Dispatch {
        let skip = self
            .skip_table
            .reason(scenario.name(), backend)
            .map(|reason| reason.to_string())
            .or_else(|| scenario.skip(backend).map(|reason| reason.to_string()));
        if let Some(reason) = skip {
            return Dispatch::Skip { reason };
        }

        let executable = match scenario.executable_override() {
            Some(path) => path.to_path_buf(),
            None => backend.executable(&self.engine_prefix),
        };

        let mut args = vec![self.build_root.join(scenario.target()).display().to_string()];
        args.extend(scenario.args().iter().cloned());
        args.extend(backend.mandatory_args().iter().map(|a| a.to_string()));

        // One log file per scenario×backend pair; reruns overwrite it.
        let log_path = self
            .log_dir
            .join(format!("{}-{}.out", scenario.name(), backend.id()));

        Dispatch::Run(ExecutionRequest {
            executable,
            args,
            timeout: scenario.timeout(),
            log_path,
        })
    }
}
