// src/walk/experiment.rs

use super::QuantumWalk;
use crate::artifacts::{CovarianceLog, JobLog, iteration_file_name, write_displacement_csv};
use crate::core::{JobId, Result, WalkError};
use crate::decoding::StatisticsBundle;
use crate::simulation::{Backend, JobBackend};
use std::path::PathBuf;
use tracing::info;

/// One recorded iteration of an experiment.
#[derive(Debug, Clone)]
pub struct IterationRecord {
    pub steps: usize,
    pub csv_path: PathBuf,
    pub statistics: StatisticsBundle,
}

/// Runs a walk for an increasing number of steps, recording each iteration.
///
/// The walk is rebuilt and stepped once, then results are recorded after
/// `1, 1 + stepsize, 1 + 2 * stepsize, ...` steps up to `max_iterations`.
#[derive(Debug, Clone)]
pub struct ExperimentRunner {
    output_dir: PathBuf,
    max_iterations: usize,
    stepsize: usize,
    shots: u64,
}

impl ExperimentRunner {
    pub fn new(output_dir: impl Into<PathBuf>, max_iterations: usize, stepsize: usize, shots: u64) -> Result<Self> {
        if stepsize == 0 {
            return Err(WalkError::config("experiment stepsize must be positive"));
        }
        Ok(Self { output_dir: output_dir.into(), max_iterations, stepsize, shots })
    }

    pub fn covariance_log(&self) -> CovarianceLog {
        CovarianceLog::new(self.output_dir.join("debug.log"))
    }

    pub fn run<B: Backend + ?Sized>(&self, walk: &mut QuantumWalk, backend: &mut B) -> Result<Vec<IterationRecord>> {
        std::fs::create_dir_all(&self.output_dir)?;
        let log = self.covariance_log();
        let n_dims = walk.system_dimensions().len();
        let n_qubits = walk.system_dimensions().first().copied().unwrap_or(0);
        let coin_name = walk.shift_coin().name().to_string();

        walk.reset_circuit()?;
        walk.step()?;
        let mut records = Vec::new();
        for steps in (1..=self.max_iterations).step_by(self.stepsize) {
            let statistics = walk.statistics(backend, self.shots, true)?;
            let csv_path = self.output_dir.join(iteration_file_name(n_dims, n_qubits, steps, &coin_name));
            if let Some(tensor) = walk.results() {
                write_displacement_csv(&csv_path, tensor)?;
            }
            log.append(steps, &statistics.covariance)?;
            info!(steps, path = %csv_path.display(), "Recorded experiment iteration");
            records.push(IterationRecord { steps, csv_path, statistics });
            walk.add_n_steps(self.stepsize)?;
        }
        Ok(records)
    }
}

/// Submits the walk's current program and appends the job id to `log`.
pub fn submit_walk<J: JobBackend + ?Sized>(walk: &QuantumWalk, backend: &mut J, shots: u64, log: &JobLog) -> Result<JobId> {
    let job_id = backend.submit(walk.circuit(), shots)?;
    log.append(job_id)?;
    info!(%job_id, steps = walk.steps_taken(), "Submitted walk program");
    Ok(job_id)
}
