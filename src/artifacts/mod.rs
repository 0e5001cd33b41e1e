// src/artifacts/mod.rs

//! Files an experiment leaves behind: per-iteration displacement CSVs, the
//! covariance debug log and the job-id log.

use crate::core::{JobId, Result, WalkError};
use crate::decoding::DisplacementTensor;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes `tensor` as CSV: `dimension_0..dimension_{k-1}, probability_density`.
pub fn write_displacement_csv(path: impl AsRef<Path>, tensor: &DisplacementTensor) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header: Vec<String> = (0..tensor.n_dimensions()).map(|d| format!("dimension_{}", d)).collect();
    header.push("probability_density".to_string());
    wtr.write_record(&header)?;
    for (row, density) in tensor.probability_density().iter().enumerate() {
        let mut record: Vec<String> = tensor.dimensions().iter().map(|column| column[row].to_string()).collect();
        record.push(density.to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    debug!(path = %path.display(), rows = tensor.len(), "Wrote displacement CSV");
    Ok(())
}

/// File name of one experiment iteration's CSV.
pub fn iteration_file_name(n_dims: usize, n_qubits: usize, steps: usize, coin_name: &str) -> String {
    format!(
        "{}D_Walk_{}_bit_iteration_{}_{}_results.csv",
        n_dims,
        1u64 << n_qubits.min(63),
        steps,
        coin_name
    )
}

fn append_handle(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Plain-text log of covariance matrices, one block per recorded step count.
#[derive(Debug, Clone)]
pub struct CovarianceLog {
    path: PathBuf,
}

impl CovarianceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, steps: usize, covariance: &[Vec<f64>]) -> Result<()> {
        let mut file = append_handle(&self.path)?;
        writeln!(file, "covariance after {} steps", steps)?;
        for row in covariance {
            let cells: Vec<String> = row.iter().map(|v| format!("{:.6}", v)).collect();
            writeln!(file, "[{}]", cells.join(", "))?;
        }
        Ok(())
    }
}

/// Log of submitted job ids, one per line, for later retrieval.
#[derive(Debug, Clone)]
pub struct JobLog {
    path: PathBuf,
}

impl JobLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, job_id: JobId) -> Result<()> {
        let mut file = append_handle(&self.path)?;
        writeln!(file, "{}", job_id)?;
        Ok(())
    }

    /// Every logged id, in submission order. A missing log is empty.
    pub fn read(&self) -> Result<Vec<JobId>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut ids = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let id = line
                .strip_prefix("job-")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| WalkError::config(format!("'{}' in {} is not a job id", line, self.path.display())))?;
            ids.push(JobId(id));
        }
        Ok(ids)
    }
}
