// src/simulation/jobs.rs

use super::{Backend, MeasurementHistogram};
use crate::circuits::Circuit;
use crate::core::{JobId, Result, WalkError};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::{debug, info, warn};

/// Lifecycle of a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Submit/poll/retrieve execution, as offered by remote services.
pub trait JobBackend {
    /// Queues `circuit` and returns immediately.
    fn submit(&mut self, circuit: &Circuit, shots: u64) -> Result<JobId>;

    fn status(&self, job_id: JobId) -> Result<JobStatus>;

    /// Results of a finished job. Repeated calls return the same histogram.
    ///
    /// # Errors
    /// `ExecutionNotReady` before the job is done, `ExecutionFailure` if it
    /// failed, `UnknownJob` for an id this backend never issued.
    fn retrieve(&self, job_id: JobId) -> Result<MeasurementHistogram>;
}

enum JobRecord {
    Queued { circuit: Circuit, shots: u64 },
    Running { circuit: Circuit, shots: u64 },
    Done(MeasurementHistogram),
    Failed(String),
}

impl JobRecord {
    fn status(&self) -> JobStatus {
        match self {
            JobRecord::Queued { .. } => JobStatus::Queued,
            JobRecord::Running { .. } => JobStatus::Running,
            JobRecord::Done(_) => JobStatus::Done,
            JobRecord::Failed(_) => JobStatus::Failed,
        }
    }
}

/// An in-process job queue in front of a blocking [`Backend`].
///
/// Nothing runs on submission. [`start_next`](Self::start_next) moves the
/// head of the queue to `Running`, [`finish_running`](Self::finish_running)
/// executes it; [`process_next`](Self::process_next) does both.
pub struct QueuedBackend<B: Backend> {
    inner: B,
    next_id: u64,
    queue: VecDeque<JobId>,
    running: Option<JobId>,
    jobs: HashMap<JobId, JobRecord>,
}

impl<B: Backend> QueuedBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner, next_id: 1, queue: VecDeque::new(), running: None, jobs: HashMap::new() }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Jobs waiting to start.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Jobs ahead of `job_id`, counting a running job.
    fn queue_position(&self, job_id: JobId) -> usize {
        let ahead_in_queue = self.queue.iter().position(|id| *id == job_id).unwrap_or(0);
        let running_ahead = usize::from(self.running.is_some_and(|id| id != job_id));
        ahead_in_queue + running_ahead
    }

    /// Moves the head of the queue to `Running`. Does nothing while a job is running.
    pub fn start_next(&mut self) -> Option<JobId> {
        if self.running.is_some() {
            return None;
        }
        let job_id = self.queue.pop_front()?;
        if let Some(record) = self.jobs.remove(&job_id) {
            let record = match record {
                JobRecord::Queued { circuit, shots } => JobRecord::Running { circuit, shots },
                other => other,
            };
            self.jobs.insert(job_id, record);
        }
        self.running = Some(job_id);
        debug!(%job_id, "Job started");
        Some(job_id)
    }

    /// Executes the running job to completion.
    pub fn finish_running(&mut self) -> Option<JobStatus> {
        let job_id = self.running.take()?;
        let record = match self.jobs.remove(&job_id)? {
            JobRecord::Running { circuit, shots } => match self.inner.execute(&circuit, shots) {
                Ok(histogram) => JobRecord::Done(histogram),
                Err(e) => {
                    warn!(%job_id, error = %e, "Job failed");
                    JobRecord::Failed(e.detail())
                }
            },
            other => other,
        };
        let status = record.status();
        self.jobs.insert(job_id, record);
        info!(%job_id, %status, "Job finished");
        Some(status)
    }

    /// Starts and finishes the next job; `None` when the queue is empty.
    pub fn process_next(&mut self) -> Option<(JobId, JobStatus)> {
        let job_id = self.start_next()?;
        self.finish_running().map(|status| (job_id, status))
    }

    /// Job records held, finished ones included.
    pub fn retained(&self) -> usize {
        self.jobs.len()
    }

    /// Like [`retrieve`](JobBackend::retrieve), but a finished or failed job
    /// is dropped once its outcome has been handed out. Pending jobs are left
    /// in place and report `ExecutionNotReady`.
    pub fn take(&mut self, job_id: JobId) -> Result<MeasurementHistogram> {
        let outcome = self.retrieve(job_id);
        if matches!(self.jobs.get(&job_id), Some(JobRecord::Done(_) | JobRecord::Failed(_))) {
            self.jobs.remove(&job_id);
            debug!(%job_id, "Job record released");
        }
        outcome
    }

    /// Drains the queue. Returns the number of jobs processed.
    pub fn run_until_idle(&mut self) -> usize {
        let mut processed = 0;
        if self.running.is_some() && self.finish_running().is_some() {
            processed += 1;
        }
        while self.process_next().is_some() {
            processed += 1;
        }
        processed
    }
}

impl<B: Backend> JobBackend for QueuedBackend<B> {
    fn submit(&mut self, circuit: &Circuit, shots: u64) -> Result<JobId> {
        let job_id = JobId(self.next_id);
        self.next_id += 1;
        self.jobs.insert(job_id, JobRecord::Queued { circuit: circuit.clone(), shots });
        self.queue.push_back(job_id);
        info!(%job_id, shots, position = self.queue.len() - 1, "Job submitted");
        Ok(job_id)
    }

    fn status(&self, job_id: JobId) -> Result<JobStatus> {
        self.jobs
            .get(&job_id)
            .map(JobRecord::status)
            .ok_or(WalkError::UnknownJob { job_id })
    }

    fn retrieve(&self, job_id: JobId) -> Result<MeasurementHistogram> {
        match self.jobs.get(&job_id) {
            None => Err(WalkError::UnknownJob { job_id }),
            Some(JobRecord::Done(histogram)) => Ok(histogram.clone()),
            Some(JobRecord::Failed(message)) => Err(WalkError::ExecutionFailure { job_id, message: message.clone() }),
            Some(JobRecord::Queued { .. } | JobRecord::Running { .. }) => Err(WalkError::ExecutionNotReady {
                job_id,
                queue_position: self.queue_position(job_id),
            }),
        }
    }
}
