//! Error handling logic

use std::fmt;
use thiserror::Error;

/// Identifier of a single wire (qubit) in a compiled walk program.
/// Wires are numbered densely from zero in allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QubitId(pub usize);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Identifier handed out by a [`JobBackend`](crate::simulation::JobBackend) on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{:06}", self.0)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WalkError>;

/// Errors raised while constructing, compiling, executing or decoding a walk.
///
/// Configuration errors are fatal at construction time and never retried.
/// `ExecutionNotReady` is the only variant a caller is expected to retry.
#[derive(Error, Debug)]
pub enum WalkError {
    /// Malformed boundary/coin strings, length mismatches, out-of-range
    /// dimensions or probabilities.
    #[error("Configuration Error: {message}")]
    Configuration {
        /// Description of the offending value
        message: String,
    },

    /// A remote job was asked for results before reaching `Done`.
    #[error("Execution Not Ready: {job_id} is not done (queue position {queue_position})")]
    ExecutionNotReady {
        /// The job whose results were requested
        job_id: JobId,
        /// Jobs ahead of this one; zero while it is running
        queue_position: usize,
    },

    /// The backend reported a failure; surfaced verbatim.
    #[error("Execution Failure ({job_id}): {message}")]
    ExecutionFailure {
        /// The failed job
        job_id: JobId,
        /// Backend failure message
        message: String,
    },

    /// The job id was never issued by this backend.
    #[error("Unknown job: {job_id}")]
    UnknownJob {
        /// The unrecognized id
        job_id: JobId,
    },

    /// Failure inside the local state-vector backend.
    #[error("Simulation Process Error: {message}")]
    Simulation {
        /// Simulation failure message
        message: String,
    },

    /// Artifact file could not be written.
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact CSV could not be encoded.
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
}

impl WalkError {
    /// Shorthand for a [`WalkError::Configuration`] error.
    pub fn config(message: impl Into<String>) -> Self {
        WalkError::Configuration { message: message.into() }
    }

    /// Shorthand for a [`WalkError::Simulation`] error.
    pub fn simulation(message: impl Into<String>) -> Self {
        WalkError::Simulation { message: message.into() }
    }

    /// The bare message carried by the error, without the variant prefix.
    pub fn detail(&self) -> String {
        match self {
            WalkError::Configuration { message }
            | WalkError::ExecutionFailure { message, .. }
            | WalkError::Simulation { message } => message.clone(),
            other => other.to_string(),
        }
    }
}
