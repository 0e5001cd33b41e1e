// src/lib.rs

//! `qwalk` - compiles discrete-time coined quantum walks on bounded lattices
//!
//! A walk is described by a [`WalkSpecification`]: one position register per
//! lattice dimension, a shift coin, and any number of [`BoundaryControl`]s
//! that regulate how the walker behaves at lattice planes. [`QuantumWalk`]
//! compiles it step by step into a [`Circuit`] of reversible operations,
//! which any [`Backend`] can execute. [`ResultDecoder`] turns the measured
//! histogram back into lattice coordinates.

pub mod artifacts;
pub mod boundaries;
pub mod circuits;
pub mod config;
pub mod core;
pub mod decoding;
pub mod operations;
pub mod operators;
pub mod simulation;
pub mod validation;
pub mod walk;

// Re-export the most common types for easier top-level use
pub use boundaries::{Boundary, BoundaryControl, BoundaryKind, BoundarySpec, build_boundary_controls};
pub use circuits::{Circuit, CircuitBuilder};
pub use config::{CoinFamily, CoinParams, ExperimentConfig, FallbackPolicy};
pub use crate::core::{JobId, QubitId, RegisterLayout, Result, WalkError};
pub use decoding::{DisplacementTensor, ResultDecoder, StatisticsBundle};
pub use operations::Operation;
pub use operators::{OperatorFamily, ReversibleOperator};
pub use simulation::{Backend, JobBackend, JobStatus, LocalBackend, MeasurementHistogram, QueuedBackend};
pub use walk::{QuantumWalk, WalkSpecification};

// Example 1: A Walled One-Dimensional Walk
// Builds an 8-site line with reflecting walls at both ends, runs it for
// zero steps and checks the walker is still where it started.
/// ```
/// use qwalk::{Boundary, BoundaryControl, LocalBackend, QuantumWalk, WalkError, WalkSpecification};
///
/// fn main() -> Result<(), WalkError> {
///     let mut walls = BoundaryControl::hard();
///     walls.add_boundaries([Boundary::new("000", 0, None)?, Boundary::new("111", 0, None)?]);
///
///     let spec = WalkSpecification::new(vec![3])
///         .with_initial_states(vec!["011"])
///         .with_boundary_control(walls);
///     let mut walk = QuantumWalk::new(spec)?;
///
///     let tensor = walk.run_experiment(&mut LocalBackend::with_seed(7), 0, 128)?;
///     assert_eq!(tensor.len(), 1);
///     assert_eq!(tensor.dimension(0), Some(&[3u64][..]));
///     assert!((tensor.probability_density()[0] - 1.0).abs() < 1e-12);
///     Ok(())
/// }
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Configuration Strings
// Boundary and coin parameters usually arrive as strings. Parsing groups
// boundaries by their control code and validates coin parameters against
// the family's schema before anything is compiled.
/// ```
/// use qwalk::{ExperimentConfig, LocalBackend, QuantumWalk, WalkError};
///
/// fn main() -> Result<(), WalkError> {
///     let mut config = ExperimentConfig::new(2, 2);
///     config.boundaries = vec![
///         "hard-0-00--".into(),
///         "hard-0-11--".into(),
///         "soft-1-11-Grover-2".into(),
///     ];
///     config.coin = "PK".into();
///     config.coin_kwargs = "lam=pi/2".into();
///
///     let spec = config.to_walk_specification()?;
///     assert_eq!(spec.boundary_controls().len(), 2);
///
///     let mut walk = QuantumWalk::new(spec)?;
///     walk.add_n_steps(2)?;
///     let stats = walk.statistics(&mut LocalBackend::with_seed(3), 256, false)?;
///     assert_eq!(stats.covariance.len(), 2);
///     Ok(())
/// }
/// ```
#[doc(hidden)]
const _: () = ();

// Example 3: Remote-Style Execution
// Jobs are queued on submission; asking for results early is an error the
// caller retries, not a blocking call.
/// ```
/// use qwalk::{JobBackend, JobStatus, LocalBackend, QuantumWalk, QueuedBackend, WalkError, WalkSpecification};
///
/// fn main() -> Result<(), WalkError> {
///     let mut walk = QuantumWalk::new(WalkSpecification::new(vec![2]).with_initial_states(vec!["01"]))?;
///     walk.add_n_steps(1)?;
///
///     let mut backend = QueuedBackend::new(LocalBackend::with_seed(1));
///     let job = backend.submit(walk.circuit(), 64)?;
///     assert!(matches!(backend.retrieve(job), Err(WalkError::ExecutionNotReady { .. })));
///
///     backend.run_until_idle();
///     assert_eq!(backend.status(job)?, JobStatus::Done);
///     let histogram = backend.retrieve(job)?;
///     let tensor = walk.decoder().decode(&histogram, 64)?;
///     assert!((tensor.total_probability() - 1.0).abs() < 1e-9);
///     Ok(())
/// }
/// ```
#[doc(hidden)]
const _: () = ();
