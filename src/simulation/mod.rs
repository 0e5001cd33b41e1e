// src/simulation/mod.rs

//! Execution backends for compiled walk programs.
//!
//! [`Backend`] is the blocking interface: hand over a [`Circuit`] and a shot
//! count, get a [`MeasurementHistogram`] back. [`LocalBackend`] implements it
//! with a full state-vector simulation. [`JobBackend`] is the
//! submit/poll/retrieve interface of a remote service, and [`QueuedBackend`]
//! provides it in-process on top of any [`Backend`].

mod engine;
mod jobs;
mod results;

pub use jobs::{JobBackend, JobStatus, QueuedBackend};
pub use results::MeasurementHistogram;

use crate::circuits::Circuit;
use crate::core::{Result, WalkError};
use crate::validation::check_normalization;
use engine::SimulationEngine;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Widest program [`LocalBackend`] accepts unless configured otherwise.
pub const DEFAULT_MAX_QUBITS: usize = 24;

const NORM_TOLERANCE: f64 = 1e-6;

/// Runs a compiled program and measures every wire.
pub trait Backend {
    /// Executes `circuit` for `shots` trials.
    ///
    /// # Errors
    /// Backend-specific; [`LocalBackend`] raises `WalkError::Simulation`.
    fn execute(&mut self, circuit: &Circuit, shots: u64) -> Result<MeasurementHistogram>;
}

/// State-vector simulator.
///
/// A program without resets is evolved once and the final distribution
/// sampled `shots` times. A program with resets is run once per shot, each
/// run drawing its own reset outcomes.
pub struct LocalBackend {
    rng: StdRng,
    max_qubits: usize,
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBackend {
    /// A backend seeded from the operating system.
    pub fn new() -> Self {
        Self { rng: StdRng::from_os_rng(), max_qubits: DEFAULT_MAX_QUBITS }
    }

    /// A backend whose samples are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), max_qubits: DEFAULT_MAX_QUBITS }
    }

    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    fn evolve(&mut self, circuit: &Circuit) -> Result<SimulationEngine> {
        let mut engine = SimulationEngine::init(circuit.width())?;
        for op in circuit.operations() {
            engine.apply_operation(op, &mut self.rng)?;
        }
        Ok(engine)
    }
}

impl Backend for LocalBackend {
    fn execute(&mut self, circuit: &Circuit, shots: u64) -> Result<MeasurementHistogram> {
        let width = circuit.width();
        if width > self.max_qubits {
            return Err(WalkError::simulation(format!(
                "{} wires exceed the local limit of {} (a state vector would need {:.3} GB)",
                width,
                self.max_qubits,
                circuit.layout().required_memory_gb()
            )));
        }
        info!(wires = width, ops = circuit.len(), shots, resets = circuit.has_resets(), "Running local simulation");

        let layout = circuit.layout();
        let mut histogram = MeasurementHistogram::new(shots);
        if circuit.has_resets() {
            for _ in 0..shots {
                let engine = self.evolve(circuit)?;
                let outcome = engine.sample(&mut self.rng);
                histogram.record(layout.format_key(outcome), 1);
            }
        } else if shots > 0 {
            let engine = self.evolve(circuit)?;
            check_normalization(engine.state(), Some(NORM_TOLERANCE))?;
            let probabilities = engine.state().probabilities();
            for _ in 0..shots {
                let outcome = engine::sample_index(&probabilities, &mut self.rng);
                histogram.record(layout.format_key(outcome), 1);
            }
        }
        debug!(outcomes = histogram.len(), "Local simulation finished");
        Ok(histogram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::CircuitBuilder;
    use crate::core::{QubitId, RegisterAllocator, RegisterLayout, RegisterRole};
    use crate::operations::{Gate, GateKind, Operation};

    fn layout() -> Result<RegisterLayout> {
        let mut alloc = RegisterAllocator::new();
        alloc.allocate("dimension0", RegisterRole::Dimension(0), 2)?;
        alloc.allocate("coin", RegisterRole::Coin, 1)?;
        Ok(alloc.finish())
    }

    #[test]
    fn test_deterministic_program_single_key() -> Result<()> {
        // dimension0 = "01", coin = "1"
        let circuit = CircuitBuilder::new(layout()?)
            .add_op(Operation::Gate(Gate::new(GateKind::Flip, QubitId(0))))?
            .add_op(Operation::Gate(Gate::new(GateKind::Flip, QubitId(2))))?
            .build();
        let histogram = LocalBackend::with_seed(1).execute(&circuit, 100)?;
        assert_eq!(histogram.len(), 1);
        assert_eq!(histogram.get("011"), Some(100));
        assert_eq!(histogram.shots(), 100);
        Ok(())
    }

    #[test]
    fn test_seeded_runs_repeat() -> Result<()> {
        let circuit = CircuitBuilder::new(layout()?)
            .add_op(Operation::Gate(Gate::new(GateKind::Hadamard, QubitId(0))))?
            .add_op(Operation::Gate(Gate::new(GateKind::Hadamard, QubitId(2))))?
            .build();
        let a = LocalBackend::with_seed(42).execute(&circuit, 256)?;
        let b = LocalBackend::with_seed(42).execute(&circuit, 256)?;
        assert_eq!(a, b);
        assert_eq!(a.total(), 256);
        assert_eq!(a.len(), 4);
        Ok(())
    }

    #[test]
    fn test_reset_trajectories_conserve_shots() -> Result<()> {
        let circuit = CircuitBuilder::new(layout()?)
            .add_op(Operation::Gate(Gate::new(GateKind::Hadamard, QubitId(2))))?
            .add_op(Operation::Reset { targets: vec![QubitId(2)] })?
            .build();
        let histogram = LocalBackend::with_seed(5).execute(&circuit, 64)?;
        assert_eq!(histogram.get("000"), Some(64));
        Ok(())
    }

    #[test]
    fn test_width_limit() -> Result<()> {
        let circuit = CircuitBuilder::new(layout()?).build();
        assert!(matches!(
            LocalBackend::with_seed(0).with_max_qubits(2).execute(&circuit, 1),
            Err(WalkError::Simulation { .. })
        ));
        Ok(())
    }
}
