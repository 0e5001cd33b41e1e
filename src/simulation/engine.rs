// src/simulation/engine.rs
use crate::core::{AMPLITUDE_TOLERANCE, QubitId, Result, StateVector, WalkError};
use crate::operations::{Gate, Operation};
use num_complex::Complex;
use num_traits::Zero;
use rand::Rng;

/// Evolves one full-width state vector through a walk program.
/// (Internal visibility)
pub(crate) struct SimulationEngine {
    /// Basis index bit `q` is the value of wire `q`.
    state: StateVector,
    num_qubits: usize,
}

impl SimulationEngine {
    /// Starts every wire in `|0>`.
    pub(crate) fn init(num_qubits: usize) -> Result<Self> {
        if num_qubits == 0 {
            return Err(WalkError::simulation("Cannot initialize simulation engine with zero wires"));
        }
        Ok(Self { state: StateVector::zero_state(num_qubits)?, num_qubits })
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: StateVector) -> Result<()> {
        if state.dim() != self.state.dim() {
            return Err(WalkError::simulation(format!(
                "Cannot set state: provided dimension {} does not match engine dimension {}",
                state.dim(),
                self.state.dim()
            )));
        }
        self.state = state;
        Ok(())
    }

    pub(crate) fn state(&self) -> &StateVector {
        &self.state
    }

    /// Applies one operation. Resets draw their outcome from `rng`.
    pub(crate) fn apply_operation<R: Rng + ?Sized>(&mut self, op: &Operation, rng: &mut R) -> Result<()> {
        match op {
            Operation::Gate(gate) => self.apply_gate(gate),
            Operation::Apply { gates, .. } => gates.iter().try_for_each(|g| self.apply_gate(g)),
            Operation::Reset { targets } => targets.iter().try_for_each(|q| self.reset(*q, rng)),
            Operation::Barrier => Ok(()),
        }
    }

    fn wire_mask(&self, q: QubitId) -> Result<usize> {
        if q.0 >= self.num_qubits {
            return Err(WalkError::simulation(format!(
                "wire {} not found in a {}-wire simulation",
                q, self.num_qubits
            )));
        }
        Ok(1 << q.0)
    }

    /// Applies a 2x2 matrix to the target on every basis pair whose control
    /// wires match their required values.
    pub(crate) fn apply_gate(&mut self, gate: &Gate) -> Result<()> {
        let target_mask = self.wire_mask(gate.target)?;
        let mut ctrl_mask = 0usize;
        let mut ctrl_value = 0usize;
        for control in &gate.controls {
            let mask = self.wire_mask(control.wire)?;
            if mask == target_mask {
                return Err(WalkError::simulation(format!(
                    "wire {} is both control and target",
                    gate.target
                )));
            }
            ctrl_mask |= mask;
            if control.state {
                ctrl_value |= mask;
            }
        }

        let matrix = gate.kind.matrix();
        let amplitudes = self.state.vector_mut();
        for i0 in 0..amplitudes.len() {
            // visit each pair once, from its target=0 member
            if i0 & target_mask != 0 || i0 & ctrl_mask != ctrl_value {
                continue;
            }
            let i1 = i0 | target_mask;
            let (psi_0, psi_1) = (amplitudes[i0], amplitudes[i1]);
            amplitudes[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            amplitudes[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
        Ok(())
    }

    /// Measures wire `q`, collapses, and flips it back to `|0>` on outcome 1.
    fn reset<R: Rng + ?Sized>(&mut self, q: QubitId, rng: &mut R) -> Result<()> {
        let mask = self.wire_mask(q)?;
        let amplitudes = self.state.vector_mut();
        let p_one: f64 = amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, c)| c.norm_sqr())
            .sum();
        let outcome_one = p_one > AMPLITUDE_TOLERANCE && rng.random::<f64>() < p_one;
        let kept = if outcome_one { p_one } else { 1.0 - p_one };
        if kept <= AMPLITUDE_TOLERANCE {
            return Err(WalkError::simulation(format!("reset of {} collapsed onto a zero-norm branch", q)));
        }
        let scale = 1.0 / kept.sqrt();

        for i0 in 0..amplitudes.len() {
            if i0 & mask != 0 {
                continue;
            }
            let i1 = i0 | mask;
            let survivor = if outcome_one { amplitudes[i1] } else { amplitudes[i0] };
            amplitudes[i0] = survivor * scale;
            amplitudes[i1] = Complex::zero();
        }
        Ok(())
    }

    /// Draws one basis index from the Born distribution.
    pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let probabilities = self.state.probabilities();
        sample_index(&probabilities, rng)
    }
}

/// Inverse-CDF draw over `probabilities`; the last non-zero entry absorbs rounding.
pub(crate) fn sample_index<R: Rng + ?Sized>(probabilities: &[f64], rng: &mut R) -> usize {
    let total: f64 = probabilities.iter().sum();
    let p_sample = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_nonzero = 0;
    for (index, p) in probabilities.iter().enumerate() {
        if *p <= 0.0 {
            continue;
        }
        last_nonzero = index;
        cumulative += p;
        if p_sample < cumulative {
            return index;
        }
    }
    last_nonzero
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::GateKind;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn gate(kind: GateKind, target: usize) -> Operation {
        Operation::Gate(Gate::new(kind, QubitId(target)))
    }

    #[test]
    fn test_flip_and_controlled_flip() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(7);
        let mut engine = SimulationEngine::init(2)?;
        engine.apply_operation(&gate(GateKind::Flip, 0), &mut rng)?;
        let cx = Operation::Gate(Gate::controlled(GateKind::Flip, &[QubitId(0)], QubitId(1)));
        engine.apply_operation(&cx, &mut rng)?;
        assert_relative_eq!(engine.state().probabilities()[0b11], 1.0);
        Ok(())
    }

    #[test]
    fn test_zero_valued_control() -> Result<()> {
        let mut engine = SimulationEngine::init(2)?;
        let mut open = Gate::controlled(GateKind::Flip, &[QubitId(0)], QubitId(1));
        open.controls[0].state = false;
        engine.apply_gate(&open)?;
        assert_relative_eq!(engine.state().probabilities()[0b10], 1.0);
        Ok(())
    }

    #[test]
    fn test_hadamard_superposition() -> Result<()> {
        let mut engine = SimulationEngine::init(1)?;
        engine.apply_gate(&Gate::new(GateKind::Hadamard, QubitId(0)))?;
        let v = engine.state().vector();
        assert_relative_eq!(v[0].re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(v[1].re, FRAC_1_SQRT_2, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_reset_returns_wire_to_zero() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..16 {
            let mut engine = SimulationEngine::init(2)?;
            engine.set_state(StateVector::from_amplitudes(vec![
                Complex::new(0.5, 0.0),
                Complex::new(0.5, 0.0),
                Complex::new(0.5, 0.0),
                Complex::new(-0.5, 0.0),
            ])?)?;
            engine.apply_operation(&Operation::Reset { targets: vec![QubitId(0)] }, &mut rng)?;
            let p = engine.state().probabilities();
            assert_relative_eq!(p[0] + p[2], 1.0, epsilon = 1e-12);
            assert_relative_eq!(p[1] + p[3], 0.0, epsilon = 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_out_of_range_wire() -> Result<()> {
        let mut engine = SimulationEngine::init(1)?;
        assert!(engine.apply_gate(&Gate::new(GateKind::Flip, QubitId(1))).is_err());
        assert!(SimulationEngine::init(0).is_err());
        Ok(())
    }

    #[test]
    fn test_sample_skips_zero_entries() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..32 {
            assert_eq!(sample_index(&[0.0, 1.0, 0.0], &mut rng), 1);
        }
    }
}
