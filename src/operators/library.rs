// src/operators/library.rs

//! Constructors for the named operator families.

use super::{OperatorFamily, ReversibleOperator};
use crate::core::{PI, Result, WalkError};
use crate::operations::{Gate, GateKind};
use num_complex::Complex;

/// The six fixed-phase kickback coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KickbackVariant {
    /// λ = π/2
    Right,
    /// λ = π/4
    RightPlus,
    /// λ = 3π/4
    RightMinus,
    /// λ = 3π/2
    Left,
    /// λ = 5π/4
    LeftMinus,
    /// λ = 7π/4
    LeftPlus,
}

impl KickbackVariant {
    pub fn phase(&self) -> f64 {
        match self {
            KickbackVariant::Right => PI / 2.0,
            KickbackVariant::RightPlus => PI / 4.0,
            KickbackVariant::RightMinus => 3.0 * PI / 4.0,
            KickbackVariant::Left => 3.0 * PI / 2.0,
            KickbackVariant::LeftMinus => 5.0 * PI / 4.0,
            KickbackVariant::LeftPlus => 7.0 * PI / 4.0,
        }
    }

    pub fn coin_name(&self) -> &'static str {
        match self {
            KickbackVariant::Right => "Right Kickback Coin",
            KickbackVariant::RightPlus => "Right Plus Kickback Coin",
            KickbackVariant::RightMinus => "Right Minus Kickback Coin",
            KickbackVariant::Left => "Left Kickback Coin",
            KickbackVariant::LeftMinus => "Left Minus Kickback Coin",
            KickbackVariant::LeftPlus => "Left Plus Kickback Coin",
        }
    }
}

/// One rotation parameter: shared by every wire, or given per wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Angles {
    Uniform(f64),
    PerQubit(Vec<f64>),
}

impl Angles {
    fn resolve(&self, n_qubits: usize, what: &str) -> Result<Vec<f64>> {
        match self {
            Angles::Uniform(v) => Ok(vec![*v; n_qubits]),
            Angles::PerQubit(list) if list.len() == n_qubits => Ok(list.clone()),
            Angles::PerQubit(list) => Err(WalkError::config(format!(
                "{} has {} angles but the register has {} qubits",
                what,
                list.len(),
                n_qubits
            ))),
        }
    }
}

fn every_wire(kind: GateKind, n_qubits: usize) -> Vec<Gate<usize>> {
    (0..n_qubits).map(|w| Gate::new(kind.clone(), w)).collect()
}

fn su2_matrix(theta: f64, zeta: f64, xi: f64) -> [[Complex<f64>; 2]; 2] {
    let e = |phi: f64| Complex::new(phi.cos(), phi.sin());
    [
        [e(xi) * theta.cos(), e(zeta) * theta.sin()],
        [e(-zeta) * theta.sin(), -e(-xi) * theta.cos()],
    ]
}

impl ReversibleOperator {
    /// The no-op control; width 0 is allowed.
    pub fn identity(n_qubits: usize) -> Self {
        Self::from_gates("Identity", OperatorFamily::Identity, n_qubits, Vec::new())
    }

    /// Hadamard on every wire; the default shift coin.
    pub fn hadamard(n_qubits: usize) -> Self {
        Self::from_gates("Hadamard Coin", OperatorFamily::Rotation, n_qubits, every_wire(GateKind::Hadamard, n_qubits))
    }

    /// X on every wire.
    pub fn flip(n_qubits: usize) -> Self {
        Self::from_gates("X Coin", OperatorFamily::Flip, n_qubits, every_wire(GateKind::Flip, n_qubits))
    }

    /// The control of an absorbing boundary: a latch with no per-step body.
    /// Its register is set to the trigger pattern once, when the program is
    /// built, and holds it for every later step.
    pub fn absorbing(n_qubits: usize) -> Self {
        Self::from_gates("Absorbing Latch", OperatorFamily::Identity, n_qubits, Vec::new())
    }

    /// X on a single ancilla wire, used to record a one-way crossing.
    pub fn crossing_flag() -> Self {
        Self::from_gates("Crossing Flag", OperatorFamily::Flip, 1, vec![Gate::new(GateKind::Flip, 0)])
    }

    /// Inversion about the mean: H, X on every wire, a multi-controlled
    /// sign flip on the last wire, then X and H undone.
    pub fn diffusion(n_qubits: usize) -> Self {
        let mut gates = Self::diffuser_prologue(n_qubits);
        if let Some(last) = n_qubits.checked_sub(1) {
            let controls: Vec<usize> = (0..last).collect();
            gates.push(Gate::new(GateKind::Hadamard, last));
            gates.push(Gate::controlled(GateKind::Flip, &controls, last));
            gates.push(Gate::new(GateKind::Hadamard, last));
        }
        gates.extend(Self::diffuser_prologue(n_qubits).into_iter().rev());
        Self::from_gates("Grover Coin", OperatorFamily::Diffusion, n_qubits, gates)
    }

    /// The diffusion construction with the sign flip replaced by a
    /// multi-controlled phase `lambda`.
    pub fn phase_kickback(n_qubits: usize, lambda: f64) -> Self {
        let mut gates = Self::diffuser_prologue(n_qubits);
        if let Some(last) = n_qubits.checked_sub(1) {
            let controls: Vec<usize> = (0..last).collect();
            gates.push(Gate::controlled(GateKind::Phase(lambda), &controls, last));
        }
        gates.extend(Self::diffuser_prologue(n_qubits).into_iter().rev());
        Self::from_gates("Phase Kickback Coin", OperatorFamily::PhaseKickback(lambda), n_qubits, gates)
    }

    /// One of the six named fixed-phase kickback coins.
    pub fn kickback(n_qubits: usize, variant: KickbackVariant) -> Self {
        let mut op = Self::phase_kickback(n_qubits, variant.phase());
        op.name = variant.coin_name().to_string();
        op
    }

    fn diffuser_prologue(n_qubits: usize) -> Vec<Gate<usize>> {
        let mut gates = every_wire(GateKind::Hadamard, n_qubits);
        gates.extend(every_wire(GateKind::Flip, n_qubits));
        gates
    }

    /// Discrete Fourier transform: controlled-phase ladder from the top wire
    /// down, then bit-reversal swaps.
    pub fn fourier(n_qubits: usize) -> Self {
        let mut gates = Vec::new();
        for top in (0..n_qubits).rev() {
            gates.push(Gate::new(GateKind::Hadamard, top));
            for wire in 0..top {
                let lambda = PI / 2f64.powi((top - wire) as i32);
                gates.push(Gate::controlled(GateKind::Phase(lambda), &[wire], top));
            }
        }
        for wire in 0..n_qubits / 2 {
            let mirror = n_qubits - wire - 1;
            // swap as three alternating CNOTs
            gates.push(Gate::controlled(GateKind::Flip, &[wire], mirror));
            gates.push(Gate::controlled(GateKind::Flip, &[mirror], wire));
            gates.push(Gate::controlled(GateKind::Flip, &[wire], mirror));
        }
        Self::from_gates("DFT Coin", OperatorFamily::Fourier, n_qubits, gates)
    }

    /// Ripple counter: flip wire 0, then flip wire `i` iff wires `0..i` are
    /// all set. Each application moves the register one step around a cycle
    /// of length `2^n` (a decrement, with wire 0 least significant).
    pub fn cyclic_increment(n_qubits: usize) -> Self {
        let mut gates = Vec::with_capacity(n_qubits);
        if n_qubits > 0 {
            gates.push(Gate::new(GateKind::Flip, 0));
        }
        for wire in 1..n_qubits {
            let controls: Vec<usize> = (0..wire).collect();
            gates.push(Gate::controlled(GateKind::Flip, &controls, wire));
        }
        Self::from_gates("Cyclic Controller", OperatorFamily::CyclicIncrement, n_qubits, gates)
    }

    /// X on the most significant wire of an `n_qubits` coin.
    pub fn direction_reversal(n_qubits: usize) -> Self {
        let gates = n_qubits.checked_sub(1).map(|msb| Gate::new(GateKind::Flip, msb)).into_iter().collect();
        Self::from_gates("Direction Reversal", OperatorFamily::DirectionReversal, n_qubits, gates)
    }

    /// Per-wire rotation
    /// `[[e^{iξ}cosθ, e^{iζ}sinθ], [e^{-iζ}sinθ, -e^{-iξ}cosθ]]`.
    ///
    /// # Errors
    /// `WalkError::Configuration` if a per-wire angle list does not have one
    /// entry per wire.
    pub fn su2(n_qubits: usize, theta: &Angles, zeta: &Angles, xi: &Angles) -> Result<Self> {
        let theta = theta.resolve(n_qubits, "theta")?;
        let zeta = zeta.resolve(n_qubits, "zeta")?;
        let xi = xi.resolve(n_qubits, "xi")?;
        let gates = (0..n_qubits)
            .map(|w| Gate::new(GateKind::Unitary(su2_matrix(theta[w], zeta[w], xi[w])), w))
            .collect();
        Ok(Self::from_gates("SU2 Coin", OperatorFamily::CustomUnitary, n_qubits, gates))
    }

    /// A soft-boundary control whose `|0>` amplitude carries probability
    /// `transmission`: `θ = arccos(√p)` on every wire.
    ///
    /// # Errors
    /// `WalkError::Configuration` if `transmission` lies outside `[0, 1]`.
    pub fn permeability(n_qubits: usize, transmission: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&transmission) {
            return Err(WalkError::config(format!(
                "transmission probability {} is outside [0, 1]",
                transmission
            )));
        }
        let theta = transmission.sqrt().acos();
        let mut op = Self::su2(n_qubits, &Angles::Uniform(theta), &Angles::Uniform(0.0), &Angles::Uniform(0.0))?;
        op.name = format!("Permeability Coin (p={})", transmission);
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cyclic_controller_structure() {
        let op = ReversibleOperator::cyclic_increment(3);
        assert!(op.is_cyclic_controller());
        let gates = op.gates();
        assert_eq!(gates.len(), 3);
        assert!(gates[0].controls.is_empty());
        assert_eq!(gates[2].controls.len(), 2);
        assert_eq!(gates[2].target, 2);
    }

    #[test]
    fn test_absorbing_latch_has_no_body() {
        let latch = ReversibleOperator::absorbing(2);
        assert_eq!(latch.family(), &OperatorFamily::Identity);
        assert!(latch.gates().is_empty());
        assert_eq!(latch.n_qubits(), 2);
    }

    #[test]
    fn test_kickback_variants_fix_phase() {
        let op = ReversibleOperator::kickback(2, KickbackVariant::LeftPlus);
        assert_eq!(op.family(), &OperatorFamily::PhaseKickback(7.0 * PI / 4.0));
        assert_eq!(op.name(), "Left Plus Kickback Coin");
        assert_relative_eq!(KickbackVariant::RightMinus.phase(), 3.0 * PI / 4.0);
    }

    #[test]
    fn test_diffusion_flips_last_wire_under_all_others() {
        let op = ReversibleOperator::diffusion(3);
        let mct = op
            .gates()
            .iter()
            .find(|g| g.kind == GateKind::Flip && !g.controls.is_empty())
            .expect("multi-controlled flip present");
        assert_eq!(mct.target, 2);
        assert_eq!(mct.controls.len(), 2);
        assert_eq!(op.gates().len(), 4 * 3 + 3);
    }

    #[test]
    fn test_fourier_gate_count() {
        // 3 H, 3 controlled phases, one swap of three CNOTs
        let op = ReversibleOperator::fourier(3);
        assert_eq!(op.gates().len(), 3 + 3 + 3);
    }

    #[test]
    fn test_su2_angle_list_mismatch_is_error() {
        let result = ReversibleOperator::su2(
            2,
            &Angles::PerQubit(vec![0.1, 0.2, 0.3]),
            &Angles::Uniform(0.0),
            &Angles::Uniform(0.0),
        );
        assert!(matches!(result, Err(WalkError::Configuration { .. })));
    }

    #[test]
    fn test_permeability_probability_range() -> Result<()> {
        assert!(ReversibleOperator::permeability(1, -0.1).is_err());
        assert!(ReversibleOperator::permeability(1, 1.1).is_err());
        let op = ReversibleOperator::permeability(1, 0.25)?;
        let m = op.gates()[0].kind.matrix();
        // cos(arccos(sqrt(p)))^2 = p
        assert_relative_eq!(m[0][0].norm_sqr(), 0.25, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_direction_reversal_targets_msb() {
        let op = ReversibleOperator::direction_reversal(3);
        assert_eq!(op.gates().len(), 1);
        assert_eq!(op.gates()[0].target, 2);
        assert!(ReversibleOperator::identity(0).gates().is_empty());
    }
}
