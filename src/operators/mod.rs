// src/operators/mod.rs

//! The reversible operator library: coins, controls, and the rules for
//! control-extending and inverting them.
//!
//! An operator is a named gate list over local wires `0..n_qubits`. Its
//! inverse is computed once at construction. Control-extension prepends `k`
//! new local wires and adds them, with the requested pattern, as extra
//! controls on every gate of the (possibly inverted) body, which is exactly
//! "apply the body iff the leading wires match".

mod library;

pub use library::{Angles, KickbackVariant};

use crate::core::bits::{ones, validate_width, wire_bits};
use crate::core::{QubitId, Result, WalkError};
use crate::operations::{Control, Gate, Operation};
use std::fmt;

/// The closed set of operator families.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorFamily {
    /// No-op.
    Identity,
    /// The same single-qubit basis rotation (Hadamard) on every wire.
    Rotation,
    /// Bit flip on every wire.
    Flip,
    /// Inversion about the mean (Grover diffuser).
    Diffusion,
    /// Discrete Fourier transform with bit-reversal swaps.
    Fourier,
    /// Diffusion construction with the sign flip replaced by phase `λ`.
    PhaseKickback(f64),
    /// Ripple counter stepping the register through all `2^n` values.
    CyclicIncrement,
    /// Per-wire two-angle-plus-phase SU(2) rotation.
    CustomUnitary,
    /// Flip of the most significant wire; maps each move onto its opposite.
    DirectionReversal,
}

/// A named unitary over exactly `n_qubits` local wires.
#[derive(Debug, Clone, PartialEq)]
pub struct ReversibleOperator {
    name: String,
    label: Option<String>,
    family: OperatorFamily,
    n_qubits: usize,
    num_ctrl_qubits: usize,
    gates: Vec<Gate<usize>>,
    inverse_gates: Vec<Gate<usize>>,
}

fn invert(gates: &[Gate<usize>]) -> Vec<Gate<usize>> {
    gates.iter().rev().map(Gate::adjoint).collect()
}

impl ReversibleOperator {
    pub(crate) fn from_gates(name: impl Into<String>, family: OperatorFamily, n_qubits: usize, gates: Vec<Gate<usize>>) -> Self {
        let inverse_gates = invert(&gates);
        Self { name: name.into(), label: None, family, n_qubits, num_ctrl_qubits: 0, gates, inverse_gates }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn family(&self) -> &OperatorFamily {
        &self.family
    }

    /// Total width, including any control wires added by [`control`](Self::control).
    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    pub fn num_ctrl_qubits(&self) -> usize {
        self.num_ctrl_qubits
    }

    pub fn gates(&self) -> &[Gate<usize>] {
        &self.gates
    }

    pub fn inverse_gates(&self) -> &[Gate<usize>] {
        &self.inverse_gates
    }

    pub fn is_cyclic_controller(&self) -> bool {
        self.family == OperatorFamily::CyclicIncrement
    }

    /// The inverse operator, renamed `"<name>^-1"`.
    pub fn inverse(&self) -> ReversibleOperator {
        Self {
            name: format!("{}^-1", self.name),
            label: self.label.clone(),
            family: self.family.clone(),
            n_qubits: self.n_qubits,
            num_ctrl_qubits: self.num_ctrl_qubits,
            gates: self.inverse_gates.clone(),
            inverse_gates: self.gates.clone(),
        }
    }

    /// Builds the operator that applies this one (or its inverse) to the
    /// trailing `n_qubits` wires iff the leading `num_ctrl_qubits` wires carry
    /// exactly `ctrl_state`.
    ///
    /// `ctrl_state` is written most-significant-first: its last character
    /// constrains control wire 0. It defaults to all ones.
    ///
    /// # Errors
    /// `WalkError::Configuration` if `ctrl_state` is not a binary string of
    /// length `num_ctrl_qubits`.
    pub fn control(
        &self,
        num_ctrl_qubits: usize,
        ctrl_state: Option<&str>,
        inverse: bool,
        label: Option<&str>,
    ) -> Result<ReversibleOperator> {
        let ctrl_state = match ctrl_state {
            Some(state) => {
                validate_width(state, num_ctrl_qubits, "ctrl_state")?;
                state.to_string()
            }
            None => ones(num_ctrl_qubits),
        };
        let ctrl_bits = wire_bits(&ctrl_state);

        let extend = |body: &[Gate<usize>]| -> Vec<Gate<usize>> {
            body.iter()
                .map(|gate| {
                    let mut shifted = gate.map_wires(|w| w + num_ctrl_qubits);
                    let mut controls: Vec<Control<usize>> = ctrl_bits
                        .iter()
                        .enumerate()
                        .map(|(wire, &state)| Control { wire, state })
                        .collect();
                    controls.append(&mut shifted.controls);
                    shifted.controls = controls;
                    shifted
                })
                .collect()
        };

        let (body, inverse_body, base_name) = if inverse {
            (&self.inverse_gates, &self.gates, format!("{}^-1", self.name))
        } else {
            (&self.gates, &self.inverse_gates, self.name.clone())
        };

        Ok(Self {
            name: format!("C{}[{}]-{}", num_ctrl_qubits, ctrl_state, base_name),
            label: label.map(str::to_string).or_else(|| self.label.clone()),
            family: self.family.clone(),
            n_qubits: self.n_qubits + num_ctrl_qubits,
            num_ctrl_qubits: self.num_ctrl_qubits + num_ctrl_qubits,
            gates: extend(body.as_slice()),
            inverse_gates: extend(inverse_body.as_slice()),
        })
    }

    /// Binds local wire `i` to `wires[i]`, producing a program operation.
    pub fn bind(&self, wires: &[QubitId]) -> Result<Operation> {
        if wires.len() != self.n_qubits {
            return Err(WalkError::config(format!(
                "operator '{}' acts on {} wires but {} were bound",
                self.name,
                self.n_qubits,
                wires.len()
            )));
        }
        let gates = self.gates.iter().map(|g| g.map_wires(|w| wires[w])).collect();
        Ok(Operation::Apply {
            name: self.name.clone(),
            label: self.label.clone(),
            wires: wires.to_vec(),
            gates,
        })
    }
}

impl fmt::Display for ReversibleOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} wires, {} gates)", self.name, self.n_qubits, self.gates.len())
    }
}
