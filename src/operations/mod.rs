// src/operations/mod.rs

//! Primitive operations a compiled walk program is made of.
//!
//! Every reversible operator in the library reduces to a list of [`Gate`]s: a
//! single-qubit transform on one target wire, applied only when each of its
//! control wires carries the required value. Control-extension and inversion
//! of whole operators are therefore just list rewrites over these gates.

use crate::core::QubitId;
use num_complex::Complex;
use num_traits::Zero;
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

/// The single-qubit transform a [`Gate`] applies to its target.
#[derive(Debug, Clone, PartialEq)]
pub enum GateKind {
    /// Bit flip (X). Multi-controlled, it is the Toffoli family.
    Flip,
    /// Hadamard basis rotation.
    Hadamard,
    /// `diag(1, e^{iλ})`.
    Phase(f64),
    /// Arbitrary 2x2 unitary, row-major.
    Unitary([[Complex<f64>; 2]; 2]),
}

impl GateKind {
    /// The 2x2 matrix of this transform.
    pub fn matrix(&self) -> [[Complex<f64>; 2]; 2] {
        let one = Complex::new(1.0, 0.0);
        match self {
            GateKind::Flip => [[Complex::zero(), one], [one, Complex::zero()]],
            GateKind::Hadamard => {
                let h = Complex::new(FRAC_1_SQRT_2, 0.0);
                [[h, h], [h, -h]]
            }
            GateKind::Phase(lambda) => {
                [[one, Complex::zero()], [Complex::zero(), Complex::new(lambda.cos(), lambda.sin())]]
            }
            GateKind::Unitary(m) => *m,
        }
    }

    /// The inverse transform. Flip and Hadamard are self-inverse.
    pub fn adjoint(&self) -> GateKind {
        match self {
            GateKind::Flip => GateKind::Flip,
            GateKind::Hadamard => GateKind::Hadamard,
            GateKind::Phase(lambda) => GateKind::Phase(-lambda),
            GateKind::Unitary(m) => GateKind::Unitary([
                [m[0][0].conj(), m[1][0].conj()],
                [m[0][1].conj(), m[1][1].conj()],
            ]),
        }
    }

    /// Short symbol used by the program listing.
    pub fn symbol(&self) -> String {
        match self {
            GateKind::Flip => "X".to_string(),
            GateKind::Hadamard => "H".to_string(),
            GateKind::Phase(lambda) => format!("P({:.4})", lambda),
            GateKind::Unitary(_) => "U".to_string(),
        }
    }
}

/// A control wire together with the value it must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Control<W> {
    pub wire: W,
    pub state: bool,
}

/// A single-target gate with any number of exact-value controls.
///
/// `W` is the wire type: `usize` for an operator body (local wire indices),
/// [`QubitId`] once bound into a program.
#[derive(Debug, Clone, PartialEq)]
pub struct Gate<W = QubitId> {
    pub kind: GateKind,
    pub target: W,
    pub controls: Vec<Control<W>>,
}

impl<W: Copy> Gate<W> {
    /// An unconditional gate.
    pub fn new(kind: GateKind, target: W) -> Self {
        Self { kind, target, controls: Vec::new() }
    }

    /// A gate that fires when every wire in `controls` is set.
    pub fn controlled(kind: GateKind, controls: &[W], target: W) -> Self {
        Self {
            kind,
            target,
            controls: controls.iter().map(|&wire| Control { wire, state: true }).collect(),
        }
    }

    /// The same gate with its transform inverted.
    pub fn adjoint(&self) -> Self {
        Self { kind: self.kind.adjoint(), target: self.target, controls: self.controls.clone() }
    }

    /// Renames every wire through `f`.
    pub fn map_wires<V, F: Fn(W) -> V>(&self, f: F) -> Gate<V> {
        Gate {
            kind: self.kind.clone(),
            target: f(self.target),
            controls: self
                .controls
                .iter()
                .map(|c| Control { wire: f(c.wire), state: c.state })
                .collect(),
        }
    }

    /// All wires this gate touches, controls first.
    pub fn wires(&self) -> Vec<W> {
        self.controls.iter().map(|c| c.wire).chain(std::iter::once(self.target)).collect()
    }
}

/// One entry of a compiled walk program.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// A primitive gate, e.g. an initial-state flip or a ripple-shift Toffoli.
    Gate(Gate),
    /// A library operator bound to `wires`, kept expanded into its gates.
    Apply {
        /// Operator name, e.g. `"Hadamard Coin"`.
        name: String,
        /// Caller-supplied label, typically the boundary it belongs to.
        label: Option<String>,
        /// Program wires, in the operator's local wire order.
        wires: Vec<QubitId>,
        /// The operator body after binding.
        gates: Vec<Gate>,
    },
    /// Reset every target wire to `|0>`.
    Reset { targets: Vec<QubitId> },
    /// Readability and ordering barrier; no effect on the state.
    Barrier,
}

impl Operation {
    /// Returns every wire mentioned by the operation.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Gate(gate) => gate.wires(),
            Operation::Apply { wires, .. } => wires.clone(),
            Operation::Reset { targets } => targets.clone(),
            Operation::Barrier => Vec::new(),
        }
    }

    /// The primitive gates this operation expands to (none for resets and barriers).
    pub fn gates(&self) -> &[Gate] {
        match self {
            Operation::Gate(gate) => std::slice::from_ref(gate),
            Operation::Apply { gates, .. } => gates,
            Operation::Reset { .. } | Operation::Barrier => &[],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn wire_list(wires: &[QubitId]) -> String {
            wires.iter().map(|q| q.to_string()).collect::<Vec<_>>().join(",")
        }
        match self {
            Operation::Gate(gate) => {
                if gate.controls.is_empty() {
                    write!(f, "{} {}", gate.kind.symbol(), gate.target)
                } else {
                    let ctrl: String = gate
                        .controls
                        .iter()
                        .map(|c| format!("{}={}", c.wire, u8::from(c.state)))
                        .collect::<Vec<_>>()
                        .join(",");
                    write!(f, "C[{}] {} {}", ctrl, gate.kind.symbol(), gate.target)
                }
            }
            Operation::Apply { name, label, wires, gates } => {
                write!(f, "{}", name)?;
                if let Some(label) = label {
                    write!(f, " <{}>", label)?;
                }
                write!(f, " on [{}] ({} gates)", wire_list(wires), gates.len())
            }
            Operation::Reset { targets } => write!(f, "reset [{}]", wire_list(targets)),
            Operation::Barrier => write!(f, "barrier"),
        }
    }
}
