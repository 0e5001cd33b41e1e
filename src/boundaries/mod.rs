// src/boundaries/mod.rs

//! Lattice boundaries and the control registers regulating their permeability.
//!
//! A [`Boundary`] names one lattice plane: the value of a dimension register at
//! which the walker is reflected. A [`BoundaryControl`] groups boundaries that
//! share one permeability policy and emits, per boundary and per step, the
//! gate block that implements it. The four policies form a closed set
//! ([`BoundaryKind`]):
//!
//! * **Hard**: no control register, unconditional reflection.
//! * **Permeable**: an arbitrary coin on the control register; reflection only
//!   happens on the `ctrl_state` branch, so the coin fixes the transmission.
//! * **OneWay**: a cyclic counter on the control register marks the step the
//!   walker touches the plane, and the ancilla records which way it arrived.
//!   Walkers moving toward higher index pass, the others are reflected.
//! * **Absorbing**: a latch register set to `ctrl_state` once, when the program
//!   is built, and never reset, so the reflection fires on every step.

mod geometry;
mod parse;

pub use geometry::{BoundaryGenerator, EdgeGeometry};
pub use parse::{BoundarySpec, build_boundary_controls};

use crate::core::bits::{ones, validate_bitstring, wire_bits};
use crate::core::constants::walk_constants::DIRECTIONAL_ANCILLA_WIDTH;
use crate::core::{QubitId, Register, Result, WalkError};
use crate::operations::{Gate, GateKind, Operation};
use crate::operators::{OperatorFamily, ReversibleOperator};
use tracing::debug;

/// A lattice plane: the register value `bitstring` on `dimension`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    bitstring: String,
    dimension: usize,
    label: Option<String>,
}

impl Boundary {
    /// # Errors
    /// `WalkError::Configuration` if `bitstring` is empty or not binary. Its
    /// width is checked against the dimension register when the walk is built.
    pub fn new(bitstring: impl Into<String>, dimension: usize, label: Option<&str>) -> Result<Self> {
        let bitstring = bitstring.into();
        validate_bitstring(&bitstring)?;
        if bitstring.is_empty() {
            return Err(WalkError::config(format!("boundary on dimension {} has an empty bitstring", dimension)));
        }
        Ok(Self { bitstring, dimension, label: label.map(str::to_string) })
    }

    pub fn bitstring(&self) -> &str {
        &self.bitstring
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Length of the boundary bitstring.
    pub fn n_bits(&self) -> usize {
        self.bitstring.len()
    }
}

/// Permeability policy of a [`BoundaryControl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    Hard,
    Permeable,
    OneWay,
    Absorbing,
}

/// The registers one boundary gate block is wired to.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryWiring<'a> {
    /// Position register of the boundary's dimension.
    pub dimension: &'a Register,
    /// The shared shift-coin register.
    pub coin: &'a Register,
    /// This control's permeability register, if it has one.
    pub control: Option<&'a Register>,
    /// The two-wire crossing record of a one-way control.
    pub ancilla: Option<&'a Register>,
}

/// A group of boundaries sharing one permeability-control operator.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryControl {
    kind: BoundaryKind,
    ctrl: Option<ReversibleOperator>,
    ctrl_state: String,
    boundaries: Vec<Boundary>,
    n_resets: usize,
    label: Option<String>,
}

impl BoundaryControl {
    fn with_ctrl(kind: BoundaryKind, ctrl: Option<ReversibleOperator>) -> Self {
        let ctrl_state = ones(ctrl.as_ref().map_or(0, ReversibleOperator::n_qubits));
        Self { kind, ctrl, ctrl_state, boundaries: Vec::new(), n_resets: 1, label: None }
    }

    /// Unconditional reflection; no control register.
    pub fn hard() -> Self {
        Self::with_ctrl(BoundaryKind::Hard, None)
    }

    /// Reflection gated by the `ctrl_state` branch of `ctrl`.
    pub fn permeable(ctrl: ReversibleOperator) -> Self {
        Self::with_ctrl(BoundaryKind::Permeable, Some(ctrl))
    }

    /// A valve driven by a `cycle_bits`-wide crossing counter. Walkers that
    /// reach the plane moving toward higher index keep going; walkers arriving
    /// from the other side are reflected.
    ///
    /// # Errors
    /// `WalkError::Configuration` if `cycle_bits` is zero.
    pub fn one_way(cycle_bits: usize) -> Result<Self> {
        if cycle_bits == 0 {
            return Err(WalkError::config("one-way boundary needs at least one cycle bit"));
        }
        Ok(Self::with_ctrl(BoundaryKind::OneWay, Some(ReversibleOperator::cyclic_increment(cycle_bits))))
    }

    /// A latched wall: the control register is prepared to `ctrl_state` once
    /// and never touched again, so nothing crosses the plane.
    ///
    /// # Errors
    /// `WalkError::Configuration` if `n_qubits` is zero.
    pub fn absorbing(n_qubits: usize) -> Result<Self> {
        if n_qubits == 0 {
            return Err(WalkError::config("absorbing boundary needs at least one control qubit"));
        }
        Ok(Self::with_ctrl(BoundaryKind::Absorbing, Some(ReversibleOperator::absorbing(n_qubits))))
    }

    /// Overrides the default all-ones control pattern.
    ///
    /// # Errors
    /// `WalkError::Configuration` if the pattern width differs from the
    /// control register, or a pattern is given for a hard boundary.
    pub fn with_ctrl_state(mut self, ctrl_state: &str) -> Result<Self> {
        crate::core::bits::validate_width(ctrl_state, self.ctrl_size(), "boundary ctrl_state")?;
        self.ctrl_state = ctrl_state.to_string();
        Ok(self)
    }

    /// Sets how many times the control register is reset each step.
    pub fn with_n_resets(mut self, n_resets: usize) -> Self {
        self.n_resets = n_resets;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn add_boundary(&mut self, boundary: Boundary) {
        self.boundaries.push(boundary);
    }

    pub fn add_boundaries<I: IntoIterator<Item = Boundary>>(&mut self, boundaries: I) {
        self.boundaries.extend(boundaries);
    }

    pub fn kind(&self) -> BoundaryKind {
        self.kind
    }

    pub fn ctrl(&self) -> Option<&ReversibleOperator> {
        self.ctrl.as_ref()
    }

    pub fn ctrl_state(&self) -> &str {
        &self.ctrl_state
    }

    /// Width of the control register (zero for hard boundaries).
    pub fn ctrl_size(&self) -> usize {
        self.ctrl.as_ref().map_or(0, ReversibleOperator::n_qubits)
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn n_resets(&self) -> usize {
        self.n_resets
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Width of the ancilla register; only one-way controls carry one.
    pub fn ancilla_width(&self) -> usize {
        match self.kind {
            BoundaryKind::OneWay => DIRECTIONAL_ANCILLA_WIDTH,
            _ => 0,
        }
    }

    /// The operator applied to the control register in the coin pass.
    ///
    /// Cyclic controllers are excluded: they only ever run conditionally
    /// inside the boundary block. Absorbing latches have no per-step body.
    pub fn permeability_operator(&self) -> Option<&ReversibleOperator> {
        self.ctrl
            .as_ref()
            .filter(|op| !op.is_cyclic_controller() && op.family() != &OperatorFamily::Identity)
    }

    /// Flips applied once, when the program is (re)built: an absorbing latch
    /// starts out holding its trigger pattern.
    pub fn preparation(&self, control: Option<&Register>) -> Vec<Operation> {
        let Some(register) = control.filter(|_| self.kind == BoundaryKind::Absorbing) else {
            return Vec::new();
        };
        wire_bits(&self.ctrl_state)
            .into_iter()
            .enumerate()
            .filter(|(_, bit)| *bit)
            .map(|(wire, _)| Operation::Gate(Gate::new(GateKind::Flip, register.qubit(wire))))
            .collect()
    }

    /// Whether the control register is dirty-reset at the end of a step.
    pub fn resets_register(&self) -> bool {
        self.ctrl.is_some() && self.kind != BoundaryKind::Absorbing
    }

    /// The end-of-step reset script: `n_resets` rounds over the control
    /// register (unless absorbing) and the ancilla register.
    pub fn reset_script(&self, control: Option<&Register>, ancilla: Option<&Register>) -> Vec<Operation> {
        let mut targets: Vec<QubitId> = Vec::new();
        if self.resets_register() {
            if let Some(register) = control {
                targets.extend(register.qubits());
            }
        }
        if let Some(register) = ancilla {
            targets.extend(register.qubits());
        }
        if targets.is_empty() {
            return Vec::new();
        }
        (0..self.n_resets).map(|_| Operation::Reset { targets: targets.clone() }).collect()
    }

    /// Emits the gate block of one boundary, closed by a barrier.
    ///
    /// Controls are bound control register first, then the position register,
    /// and the pattern is `bitstring ++ ctrl_state`, so the last character of
    /// the pattern lands on control wire 0.
    pub fn gate_block(
        &self,
        boundary: &Boundary,
        shift_coin: &ReversibleOperator,
        wiring: BoundaryWiring<'_>,
    ) -> Result<Vec<Operation>> {
        let label = boundary.label().or(self.label());
        let reversal = ReversibleOperator::direction_reversal(wiring.coin.width());
        let position = wiring.dimension.qubits();
        let coin = wiring.coin.qubits();
        let control = match (self.ctrl.is_some(), wiring.control) {
            (false, _) => Vec::new(),
            (true, Some(register)) => register.qubits(),
            (true, None) => {
                return Err(WalkError::config(format!(
                    "boundary '{}' on dimension {} has a control operator but no control register",
                    boundary.bitstring(),
                    boundary.dimension()
                )));
            }
        };

        let combined_pattern = format!("{}{}", boundary.bitstring(), self.ctrl_state);
        let n_combined = position.len() + control.len();
        let full_wires: Vec<QubitId> = control.iter().chain(&position).chain(&coin).copied().collect();

        let mut ops = Vec::with_capacity(5);
        if self.kind == BoundaryKind::OneWay {
            let ctrl = self.ctrl.as_ref().ok_or_else(|| WalkError::config("one-way boundary without a counter"))?;
            let ancilla = wiring
                .ancilla
                .filter(|a| a.width() == DIRECTIONAL_ANCILLA_WIDTH)
                .ok_or_else(|| WalkError::config("one-way boundary needs a two-wire ancilla register"))?;
            let direction = wiring
                .coin
                .most_significant()
                .ok_or_else(|| WalkError::config("one-way boundary needs a coin register"))?;
            let (blocked, permitted) = (ancilla.qubit(0), ancilla.qubit(1));
            let pattern = Some(boundary.bitstring());
            let n_position = position.len();
            let position_coin: Vec<QubitId> = position.iter().chain(&coin).copied().collect();
            let position_control: Vec<QubitId> = position.iter().chain(&control).copied().collect();
            let flag = ReversibleOperator::crossing_flag();
            // direction bit first, so it takes the last pattern character
            let record = |target: QubitId, moving_down: bool| -> Result<Operation> {
                let wires: Vec<QubitId> =
                    std::iter::once(direction).chain(position.iter().copied()).chain(std::iter::once(target)).collect();
                let state = format!("{}{}", boundary.bitstring(), if moving_down { '1' } else { '0' });
                flag.control(n_position + 1, Some(&state), false, label)?.bind(&wires)
            };
            let pass_wires: Vec<QubitId> = control
                .iter()
                .copied()
                .chain(std::iter::once(permitted))
                .chain(position.iter().copied())
                .chain(coin.iter().copied())
                .collect();
            let pass_pattern = format!("{}1{}", boundary.bitstring(), self.ctrl_state);

            ops.push(shift_coin.control(n_position, pattern, true, label)?.bind(&position_coin)?);
            ops.push(record(blocked, true)?);
            ops.push(record(permitted, false)?);
            ops.push(ctrl.control(n_position, pattern, false, label)?.bind(&position_control)?);
            ops.push(reversal.control(n_position, pattern, false, label)?.bind(&position_coin)?);
            ops.push(reversal.control(n_combined + 1, Some(&pass_pattern), false, label)?.bind(&pass_wires)?);
        } else {
            ops.push(shift_coin.control(n_combined, Some(&combined_pattern), true, label)?.bind(&full_wires)?);
            ops.push(reversal.control(n_combined, Some(&combined_pattern), false, label)?.bind(&full_wires)?);
        }
        ops.push(Operation::Barrier);

        debug!(
            kind = ?self.kind,
            dimension = boundary.dimension(),
            bitstring = boundary.bitstring(),
            ops = ops.len(),
            "Emitted boundary block"
        );
        Ok(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RegisterAllocator, RegisterRole};

    #[test]
    fn test_hard_boundary_has_no_register() {
        let ctrl = BoundaryControl::hard();
        assert_eq!(ctrl.ctrl_size(), 0);
        assert_eq!(ctrl.ctrl_state(), "");
        assert!(ctrl.permeability_operator().is_none());
        assert!(!ctrl.resets_register());
    }

    #[test]
    fn test_cyclic_controller_excluded_from_coin_pass() -> Result<()> {
        let one_way = BoundaryControl::one_way(3)?;
        assert!(one_way.ctrl().is_some());
        assert!(one_way.permeability_operator().is_none());
        assert_eq!(one_way.ancilla_width(), 2);

        let permeable = BoundaryControl::permeable(ReversibleOperator::diffusion(2));
        assert_eq!(permeable.permeability_operator().map(|op| op.name()), Some("Grover Coin"));
        assert_eq!(permeable.ctrl_state(), "11");
        Ok(())
    }

    #[test]
    fn test_absorbing_never_resets_control() -> Result<()> {
        let mut alloc = RegisterAllocator::new();
        let reg = alloc.allocate("absorber", RegisterRole::BoundaryControl(0), 2)?;
        let absorbing = BoundaryControl::absorbing(2)?.with_n_resets(3);
        assert!(absorbing.reset_script(Some(&reg), None).is_empty());

        let soft = BoundaryControl::permeable(ReversibleOperator::hadamard(2)).with_n_resets(3);
        let script = soft.reset_script(Some(&reg), None);
        assert_eq!(script.len(), 3);
        assert_eq!(script[0], Operation::Reset { targets: reg.qubits() });
        Ok(())
    }

    #[test]
    fn test_ctrl_state_width_checked() {
        let soft = BoundaryControl::permeable(ReversibleOperator::hadamard(2));
        assert!(soft.clone().with_ctrl_state("01").is_ok());
        assert!(soft.with_ctrl_state("1").is_err());
        assert!(Boundary::new("01a", 0, None).is_err());
        assert!(Boundary::new("", 0, None).is_err());
    }

    #[test]
    fn test_permeable_block_binds_control_first() -> Result<()> {
        let mut alloc = RegisterAllocator::new();
        let dim = alloc.allocate("dimension0", RegisterRole::Dimension(0), 2)?;
        let coin = alloc.allocate("coin", RegisterRole::Coin, 1)?;
        let ctrl_reg = alloc.allocate("boundary0 control", RegisterRole::BoundaryControl(0), 1)?;
        let soft = BoundaryControl::permeable(ReversibleOperator::hadamard(1));
        let boundary = Boundary::new("11", 0, Some("right"))?;
        let wiring = BoundaryWiring { dimension: &dim, coin: &coin, control: Some(&ctrl_reg), ancilla: None };

        let ops = soft.gate_block(&boundary, &ReversibleOperator::hadamard(1), wiring)?;
        assert_eq!(ops.len(), 3);
        match &ops[0] {
            Operation::Apply { wires, label, .. } => {
                assert_eq!(wires, &vec![QubitId(3), QubitId(0), QubitId(1), QubitId(2)]);
                assert_eq!(label.as_deref(), Some("right"));
            }
            other => panic!("expected an operator application, got {}", other),
        }
        assert_eq!(ops[2], Operation::Barrier);
        Ok(())
    }

    #[test]
    fn test_one_way_block_sequence() -> Result<()> {
        let mut alloc = RegisterAllocator::new();
        let dim = alloc.allocate("dimension0", RegisterRole::Dimension(0), 2)?;
        let coin = alloc.allocate("coin", RegisterRole::Coin, 1)?;
        let ctrl_reg = alloc.allocate("boundary0 control", RegisterRole::BoundaryControl(0), 3)?;
        let anc_reg = alloc.allocate("boundary0 ancilla", RegisterRole::Ancilla(0), 2)?;
        let valve = BoundaryControl::one_way(3)?;
        let boundary = Boundary::new("00", 0, None)?;
        let unwired = BoundaryWiring { dimension: &dim, coin: &coin, control: Some(&ctrl_reg), ancilla: None };
        assert!(valve.gate_block(&boundary, &ReversibleOperator::hadamard(1), unwired).is_err());

        let wiring = BoundaryWiring { dimension: &dim, coin: &coin, control: Some(&ctrl_reg), ancilla: Some(&anc_reg) };
        let ops = valve.gate_block(&boundary, &ReversibleOperator::hadamard(1), wiring)?;
        let names: Vec<String> = ops
            .iter()
            .filter_map(|op| match op {
                Operation::Apply { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "C2[00]-Hadamard Coin^-1",
                "C3[001]-Crossing Flag",
                "C3[000]-Crossing Flag",
                "C2[00]-Cyclic Controller",
                "C2[00]-Direction Reversal",
                "C6[001111]-Direction Reversal",
            ]
        );
        // the pass-through reversal also waits on the permitted-crossing flag
        match ops.get(5) {
            Some(Operation::Apply { wires, .. }) => {
                assert_eq!(&wires[..4], &[QubitId(3), QubitId(4), QubitId(5), QubitId(7)]);
            }
            other => panic!("expected the pass-through reversal, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_absorbing_latch_prepared_once() -> Result<()> {
        let mut alloc = RegisterAllocator::new();
        let reg = alloc.allocate("absorber", RegisterRole::BoundaryControl(0), 2)?;
        let absorbing = BoundaryControl::absorbing(2)?;
        assert!(absorbing.permeability_operator().is_none());
        assert_eq!(
            absorbing.preparation(Some(&reg)),
            vec![
                Operation::Gate(Gate::new(GateKind::Flip, reg.qubit(0))),
                Operation::Gate(Gate::new(GateKind::Flip, reg.qubit(1))),
            ]
        );

        let soft = BoundaryControl::permeable(ReversibleOperator::hadamard(2));
        assert!(soft.preparation(Some(&reg)).is_empty());
        Ok(())
    }
}
