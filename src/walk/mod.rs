// src/walk/mod.rs

//! The walk step compiler.
//!
//! [`QuantumWalk`] owns the register layout, the shift coin, the boundary
//! controls and the program buffer. Each [`QuantumWalk::step`] drives the
//! buffer through one cycle of [`StepPhase`]:
//!
//! 1. **Idle → Coined**: the shift coin on the coin register, then every
//!    boundary control's permeability operator on its own register.
//! 2. **Coined → Bounded**: one gate block per boundary.
//! 3. **Bounded → Shifted**: a wrapped left and right ripple per dimension.
//! 4. **Shifted → Reset**: the dirty-reset script of every boundary control,
//!    then back to `Idle`.
//!
//! The classical initial state is prepared once, when the buffer is
//! (re)built, never per step.

mod experiment;
pub mod shift;

pub use experiment::{ExperimentRunner, IterationRecord, submit_walk};
pub use shift::{MovePattern, ShiftDirection};

use crate::boundaries::{Boundary, BoundaryControl, BoundaryWiring};
use crate::circuits::Circuit;
use crate::config::{CoinFamily, CoinParams};
use crate::core::bits::validate_width;
use crate::core::{QubitId, Register, RegisterAllocator, RegisterLayout, RegisterRole, Result, WalkError};
use crate::decoding::{DisplacementTensor, ResultDecoder, StatisticsBundle};
use crate::operations::{Gate, GateKind, Operation};
use crate::operators::ReversibleOperator;
use crate::simulation::{Backend, MeasurementHistogram};
use crate::validation::check_tensor;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Periodic reset of selected coin qubits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoherenceCycle {
    /// Reset after every `cycle_length` steps.
    pub cycle_length: usize,
    /// Coin wire indices (0 = least significant) to reset.
    pub target_qubits: Vec<usize>,
}

/// Everything needed to build a [`QuantumWalk`].
#[derive(Debug, Clone)]
pub struct WalkSpecification {
    system_dimensions: Vec<usize>,
    initial_states: Option<Vec<String>>,
    coin_family: CoinFamily,
    coin_params: CoinParams,
    n_shift_coin_bits: Option<usize>,
    boundary_controls: Vec<BoundaryControl>,
    decoherence: Option<DecoherenceCycle>,
}

impl WalkSpecification {
    /// A walk over the given per-dimension register widths with a Hadamard
    /// coin of default width and no boundaries.
    pub fn new(system_dimensions: Vec<usize>) -> Self {
        Self {
            system_dimensions,
            initial_states: None,
            coin_family: CoinFamily::Hadamard,
            coin_params: CoinParams::new(),
            n_shift_coin_bits: None,
            boundary_controls: Vec::new(),
            decoherence: None,
        }
    }

    /// One bitstring per dimension, most significant bit first.
    pub fn with_initial_states<S: Into<String>>(mut self, states: Vec<S>) -> Self {
        self.initial_states = Some(states.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_coin(mut self, family: CoinFamily, params: CoinParams) -> Self {
        self.coin_family = family;
        self.coin_params = params;
        self
    }

    pub fn with_coin_width(mut self, n_shift_coin_bits: usize) -> Self {
        self.n_shift_coin_bits = Some(n_shift_coin_bits);
        self
    }

    pub fn with_boundary_control(mut self, control: BoundaryControl) -> Self {
        self.boundary_controls.push(control);
        self
    }

    pub fn with_boundary_controls<I: IntoIterator<Item = BoundaryControl>>(mut self, controls: I) -> Self {
        self.boundary_controls.extend(controls);
        self
    }

    pub fn with_decoherence(mut self, cycle: DecoherenceCycle) -> Self {
        self.decoherence = Some(cycle);
        self
    }

    pub fn system_dimensions(&self) -> &[usize] {
        &self.system_dimensions
    }

    pub fn initial_states(&self) -> Option<&[String]> {
        self.initial_states.as_deref()
    }

    pub fn coin_family(&self) -> CoinFamily {
        self.coin_family
    }

    pub fn boundary_controls(&self) -> &[BoundaryControl] {
        &self.boundary_controls
    }

    /// Explicit coin width, or `ceil(log2(2 * dims))`.
    pub fn coin_width(&self) -> usize {
        self.n_shift_coin_bits
            .unwrap_or_else(|| shift::default_coin_width(self.system_dimensions.len()))
    }
}

/// Position in the per-step phase cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepPhase {
    Idle,
    Coined,
    Bounded,
    Shifted,
    Reset,
}

/// Registers owned by one boundary control.
#[derive(Debug, Clone)]
struct ControlRegisters {
    control: Option<Register>,
    ancilla: Option<Register>,
}

/// A compiled coined quantum walk and its program buffer.
#[derive(Debug)]
pub struct QuantumWalk {
    system_dimensions: Vec<usize>,
    initial_states: Option<Vec<String>>,
    layout: RegisterLayout,
    shift_coin: ReversibleOperator,
    boundary_controls: Vec<BoundaryControl>,
    control_registers: Vec<ControlRegisters>,
    move_patterns: Vec<MovePattern>,
    decoherence: Option<DecoherenceCycle>,
    circuit: Circuit,
    phase: StepPhase,
    steps: usize,
    results: Option<DisplacementTensor>,
}

impl QuantumWalk {
    /// Allocates registers, builds the coin and prepares the initial state.
    ///
    /// # Errors
    /// `WalkError::Configuration` for an empty or zero-width dimension, an
    /// initial state or boundary bitstring of the wrong width, a boundary
    /// dimension out of range, a coin too narrow for the move set, or a coin
    /// family that yields no operator.
    pub fn new(spec: WalkSpecification) -> Result<Self> {
        let WalkSpecification {
            system_dimensions,
            initial_states,
            coin_family,
            coin_params,
            n_shift_coin_bits,
            boundary_controls,
            decoherence,
        } = spec;

        if system_dimensions.is_empty() {
            return Err(WalkError::config("a walk needs at least one dimension"));
        }
        if let Some(d) = system_dimensions.iter().position(|w| *w == 0) {
            return Err(WalkError::config(format!("dimension {} has a zero-width register", d)));
        }
        if let Some(states) = &initial_states {
            if states.len() != system_dimensions.len() {
                return Err(WalkError::config(format!(
                    "{} initial states given for {} dimensions",
                    states.len(),
                    system_dimensions.len()
                )));
            }
            for (state, width) in states.iter().zip(&system_dimensions) {
                validate_width(state, *width, "initial state")?;
            }
        }
        for control in &boundary_controls {
            for boundary in control.boundaries() {
                let width = system_dimensions.get(boundary.dimension()).ok_or_else(|| {
                    WalkError::config(format!(
                        "boundary '{}' targets dimension {} but the walk has {}",
                        boundary.bitstring(),
                        boundary.dimension(),
                        system_dimensions.len()
                    ))
                })?;
                validate_width(boundary.bitstring(), *width, "boundary bitstring")?;
            }
        }

        let coin_width = n_shift_coin_bits.unwrap_or_else(|| shift::default_coin_width(system_dimensions.len()));
        let move_patterns = shift::move_patterns(system_dimensions.len(), coin_width)?;
        if !coin_family.is_shift_coin() {
            return Err(WalkError::config(format!("'{}' is not a shift coin", coin_family.name())));
        }
        let shift_coin = coin_family
            .build(coin_width, &coin_params)?
            .ok_or_else(|| WalkError::config(format!("'{}' is not a shift coin", coin_family.name())))?;
        if let Some(cycle) = &decoherence {
            if cycle.cycle_length == 0 {
                return Err(WalkError::config("decoherence cycle length must be positive"));
            }
            if let Some(q) = cycle.target_qubits.iter().find(|q| **q >= coin_width) {
                return Err(WalkError::config(format!(
                    "decoherence target {} outside the {}-qubit coin",
                    q, coin_width
                )));
            }
        }

        // dimensions first, so the state bits form the key prefix
        let mut alloc = RegisterAllocator::new();
        for (d, width) in system_dimensions.iter().enumerate() {
            alloc.allocate(format!("dimension{}", d), RegisterRole::Dimension(d), *width)?;
        }
        alloc.allocate("coin", RegisterRole::Coin, coin_width)?;
        let mut control_registers = Vec::with_capacity(boundary_controls.len());
        for (i, control) in boundary_controls.iter().enumerate() {
            let stem = control.label().map_or_else(|| format!("boundary{}", i), str::to_string);
            let control_reg = match control.ctrl_size() {
                0 => None,
                n => Some(alloc.allocate(format!("{} control", stem), RegisterRole::BoundaryControl(i), n)?),
            };
            let ancilla = match control.ancilla_width() {
                0 => None,
                n => Some(alloc.allocate(format!("{} ancilla", stem), RegisterRole::Ancilla(i), n)?),
            };
            control_registers.push(ControlRegisters { control: control_reg, ancilla });
        }
        let layout = alloc.finish();

        info!(
            dimensions = ?system_dimensions,
            coin = shift_coin.name(),
            width = layout.width(),
            boundary_controls = boundary_controls.len(),
            "Built quantum walk"
        );

        let mut walk = Self {
            system_dimensions,
            initial_states,
            circuit: Circuit::new(layout.clone()),
            layout,
            shift_coin,
            boundary_controls,
            control_registers,
            move_patterns,
            decoherence,
            phase: StepPhase::Idle,
            steps: 0,
            results: None,
        };
        walk.initialise_states()?;
        Ok(walk)
    }

    pub fn layout(&self) -> &RegisterLayout {
        &self.layout
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn shift_coin(&self) -> &ReversibleOperator {
        &self.shift_coin
    }

    pub fn boundary_controls(&self) -> &[BoundaryControl] {
        &self.boundary_controls
    }

    pub fn system_dimensions(&self) -> &[usize] {
        &self.system_dimensions
    }

    pub fn move_patterns(&self) -> &[MovePattern] {
        &self.move_patterns
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    /// Steps appended since the buffer was last built.
    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    /// The cached decoded results, if any, from the current buffer.
    pub fn results(&self) -> Option<&DisplacementTensor> {
        self.results.as_ref()
    }

    fn coin_register(&self) -> Result<&Register> {
        self.layout.coin().ok_or_else(|| WalkError::config("layout has no coin register"))
    }

    fn dimension_register(&self, dimension: usize) -> Result<&Register> {
        self.layout.dimension(dimension).ok_or_else(|| {
            WalkError::config(format!(
                "dimension {} out of range for a {}-dimensional walk",
                dimension,
                self.system_dimensions.len()
            ))
        })
    }

    fn advance(&mut self, from: StepPhase, to: StepPhase) -> Result<()> {
        if self.phase != from {
            return Err(WalkError::config(format!(
                "step phase {:?} cannot follow {:?}",
                to, self.phase
            )));
        }
        self.phase = to;
        Ok(())
    }

    fn initialise_states(&mut self) -> Result<()> {
        let latches: Vec<Operation> = self
            .boundary_controls
            .iter()
            .zip(&self.control_registers)
            .flat_map(|(control, registers)| control.preparation(registers.control.as_ref()))
            .collect();
        self.circuit.add_operations(latches)?;
        let Some(states) = self.initial_states.clone() else {
            return Ok(());
        };
        for (d, state) in states.iter().enumerate() {
            let register = self.dimension_register(d)?.clone();
            for (wire, bit) in crate::core::bits::wire_bits(state).into_iter().enumerate() {
                if bit {
                    self.circuit
                        .add_operation(Operation::Gate(Gate::new(GateKind::Flip, register.qubit(wire))))?;
                }
            }
        }
        Ok(())
    }

    /// Idle → Coined.
    pub fn add_coins(&mut self) -> Result<()> {
        self.advance(StepPhase::Idle, StepPhase::Coined)?;
        let coin = self.coin_register()?.qubits();
        self.circuit.append(&self.shift_coin, &coin)?;
        for (control, registers) in self.boundary_controls.iter().zip(&self.control_registers) {
            if let (Some(op), Some(register)) = (control.permeability_operator(), &registers.control) {
                self.circuit.append(op, &register.qubits())?;
            }
        }
        self.circuit.barrier();
        debug!(step = self.steps, "Coins applied");
        Ok(())
    }

    /// Appends the gate block of `boundary` under boundary control `index`.
    pub fn apply_boundary(&mut self, index: usize, boundary: &Boundary) -> Result<()> {
        let control = self
            .boundary_controls
            .get(index)
            .ok_or_else(|| WalkError::config(format!("no boundary control {}", index)))?;
        let registers = self
            .control_registers
            .get(index)
            .ok_or_else(|| WalkError::config(format!("no registers for boundary control {}", index)))?;
        let wiring = BoundaryWiring {
            dimension: self.dimension_register(boundary.dimension())?,
            coin: self.coin_register()?,
            control: registers.control.as_ref(),
            ancilla: registers.ancilla.as_ref(),
        };
        let ops = control.gate_block(boundary, &self.shift_coin, wiring)?;
        self.circuit.add_operations(ops)
    }

    /// Coined → Bounded.
    pub fn apply_boundaries(&mut self) -> Result<()> {
        self.advance(StepPhase::Coined, StepPhase::Bounded)?;
        for index in 0..self.boundary_controls.len() {
            let boundaries = self.boundary_controls[index].boundaries().to_vec();
            for boundary in &boundaries {
                self.apply_boundary(index, boundary)?;
            }
        }
        self.circuit.barrier();
        Ok(())
    }

    /// Unconditioned (coin all ones) −1 ripple on `dimension`.
    pub fn add_left_shift(&mut self, dimension: usize) -> Result<()> {
        let ops = shift::ripple(ShiftDirection::Left, self.coin_register()?, self.dimension_register(dimension)?);
        self.circuit.add_operations(ops)
    }

    /// Unconditioned (coin all ones) +1 ripple on `dimension`.
    pub fn add_right_shift(&mut self, dimension: usize) -> Result<()> {
        let ops = shift::ripple(ShiftDirection::Right, self.coin_register()?, self.dimension_register(dimension)?);
        self.circuit.add_operations(ops)
    }

    /// Appends a shift that fires only on coin value `coin_bitstring`.
    pub fn wrap_shift(&mut self, direction: ShiftDirection, coin_bitstring: &str, dimension: usize) -> Result<()> {
        let coin = self.coin_register()?;
        let shift = shift::ripple(direction, coin, self.dimension_register(dimension)?);
        let ops = shift::wrap(coin, coin_bitstring, shift)?;
        self.circuit.add_operations(ops)
    }

    /// Bounded → Shifted.
    pub fn add_shifts(&mut self) -> Result<()> {
        self.advance(StepPhase::Bounded, StepPhase::Shifted)?;
        for pattern in self.move_patterns.clone() {
            self.wrap_shift(ShiftDirection::Left, &pattern.left, pattern.dimension)?;
            self.wrap_shift(ShiftDirection::Right, &pattern.right, pattern.dimension)?;
        }
        Ok(())
    }

    /// Shifted → Reset → Idle.
    pub fn reset_boundaries(&mut self) -> Result<()> {
        self.advance(StepPhase::Shifted, StepPhase::Reset)?;
        let mut script = Vec::new();
        for (control, registers) in self.boundary_controls.iter().zip(&self.control_registers) {
            script.extend(control.reset_script(registers.control.as_ref(), registers.ancilla.as_ref()));
        }
        self.circuit.add_operations(script)?;
        self.phase = StepPhase::Idle;
        Ok(())
    }

    fn apply_decoherence(&mut self) -> Result<()> {
        let Some(cycle) = &self.decoherence else {
            return Ok(());
        };
        if self.steps % cycle.cycle_length != 0 || cycle.target_qubits.is_empty() {
            return Ok(());
        }
        let coin = self.coin_register()?;
        let targets: Vec<QubitId> = cycle.target_qubits.iter().map(|q| coin.qubit(*q)).collect();
        debug!(step = self.steps, targets = targets.len(), "Coin decoherence reset");
        self.circuit.add_operation(Operation::Reset { targets })
    }

    /// Appends one full walk step.
    pub fn step(&mut self) -> Result<()> {
        self.add_coins()?;
        self.apply_boundaries()?;
        self.add_shifts()?;
        self.reset_boundaries()?;
        self.steps += 1;
        self.apply_decoherence()?;
        self.results = None;
        Ok(())
    }

    /// Appends `n_steps` steps without rebuilding the buffer.
    pub fn add_n_steps(&mut self, n_steps: usize) -> Result<()> {
        for _ in 0..n_steps {
            self.step()?;
        }
        debug!(steps = self.steps, ops = self.circuit.len(), "Steps appended");
        Ok(())
    }

    /// Discards every appended operation and re-prepares the initial state.
    pub fn reset_circuit(&mut self) -> Result<()> {
        self.circuit.clear();
        self.phase = StepPhase::Idle;
        self.steps = 0;
        self.results = None;
        self.initialise_states()
    }

    pub fn decoder(&self) -> ResultDecoder {
        ResultDecoder::from_layout(&self.layout)
    }

    /// Runs the buffer on `backend` and returns the raw histogram.
    pub fn execute<B: Backend + ?Sized>(&self, backend: &mut B, shots: u64) -> Result<MeasurementHistogram> {
        info!(steps = self.steps, ops = self.circuit.len(), shots, "Executing walk program");
        backend.execute(&self.circuit, shots)
    }

    /// Runs the buffer, decodes the histogram and caches the tensor.
    pub fn get_results<B: Backend + ?Sized>(&mut self, backend: &mut B, shots: u64) -> Result<&DisplacementTensor> {
        let histogram = self.execute(backend, shots)?;
        let tensor = self.decoder().decode(&histogram, shots)?;
        check_tensor(&tensor, &self.system_dimensions, Some(1e-9))?;
        let cached: &DisplacementTensor = self.results.insert(tensor);
        Ok(cached)
    }

    /// Rebuilds the buffer, appends `n_steps` steps and decodes the outcome.
    pub fn run_experiment<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        n_steps: usize,
        shots: u64,
    ) -> Result<DisplacementTensor> {
        self.reset_circuit()?;
        self.add_n_steps(n_steps)?;
        self.get_results(backend, shots).cloned()
    }

    /// Statistics of the cached results, executing first when there are none
    /// or `force_rerun` is set.
    pub fn statistics<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        shots: u64,
        force_rerun: bool,
    ) -> Result<StatisticsBundle> {
        if force_rerun || self.results.is_none() {
            self.get_results(backend, shots)?;
        }
        let tensor = self
            .results
            .as_ref()
            .ok_or_else(|| WalkError::simulation("no results after execution"))?;
        Ok(StatisticsBundle::from_tensor(tensor))
    }

    /// Covariance matrix of the per-dimension displacements.
    pub fn covariance_tensor<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        shots: u64,
        force_rerun: bool,
    ) -> Result<Vec<Vec<f64>>> {
        Ok(self.statistics(backend, shots, force_rerun)?.covariance)
    }
}
