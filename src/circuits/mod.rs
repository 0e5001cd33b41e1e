// src/circuits/mod.rs

//! Defines the program buffer a walk is compiled into.
//!
//! A [`Circuit`] is an ordered list of [`Operation`]s over the wires of one
//! frozen [`RegisterLayout`]. The walk compiler is its only writer; backends
//! only ever read it.

use crate::core::{QubitId, RegisterLayout, Result, WalkError};
use crate::operations::Operation;
use crate::operators::ReversibleOperator;
use std::fmt;

/// An ordered sequence of operations over a fixed register layout.
///
/// The order is the execution order. Wire indices of every operation lie
/// inside `0..layout.width()`.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    layout: RegisterLayout,
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates a new, empty circuit over `layout`.
    pub fn new(layout: RegisterLayout) -> Self {
        Self { layout, operations: Vec::new() }
    }

    pub fn layout(&self) -> &RegisterLayout {
        &self.layout
    }

    /// Total number of wires.
    pub fn width(&self) -> usize {
        self.layout.width()
    }

    fn check_wires(&self, op: &Operation) -> Result<()> {
        match op.involved_qubits().into_iter().find(|q| q.0 >= self.layout.width()) {
            Some(QubitId(wire)) => Err(WalkError::config(format!(
                "operation '{}' touches wire {} outside a {}-wire circuit",
                op,
                wire,
                self.layout.width()
            ))),
            None => Ok(()),
        }
    }

    /// Adds a single operation to the end of the sequence.
    ///
    /// # Errors
    /// `WalkError::Configuration` if the operation touches a wire outside the layout.
    pub fn add_operation(&mut self, op: Operation) -> Result<()> {
        self.check_wires(&op)?;
        self.operations.push(op);
        Ok(())
    }

    /// Adds multiple operations, stopping at the first invalid one.
    pub fn add_operations<I>(&mut self, ops: I) -> Result<()>
    where
        I: IntoIterator<Item = Operation>,
    {
        for op in ops {
            self.add_operation(op)?;
        }
        Ok(())
    }

    /// Binds `operator` to `wires` and appends it.
    pub fn append(&mut self, operator: &ReversibleOperator, wires: &[QubitId]) -> Result<()> {
        let op = operator.bind(wires)?;
        self.add_operation(op)
    }

    pub fn barrier(&mut self) {
        self.operations.push(Operation::Barrier);
    }

    /// Returns a slice containing the ordered sequence of operations.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Whether any operation is a mid-circuit reset.
    pub fn has_resets(&self) -> bool {
        self.operations.iter().any(|op| matches!(op, Operation::Reset { .. }))
    }

    /// Number of primitive gates after expanding every operator.
    pub fn gate_count(&self) -> usize {
        self.operations.iter().map(|op| op.gates().len()).sum()
    }

    /// Drops every operation, keeping the layout.
    pub fn clear(&mut self) {
        self.operations.clear();
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// Builds a [`Circuit`] by method chaining.
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    pub fn new(layout: RegisterLayout) -> Self {
        Self { circuit: Circuit::new(layout) }
    }

    pub fn add_op(mut self, op: Operation) -> Result<Self> {
        self.circuit.add_operation(op)?;
        Ok(self)
    }

    pub fn add_ops<I>(mut self, ops: I) -> Result<Self>
    where
        I: IntoIterator<Item = Operation>,
    {
        self.circuit.add_operations(ops)?;
        Ok(self)
    }

    pub fn append(mut self, operator: &ReversibleOperator, wires: &[QubitId]) -> Result<Self> {
        self.circuit.append(operator, wires)?;
        Ok(self)
    }

    pub fn build(self) -> Circuit {
        self.circuit
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "qwalk::Circuit[{} operations, {} gates on {} wires]",
            self.operations.len(),
            self.gate_count(),
            self.layout.width()
        )?;
        for register in self.layout.registers() {
            writeln!(f, "  reg {}", register)?;
        }
        let index_width = self.operations.len().to_string().len();
        for (t, op) in self.operations.iter().enumerate() {
            if matches!(op, Operation::Barrier) {
                writeln!(f, "  {:>width$} ----", t, width = index_width)?;
            } else {
                writeln!(f, "  {:>width$} {}", t, op, width = index_width)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
