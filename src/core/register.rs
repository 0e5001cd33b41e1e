//! Named, non-overlapping wire ranges and the allocator that hands them out.

use super::error::{QubitId, Result, WalkError};
use std::fmt;

/// What a register is used for inside a walk program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterRole {
    /// Position register of spatial dimension `n`.
    Dimension(usize),
    /// The shared direction coin.
    Coin,
    /// Permeability control register of boundary control `n`.
    BoundaryControl(usize),
    /// Fixed-width ancilla of directional boundary control `n`.
    Ancilla(usize),
}

/// An ordered, named range of wires. Immutable once allocated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Register {
    name: String,
    role: RegisterRole,
    start: usize,
    width: usize,
}

impl Register {
    /// Register name as shown in program listings.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> RegisterRole {
        self.role
    }

    /// Index of the first wire; also the register's offset in a histogram key.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0
    }

    /// Wire `i` of this register (`i = 0` is the least significant bit).
    pub fn qubit(&self, i: usize) -> QubitId {
        debug_assert!(i < self.width, "wire {} outside register {}", i, self.name);
        QubitId(self.start + i)
    }

    /// All wires, least significant first.
    pub fn qubits(&self) -> Vec<QubitId> {
        (self.start..self.start + self.width).map(QubitId).collect()
    }

    /// The wire holding the most significant bit.
    pub fn most_significant(&self) -> Option<QubitId> {
        self.width.checked_sub(1).map(|i| self.qubit(i))
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}..{})", self.name, self.start, self.start + self.width)
    }
}

/// Hands out consecutive wire ranges so registers never overlap.
#[derive(Debug, Default)]
pub struct RegisterAllocator {
    registers: Vec<Register>,
    next: usize,
}

impl RegisterAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `width` wires under `name`. Names must be unique.
    pub fn allocate(&mut self, name: impl Into<String>, role: RegisterRole, width: usize) -> Result<Register> {
        let name = name.into();
        if self.registers.iter().any(|r| r.name == name) {
            return Err(WalkError::config(format!("register name '{}' allocated twice", name)));
        }
        let register = Register { name, role, start: self.next, width };
        self.next += width;
        self.registers.push(register.clone());
        Ok(register)
    }

    /// Freezes the allocation into a layout.
    pub fn finish(self) -> RegisterLayout {
        RegisterLayout { registers: self.registers, total_width: self.next }
    }
}

/// Start and end key offsets (inclusive) of one dimension register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionSpan {
    pub dimension: usize,
    pub start_idx: usize,
    pub end_idx: usize,
}

/// The complete, frozen register allocation of a walk program.
///
/// Histogram keys are written register by register in allocation order, each
/// register most-significant-first, so a register's key offset equals its
/// first wire index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterLayout {
    registers: Vec<Register>,
    total_width: usize,
}

impl RegisterLayout {
    /// Total circuit width: the sum of all register widths.
    pub fn width(&self) -> usize {
        self.total_width
    }

    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    pub fn find(&self, role: RegisterRole) -> Option<&Register> {
        self.registers.iter().find(|r| r.role == role)
    }

    pub fn dimension(&self, dimension: usize) -> Option<&Register> {
        self.find(RegisterRole::Dimension(dimension))
    }

    pub fn coin(&self) -> Option<&Register> {
        self.find(RegisterRole::Coin)
    }

    /// Dimension registers in dimension order.
    pub fn dimension_registers(&self) -> Vec<&Register> {
        let mut dims: Vec<(usize, &Register)> = self
            .registers
            .iter()
            .filter_map(|r| match r.role {
                RegisterRole::Dimension(d) => Some((d, r)),
                _ => None,
            })
            .collect();
        dims.sort_by_key(|(d, _)| *d);
        dims.into_iter().map(|(_, r)| r).collect()
    }

    /// Key spans of every dimension register and the index of the last state bit.
    pub fn state_register_indices(&self) -> (Vec<DimensionSpan>, Option<usize>) {
        let mut spans: Vec<DimensionSpan> = self
            .registers
            .iter()
            .filter(|r| !r.is_empty())
            .filter_map(|r| match r.role {
                RegisterRole::Dimension(dimension) => {
                    Some(DimensionSpan { dimension, start_idx: r.start, end_idx: r.start + r.width - 1 })
                }
                _ => None,
            })
            .collect();
        spans.sort_by_key(|span| span.dimension);
        let last = spans.iter().map(|s| s.end_idx).max();
        (spans, last)
    }

    /// Formats a basis-state index (bit `q` = wire `q`) as a histogram key.
    pub fn format_key(&self, basis_index: usize) -> String {
        let mut key = String::with_capacity(self.total_width);
        for register in &self.registers {
            for wire in (0..register.width).rev() {
                let bit = (basis_index >> (register.start + wire)) & 1;
                key.push(if bit == 1 { '1' } else { '0' });
            }
        }
        key
    }

    /// Memory needed to hold a full state vector of this width, in gigabytes.
    pub fn required_memory_gb(&self) -> f64 {
        1e-9 * 8.0 * 2f64.powi(self.total_width as i32)
    }
}
