// src/walk/shift.rs

//! Ripple shift construction and the coin patterns that select each move.
//!
//! A shift on a `w`-wire position register is a cascade of `w` flips, each
//! controlled by the whole coin register plus the position wires below it.
//! Processing wires from the bottom up subtracts one (modulo `2^w`), from the
//! top down adds one. Either cascade fires only when the coin is all ones, so
//! [`wrap`] conjugates it with flips to select one coin value.

use crate::core::bits::{to_bitstring, validate_width, wire_bits};
use crate::core::{QubitId, Register, Result, WalkError};
use crate::operations::{Gate, GateKind, Operation};

/// Direction of a ripple shift along one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftDirection {
    /// Toward lower index (−1).
    Left,
    /// Toward higher index (+1).
    Right,
}

fn cascade_gate(coin: &Register, position: &Register, idx: usize) -> Operation {
    let controls: Vec<QubitId> = coin.qubits().into_iter().chain((0..idx).map(|i| position.qubit(i))).collect();
    Operation::Gate(Gate::controlled(GateKind::Flip, &controls, position.qubit(idx)))
}

/// The cascade for `direction`, followed by a barrier.
pub fn ripple(direction: ShiftDirection, coin: &Register, position: &Register) -> Vec<Operation> {
    let order: Vec<usize> = match direction {
        ShiftDirection::Left => (0..position.width()).collect(),
        ShiftDirection::Right => (0..position.width()).rev().collect(),
    };
    order
        .into_iter()
        .map(|idx| cascade_gate(coin, position, idx))
        .chain(std::iter::once(Operation::Barrier))
        .collect()
}

/// Restricts `shift` to the coin basis state `coin_bitstring`.
///
/// # Errors
/// `WalkError::Configuration` if the pattern does not match the coin width.
pub fn wrap(coin: &Register, coin_bitstring: &str, shift: Vec<Operation>) -> Result<Vec<Operation>> {
    validate_width(coin_bitstring, coin.width(), "coin bitstring")?;
    let flips: Vec<Operation> = wire_bits(coin_bitstring)
        .into_iter()
        .enumerate()
        .filter(|(_, bit)| !bit)
        .map(|(wire, _)| Operation::Gate(Gate::new(GateKind::Flip, coin.qubit(wire))))
        .collect();

    let mut ops = Vec::with_capacity(2 * flips.len() + shift.len() + 1);
    ops.extend(flips.iter().cloned());
    ops.extend(shift);
    ops.extend(flips);
    ops.push(Operation::Barrier);
    Ok(ops)
}

/// The two coin values that move one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePattern {
    pub dimension: usize,
    pub left: String,
    pub right: String,
}

/// Move patterns for `n_dims` dimensions on a `coin_width`-wire coin.
///
/// Dimension `d` moves right on coin value `d` and left on `2^(c-1) + d`, so
/// the most significant coin bit is the direction and
/// [`direction_reversal`](crate::operators::ReversibleOperator::direction_reversal)
/// swaps the two moves of every dimension.
///
/// # Errors
/// `WalkError::Configuration` if the coin has fewer than `2 * n_dims` values.
pub fn move_patterns(n_dims: usize, coin_width: usize) -> Result<Vec<MovePattern>> {
    let half = coin_width
        .checked_sub(1)
        .and_then(|e| 1u64.checked_shl(e as u32))
        .ok_or_else(|| WalkError::config("the shift coin needs at least one qubit"))?;
    if (n_dims as u64) > half {
        return Err(WalkError::config(format!(
            "a {}-qubit coin cannot encode {} move directions",
            coin_width,
            2 * n_dims
        )));
    }
    Ok((0..n_dims)
        .map(|d| MovePattern {
            dimension: d,
            left: to_bitstring(half + d as u64, coin_width),
            right: to_bitstring(d as u64, coin_width),
        })
        .collect())
}

/// `max(1, ceil(log2(2 * n_dims)))`.
pub fn default_coin_width(n_dims: usize) -> usize {
    let directions = (2 * n_dims).max(2);
    (usize::BITS - (directions - 1).leading_zeros()) as usize
}
