// src/core/state.rs

use super::error::{Result, WalkError};
use num_complex::Complex;
use num_traits::Zero;
use std::fmt;

/// Amplitudes of a full walk program's wires, as held by the local backend.
///
/// Basis index bit `q` is the value of wire `q`; the vector has `2^n` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    amplitudes: Vec<Complex<f64>>,
    num_qubits: usize,
}

impl StateVector {
    /// The all-zeros basis state on `num_qubits` wires.
    pub fn zero_state(num_qubits: usize) -> Result<Self> {
        let dim = 1usize.checked_shl(num_qubits as u32).filter(|d| *d > 0).ok_or_else(|| {
            WalkError::simulation(format!(
                "{} wires is too many, the state vector dimension overflows usize",
                num_qubits
            ))
        })?;
        let mut amplitudes = vec![Complex::zero(); dim];
        amplitudes[0] = Complex::new(1.0, 0.0);
        Ok(Self { amplitudes, num_qubits })
    }

    /// Wraps an explicit amplitude vector. Its length must be a power of two.
    pub fn from_amplitudes(amplitudes: Vec<Complex<f64>>) -> Result<Self> {
        if !amplitudes.len().is_power_of_two() {
            return Err(WalkError::simulation(format!(
                "state vector length {} is not a power of two",
                amplitudes.len()
            )));
        }
        let num_qubits = amplitudes.len().trailing_zeros() as usize;
        Ok(Self { amplitudes, num_qubits })
    }

    pub fn vector(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    pub(crate) fn vector_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.amplitudes
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Born-rule probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|c| c.norm_sqr()).collect()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}
