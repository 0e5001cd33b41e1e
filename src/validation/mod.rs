// src/validation/mod.rs

//! Consistency checks on simulated states, histograms and decoded tensors.

use crate::core::{Result, StateVector, WalkError};
use crate::decoding::DisplacementTensor;
use crate::simulation::MeasurementHistogram;

// Default tolerance values (can be overridden by caller)
const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;

/// Checks if the state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Errors
/// `WalkError::Simulation` if the norm deviates by more than `tolerance`
/// (default `1e-9`).
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq: f64 = state.vector().iter().map(|c| c.norm_sqr()).sum();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        return Err(WalkError::simulation(format!(
            "State vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
            norm_sq, effective_tolerance
        )));
    }
    Ok(())
}

/// Checks that merging kept every count: both totals agree, and equal the
/// shot count when the raw histogram is complete.
pub fn check_count_conservation(raw: &MeasurementHistogram, merged: &MeasurementHistogram) -> Result<()> {
    let (before, after) = (raw.total(), merged.total());
    if before != after {
        return Err(WalkError::simulation(format!(
            "merging changed the total count from {} to {}",
            before, after
        )));
    }
    if raw.shots() != 0 && before != raw.shots() {
        return Err(WalkError::simulation(format!(
            "histogram holds {} counts for {} shots",
            before,
            raw.shots()
        )));
    }
    Ok(())
}

/// Checks that every decoded coordinate fits its register and the density
/// sums to one.
pub fn check_tensor(tensor: &DisplacementTensor, widths: &[usize], tolerance: Option<f64>) -> Result<()> {
    for (d, column) in tensor.dimensions().iter().enumerate() {
        let width = widths.get(d).copied().unwrap_or(0);
        let max = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
        if let Some(x) = column.iter().find(|x| **x > max) {
            return Err(WalkError::simulation(format!(
                "dimension {} coordinate {} exceeds its {}-bit register",
                d, x, width
            )));
        }
    }
    let total = tensor.total_probability();
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    if !tensor.is_empty() && (total - 1.0).abs() > effective_tolerance {
        return Err(WalkError::simulation(format!("probability density sums to {}", total)));
    }
    Ok(())
}
