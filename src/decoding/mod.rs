// src/decoding/mod.rs

//! Turns measurement histograms into lattice coordinates.
//!
//! Dimension registers are allocated first, so every histogram key starts
//! with the state bits. Decoding truncates each key to that prefix, merges
//! the counts of keys that agree on it, and reads each dimension's slice as
//! an unsigned integer.

mod stats;

pub use stats::StatisticsBundle;

use crate::core::bits::{parse_unsigned, validate_bitstring};
use crate::core::{DimensionSpan, RegisterLayout, Result, WalkError};
use crate::simulation::MeasurementHistogram;
use crate::validation::check_count_conservation;
use tracing::debug;

/// Decoded walk outcome: one coordinate sequence per dimension and an
/// index-aligned probability density.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementTensor {
    dimensions: Vec<Vec<u64>>,
    probability_density: Vec<f64>,
    shots: u64,
}

impl DisplacementTensor {
    /// Number of lattice dimensions.
    pub fn n_dimensions(&self) -> usize {
        self.dimensions.len()
    }

    /// Number of distinct lattice points observed.
    pub fn len(&self) -> usize {
        self.probability_density.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probability_density.is_empty()
    }

    pub fn dimension(&self, dimension: usize) -> Option<&[u64]> {
        self.dimensions.get(dimension).map(Vec::as_slice)
    }

    pub fn dimensions(&self) -> &[Vec<u64>] {
        &self.dimensions
    }

    pub fn probability_density(&self) -> &[f64] {
        &self.probability_density
    }

    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// The coordinates of row `row`, one per dimension.
    pub fn point(&self, row: usize) -> Option<Vec<u64>> {
        self.dimensions.iter().map(|d| d.get(row).copied()).collect()
    }

    /// Density at the lattice point `coords`, zero if never observed.
    pub fn density_at(&self, coords: &[u64]) -> f64 {
        (0..self.len())
            .find(|row| self.point(*row).as_deref() == Some(coords))
            .map_or(0.0, |row| self.probability_density[row])
    }

    pub fn total_probability(&self) -> f64 {
        self.probability_density.iter().sum()
    }
}

/// Decodes histograms produced under one register layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDecoder {
    spans: Vec<DimensionSpan>,
    state_bits: usize,
}

impl ResultDecoder {
    pub fn from_layout(layout: &RegisterLayout) -> Self {
        let (spans, last) = layout.state_register_indices();
        Self { spans, state_bits: last.map_or(0, |l| l + 1) }
    }

    pub fn spans(&self) -> &[DimensionSpan] {
        &self.spans
    }

    /// Length of the state-bit prefix of every key.
    pub fn state_bits(&self) -> usize {
        self.state_bits
    }

    /// Truncates every key to its state bits and sums the counts of keys that
    /// become equal. Applying it twice changes nothing.
    ///
    /// # Errors
    /// `WalkError::Configuration` for a key that is not a bitstring or is
    /// shorter than the state prefix.
    pub fn discard_non_state_bits(&self, histogram: &MeasurementHistogram) -> Result<MeasurementHistogram> {
        let mut merged = MeasurementHistogram::new(histogram.shots());
        for (key, count) in histogram.iter() {
            validate_bitstring(key)?;
            let prefix = key.get(..self.state_bits).ok_or_else(|| {
                WalkError::config(format!(
                    "histogram key '{}' is shorter than the {} state bits",
                    key, self.state_bits
                ))
            })?;
            merged.record(prefix, count);
        }
        Ok(merged)
    }

    /// Decodes `histogram`, normalising counts by `shots`.
    ///
    /// # Errors
    /// `WalkError::Configuration` for zero shots, short keys or keys that are
    /// not bitstrings.
    pub fn decode(&self, histogram: &MeasurementHistogram, shots: u64) -> Result<DisplacementTensor> {
        if shots == 0 {
            return Err(WalkError::config("cannot normalise a histogram over zero shots"));
        }
        let merged = self.discard_non_state_bits(histogram)?;
        check_count_conservation(histogram, &merged)?;
        let mut dimensions = vec![Vec::with_capacity(merged.len()); self.spans.len()];
        let mut probability_density = Vec::with_capacity(merged.len());
        for (key, count) in merged.iter() {
            for (column, span) in dimensions.iter_mut().zip(&self.spans) {
                let slice = key.get(span.start_idx..=span.end_idx).ok_or_else(|| {
                    WalkError::config(format!("key '{}' does not cover dimension {}", key, span.dimension))
                })?;
                column.push(parse_unsigned(slice)?);
            }
            probability_density.push(count as f64 / shots as f64);
        }
        debug!(raw = histogram.len(), merged = merged.len(), shots, "Decoded histogram");
        Ok(DisplacementTensor { dimensions, probability_density, shots })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RegisterAllocator, RegisterRole};
    use approx::assert_relative_eq;

    fn decoder() -> Result<ResultDecoder> {
        let mut alloc = RegisterAllocator::new();
        alloc.allocate("dimension0", RegisterRole::Dimension(0), 2)?;
        alloc.allocate("dimension1", RegisterRole::Dimension(1), 3)?;
        alloc.allocate("coin", RegisterRole::Coin, 2)?;
        Ok(ResultDecoder::from_layout(&alloc.finish()))
    }

    #[test]
    fn test_merge_drops_coin_bits() -> Result<()> {
        let decoder = decoder()?;
        assert_eq!(decoder.state_bits(), 5);
        let histogram = MeasurementHistogram::from_counts([("1010100", 3), ("1010111", 5), ("0000000", 2)]);
        let merged = decoder.discard_non_state_bits(&histogram)?;
        assert_eq!(merged.get("10101"), Some(8));
        assert_eq!(merged.get("00000"), Some(2));
        assert_eq!(decoder.discard_non_state_bits(&merged)?, merged);
        Ok(())
    }

    #[test]
    fn test_decode_coordinates() -> Result<()> {
        let decoder = decoder()?;
        let histogram = MeasurementHistogram::from_counts([("1010100", 3), ("0111111", 1)]);
        let tensor = decoder.decode(&histogram, 4)?;
        assert_eq!(tensor.n_dimensions(), 2);
        assert_relative_eq!(tensor.density_at(&[2, 5]), 0.75);
        assert_relative_eq!(tensor.density_at(&[1, 7]), 0.25);
        assert_relative_eq!(tensor.density_at(&[0, 0]), 0.0);
        assert_relative_eq!(tensor.total_probability(), 1.0);
        Ok(())
    }

    #[test]
    fn test_decode_errors() -> Result<()> {
        let decoder = decoder()?;
        let histogram = MeasurementHistogram::from_counts([("10", 1)]);
        assert!(decoder.decode(&histogram, 1).is_err());
        assert!(decoder.decode(&MeasurementHistogram::new(0), 0).is_err());
        Ok(())
    }

    #[test]
    fn test_decode_rejects_non_binary_keys() -> Result<()> {
        let decoder = decoder()?;
        for key in ["0é00000", "01a0100", "1010 00"] {
            let histogram = MeasurementHistogram::from_counts([(key, 1)]);
            assert!(matches!(decoder.decode(&histogram, 1), Err(WalkError::Configuration { .. })), "{}", key);
        }
        Ok(())
    }
}
