// src/boundaries/geometry.rs

use crate::core::bits::{binary_step_down, binary_step_up, ones, zeros};
use crate::core::{Result, WalkError};
use std::str::FromStr;

/// Which lattice edges of a dimension get a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeGeometry {
    /// Both the lowest and highest position.
    Edges,
    LeftEdge,
    RightEdge,
}

impl FromStr for EdgeGeometry {
    type Err = WalkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Edges" => Ok(EdgeGeometry::Edges),
            "LeftEdge" => Ok(EdgeGeometry::LeftEdge),
            "RightEdge" => Ok(EdgeGeometry::RightEdge),
            other => Err(WalkError::config(format!(
                "geometry '{}' should be one of 'RightEdge', 'LeftEdge', 'Edges'",
                other
            ))),
        }
    }
}

/// Generates boundary bitstrings for simple lattice geometries.
pub struct BoundaryGenerator;

impl BoundaryGenerator {
    /// Edge positions of an `n_qubits`-wide dimension, each moved `padding`
    /// sites inward (left edges step up, right edges step down).
    ///
    /// # Errors
    /// `WalkError::Configuration` if `padding` reaches the centre of the
    /// lattice (`padding >= 2^(n_qubits-1)`) or `n_qubits` is zero.
    pub fn edge_bitstrings(geometry: EdgeGeometry, n_qubits: usize, padding: u64) -> Result<Vec<String>> {
        if n_qubits == 0 {
            return Err(WalkError::config("cannot place edges on a zero-width dimension"));
        }
        let centre = 1u64.checked_shl((n_qubits - 1) as u32).unwrap_or(u64::MAX);
        if padding >= centre {
            return Err(WalkError::config(format!(
                "padding {} must not exceed the centre of the volume ({})",
                padding, centre
            )));
        }

        let left = || {
            let mut edge = zeros(n_qubits);
            for _ in 0..padding {
                edge = binary_step_up(&edge);
            }
            edge
        };
        let right = || {
            let mut edge = ones(n_qubits);
            for _ in 0..padding {
                edge = binary_step_down(&edge);
            }
            edge
        };

        Ok(match geometry {
            EdgeGeometry::Edges => vec![left(), right()],
            EdgeGeometry::LeftEdge => vec![left()],
            EdgeGeometry::RightEdge => vec![right()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_without_padding() -> Result<()> {
        let edges = BoundaryGenerator::edge_bitstrings(EdgeGeometry::Edges, 3, 0)?;
        assert_eq!(edges, vec!["000".to_string(), "111".to_string()]);
        Ok(())
    }

    #[test]
    fn test_padding_moves_edges_inward() -> Result<()> {
        let edges = BoundaryGenerator::edge_bitstrings(EdgeGeometry::Edges, 3, 2)?;
        assert_eq!(edges, vec!["010".to_string(), "101".to_string()]);
        let right = BoundaryGenerator::edge_bitstrings("RightEdge".parse()?, 4, 1)?;
        assert_eq!(right, vec!["1110".to_string()]);
        Ok(())
    }

    #[test]
    fn test_padding_past_centre_rejected() {
        assert!(BoundaryGenerator::edge_bitstrings(EdgeGeometry::LeftEdge, 3, 3).is_ok());
        assert!(matches!(
            BoundaryGenerator::edge_bitstrings(EdgeGeometry::LeftEdge, 3, 4),
            Err(WalkError::Configuration { .. })
        ));
        assert!("Corners".parse::<EdgeGeometry>().is_err());
    }
}
