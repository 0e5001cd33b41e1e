// src/boundaries/parse.rs

//! Boundary specification strings: `type-dimension-bitstring-class-n`.
//!
//! `hard-0-1111--` is a reflecting wall, `soft-1-0001-Grover-2` a permeable
//! boundary controlled by a two-qubit Grover coin. Accepted types are
//! `hard`/`h`, `soft`/`s`, `oneway`/`o` and `absorbing`/`a`.

use super::{Boundary, BoundaryControl, BoundaryKind};
use crate::config::{CoinFamily, CoinParams, FallbackPolicy};
use crate::core::constants::walk_constants::DEFAULT_CYCLE_BITS;
use crate::core::{Result, WalkError};
use std::str::FromStr;
use tracing::debug;

/// One parsed boundary string.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySpec {
    kind: BoundaryKind,
    boundary: Boundary,
    control_class: String,
    n_control_qubits: usize,
}

impl BoundarySpec {
    pub fn kind(&self) -> BoundaryKind {
        self.kind
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn control_class(&self) -> &str {
        &self.control_class
    }

    pub fn n_control_qubits(&self) -> usize {
        self.n_control_qubits
    }

    /// Boundaries with equal codes share one [`BoundaryControl`].
    pub fn control_code(&self) -> String {
        match self.kind {
            BoundaryKind::Hard => "N-0".to_string(),
            BoundaryKind::Permeable => format!("{}-{}", self.control_class, self.n_control_qubits),
            BoundaryKind::OneWay => format!("oneway-{}", self.n_control_qubits),
            BoundaryKind::Absorbing => format!("absorbing-{}", self.n_control_qubits),
        }
    }
}

fn parse_count(field: &str, default: usize, source: &str) -> Result<usize> {
    if field.is_empty() {
        return Ok(default);
    }
    field
        .parse()
        .map_err(|_| WalkError::config(format!("control qubit count '{}' in '{}' is not a number", field, source)))
}

impl FromStr for BoundarySpec {
    type Err = WalkError;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.trim().split('-').collect();
        if !(3..=5).contains(&fields.len()) {
            return Err(WalkError::config(format!(
                "boundary '{}' should look like type-dimension-bitstring-class-n",
                s
            )));
        }
        let field = |i: usize| fields.get(i).copied().unwrap_or("").trim();

        let dimension: usize = field(1)
            .parse()
            .map_err(|_| WalkError::config(format!("boundary dimension '{}' in '{}' is not an index", field(1), s)))?;
        let boundary = Boundary::new(field(2), dimension, None)?;
        let class = field(3);

        let (kind, n_control_qubits) = match field(0).to_lowercase().as_str() {
            "h" | "hard" => (BoundaryKind::Hard, 0),
            "s" | "soft" => (BoundaryKind::Permeable, parse_count(field(4), 1, s)?),
            "o" | "oneway" => (BoundaryKind::OneWay, parse_count(field(4), DEFAULT_CYCLE_BITS, s)?),
            "a" | "absorbing" => (BoundaryKind::Absorbing, parse_count(field(4), 1, s)?),
            other => return Err(WalkError::config(format!("unrecognised boundary type '{}' in '{}'", other, s))),
        };
        if matches!(kind, BoundaryKind::OneWay | BoundaryKind::Absorbing)
            && !(class.is_empty() || (kind == BoundaryKind::OneWay && class == "Cyclic_controller"))
        {
            return Err(WalkError::config(format!(
                "{:?} boundaries have a fixed control operator, got class '{}' in '{}'",
                kind, class, s
            )));
        }
        if kind != BoundaryKind::Hard && n_control_qubits == 0 {
            return Err(WalkError::config(format!("boundary '{}' needs at least one control qubit", s)));
        }

        Ok(Self { kind, boundary, control_class: class.to_string(), n_control_qubits })
    }
}

fn control_for(spec: &BoundarySpec, policy: FallbackPolicy) -> Result<BoundaryControl> {
    let n = spec.n_control_qubits;
    match spec.kind {
        BoundaryKind::Hard => Ok(BoundaryControl::hard()),
        BoundaryKind::OneWay => BoundaryControl::one_way(n),
        BoundaryKind::Absorbing => BoundaryControl::absorbing(n),
        BoundaryKind::Permeable => match policy.resolve(&spec.control_class) {
            CoinFamily::CyclicController => BoundaryControl::one_way(n),
            family => Ok(match family.build(n, &CoinParams::new())? {
                Some(ctrl) => BoundaryControl::permeable(ctrl),
                None => BoundaryControl::hard(),
            }),
        },
    }
}

/// Groups parsed boundaries by control code, in first-seen order, and builds
/// one [`BoundaryControl`] per group.
pub fn build_boundary_controls(specs: &[BoundarySpec], policy: FallbackPolicy) -> Result<Vec<BoundaryControl>> {
    let mut groups: Vec<(String, BoundaryControl)> = Vec::new();
    for spec in specs {
        let code = spec.control_code();
        match groups.iter_mut().find(|(c, _)| *c == code) {
            Some((_, control)) => control.add_boundary(spec.boundary.clone()),
            None => {
                let mut control = control_for(spec, policy)?;
                control.add_boundary(spec.boundary.clone());
                debug!(code = %code, kind = ?control.kind(), "New boundary control group");
                groups.push((code, control));
            }
        }
    }
    Ok(groups.into_iter().map(|(_, control)| control).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::OperatorFamily;

    #[test]
    fn test_hard_spec() -> Result<()> {
        let spec: BoundarySpec = "hard-0-1111--".parse()?;
        assert_eq!(spec.kind(), BoundaryKind::Hard);
        assert_eq!(spec.boundary().dimension(), 0);
        assert_eq!(spec.boundary().bitstring(), "1111");
        let controls = build_boundary_controls(&[spec], FallbackPolicy::default())?;
        assert_eq!(controls[0].ctrl_size(), 0);
        Ok(())
    }

    #[test]
    fn test_soft_grover_spec() -> Result<()> {
        let spec: BoundarySpec = "soft-1-0001-Grover-2".parse()?;
        assert_eq!(spec.kind(), BoundaryKind::Permeable);
        let controls = build_boundary_controls(&[spec], FallbackPolicy::default())?;
        let ctrl = controls[0].ctrl().expect("permeable control");
        assert_eq!(ctrl.family(), &OperatorFamily::Diffusion);
        assert_eq!(ctrl.n_qubits(), 2);
        Ok(())
    }

    #[test]
    fn test_soft_without_count_defaults_to_one() -> Result<()> {
        let spec: BoundarySpec = "s-0-01-H".parse()?;
        assert_eq!(spec.n_control_qubits(), 1);
        assert_eq!(spec.control_code(), "H-1");
        Ok(())
    }

    #[test]
    fn test_grouping_by_control_code() -> Result<()> {
        let specs: Vec<BoundarySpec> = ["h-0-000--", "h-0-111--", "s-1-00-G-2", "s-1-11-G-2", "s-1-01-G-1"]
            .iter()
            .map(|s| s.parse())
            .collect::<Result<_>>()?;
        let controls = build_boundary_controls(&specs, FallbackPolicy::default())?;
        assert_eq!(controls.len(), 3);
        assert_eq!(controls[0].boundaries().len(), 2);
        assert_eq!(controls[1].boundaries().len(), 2);
        assert_eq!(controls[2].ctrl_size(), 1);
        Ok(())
    }

    #[test]
    fn test_unknown_class_follows_policy() -> Result<()> {
        let spec: BoundarySpec = "soft-0-11-Mystery-2".parse()?;
        let basis = build_boundary_controls(std::slice::from_ref(&spec), FallbackPolicy::BasisRotation)?;
        assert_eq!(basis[0].ctrl().map(|c| c.family().clone()), Some(OperatorFamily::Rotation));
        let none = build_boundary_controls(&[spec], FallbackPolicy::NoControl)?;
        assert_eq!(none[0].kind(), BoundaryKind::Hard);
        Ok(())
    }

    #[test]
    fn test_oneway_and_absorbing_specs() -> Result<()> {
        let valve: BoundarySpec = "oneway-0-010--".parse()?;
        assert_eq!(valve.n_control_qubits(), DEFAULT_CYCLE_BITS);
        let sink: BoundarySpec = "a-0-000--2".parse()?;
        let controls = build_boundary_controls(&[valve, sink], FallbackPolicy::default())?;
        assert_eq!(controls[0].kind(), BoundaryKind::OneWay);
        assert_eq!(controls[1].kind(), BoundaryKind::Absorbing);
        assert!(!controls[1].resets_register());
        Ok(())
    }

    #[test]
    fn test_malformed_specs() {
        for bad in ["wall-0-11--", "hard-x-11--", "hard-0", "soft-0-12-H-1", "soft-0-11-H-many", "a-0-11-G-1"] {
            assert!(bad.parse::<BoundarySpec>().is_err(), "{} should be rejected", bad);
        }
    }
}
