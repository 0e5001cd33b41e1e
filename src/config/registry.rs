// src/config/registry.rs

use super::params::CoinParams;
use crate::core::Result;
use crate::operators::{KickbackVariant, ReversibleOperator};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The coin and control classes reachable by name from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinFamily {
    Hadamard,
    Flip,
    Grover,
    Dft,
    PhaseKickback,
    Kickback(KickbackVariant),
    Su2,
    CyclicController,
    /// `N`: no control operator at all.
    NoControl,
}

impl CoinFamily {
    /// Looks a class name up in the registry. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        let family = match name {
            "N" => CoinFamily::NoControl,
            "Hadamard" | "H" => CoinFamily::Hadamard,
            "X" => CoinFamily::Flip,
            "Grover" | "G" => CoinFamily::Grover,
            "DFT" => CoinFamily::Dft,
            "PhaseKickback" | "PK" => CoinFamily::PhaseKickback,
            "RK" | "RightKickback" => CoinFamily::Kickback(KickbackVariant::Right),
            "RPK" => CoinFamily::Kickback(KickbackVariant::RightPlus),
            "RMK" => CoinFamily::Kickback(KickbackVariant::RightMinus),
            "LK" | "LeftKickback" => CoinFamily::Kickback(KickbackVariant::Left),
            "LPK" => CoinFamily::Kickback(KickbackVariant::LeftPlus),
            "LMK" => CoinFamily::Kickback(KickbackVariant::LeftMinus),
            "SU2" => CoinFamily::Su2,
            "Cyclic_controller" => CoinFamily::CyclicController,
            _ => return None,
        };
        Some(family)
    }

    /// The canonical registry name, used in control codes.
    pub fn name(&self) -> &'static str {
        match self {
            CoinFamily::Hadamard => "Hadamard",
            CoinFamily::Flip => "X",
            CoinFamily::Grover => "Grover",
            CoinFamily::Dft => "DFT",
            CoinFamily::PhaseKickback => "PhaseKickback",
            CoinFamily::Kickback(KickbackVariant::Right) => "RK",
            CoinFamily::Kickback(KickbackVariant::RightPlus) => "RPK",
            CoinFamily::Kickback(KickbackVariant::RightMinus) => "RMK",
            CoinFamily::Kickback(KickbackVariant::Left) => "LK",
            CoinFamily::Kickback(KickbackVariant::LeftPlus) => "LPK",
            CoinFamily::Kickback(KickbackVariant::LeftMinus) => "LMK",
            CoinFamily::Su2 => "SU2",
            CoinFamily::CyclicController => "Cyclic_controller",
            CoinFamily::NoControl => "N",
        }
    }

    /// Whether the family can drive the walk's coin register. The cyclic
    /// controller and `N` only make sense as boundary controls.
    pub fn is_shift_coin(&self) -> bool {
        !matches!(self, CoinFamily::CyclicController | CoinFamily::NoControl)
    }

    /// Keys this family accepts.
    pub fn parameter_schema(&self) -> &'static [&'static str] {
        match self {
            CoinFamily::PhaseKickback => &["lam"],
            CoinFamily::Su2 => &["theta", "zeta", "xi", "p"],
            _ => &[],
        }
    }

    /// Builds the operator on `n_qubits` wires; `None` for [`CoinFamily::NoControl`].
    ///
    /// `SU2` takes either a transmission probability `p` or all three of
    /// `theta`, `zeta`, `xi` (each a scalar or one value per qubit).
    ///
    /// # Errors
    /// `WalkError::Configuration` on unknown keys, missing keys, or values the
    /// operator constructor rejects.
    pub fn build(&self, n_qubits: usize, params: &CoinParams) -> Result<Option<ReversibleOperator>> {
        params.check_keys(self.parameter_schema(), self.name())?;
        let op = match self {
            CoinFamily::NoControl => return Ok(None),
            CoinFamily::Hadamard => ReversibleOperator::hadamard(n_qubits),
            CoinFamily::Flip => ReversibleOperator::flip(n_qubits),
            CoinFamily::Grover => ReversibleOperator::diffusion(n_qubits),
            CoinFamily::Dft => ReversibleOperator::fourier(n_qubits),
            CoinFamily::PhaseKickback => {
                let lam = params.require("lam", self.name())?.as_scalar("lam")?;
                ReversibleOperator::phase_kickback(n_qubits, lam)
            }
            CoinFamily::Kickback(variant) => ReversibleOperator::kickback(n_qubits, *variant),
            CoinFamily::CyclicController => ReversibleOperator::cyclic_increment(n_qubits),
            CoinFamily::Su2 => match params.get("p") {
                Some(p) => {
                    params.check_keys(&["p"], "SU2 with a transmission probability")?;
                    ReversibleOperator::permeability(n_qubits, p.as_scalar("p")?)?
                }
                None => {
                    let theta = params.require("theta", self.name())?.to_angles();
                    let zeta = params.require("zeta", self.name())?.to_angles();
                    let xi = params.require("xi", self.name())?.to_angles();
                    ReversibleOperator::su2(n_qubits, &theta, &zeta, &xi)?
                }
            },
        };
        Ok(Some(op))
    }
}

/// What an unrecognized control-class name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Use the per-qubit Hadamard coin.
    #[default]
    BasisRotation,
    /// Drop the control; the boundary becomes hard.
    NoControl,
}

impl FallbackPolicy {
    /// Resolves `name`, applying the policy (with a warning) on a miss.
    pub fn resolve(&self, name: &str) -> CoinFamily {
        if let Some(family) = CoinFamily::from_name(name) {
            return family;
        }
        let fallback = match self {
            FallbackPolicy::BasisRotation => CoinFamily::Hadamard,
            FallbackPolicy::NoControl => CoinFamily::NoControl,
        };
        warn!(class = name, fallback = fallback.name(), "Unrecognized control class, using fallback");
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WalkError;
    use crate::operators::OperatorFamily;

    #[test]
    fn test_registry_aliases() {
        assert_eq!(CoinFamily::from_name("G"), Some(CoinFamily::Grover));
        assert_eq!(CoinFamily::from_name("LeftKickback"), Some(CoinFamily::Kickback(KickbackVariant::Left)));
        assert_eq!(CoinFamily::from_name("N"), Some(CoinFamily::NoControl));
        assert_eq!(CoinFamily::from_name("grover"), None);
    }

    #[test]
    fn test_fallback_policies_differ() {
        assert_eq!(FallbackPolicy::BasisRotation.resolve("Mystery"), CoinFamily::Hadamard);
        assert_eq!(FallbackPolicy::NoControl.resolve("Mystery"), CoinFamily::NoControl);
        assert_eq!(FallbackPolicy::NoControl.resolve("DFT"), CoinFamily::Dft);
    }

    #[test]
    fn test_build_checks_schema() -> Result<()> {
        let empty = CoinParams::new();
        assert!(CoinFamily::NoControl.build(2, &empty)?.is_none());
        assert!(matches!(CoinFamily::PhaseKickback.build(2, &empty), Err(WalkError::Configuration { .. })));

        let lam: CoinParams = "lam=pi/3".parse()?;
        let op = CoinFamily::PhaseKickback.build(2, &lam)?;
        assert!(matches!(op.map(|o| o.family().clone()), Some(OperatorFamily::PhaseKickback(_))));
        assert!(CoinFamily::Grover.build(2, &lam).is_err());
        Ok(())
    }

    #[test]
    fn test_su2_from_probability_or_angles() -> Result<()> {
        let p: CoinParams = "p=0.5".parse()?;
        assert!(CoinFamily::Su2.build(1, &p)?.is_some());
        assert!(CoinFamily::Su2.build(1, &"p=1.5".parse()?).is_err());
        assert!(CoinFamily::Su2.build(1, &"p=0.5,theta=1".parse()?).is_err());

        let angles: CoinParams = "theta=[0.1;0.2],zeta=0,xi=pi".parse()?;
        assert!(CoinFamily::Su2.build(2, &angles)?.is_some());
        assert!(CoinFamily::Su2.build(3, &angles).is_err());
        Ok(())
    }
}
