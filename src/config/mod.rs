// src/config/mod.rs

//! Typed configuration: coin parameters, the coin/control-class registry and
//! the experiment record a walk is built from.

mod params;
mod registry;

pub use params::{CoinParams, ParamValue, parse_number};
pub use registry::{CoinFamily, FallbackPolicy};

use crate::boundaries::{BoundarySpec, build_boundary_controls};
use crate::core::constants::walk_constants::DEFAULT_SHOTS;
use crate::core::{Result, WalkError};
use crate::walk::{DecoherenceCycle, WalkSpecification};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Initial positions: `"auto"`, a whitespace-separated word list, or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialStates {
    Words(String),
    List(Vec<String>),
}

impl Default for InitialStates {
    fn default() -> Self {
        InitialStates::Words("auto".to_string())
    }
}

impl InitialStates {
    /// One bitstring per dimension. `auto` starts every dimension at
    /// `0` followed by `n - 1` ones.
    pub fn resolve(&self, ndims: usize, nqubits: usize) -> Vec<String> {
        match self {
            InitialStates::Words(words) if words.trim() == "auto" => {
                let start = format!("0{}", "1".repeat(nqubits.saturating_sub(1)));
                vec![start; ndims]
            }
            InitialStates::Words(words) => words.split_whitespace().map(str::to_string).collect(),
            InitialStates::List(list) => list.clone(),
        }
    }
}

fn default_coin() -> String {
    "Hadamard".to_string()
}

fn default_nsteps() -> usize {
    10
}

fn default_shots() -> u64 {
    DEFAULT_SHOTS
}

/// An experiment description as it appears in a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Number of lattice dimensions.
    pub ndims: usize,
    /// Position qubits per dimension.
    pub nqubits: usize,
    /// Boundary strings, `type-dimension-bitstring-class-n`.
    #[serde(default)]
    pub boundaries: Vec<String>,
    #[serde(default)]
    pub initial_states: InitialStates,
    #[serde(default = "default_coin")]
    pub coin: String,
    /// Coin parameter string, `k=v,k2=[a;b]`.
    #[serde(default)]
    pub coin_kwargs: String,
    #[serde(default)]
    pub n_shift_coin_bits: Option<usize>,
    #[serde(default = "default_nsteps")]
    pub nsteps: usize,
    #[serde(default = "default_shots")]
    pub shots: u64,
    #[serde(default)]
    pub fallback: FallbackPolicy,
    #[serde(default)]
    pub decoherence: Option<DecoherenceCycle>,
}

impl ExperimentConfig {
    /// A config with every optional field at its default.
    pub fn new(ndims: usize, nqubits: usize) -> Self {
        Self {
            ndims,
            nqubits,
            boundaries: Vec::new(),
            initial_states: InitialStates::default(),
            coin: default_coin(),
            coin_kwargs: String::new(),
            n_shift_coin_bits: None,
            nsteps: default_nsteps(),
            shots: default_shots(),
            fallback: FallbackPolicy::default(),
            decoherence: None,
        }
    }

    pub fn boundary_specs(&self) -> Result<Vec<BoundarySpec>> {
        self.boundaries.iter().map(|b| b.parse()).collect()
    }

    /// The shift coin family. Unknown names always fall back to Hadamard,
    /// whatever the boundary fallback policy says.
    pub fn shift_coin(&self) -> Result<CoinFamily> {
        let family = FallbackPolicy::BasisRotation.resolve(&self.coin);
        if !family.is_shift_coin() {
            return Err(WalkError::config(format!("'{}' cannot be used as the shift coin", self.coin)));
        }
        Ok(family)
    }

    /// Parses every string field and assembles a [`WalkSpecification`].
    ///
    /// # Errors
    /// `WalkError::Configuration` for zero dimensions or qubits, malformed
    /// boundary or coin parameter strings, or initial states that do not
    /// match the dimension count.
    pub fn to_walk_specification(&self) -> Result<WalkSpecification> {
        if self.ndims == 0 || self.nqubits == 0 {
            return Err(WalkError::config("an experiment needs at least one dimension and one qubit"));
        }
        let controls = build_boundary_controls(&self.boundary_specs()?, self.fallback)?;
        let coin_params: CoinParams = self.coin_kwargs.parse()?;
        let family = self.shift_coin()?;
        debug!(coin = family.name(), boundary_controls = controls.len(), "Resolved experiment config");

        let mut spec = WalkSpecification::new(vec![self.nqubits; self.ndims])
            .with_initial_states(self.initial_states.resolve(self.ndims, self.nqubits))
            .with_coin(family, coin_params)
            .with_boundary_controls(controls);
        if let Some(bits) = self.n_shift_coin_bits {
            spec = spec.with_coin_width(bits);
        }
        if let Some(cycle) = &self.decoherence {
            spec = spec.with_decoherence(cycle.clone());
        }
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_initial_states() {
        let auto = InitialStates::default();
        assert_eq!(auto.resolve(2, 3), vec!["011".to_string(), "011".to_string()]);
        let words = InitialStates::Words("01 10".to_string());
        assert_eq!(words.resolve(2, 2), vec!["01".to_string(), "10".to_string()]);
    }

    #[test]
    fn test_deserialize_with_defaults() -> std::result::Result<(), serde_json::Error> {
        let config: ExperimentConfig = serde_json::from_str(
            r#"{"ndims": 2, "nqubits": 3, "boundaries": ["hard-0-000--", "soft-1-111-G-2"],
                "initial_states": ["010", "011"], "fallback": "no_control"}"#,
        )?;
        assert_eq!(config.nsteps, 10);
        assert_eq!(config.shots, DEFAULT_SHOTS);
        assert_eq!(config.coin, "Hadamard");
        assert_eq!(config.fallback, FallbackPolicy::NoControl);
        assert_eq!(config.initial_states, InitialStates::List(vec!["010".into(), "011".into()]));
        Ok(())
    }

    #[test]
    fn test_to_walk_specification() -> Result<()> {
        let mut config = ExperimentConfig::new(2, 2);
        config.boundaries = vec!["h-0-00--".into(), "h-0-11--".into(), "s-1-00-G-2".into()];
        config.coin = "DFT".into();
        let spec = config.to_walk_specification()?;
        assert_eq!(spec.system_dimensions(), &[2, 2]);
        assert_eq!(spec.boundary_controls().len(), 2);
        assert_eq!(spec.coin_family(), CoinFamily::Dft);
        assert_eq!(spec.initial_states(), Some(&["01".to_string(), "01".to_string()][..]));
        Ok(())
    }

    #[test]
    fn test_shift_coin_resolution() {
        let mut config = ExperimentConfig::new(1, 3);
        config.coin = "Mystery".into();
        assert_eq!(config.shift_coin().ok(), Some(CoinFamily::Hadamard));
        config.coin = "N".into();
        assert!(config.shift_coin().is_err());
        config.coin = "Cyclic_controller".into();
        assert!(config.shift_coin().is_err());
        config.coin = "PK".into();
        assert_eq!(config.shift_coin().ok(), Some(CoinFamily::PhaseKickback));
        config.coin_kwargs = "lam".into();
        assert!(config.to_walk_specification().is_err());
    }
}
