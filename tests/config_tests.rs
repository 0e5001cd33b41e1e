// tests/config_tests.rs

use qwalk::boundaries::{BoundaryGenerator, EdgeGeometry};
use qwalk::walk::ExperimentRunner;
use qwalk::{
    BoundaryKind, BoundarySpec, ExperimentConfig, FallbackPolicy, LocalBackend, OperatorFamily, QuantumWalk, Result,
    WalkError, build_boundary_controls,
};

#[test]
fn test_parse_hard_and_soft_strings() -> Result<()> {
    let hard: BoundarySpec = "hard-0-1111--".parse()?;
    let soft: BoundarySpec = "soft-1-0001-Grover-2".parse()?;
    let controls = build_boundary_controls(&[hard, soft], FallbackPolicy::default())?;

    assert_eq!(controls[0].kind(), BoundaryKind::Hard);
    assert_eq!(controls[0].ctrl_size(), 0);
    assert_eq!(controls[0].boundaries()[0].dimension(), 0);

    assert_eq!(controls[1].kind(), BoundaryKind::Permeable);
    let ctrl = controls[1].ctrl().ok_or_else(|| WalkError::config("missing control"))?;
    assert_eq!(ctrl.family(), &OperatorFamily::Diffusion);
    assert_eq!(ctrl.n_qubits(), 2);
    Ok(())
}

#[test]
fn test_generated_edges_feed_a_walk() -> Result<()> {
    let edges = BoundaryGenerator::edge_bitstrings(EdgeGeometry::Edges, 3, 0)?;
    let mut config = ExperimentConfig::new(1, 3);
    config.boundaries = edges.iter().map(|b| format!("h-0-{}--", b)).collect();
    let walk = QuantumWalk::new(config.to_walk_specification()?)?;
    assert_eq!(walk.boundary_controls().len(), 1);
    assert_eq!(walk.boundary_controls()[0].boundaries().len(), 2);
    assert!(BoundaryGenerator::edge_bitstrings(EdgeGeometry::Edges, 3, 4).is_err());
    Ok(())
}

#[test]
fn test_experiment_from_json_config() -> Result<()> {
    let config: ExperimentConfig = serde_json::from_str(
        r#"{
            "ndims": 2,
            "nqubits": 2,
            "boundaries": ["h-0-00--", "h-0-11--", "h-1-00--", "h-1-11--"],
            "coin": "Grover",
            "nsteps": 3,
            "shots": 128
        }"#,
    )
    .map_err(|e| WalkError::config(e.to_string()))?;

    let dir = tempfile::tempdir()?;
    let mut walk = QuantumWalk::new(config.to_walk_specification()?)?;
    let runner = ExperimentRunner::new(dir.path(), config.nsteps, 1, config.shots)?;
    let records = runner.run(&mut walk, &mut LocalBackend::with_seed(17))?;
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.statistics.covariance.len() == 2));
    assert!(dir.path().join("2D_Walk_4_bit_iteration_3_Grover Coin_results.csv").exists());
    Ok(())
}

#[test]
fn test_configuration_errors_surface() {
    let mut config = ExperimentConfig::new(1, 3);
    config.boundaries = vec!["hard-0-11--".into()];
    assert!(matches!(
        config.to_walk_specification().and_then(QuantumWalk::new),
        Err(WalkError::Configuration { .. })
    ));

    let mut config = ExperimentConfig::new(1, 3);
    config.coin = "SU2".into();
    config.coin_kwargs = "p=2".into();
    assert!(matches!(
        config.to_walk_specification().and_then(QuantumWalk::new),
        Err(WalkError::Configuration { .. })
    ));
}
