// tests/simulation_tests.rs

use approx::assert_relative_eq;
use qwalk::{
    Boundary, BoundaryControl, BoundarySpec, DisplacementTensor, FallbackPolicy, JobBackend,
    JobStatus, LocalBackend, Operation, QuantumWalk, QueuedBackend, Result, ReversibleOperator,
    WalkError, WalkSpecification, build_boundary_controls,
};

// Helper: reflecting walls on both edges of every dimension
fn walls(dims: &[usize]) -> Result<BoundaryControl> {
    let mut control = BoundaryControl::hard();
    for (d, width) in dims.iter().enumerate() {
        control.add_boundary(Boundary::new("0".repeat(*width), d, None)?);
        control.add_boundary(Boundary::new("1".repeat(*width), d, None)?);
    }
    Ok(control)
}

// Helper: a 3-qubit line with one wall at x = 4 under `control`
fn walled_line(start: &str, mut control: BoundaryControl, n_steps: usize, seed: u64) -> Result<DisplacementTensor> {
    control.add_boundary(Boundary::new("100", 0, Some("x=4"))?);
    let spec = WalkSpecification::new(vec![3])
        .with_initial_states(vec![start])
        .with_boundary_control(control);
    let mut walk = QuantumWalk::new(spec)?;
    walk.add_n_steps(n_steps)?;
    Ok(walk.get_results(&mut LocalBackend::with_seed(seed), 4000)?.clone())
}

fn mass_in(tensor: &DisplacementTensor, sites: std::ops::RangeInclusive<u64>) -> f64 {
    sites.map(|x| tensor.density_at(&[x])).sum()
}

#[test]
fn test_hard_wall_reflects() -> Result<()> {
    let tensor = walled_line("011", BoundaryControl::hard(), 3, 11)?;
    assert_eq!(mass_in(&tensor, 5..=7), 0.0);
    assert_relative_eq!(tensor.total_probability(), 1.0, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_absorbing_wall_never_opens() -> Result<()> {
    let tensor = walled_line("011", BoundaryControl::absorbing(1)?, 3, 12)?;
    assert_eq!(mass_in(&tensor, 5..=7), 0.0);

    let open = walled_line("011", BoundaryControl::permeable(ReversibleOperator::hadamard(1)), 3, 12)?;
    assert!(mass_in(&open, 5..=7) > 0.0);
    Ok(())
}

#[test]
fn test_permeable_wall_halves_transmission() -> Result<()> {
    // a free walk from 3 puts a quarter of its mass on 5 after two steps
    let tensor = walled_line("011", BoundaryControl::permeable(ReversibleOperator::hadamard(1)), 2, 13)?;
    assert_relative_eq!(tensor.density_at(&[5]), 0.125, epsilon = 0.03);
    assert_relative_eq!(tensor.density_at(&[3]), 0.625, epsilon = 0.04);
    Ok(())
}

#[test]
fn test_one_way_wall_passes_upward_traffic() -> Result<()> {
    let tensor = walled_line("011", BoundaryControl::one_way(3)?, 2, 14)?;
    assert_relative_eq!(tensor.density_at(&[5]), 0.5, epsilon = 0.05);
    assert_relative_eq!(tensor.density_at(&[1]), 0.25, epsilon = 0.05);
    Ok(())
}

#[test]
fn test_one_way_wall_blocks_downward_traffic() -> Result<()> {
    let tensor = walled_line("101", BoundaryControl::one_way(3)?, 2, 15)?;
    assert_eq!(mass_in(&tensor, 0..=3), 0.0);
    assert_relative_eq!(tensor.density_at(&[5]), 0.75, epsilon = 0.05);
    assert_relative_eq!(tensor.density_at(&[7]), 0.25, epsilon = 0.05);
    Ok(())
}

#[test]
fn test_zero_step_walk_stays_put() -> Result<()> {
    let spec = WalkSpecification::new(vec![3])
        .with_initial_states(vec!["011"])
        .with_boundary_control(walls(&[3])?);
    let mut walk = QuantumWalk::new(spec)?;

    let histogram = walk.execute(&mut LocalBackend::with_seed(1), 200)?;
    let merged = walk.decoder().discard_non_state_bits(&histogram)?;
    assert_eq!(merged.len(), 1);
    assert_eq!(merged.get("011"), Some(200));

    let tensor = walk.get_results(&mut LocalBackend::with_seed(1), 200)?;
    assert_eq!(tensor.dimension(0), Some(&[3u64][..]));
    assert_relative_eq!(tensor.probability_density()[0], 1.0);
    Ok(())
}

#[test]
fn test_two_dimensional_single_step() -> Result<()> {
    let spec = WalkSpecification::new(vec![2, 2])
        .with_initial_states(vec!["01", "01"])
        .with_coin_width(2)
        .with_boundary_control(walls(&[2, 2])?);
    let mut walk = QuantumWalk::new(spec)?;
    walk.add_n_steps(1)?;

    let shots = 4000;
    let tensor = walk.get_results(&mut LocalBackend::with_seed(2024), shots)?.clone();
    assert_relative_eq!(tensor.total_probability(), 1.0, epsilon = 1e-9);
    for row in 0..tensor.len() {
        let point = tensor.point(row).unwrap_or_default();
        let distance = point[0].abs_diff(1) + point[1].abs_diff(1);
        assert_eq!(distance, 1, "mass at {:?} is not adjacent to (1, 1)", point);
    }
    for neighbour in [[0, 1], [2, 1], [1, 0], [1, 2]] {
        assert_relative_eq!(tensor.density_at(&neighbour), 0.25, epsilon = 0.05);
    }
    Ok(())
}

#[test]
fn test_results_cached_until_stepped() -> Result<()> {
    let mut walk = QuantumWalk::new(WalkSpecification::new(vec![2]).with_initial_states(vec!["01"]))?;
    let mut backend = LocalBackend::with_seed(4);
    assert!(walk.results().is_none());
    let first = walk.covariance_tensor(&mut backend, 128, false)?;
    let again = walk.covariance_tensor(&mut backend, 128, false)?;
    assert_eq!(first.len(), 1);
    assert!(first[0][0] == again[0][0] || first[0][0].is_nan());
    walk.step()?;
    assert!(walk.results().is_none());
    Ok(())
}

#[test]
fn test_rebuild_discards_steps() -> Result<()> {
    let mut walk = QuantumWalk::new(WalkSpecification::new(vec![2]).with_initial_states(vec!["10"]))?;
    let prepared = walk.circuit().len();
    walk.add_n_steps(3)?;
    assert!(walk.circuit().len() > prepared);
    walk.reset_circuit()?;
    assert_eq!(walk.circuit().len(), prepared);
    let tensor = walk.run_experiment(&mut LocalBackend::with_seed(5), 0, 32)?;
    assert_eq!(tensor.dimension(0), Some(&[2u64][..]));
    Ok(())
}

#[test]
fn test_boundary_controls_reset_each_step() -> Result<()> {
    let specs: Vec<BoundarySpec> = ["soft-0-000-G-2", "oneway-0-111--2"]
        .iter()
        .map(|s| s.parse())
        .collect::<Result<_>>()?;
    let controls = build_boundary_controls(&specs, FallbackPolicy::default())?;
    let spec = WalkSpecification::new(vec![3])
        .with_initial_states(vec!["011"])
        .with_boundary_controls(controls);
    let mut walk = QuantumWalk::new(spec)?;
    walk.add_n_steps(2)?;

    let resets = walk.circuit().operations().iter().filter(|op| matches!(op, Operation::Reset { .. })).count();
    // one reset per control per step
    assert_eq!(resets, 4);
    let tensor = walk.get_results(&mut LocalBackend::with_seed(8), 64)?;
    assert_relative_eq!(tensor.total_probability(), 1.0, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_queued_execution_of_a_walk() -> Result<()> {
    let mut walk = QuantumWalk::new(WalkSpecification::new(vec![2]).with_initial_states(vec!["01"]))?;
    walk.add_n_steps(1)?;
    let mut backend = QueuedBackend::new(LocalBackend::with_seed(6));
    let job = backend.submit(walk.circuit(), 50)?;
    assert_eq!(backend.status(job)?, JobStatus::Queued);
    assert!(matches!(
        backend.retrieve(job),
        Err(WalkError::ExecutionNotReady { queue_position: 0, .. })
    ));
    assert_eq!(backend.process_next(), Some((job, JobStatus::Done)));
    let histogram = backend.retrieve(job)?;
    assert_eq!(histogram.total(), 50);
    Ok(())
}
