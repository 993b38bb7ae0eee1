use dorling_rs::core::Point;
use dorling_rs::simulation::{
    ConvergenceReason, ForceConfig, ForceSimulation, SimulationNode, SimulationState,
    SimulationStatus,
};

fn cluster() -> Vec<SimulationNode> {
    [
        (0.0, 0.0),
        (5.0, 0.0),
        (0.0, 5.0),
        (5.0, 5.0),
        (2.5, 2.5),
    ]
    .iter()
    .enumerate()
    .map(|(i, (x, y))| SimulationNode::new(format!("R{i}"), Point::new(*x, *y), 10.0))
    .collect()
}

fn resolving_config() -> ForceConfig {
    ForceConfig::default()
        .with_position_strength(0.02)
        .with_collision_strength(1.0)
        .with_collision_padding(0.0)
        .with_collision_iterations(3)
        .with_energy_threshold(0.0)
}

#[test]
fn overlapping_circles_are_separated_after_convergence() {
    let mut simulation = ForceSimulation::new(cluster(), resolving_config()).expect("simulation");
    let nodes = simulation.run_to_convergence().to_vec();

    assert_eq!(simulation.state(), SimulationState::Converged);
    for (i, a) in nodes.iter().enumerate() {
        for b in nodes.iter().skip(i + 1) {
            let distance = a.position().distance_to(b.position());
            assert!(
                distance >= a.radius + b.radius - 1e-2,
                "{} and {} overlap: distance {distance}",
                a.id,
                b.id
            );
        }
    }
}

#[test]
fn zero_collision_strength_keeps_nodes_on_anchors() {
    let config = resolving_config().with_collision_strength(0.0);
    let mut simulation = ForceSimulation::new(cluster(), config).expect("simulation");
    let nodes = simulation.run_to_convergence();

    for node in nodes {
        assert_eq!(node.x, node.anchor.x);
        assert_eq!(node.y, node.anchor.y);
        assert_eq!(node.displacement(), 0.0);
    }
}

fn worst_padded_overlap(nodes: &[SimulationNode], padding: f64) -> f64 {
    let mut worst = 0.0_f64;
    for (i, a) in nodes.iter().enumerate() {
        for b in nodes.iter().skip(i + 1) {
            let reach = a.radius + b.radius + 2.0 * padding;
            worst = worst.max(reach - a.position().distance_to(b.position()));
        }
    }
    worst
}

#[test]
fn separated_nodes_settle_after_consecutive_calm_ticks() {
    let nodes = vec![
        SimulationNode::new("A1", Point::new(0.0, 0.0), 1.0),
        SimulationNode::new("A2", Point::new(100.0, 0.0), 1.0),
    ];
    let config = ForceConfig::default();
    let mut simulation = ForceSimulation::new(nodes, config).expect("simulation");
    simulation.start();

    for _ in 1..config.settle_ticks {
        assert!(simulation.step().is_running());
    }
    assert!(simulation.step().is_converged());
    assert_eq!(simulation.tick_count(), config.settle_ticks);
    assert_eq!(
        simulation.last_convergence_reason(),
        Some(ConvergenceReason::Settled)
    );
    assert_eq!(simulation.nodes()[1].x, 100.0);
}

#[test]
fn default_config_resolves_an_overlapping_pair() {
    let nodes = vec![
        SimulationNode::new("A", Point::new(0.0, 0.0), 5.0),
        SimulationNode::new("B", Point::new(1.0, 0.0), 5.0),
    ];
    let config = ForceConfig::default();
    let mut simulation = ForceSimulation::new(nodes, config).expect("simulation");
    let nodes = simulation.run_to_convergence().to_vec();

    assert_eq!(simulation.state(), SimulationState::Converged);
    assert!(simulation.tick_count() > 20);
    let worst = worst_padded_overlap(&nodes, config.collision_padding);
    assert!(worst <= 1e-2 + 1e-9, "pair still overlaps by {worst}");
    assert!((simulation.max_overlap() - worst.max(0.0)).abs() <= 1e-9);
}

#[test]
fn default_config_resolves_a_dense_cluster() {
    let config = ForceConfig::default();
    let mut simulation = ForceSimulation::new(cluster(), config).expect("simulation");
    let nodes = simulation.run_to_convergence().to_vec();

    assert_eq!(simulation.state(), SimulationState::Converged);
    let worst = worst_padded_overlap(&nodes, config.collision_padding);
    assert!(worst <= 1e-2 + 1e-9, "cluster still overlaps by {worst}");
}

#[test]
fn momentary_stillness_does_not_end_a_run_with_overlap() {
    let nodes = vec![
        SimulationNode::new("A", Point::new(0.0, 0.0), 5.0),
        SimulationNode::new("B", Point::new(1.0, 0.0), 5.0),
    ];
    let config = ForceConfig::default();
    let mut simulation = ForceSimulation::new(nodes, config).expect("simulation");
    simulation.start();

    let mut still_while_overlapping = None;
    while simulation.step().is_running() {
        if still_while_overlapping.is_none()
            && simulation.kinetic_energy() < config.energy_threshold
            && simulation.max_overlap() > config.overlap_tolerance
        {
            still_while_overlapping = Some(simulation.tick_count());
        }
    }

    let dip = still_while_overlapping.expect("energy dips while circles still overlap");
    assert!(simulation.tick_count() > dip);
    assert!(simulation.max_overlap() <= config.overlap_tolerance + 1e-9);
}

#[test]
fn alpha_cooling_ends_the_run_near_three_hundred_ticks() {
    let mut simulation = ForceSimulation::new(cluster(), resolving_config()).expect("simulation");
    simulation.run_to_convergence();

    assert_eq!(
        simulation.last_convergence_reason(),
        Some(ConvergenceReason::Cooled)
    );
    assert!((299..=302).contains(&simulation.tick_count()));
    assert!(simulation.alpha() < ForceConfig::default().alpha_min);
}

#[test]
fn every_tick_reports_all_node_positions() {
    let mut simulation = ForceSimulation::new(cluster(), resolving_config()).expect("simulation");
    simulation.start();

    match simulation.step() {
        SimulationStatus::Running { nodes, tick } => {
            assert_eq!(tick, 1);
            assert_eq!(nodes.len(), 5);
            assert!(nodes.iter().all(|node| node.x.is_finite() && node.y.is_finite()));
        }
        other => panic!("expected a running tick, got {other:?}"),
    }
    assert_eq!(simulation.tick_count(), 1);
}

#[test]
fn restarting_stops_the_previous_run_and_resets_positions() {
    let mut simulation = ForceSimulation::new(cluster(), resolving_config()).expect("simulation");
    let first = simulation.start();
    for _ in 0..10 {
        let _ = simulation.step();
    }
    assert!(simulation.nodes().iter().any(|node| node.displacement() > 0.0));

    let second = simulation.start();
    assert_eq!(second, first + 1);
    assert_eq!(simulation.state(), SimulationState::Running);
    assert_eq!(simulation.tick_count(), 0);
    assert!((simulation.alpha() - 1.0).abs() <= 1e-12);
    assert!(simulation.nodes().iter().all(|node| node.displacement() == 0.0));
    assert_eq!(simulation.kinetic_energy(), 0.0);
}

#[test]
fn stop_is_idempotent_and_freezes_positions() {
    let mut simulation = ForceSimulation::new(cluster(), resolving_config()).expect("simulation");
    assert!(!simulation.stop());

    simulation.start();
    let _ = simulation.step();
    assert!(simulation.stop());
    assert!(!simulation.stop());
    assert_eq!(simulation.state(), SimulationState::Stopped);

    let frozen: Vec<Point> = simulation.nodes().iter().map(SimulationNode::position).collect();
    assert_eq!(simulation.step(), SimulationStatus::Inactive);
    let after: Vec<Point> = simulation.nodes().iter().map(SimulationNode::position).collect();
    assert_eq!(frozen, after);
}

#[test]
fn replacing_nodes_cancels_the_active_run() {
    let mut simulation = ForceSimulation::new(cluster(), resolving_config()).expect("simulation");
    simulation.start();
    let _ = simulation.step();

    simulation
        .replace_nodes(vec![SimulationNode::new("B1", Point::new(1.0, 1.0), 2.0)])
        .expect("valid nodes");
    assert_eq!(simulation.state(), SimulationState::Idle);
    assert!(!simulation.is_running());
    assert_eq!(simulation.nodes().len(), 1);
}

#[test]
fn non_finite_anchors_are_rejected() {
    let nodes = vec![SimulationNode::new("A1", Point::new(f64::NAN, 0.0), 1.0)];
    assert!(ForceSimulation::new(nodes, ForceConfig::default()).is_err());
}

#[test]
fn invalid_force_config_is_rejected() {
    let config = ForceConfig::default().with_collision_strength(1.5);
    assert!(ForceSimulation::new(Vec::new(), config).is_err());
    assert!(
        ForceConfig::default()
            .with_max_ticks(0)
            .validate()
            .is_err()
    );
    assert!(
        ForceConfig::default()
            .with_settle_ticks(0)
            .validate()
            .is_err()
    );
    assert!(
        ForceConfig::default()
            .with_overlap_tolerance(-1.0)
            .validate()
            .is_err()
    );
}

#[test]
fn large_region_sets_converge_with_finite_positions() {
    let nodes: Vec<SimulationNode> = (0..1_200)
        .map(|i| {
            let x = f64::from(i % 40) * 6.0;
            let y = f64::from(i / 40) * 6.0;
            SimulationNode::new(format!("N{i}"), Point::new(x, y), 2.0 + f64::from(i % 5))
        })
        .collect();
    let mut simulation = ForceSimulation::new(nodes, ForceConfig::default()).expect("simulation");
    let nodes = simulation.run_to_convergence();

    assert_eq!(nodes.len(), 1_200);
    assert!(nodes.iter().all(|node| node.x.is_finite() && node.y.is_finite()));
    assert_eq!(simulation.state(), SimulationState::Converged);
}
