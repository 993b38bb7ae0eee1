use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::config::ForceConfig;
use super::forces::{Lcg, apply_collision, apply_position_force, integrate, max_overlap};
use super::node::SimulationNode;
use crate::error::{DorlingError, DorlingResult};

/// Lifecycle of the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SimulationState {
    #[default]
    Idle,
    Running,
    Converged,
    Stopped,
}

/// Outcome of one [`ForceSimulation::step`].
///
/// `tick` is the run's tick count after the step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimulationStatus<'a> {
    /// A tick was applied; the run continues.
    Running {
        nodes: &'a [SimulationNode],
        tick: u32,
    },
    /// A tick was applied and the run just settled.
    Converged {
        nodes: &'a [SimulationNode],
        tick: u32,
    },
    /// No run is active; nothing moved.
    Inactive,
}

impl<'a> SimulationStatus<'a> {
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    #[must_use]
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    #[must_use]
    pub fn nodes(&self) -> Option<&'a [SimulationNode]> {
        match *self {
            Self::Running { nodes, .. } | Self::Converged { nodes, .. } => Some(nodes),
            Self::Inactive => None,
        }
    }

    #[must_use]
    pub fn tick(&self) -> Option<u32> {
        match *self {
            Self::Running { tick, .. } | Self::Converged { tick, .. } => Some(tick),
            Self::Inactive => None,
        }
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceReason {
    Empty,
    Cooled,
    Settled,
    TickCap,
}

/// Explicitly stepped force layout over a fixed node set.
///
/// Node positions are only written inside [`step`](Self::step), and at most
/// one run exists at a time: [`start`](Self::start) stops the active run
/// before resetting positions.
#[derive(Debug, Clone)]
pub struct ForceSimulation {
    config: ForceConfig,
    nodes: Vec<SimulationNode>,
    alpha: f64,
    tick_count: u32,
    state: SimulationState,
    run_id: u64,
    last_reason: Option<ConvergenceReason>,
    calm_ticks: u32,
    jiggle: Lcg,
}

impl ForceSimulation {
    pub fn new(nodes: Vec<SimulationNode>, config: ForceConfig) -> DorlingResult<Self> {
        config.validate()?;
        let mut simulation = Self {
            config,
            nodes: Vec::new(),
            alpha: 1.0,
            tick_count: 0,
            state: SimulationState::Idle,
            run_id: 0,
            last_reason: None,
            calm_ticks: 0,
            jiggle: Lcg::default(),
        };
        simulation.replace_nodes(nodes)?;
        Ok(simulation)
    }

    /// Swaps in a new node set, stopping any active run first.
    pub fn replace_nodes(&mut self, mut nodes: Vec<SimulationNode>) -> DorlingResult<()> {
        if let Some(node) = nodes.iter().find(|node| !node.anchor.is_finite()) {
            return Err(DorlingError::InvalidData(format!(
                "anchor of node `{}` must be finite",
                node.id
            )));
        }
        self.stop();
        for (index, node) in nodes.iter_mut().enumerate() {
            node.index = index;
            node.reset();
        }
        self.nodes = nodes;
        self.state = SimulationState::Idle;
        self.tick_count = 0;
        self.alpha = 1.0;
        self.last_reason = None;
        self.calm_ticks = 0;
        Ok(())
    }

    /// Replaces the force parameters, stopping any active run first.
    pub fn set_config(&mut self, config: ForceConfig) -> DorlingResult<()> {
        config.validate()?;
        self.stop();
        self.config = config;
        Ok(())
    }

    #[must_use]
    pub fn config(&self) -> ForceConfig {
        self.config
    }

    #[must_use]
    pub fn nodes(&self) -> &[SimulationNode] {
        &self.nodes
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[must_use]
    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    #[must_use]
    pub fn state(&self) -> SimulationState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == SimulationState::Running
    }

    /// Identifier of the latest run; `0` before the first start.
    #[must_use]
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    #[must_use]
    pub fn last_convergence_reason(&self) -> Option<ConvergenceReason> {
        self.last_reason
    }

    /// Begins a new run from the anchors and returns its id.
    pub fn start(&mut self) -> u64 {
        if self.is_running() {
            self.stop();
        }
        for node in &mut self.nodes {
            node.reset();
        }
        self.run_id += 1;
        self.alpha = 1.0;
        self.tick_count = 0;
        self.last_reason = None;
        self.calm_ticks = 0;
        self.jiggle = Lcg::default();
        self.state = SimulationState::Running;
        debug!(run_id = self.run_id, nodes = self.nodes.len(), "simulation started");
        self.run_id
    }

    /// Cancels the active run. Returns `false` when nothing was running.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = SimulationState::Stopped;
        debug!(
            run_id = self.run_id,
            ticks = self.tick_count,
            "simulation stopped"
        );
        true
    }

    /// Applies one tick of the active run.
    pub fn step(&mut self) -> SimulationStatus<'_> {
        if !self.is_running() {
            return SimulationStatus::Inactive;
        }
        if self.nodes.is_empty() {
            self.finish(ConvergenceReason::Empty);
            return SimulationStatus::Converged {
                nodes: &self.nodes,
                tick: self.tick_count,
            };
        }

        self.tick();

        self.calm_ticks = if self.is_calm() {
            self.calm_ticks + 1
        } else {
            0
        };
        let reason = if self.alpha < self.config.alpha_min {
            Some(ConvergenceReason::Cooled)
        } else if self.calm_ticks >= self.config.settle_ticks {
            Some(ConvergenceReason::Settled)
        } else if self.tick_count >= self.config.max_ticks {
            Some(ConvergenceReason::TickCap)
        } else {
            None
        };

        let tick = self.tick_count;
        match reason {
            Some(reason) => {
                self.finish(reason);
                SimulationStatus::Converged {
                    nodes: &self.nodes,
                    tick,
                }
            }
            None => SimulationStatus::Running {
                nodes: &self.nodes,
                tick,
            },
        }
    }

    /// Starts a run if none is active and steps it to the end.
    pub fn run_to_convergence(&mut self) -> &[SimulationNode] {
        if !self.is_running() {
            self.start();
        }
        while self.step().is_running() {}
        &self.nodes
    }

    /// Total kinetic energy of the node set.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        self.nodes.iter().map(SimulationNode::kinetic_energy).sum()
    }

    /// Deepest remaining overlap of padded collision circles.
    #[must_use]
    pub fn max_overlap(&self) -> f64 {
        max_overlap(&self.nodes, self.config.collision_padding)
    }

    /// Energy below the threshold and no overlap beyond tolerance.
    fn is_calm(&self) -> bool {
        self.config.energy_threshold > 0.0
            && self.kinetic_energy() < self.config.energy_threshold
            && self.max_overlap() <= self.config.overlap_tolerance
    }

    fn tick(&mut self) {
        self.alpha -= self.alpha * self.config.alpha_decay;

        apply_position_force(&mut self.nodes, self.config.position_strength, self.alpha);
        apply_collision(
            &mut self.nodes,
            self.config.collision_strength,
            self.config.collision_padding,
            self.config.collision_iterations,
            &mut self.jiggle,
        );
        integrate(&mut self.nodes, self.config.velocity_decay);

        self.tick_count += 1;
        trace!(
            run_id = self.run_id,
            tick = self.tick_count,
            alpha = self.alpha,
            "simulation tick"
        );
    }

    fn finish(&mut self, reason: ConvergenceReason) {
        self.state = SimulationState::Converged;
        self.last_reason = Some(reason);
        if reason == ConvergenceReason::TickCap {
            warn!(
                run_id = self.run_id,
                ticks = self.tick_count,
                "simulation hit tick cap; treating as converged"
            );
        } else {
            debug!(
                run_id = self.run_id,
                ticks = self.tick_count,
                reason = ?reason,
                "simulation converged"
            );
        }
    }
}
