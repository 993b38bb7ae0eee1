//! Force terms and velocity integration, following d3-force semantics.

#[cfg(feature = "parallel-forces")]
use rayon::prelude::*;
use smallvec::SmallVec;

use super::grid::CollisionGrid;
use super::node::SimulationNode;
use crate::core::Point;

/// Deterministic linear congruential generator used for jiggling
/// coincident centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Default for Lcg {
    fn default() -> Self {
        Self { state: 1 }
    }
}

impl Lcg {
    const MULTIPLIER: u32 = 1_664_525;
    const INCREMENT: u32 = 1_013_904_223;

    /// Next sample in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        f64::from(self.state) / 4_294_967_296.0
    }

    /// Tiny non-zero offset.
    pub fn jiggle(&mut self) -> f64 {
        (self.next_unit() - 0.5) * 1e-6
    }
}

/// Pulls every node toward its anchor on both axes.
pub fn apply_position_force(nodes: &mut [SimulationNode], strength: f64, alpha: f64) {
    let factor = strength * alpha;
    if factor == 0.0 {
        return;
    }

    #[cfg(feature = "parallel-forces")]
    {
        nodes
            .par_iter_mut()
            .for_each(|node| pull_toward_anchor(node, factor));
    }

    #[cfg(not(feature = "parallel-forces"))]
    {
        for node in nodes.iter_mut() {
            pull_toward_anchor(node, factor);
        }
    }
}

fn pull_toward_anchor(node: &mut SimulationNode, factor: f64) {
    node.vx += (node.anchor.x - node.x) * factor;
    node.vy += (node.anchor.y - node.y) * factor;
}

/// Separates overlapping circles.
///
/// Each pass works on predicted positions (`x + vx`), visits every pair once
/// and splits the correction by squared radius, so the smaller circle moves
/// more.
pub fn apply_collision(
    nodes: &mut [SimulationNode],
    strength: f64,
    padding: f64,
    iterations: u32,
    jiggle: &mut Lcg,
) {
    if strength <= 0.0 || nodes.len() < 2 {
        return;
    }
    let max_radius = nodes
        .iter()
        .map(|node| node.radius + padding)
        .fold(0.0_f64, f64::max);
    if max_radius <= 0.0 {
        return;
    }

    for _ in 0..iterations {
        let grid = CollisionGrid::from_points(
            2.0 * max_radius,
            nodes
                .iter()
                .enumerate()
                .map(|(i, node)| (i, Point::new(node.x + node.vx, node.y + node.vy))),
        );

        for i in 0..nodes.len() {
            let ri = nodes[i].radius + padding;
            let ri2 = ri * ri;
            let xi = nodes[i].x + nodes[i].vx;
            let yi = nodes[i].y + nodes[i].vy;
            let candidates: SmallVec<[usize; 16]> = grid
                .neighbors(Point::new(xi, yi))
                .filter(|&j| j > i)
                .collect();

            for j in candidates {
                let rj = nodes[j].radius + padding;
                let reach = ri + rj;
                let mut dx = xi - nodes[j].x - nodes[j].vx;
                let mut dy = yi - nodes[j].y - nodes[j].vy;
                let mut distance_sq = dx * dx + dy * dy;
                if distance_sq >= reach * reach {
                    continue;
                }
                if dx == 0.0 {
                    dx = jiggle.jiggle();
                    distance_sq += dx * dx;
                }
                if dy == 0.0 {
                    dy = jiggle.jiggle();
                    distance_sq += dy * dy;
                }
                let distance = distance_sq.sqrt();
                let push = (reach - distance) / distance * strength;
                dx *= push;
                dy *= push;

                let rj2 = rj * rj;
                let weight = rj2 / (ri2 + rj2);
                nodes[i].vx += dx * weight;
                nodes[i].vy += dy * weight;
                nodes[j].vx -= dx * (1.0 - weight);
                nodes[j].vy -= dy * (1.0 - weight);
            }
        }
    }
}

/// Deepest overlap between padded collision circles at current positions;
/// `0` when no pair touches.
#[must_use]
pub fn max_overlap(nodes: &[SimulationNode], padding: f64) -> f64 {
    let max_radius = nodes
        .iter()
        .map(|node| node.radius + padding)
        .fold(0.0_f64, f64::max);
    if nodes.len() < 2 || max_radius <= 0.0 {
        return 0.0;
    }

    let grid = CollisionGrid::from_points(
        2.0 * max_radius,
        nodes.iter().enumerate().map(|(i, node)| (i, node.position())),
    );
    let mut deepest = 0.0_f64;
    for (i, node) in nodes.iter().enumerate() {
        for j in grid.neighbors(node.position()).filter(|&j| j > i) {
            let other = &nodes[j];
            let reach = node.radius + other.radius + 2.0 * padding;
            deepest = deepest.max(reach - node.position().distance_to(other.position()));
        }
    }
    deepest
}

/// Damps velocities and moves nodes.
pub fn integrate(nodes: &mut [SimulationNode], velocity_decay: f64) {
    let retain = 1.0 - velocity_decay;

    #[cfg(feature = "parallel-forces")]
    {
        nodes
            .par_iter_mut()
            .for_each(|node| integrate_node(node, retain));
    }

    #[cfg(not(feature = "parallel-forces"))]
    {
        for node in nodes.iter_mut() {
            integrate_node(node, retain);
        }
    }
}

fn integrate_node(node: &mut SimulationNode, retain: f64) {
    node.vx *= retain;
    node.vy *= retain;
    node.x += node.vx;
    node.y += node.vy;
}
