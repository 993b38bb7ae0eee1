use serde::{Deserialize, Serialize};

use crate::core::{Point, RegionId};

/// A circle in the force layout.
///
/// `index` is the node's position in the simulation's node slice and is used
/// to visit each colliding pair once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationNode {
    pub id: RegionId,
    pub index: usize,
    pub anchor: Point,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
}

impl SimulationNode {
    #[must_use]
    pub fn new(id: impl Into<RegionId>, anchor: Point, radius: f64) -> Self {
        Self {
            id: id.into(),
            index: 0,
            anchor,
            x: anchor.x,
            y: anchor.y,
            vx: 0.0,
            vy: 0.0,
            radius: if radius.is_finite() && radius > 0.0 {
                radius
            } else {
                0.0
            },
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn displacement(&self) -> f64 {
        self.position().distance_to(self.anchor)
    }

    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * (self.vx * self.vx + self.vy * self.vy)
    }

    /// Puts the node back on its anchor at rest.
    pub fn reset(&mut self) {
        self.x = self.anchor.x;
        self.y = self.anchor.y;
        self.vx = 0.0;
        self.vy = 0.0;
    }
}
