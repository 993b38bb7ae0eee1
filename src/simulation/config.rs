use serde::{Deserialize, Serialize};

use crate::error::{DorlingError, DorlingResult};

pub const DEFAULT_POSITION_STRENGTH: f64 = 0.1;
pub const DEFAULT_COLLISION_STRENGTH: f64 = 0.7;
pub const DEFAULT_COLLISION_PADDING: f64 = 0.1;
pub const DEFAULT_VELOCITY_DECAY: f64 = 0.4;
pub const DEFAULT_ALPHA_MIN: f64 = 0.001;
pub const DEFAULT_ENERGY_THRESHOLD: f64 = 1e-6;
pub const DEFAULT_MAX_TICKS: u32 = 1000;
pub const DEFAULT_SETTLE_TICKS: u32 = 5;
pub const DEFAULT_OVERLAP_TOLERANCE: f64 = 1e-2;

/// Alpha decay that cools from 1 to `alpha_min` in 300 ticks.
#[must_use]
pub fn default_alpha_decay() -> f64 {
    1.0 - DEFAULT_ALPHA_MIN.powf(1.0 / 300.0)
}

/// Force-layout parameters.
///
/// Strengths are in `[0, 1]`. The collision radius of a node is its rendered
/// radius plus `collision_padding`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceConfig {
    #[serde(default = "default_position_strength")]
    pub position_strength: f64,
    #[serde(default = "default_collision_strength")]
    pub collision_strength: f64,
    #[serde(default = "default_collision_padding")]
    pub collision_padding: f64,
    #[serde(default = "default_collision_iterations")]
    pub collision_iterations: u32,
    #[serde(default = "default_velocity_decay")]
    pub velocity_decay: f64,
    #[serde(default = "default_alpha_min")]
    pub alpha_min: f64,
    #[serde(default = "default_alpha_decay")]
    pub alpha_decay: f64,
    /// Total kinetic energy below which a run may settle early; `0`
    /// disables the check.
    #[serde(default = "default_energy_threshold")]
    pub energy_threshold: f64,
    /// Consecutive calm ticks required before a run settles.
    #[serde(default = "default_settle_ticks")]
    pub settle_ticks: u32,
    /// Largest overlap of padded collision radii a settled layout may keep.
    #[serde(default = "default_overlap_tolerance")]
    pub overlap_tolerance: f64,
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            position_strength: DEFAULT_POSITION_STRENGTH,
            collision_strength: DEFAULT_COLLISION_STRENGTH,
            collision_padding: DEFAULT_COLLISION_PADDING,
            collision_iterations: default_collision_iterations(),
            velocity_decay: DEFAULT_VELOCITY_DECAY,
            alpha_min: DEFAULT_ALPHA_MIN,
            alpha_decay: default_alpha_decay(),
            energy_threshold: DEFAULT_ENERGY_THRESHOLD,
            settle_ticks: DEFAULT_SETTLE_TICKS,
            overlap_tolerance: DEFAULT_OVERLAP_TOLERANCE,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

impl ForceConfig {
    #[must_use]
    pub fn with_position_strength(mut self, strength: f64) -> Self {
        self.position_strength = strength;
        self
    }

    #[must_use]
    pub fn with_collision_strength(mut self, strength: f64) -> Self {
        self.collision_strength = strength;
        self
    }

    #[must_use]
    pub fn with_collision_padding(mut self, padding: f64) -> Self {
        self.collision_padding = padding;
        self
    }

    #[must_use]
    pub fn with_collision_iterations(mut self, iterations: u32) -> Self {
        self.collision_iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_velocity_decay(mut self, decay: f64) -> Self {
        self.velocity_decay = decay;
        self
    }

    #[must_use]
    pub fn with_alpha_min(mut self, alpha_min: f64) -> Self {
        self.alpha_min = alpha_min;
        self
    }

    #[must_use]
    pub fn with_alpha_decay(mut self, alpha_decay: f64) -> Self {
        self.alpha_decay = alpha_decay;
        self
    }

    #[must_use]
    pub fn with_energy_threshold(mut self, threshold: f64) -> Self {
        self.energy_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_settle_ticks(mut self, settle_ticks: u32) -> Self {
        self.settle_ticks = settle_ticks;
        self
    }

    #[must_use]
    pub fn with_overlap_tolerance(mut self, tolerance: f64) -> Self {
        self.overlap_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u32) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn validate(&self) -> DorlingResult<()> {
        for (name, value) in [
            ("position strength", self.position_strength),
            ("collision strength", self.collision_strength),
            ("velocity decay", self.velocity_decay),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(DorlingError::InvalidConfig(format!(
                    "{name} must be finite and within [0, 1]"
                )));
            }
        }
        if !self.collision_padding.is_finite() || self.collision_padding < 0.0 {
            return Err(DorlingError::InvalidConfig(
                "collision padding must be finite and >= 0".to_owned(),
            ));
        }
        if self.collision_iterations == 0 {
            return Err(DorlingError::InvalidConfig(
                "collision iterations must be >= 1".to_owned(),
            ));
        }
        if !self.alpha_min.is_finite() || self.alpha_min <= 0.0 || self.alpha_min >= 1.0 {
            return Err(DorlingError::InvalidConfig(
                "alpha min must be finite and within (0, 1)".to_owned(),
            ));
        }
        if !self.alpha_decay.is_finite() || self.alpha_decay <= 0.0 || self.alpha_decay > 1.0 {
            return Err(DorlingError::InvalidConfig(
                "alpha decay must be finite and within (0, 1]".to_owned(),
            ));
        }
        if !self.energy_threshold.is_finite() || self.energy_threshold < 0.0 {
            return Err(DorlingError::InvalidConfig(
                "energy threshold must be finite and >= 0".to_owned(),
            ));
        }
        if self.settle_ticks == 0 {
            return Err(DorlingError::InvalidConfig(
                "settle ticks must be >= 1".to_owned(),
            ));
        }
        if !self.overlap_tolerance.is_finite() || self.overlap_tolerance < 0.0 {
            return Err(DorlingError::InvalidConfig(
                "overlap tolerance must be finite and >= 0".to_owned(),
            ));
        }
        if self.max_ticks == 0 {
            return Err(DorlingError::InvalidConfig(
                "max ticks must be >= 1".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_position_strength() -> f64 {
    DEFAULT_POSITION_STRENGTH
}

fn default_collision_strength() -> f64 {
    DEFAULT_COLLISION_STRENGTH
}

fn default_collision_padding() -> f64 {
    DEFAULT_COLLISION_PADDING
}

fn default_collision_iterations() -> u32 {
    1
}

fn default_velocity_decay() -> f64 {
    DEFAULT_VELOCITY_DECAY
}

fn default_alpha_min() -> f64 {
    DEFAULT_ALPHA_MIN
}

fn default_energy_threshold() -> f64 {
    DEFAULT_ENERGY_THRESHOLD
}

fn default_settle_ticks() -> u32 {
    DEFAULT_SETTLE_TICKS
}

fn default_overlap_tolerance() -> f64 {
    DEFAULT_OVERLAP_TOLERANCE
}

fn default_max_ticks() -> u32 {
    DEFAULT_MAX_TICKS
}
