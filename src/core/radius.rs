use serde::{Deserialize, Serialize};

use crate::error::{DorlingError, DorlingResult};

/// Screen units per square-root unit of the size statistic.
pub const DEFAULT_RADIUS_BASE_SCALE: f64 = 0.005;
/// Default visual enlargement of all circles.
pub const DEFAULT_EXAGGERATION_FACTOR: f64 = 1.2;

/// `radius(v) = exaggeration_factor * base_scale * sqrt(v)`.
///
/// Circle area is proportional to the statistic. Missing, negative and
/// non-finite values render with radius `0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusFunction {
    exaggeration_factor: f64,
    base_scale: f64,
}

impl Default for RadiusFunction {
    fn default() -> Self {
        Self {
            exaggeration_factor: DEFAULT_EXAGGERATION_FACTOR,
            base_scale: DEFAULT_RADIUS_BASE_SCALE,
        }
    }
}

impl RadiusFunction {
    pub fn new(exaggeration_factor: f64) -> DorlingResult<Self> {
        Self::default().with_exaggeration_factor(exaggeration_factor)
    }

    pub fn with_exaggeration_factor(mut self, exaggeration_factor: f64) -> DorlingResult<Self> {
        if !exaggeration_factor.is_finite() || exaggeration_factor < 0.0 {
            return Err(DorlingError::InvalidData(
                "circle exaggeration factor must be finite and >= 0".to_owned(),
            ));
        }
        self.exaggeration_factor = exaggeration_factor;
        Ok(self)
    }

    pub fn with_base_scale(mut self, base_scale: f64) -> DorlingResult<Self> {
        if !base_scale.is_finite() || base_scale < 0.0 {
            return Err(DorlingError::InvalidData(
                "radius base scale must be finite and >= 0".to_owned(),
            ));
        }
        self.base_scale = base_scale;
        Ok(self)
    }

    #[must_use]
    pub fn exaggeration_factor(self) -> f64 {
        self.exaggeration_factor
    }

    #[must_use]
    pub fn base_scale(self) -> f64 {
        self.base_scale
    }

    #[must_use]
    pub fn radius(self, value: f64) -> f64 {
        if !value.is_finite() || value <= 0.0 {
            return 0.0;
        }
        self.exaggeration_factor * self.base_scale * value.sqrt()
    }

    #[must_use]
    pub fn radius_for(self, value: Option<f64>) -> f64 {
        value.map_or(0.0, |value| self.radius(value))
    }
}
