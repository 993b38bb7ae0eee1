use serde::{Deserialize, Serialize};

use crate::error::{DorlingError, DorlingResult};

/// Transform applied to domain values before the piecewise-linear mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScaleTransform {
    #[default]
    Identity,
    /// `sign(x) * ln(1 + |x|)`: linear near zero, logarithmic in the tails.
    Symlog,
}

impl ScaleTransform {
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Identity => value,
            Self::Symlog => value.signum() * value.abs().ln_1p(),
        }
    }
}

/// Maps `[low, mid, high]` onto `[0, 0.5, 1]`, one linear piece per half.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DivergingScale {
    domain: [f64; 3],
    transform: ScaleTransform,
}

impl DivergingScale {
    pub fn new(low: f64, mid: f64, high: f64, transform: ScaleTransform) -> DorlingResult<Self> {
        if !low.is_finite() || !mid.is_finite() || !high.is_finite() {
            return Err(DorlingError::InvalidData(
                "diverging scale domain must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain: [low, mid, high],
            transform,
        })
    }

    #[must_use]
    pub fn domain(self) -> [f64; 3] {
        self.domain
    }

    #[must_use]
    pub fn transform(self) -> ScaleTransform {
        self.transform
    }

    /// Position of `value` along the scale; `0.5` is the pivot.
    ///
    /// Not clamped: values outside the domain land outside `[0, 1]`.
    /// NaN stays NaN.
    #[must_use]
    pub fn normalize(self, value: f64) -> f64 {
        if value.is_nan() {
            return f64::NAN;
        }

        let [t0, t1, t2] = self.domain.map(|d| self.transform.apply(d));
        let k10 = if t0 == t1 { 0.0 } else { 0.5 / (t1 - t0) };
        let k21 = if t1 == t2 { 0.0 } else { 0.5 / (t2 - t1) };
        let direction = if t1 < t0 { -1.0 } else { 1.0 };

        let x = self.transform.apply(value);
        let k = if direction * x < direction * t1 { k10 } else { k21 };
        0.5 + (x - t1) * k
    }

    /// Extends the outer domain bounds to round values, keeping the pivot.
    #[must_use]
    pub fn nice(self) -> Self {
        self.nice_with_count(10)
    }

    #[must_use]
    pub fn nice_with_count(mut self, count: usize) -> Self {
        let (mut i0, mut i1) = (0, 2);
        let (mut start, mut stop) = (self.domain[i0], self.domain[i1]);
        if stop < start {
            std::mem::swap(&mut start, &mut stop);
            std::mem::swap(&mut i0, &mut i1);
        }

        let mut previous_step: Option<f64> = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if previous_step == Some(step) {
                self.domain[i0] = start;
                self.domain[i1] = stop;
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            previous_step = Some(step);
        }
        self
    }
}

/// Tick step for roughly `count` ticks over `[start, stop]`.
///
/// Positive results are the step itself; negative results encode the
/// inverse of a sub-unit step (`-10` means `0.1`). Zero when the span is
/// empty or not finite.
#[must_use]
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    if count == 0 || !start.is_finite() || !stop.is_finite() || stop <= start {
        return 0.0;
    }

    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

#[cfg(test)]
mod tests {
    use super::{DivergingScale, ScaleTransform, tick_increment};

    #[test]
    fn linear_diverging_maps_pivot_to_half() {
        let scale = DivergingScale::new(-10.0, 0.0, 40.0, ScaleTransform::Identity)
            .expect("valid scale");
        assert_eq!(scale.normalize(-10.0), 0.0);
        assert_eq!(scale.normalize(0.0), 0.5);
        assert_eq!(scale.normalize(40.0), 1.0);
        assert!((scale.normalize(20.0) - 0.75).abs() <= 1e-12);
    }

    #[test]
    fn symlog_diverging_is_monotonic() {
        let scale =
            DivergingScale::new(-5.0, 10.0, 20.0, ScaleTransform::Symlog).expect("valid scale");
        let samples = [-5.0, -1.0, 0.0, 3.0, 10.0, 15.0, 20.0];
        for pair in samples.windows(2) {
            assert!(scale.normalize(pair[0]) < scale.normalize(pair[1]));
        }
    }

    #[test]
    fn tick_increment_picks_round_steps() {
        assert_eq!(tick_increment(0.0, 100.0, 10), 10.0);
        assert_eq!(tick_increment(0.0, 1.0, 10), -10.0);
        assert_eq!(tick_increment(0.0, 23.0, 10), 2.0);
        assert_eq!(tick_increment(5.0, 5.0, 10), 0.0);
    }

    #[test]
    fn nice_rounds_outer_bounds_only() {
        let scale = DivergingScale::new(-7.3, 9.85, 19.7, ScaleTransform::Symlog)
            .expect("valid scale")
            .nice();
        assert_eq!(scale.domain(), [-8.0, 9.85, 20.0]);
    }
}
