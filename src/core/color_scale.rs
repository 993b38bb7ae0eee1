use serde::{Deserialize, Serialize};
use tracing::debug;

use super::primitives::{format_number, round_to_nearest};
use super::scale::{DivergingScale, ScaleTransform};
use super::{Color, ColorScheme};
use crate::error::{DorlingError, DorlingResult};

/// Number of boundaries derived when colors are given without thresholds.
pub const AUTO_THRESHOLD_COUNT: usize = 6;
/// Auto-derived boundaries are rounded to multiples of this step.
pub const AUTO_THRESHOLD_ROUNDING: f64 = 5.0;

const AUTO_THRESHOLD_PALETTE: [u32; 6] = [0x2d50a0, 0x6487c3, 0xaab9e1, 0xf0cd91, 0xe6a532, 0xd76e2d];

/// Fixed blue-to-orange palette used with auto-derived thresholds.
#[must_use]
pub fn auto_threshold_palette() -> Vec<Color> {
    AUTO_THRESHOLD_PALETTE
        .iter()
        .map(|rgb| Color::from_rgb8((rgb >> 16) as u8, (rgb >> 8) as u8, *rgb as u8))
        .collect()
}

/// Color classification settings.
///
/// `colors` selects discrete classification, `thresholds` selects explicit
/// boundaries; see [`ColorScale::build`] for how the four combinations map
/// onto scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ColorScaleConfig {
    #[serde(default)]
    pub scheme: ColorScheme,
    #[serde(default)]
    pub colors: Option<Vec<Color>>,
    #[serde(default)]
    pub thresholds: Option<Vec<f64>>,
}

impl ColorScaleConfig {
    #[must_use]
    pub fn with_scheme(mut self, scheme: ColorScheme) -> Self {
        self.scheme = scheme;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: Option<Vec<Color>>) -> Self {
        self.colors = colors;
        self
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Option<Vec<f64>>) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn validate(&self) -> DorlingResult<()> {
        if let Some(colors) = &self.colors {
            if colors.is_empty() {
                return Err(DorlingError::InvalidConfig(
                    "explicit color palette must not be empty".to_owned(),
                ));
            }
            for color in colors {
                color.validate()?;
            }
        }
        if let Some(thresholds) = &self.thresholds {
            validate_thresholds(thresholds)?;
        }
        Ok(())
    }
}

fn validate_thresholds(thresholds: &[f64]) -> DorlingResult<()> {
    if thresholds.iter().any(|t| !t.is_finite()) {
        return Err(DorlingError::InvalidConfig(
            "color thresholds must be finite".to_owned(),
        ));
    }
    if thresholds.windows(2).any(|pair| pair[1] < pair[0]) {
        return Err(DorlingError::InvalidConfig(
            "color thresholds must be ascending".to_owned(),
        ));
    }
    Ok(())
}

/// Splits the extent into five equal intervals (six boundaries) rounded to
/// multiples of five.
///
/// A minimum below `1` starts the split at `5`. When the start is not below
/// the maximum only the rounded maximum is returned.
#[must_use]
pub fn auto_thresholds(extent: (f64, f64)) -> Vec<f64> {
    let (min, max) = extent;
    let left = if min < 1.0 { 5.0 } else { min };
    if !(left < max) {
        return vec![round_to_nearest(max, AUTO_THRESHOLD_ROUNDING)];
    }

    let intervals = (AUTO_THRESHOLD_COUNT - 1) as f64;
    let delta = (max - left) / intervals;
    (0..AUTO_THRESHOLD_COUNT)
        .map(|i| round_to_nearest(left + delta * i as f64, AUTO_THRESHOLD_ROUNDING))
        .collect()
}

/// One discrete class of a threshold scale. Open-ended classes have no bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorClass {
    pub color: Color,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl ColorClass {
    /// Legend label: `< b`, `a to b` or `≥ a` with the given delimiter.
    #[must_use]
    pub fn label(&self, delimiter: &str) -> String {
        match (self.lower, self.upper) {
            (None, Some(upper)) => format!("< {}", format_number(upper)),
            (Some(lower), None) => format!("≥ {}", format_number(lower)),
            (Some(lower), Some(upper)) => format!(
                "{}{delimiter}{}",
                format_number(lower),
                format_number(upper)
            ),
            (None, None) => "all values".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub color: Color,
    pub label: String,
}

/// Step function from ascending thresholds into a color list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdScale {
    thresholds: Vec<f64>,
    colors: Vec<Color>,
    coverage: (f64, f64),
    unknown: Color,
}

impl ThresholdScale {
    pub fn new(thresholds: Vec<f64>, colors: Vec<Color>) -> DorlingResult<Self> {
        validate_thresholds(&thresholds)?;
        if colors.is_empty() {
            return Err(DorlingError::InvalidData(
                "threshold scale needs at least one color".to_owned(),
            ));
        }

        Ok(Self {
            thresholds,
            colors,
            coverage: (f64::NEG_INFINITY, f64::INFINITY),
            unknown: Color::UNKNOWN,
        })
    }

    /// Restricts classification to `[min, max]`; values outside map to the
    /// unknown color.
    #[must_use]
    pub fn with_coverage(mut self, min: f64, max: f64) -> Self {
        self.coverage = (min.min(max), min.max(max));
        self
    }

    #[must_use]
    pub fn with_unknown(mut self, unknown: Color) -> Self {
        self.unknown = unknown;
        self
    }

    #[must_use]
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    #[must_use]
    pub fn coverage(&self) -> (f64, f64) {
        self.coverage
    }

    fn active_threshold_count(&self) -> usize {
        self.thresholds.len().min(self.colors.len() - 1)
    }

    #[must_use]
    pub fn class_index(&self, value: f64) -> Option<usize> {
        if value.is_nan() || value < self.coverage.0 || value > self.coverage.1 {
            return None;
        }
        let active = &self.thresholds[..self.active_threshold_count()];
        Some(active.partition_point(|threshold| *threshold <= value))
    }

    #[must_use]
    pub fn color(&self, value: f64) -> Color {
        self.class_index(value)
            .map_or(self.unknown, |index| self.colors[index])
    }

    #[must_use]
    pub fn classes(&self) -> Vec<ColorClass> {
        let active = self.active_threshold_count();
        (0..=active)
            .map(|index| ColorClass {
                color: self.colors[index],
                lower: index.checked_sub(1).map(|i| self.thresholds[i]),
                upper: (index < active).then(|| self.thresholds[index]),
            })
            .collect()
    }
}

/// Continuous diverging interpolation through a named scheme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DivergingColorScale {
    scale: DivergingScale,
    scheme: ColorScheme,
    reversed: bool,
}

impl DivergingColorScale {
    #[must_use]
    pub fn new(scale: DivergingScale, scheme: ColorScheme, reversed: bool) -> Self {
        Self {
            scale,
            scheme,
            reversed,
        }
    }

    #[must_use]
    pub fn scale(self) -> DivergingScale {
        self.scale
    }

    #[must_use]
    pub fn scheme(self) -> ColorScheme {
        self.scheme
    }

    #[must_use]
    pub fn color(self, value: f64) -> Color {
        let t = self.scale.normalize(value);
        if t.is_nan() {
            return Color::UNKNOWN;
        }
        let t = if self.reversed { 1.0 - t } else { t };
        self.scheme.interpolate(t)
    }
}

/// Value -> color classification derived once per build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColorScale {
    Threshold(ThresholdScale),
    Diverging(DivergingColorScale),
}

impl ColorScale {
    /// Derives the scale from configuration and the color indicator extent.
    ///
    /// - colors + thresholds: explicit step function.
    /// - colors only: auto-derived thresholds over the fixed six-color palette.
    /// - thresholds only: linear diverging over `[min, 0, max]`.
    /// - neither: reversed symlog diverging over `[min, max / 2, max]`, niced.
    pub fn build(config: &ColorScaleConfig, extent: (f64, f64)) -> DorlingResult<Self> {
        config.validate()?;
        let (min, max) = extent;
        if !min.is_finite() || !max.is_finite() {
            return Err(DorlingError::InvalidData(
                "color extent must be finite".to_owned(),
            ));
        }

        let scale = match (&config.colors, &config.thresholds) {
            (Some(colors), Some(thresholds)) => {
                Self::Threshold(threshold_with_coverage(thresholds.clone(), colors.clone(), extent)?)
            }
            (Some(_), None) => {
                let thresholds = auto_thresholds(extent);
                Self::Threshold(threshold_with_coverage(
                    thresholds,
                    auto_threshold_palette(),
                    extent,
                )?)
            }
            (None, Some(_)) => Self::Diverging(DivergingColorScale::new(
                DivergingScale::new(min, 0.0, max, ScaleTransform::Identity)?,
                config.scheme,
                false,
            )),
            (None, None) => Self::Diverging(DivergingColorScale::new(
                DivergingScale::new(min, max / 2.0, max, ScaleTransform::Symlog)?.nice(),
                config.scheme,
                true,
            )),
        };

        debug!(
            kind = scale.kind_name(),
            min,
            max,
            "built color scale"
        );
        Ok(scale)
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Threshold(_) => "threshold",
            Self::Diverging(_) => "diverging",
        }
    }

    #[must_use]
    pub fn is_threshold(&self) -> bool {
        matches!(self, Self::Threshold(_))
    }

    #[must_use]
    pub fn color(&self, value: f64) -> Color {
        match self {
            Self::Threshold(scale) => scale.color(value),
            Self::Diverging(scale) => scale.color(value),
        }
    }

    /// Missing values map to the unknown color.
    #[must_use]
    pub fn color_for(&self, value: Option<f64>) -> Color {
        value.map_or(Color::UNKNOWN, |value| self.color(value))
    }

    #[must_use]
    pub fn threshold_classes(&self) -> Vec<ColorClass> {
        match self {
            Self::Threshold(scale) => scale.classes(),
            Self::Diverging(_) => Vec::new(),
        }
    }

    /// Legend rows: one per class for threshold scales, otherwise `cells`
    /// evenly spaced samples across the domain labelled with one decimal.
    #[must_use]
    pub fn legend_entries(&self, cells: usize, delimiter: &str) -> Vec<LegendEntry> {
        match self {
            Self::Threshold(scale) => scale
                .classes()
                .into_iter()
                .map(|class| LegendEntry {
                    color: class.color,
                    label: class.label(delimiter),
                })
                .collect(),
            Self::Diverging(scale) => {
                let [low, _, high] = scale.scale().domain();
                let last = cells.saturating_sub(1).max(1) as f64;
                (0..cells)
                    .map(|i| {
                        let value = low + (high - low) * i as f64 / last;
                        LegendEntry {
                            color: scale.color(value),
                            label: format!("{value:.1}"),
                        }
                    })
                    .collect()
            }
        }
    }
}

fn threshold_with_coverage(
    thresholds: Vec<f64>,
    colors: Vec<Color>,
    extent: (f64, f64),
) -> DorlingResult<ThresholdScale> {
    let first = thresholds.first().copied().unwrap_or(extent.0);
    let last = thresholds.last().copied().unwrap_or(extent.1);
    let coverage_min = extent.0.min(first);
    let coverage_max = extent.1.max(last);
    Ok(ThresholdScale::new(thresholds, colors)?.with_coverage(coverage_min, coverage_max))
}
