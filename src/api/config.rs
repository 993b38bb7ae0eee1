use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::color_scale::ColorScaleConfig;
use crate::core::radius::{DEFAULT_EXAGGERATION_FACTOR, RadiusFunction};
use crate::core::stats::{DEFAULT_AGGREGATE_MARKERS, StatisticalIndexer};
use crate::error::{DorlingError, DorlingResult};
use crate::simulation::ForceConfig;

pub const DEFAULT_STATISTICS_BASE_URL: &str =
    "https://ec.europa.eu/eurostat/wdds/rest/data/v2.1/json/en/";
pub const DEFAULT_NUTS_LEVEL: u8 = 2;
pub const MAX_NUTS_LEVEL: u8 = 3;

/// A statistics dataset code plus its query filters
/// (`"sex=T&age=TOTAL&unit=NR&time=2018"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSelection {
    pub code: String,
    #[serde(default)]
    pub filters: String,
}

impl DatasetSelection {
    #[must_use]
    pub fn new(code: impl Into<String>, filters: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            filters: filters.into(),
        }
    }

    /// Query URL for this dataset at the given NUTS level.
    #[must_use]
    pub fn query_url(&self, base_url: &str, nuts_level: u8) -> String {
        let geo_level = if nuts_level == 0 {
            "country".to_owned()
        } else {
            format!("nuts{nuts_level}")
        };
        let mut url = format!("{base_url}{}?geoLevel={geo_level}", self.code);
        let filters = self.filters.trim_start_matches('&');
        if !filters.is_empty() {
            url.push('&');
            url.push_str(filters);
        }
        url
    }

    fn validate(&self, role: &str) -> DorlingResult<()> {
        if self.code.trim().is_empty() {
            return Err(DorlingError::InvalidConfig(format!(
                "{role} dataset code must not be empty"
            )));
        }
        Ok(())
    }
}

/// Playback timing of the geographic/cartogram cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationBehavior {
    /// Start playing right after a build.
    #[serde(default = "default_true")]
    pub autoplay: bool,
    /// Return to the geographic view after each converged run.
    #[serde(default = "default_true")]
    pub loop_animation: bool,
    #[serde(default = "default_dwell_ms")]
    pub dwell_ms: u64,
    #[serde(default = "default_fade_in_ms")]
    pub fade_in_ms: u64,
    #[serde(default = "default_fade_out_ms")]
    pub fade_out_ms: u64,
    /// Simulation ticks performed per `advance` call.
    #[serde(default = "default_ticks_per_advance")]
    pub ticks_per_advance: u32,
}

impl Default for AnimationBehavior {
    fn default() -> Self {
        Self {
            autoplay: true,
            loop_animation: true,
            dwell_ms: default_dwell_ms(),
            fade_in_ms: default_fade_in_ms(),
            fade_out_ms: default_fade_out_ms(),
            ticks_per_advance: default_ticks_per_advance(),
        }
    }
}

impl AnimationBehavior {
    #[must_use]
    pub fn dwell(self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    #[must_use]
    pub fn fade_in(self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    #[must_use]
    pub fn fade_out(self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }
}

/// Immutable build-time configuration of a cartogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DorlingConfig {
    #[serde(default = "default_nuts_level")]
    pub nuts_level: u8,
    #[serde(default = "default_size_dataset")]
    pub size_dataset: DatasetSelection,
    #[serde(default = "default_color_dataset")]
    pub color_dataset: DatasetSelection,
    /// Denominator dataset; when set, colors encode `value / total * 100`.
    #[serde(default)]
    pub color_percentage_dataset: Option<DatasetSelection>,
    /// Country codes whose regions are dropped from the cartogram.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Substrings identifying supranational aggregate codes.
    #[serde(default = "default_aggregate_markers")]
    pub aggregate_markers: Vec<String>,
    #[serde(default = "default_exaggeration_factor")]
    pub circle_exaggeration_factor: f64,
    #[serde(default)]
    pub force: ForceConfig,
    #[serde(default)]
    pub color_scale: ColorScaleConfig,
    #[serde(default)]
    pub animation: AnimationBehavior,
    #[serde(default = "default_statistics_base_url")]
    pub statistics_base_url: String,
}

impl Default for DorlingConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DorlingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nuts_level: DEFAULT_NUTS_LEVEL,
            size_dataset: default_size_dataset(),
            color_dataset: default_color_dataset(),
            color_percentage_dataset: None,
            exclude: Vec::new(),
            aggregate_markers: default_aggregate_markers(),
            circle_exaggeration_factor: DEFAULT_EXAGGERATION_FACTOR,
            force: ForceConfig::default(),
            color_scale: ColorScaleConfig::default(),
            animation: AnimationBehavior::default(),
            statistics_base_url: default_statistics_base_url(),
        }
    }

    #[must_use]
    pub fn with_nuts_level(mut self, nuts_level: u8) -> Self {
        self.nuts_level = nuts_level;
        self
    }

    #[must_use]
    pub fn with_size_dataset(mut self, dataset: DatasetSelection) -> Self {
        self.size_dataset = dataset;
        self
    }

    #[must_use]
    pub fn with_color_dataset(mut self, dataset: DatasetSelection) -> Self {
        self.color_dataset = dataset;
        self
    }

    /// Switches colors to a percentage of `totals` (or back with `None`).
    #[must_use]
    pub fn with_color_percentage_dataset(mut self, totals: Option<DatasetSelection>) -> Self {
        self.color_percentage_dataset = totals;
        self
    }

    #[must_use]
    pub fn with_exclude(mut self, countries: Vec<String>) -> Self {
        self.exclude = countries;
        self
    }

    #[must_use]
    pub fn with_aggregate_markers(mut self, markers: Vec<String>) -> Self {
        self.aggregate_markers = markers;
        self
    }

    #[must_use]
    pub fn with_circle_exaggeration_factor(mut self, factor: f64) -> Self {
        self.circle_exaggeration_factor = factor;
        self
    }

    #[must_use]
    pub fn with_force(mut self, force: ForceConfig) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub fn with_position_strength(mut self, strength: f64) -> Self {
        self.force.position_strength = strength;
        self
    }

    #[must_use]
    pub fn with_collision_strength(mut self, strength: f64) -> Self {
        self.force.collision_strength = strength;
        self
    }

    #[must_use]
    pub fn with_collision_padding(mut self, padding: f64) -> Self {
        self.force.collision_padding = padding;
        self
    }

    #[must_use]
    pub fn with_color_scale(mut self, color_scale: ColorScaleConfig) -> Self {
        self.color_scale = color_scale;
        self
    }

    #[must_use]
    pub fn with_animation(mut self, animation: AnimationBehavior) -> Self {
        self.animation = animation;
        self
    }

    #[must_use]
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.animation.autoplay = autoplay;
        self
    }

    #[must_use]
    pub fn with_loop(mut self, loop_animation: bool) -> Self {
        self.animation.loop_animation = loop_animation;
        self
    }

    #[must_use]
    pub fn with_dwell(mut self, dwell: Duration) -> Self {
        self.animation.dwell_ms = u64::try_from(dwell.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_statistics_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.statistics_base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn is_color_percentage(&self) -> bool {
        self.color_percentage_dataset.is_some()
    }

    pub fn validate(&self) -> DorlingResult<()> {
        if self.nuts_level > MAX_NUTS_LEVEL {
            return Err(DorlingError::InvalidConfig(format!(
                "nuts level must be within 0..={MAX_NUTS_LEVEL}"
            )));
        }
        self.size_dataset.validate("size")?;
        self.color_dataset.validate("color")?;
        if let Some(totals) = &self.color_percentage_dataset {
            totals.validate("color percentage")?;
        }
        if self.exclude.iter().any(|code| code.trim().is_empty()) {
            return Err(DorlingError::InvalidConfig(
                "excluded country codes must not be empty".to_owned(),
            ));
        }
        if !self.circle_exaggeration_factor.is_finite() || self.circle_exaggeration_factor <= 0.0 {
            return Err(DorlingError::InvalidConfig(
                "circle exaggeration factor must be finite and > 0".to_owned(),
            ));
        }
        if self.animation.ticks_per_advance == 0 {
            return Err(DorlingError::InvalidConfig(
                "ticks per advance must be >= 1".to_owned(),
            ));
        }
        self.force.validate()?;
        self.color_scale.validate()
    }

    pub fn radius_function(&self) -> DorlingResult<RadiusFunction> {
        RadiusFunction::new(self.circle_exaggeration_factor)
    }

    #[must_use]
    pub fn indexer(&self) -> StatisticalIndexer {
        StatisticalIndexer::new(self.exclude.clone(), self.aggregate_markers.clone())
    }

    #[must_use]
    pub fn size_query_url(&self) -> String {
        self.size_dataset
            .query_url(&self.statistics_base_url, self.nuts_level)
    }

    #[must_use]
    pub fn color_query_url(&self) -> String {
        self.color_dataset
            .query_url(&self.statistics_base_url, self.nuts_level)
    }

    #[must_use]
    pub fn color_percentage_query_url(&self) -> Option<String> {
        self.color_percentage_dataset
            .as_ref()
            .map(|totals| totals.query_url(&self.statistics_base_url, self.nuts_level))
    }

    pub fn to_json_pretty(&self) -> DorlingResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            DorlingError::InvalidConfig(format!("failed to serialize config json: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> DorlingResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            DorlingError::InvalidConfig(format!("failed to parse config json: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }
}

fn default_true() -> bool {
    true
}

fn default_dwell_ms() -> u64 {
    2_000
}

fn default_fade_in_ms() -> u64 {
    1_000
}

fn default_fade_out_ms() -> u64 {
    500
}

fn default_ticks_per_advance() -> u32 {
    1
}

fn default_nuts_level() -> u8 {
    DEFAULT_NUTS_LEVEL
}

fn default_size_dataset() -> DatasetSelection {
    DatasetSelection::new("demo_r_pjangrp3", "sex=T&age=TOTAL&unit=NR&time=2018")
}

fn default_color_dataset() -> DatasetSelection {
    DatasetSelection::new("demo_r_gind3", "indic_de=GROWRT&time=2018")
}

fn default_aggregate_markers() -> Vec<String> {
    DEFAULT_AGGREGATE_MARKERS
        .iter()
        .map(|marker| (*marker).to_owned())
        .collect()
}

fn default_exaggeration_factor() -> f64 {
    DEFAULT_EXAGGERATION_FACTOR
}

fn default_statistics_base_url() -> String {
    DEFAULT_STATISTICS_BASE_URL.to_owned()
}
