use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::DorlingConfig;
use crate::core::color::Color;
use crate::core::color_scale::ColorScale;
use crate::core::countries::country_name;
use crate::core::primitives::round_to_one_decimal;
use crate::core::radius::RadiusFunction;
use crate::core::stats::{
    CountryTotals, IndexedIndicator, IndicatorMap, IndicatorRequest, StatResponse,
};
use crate::core::types::{Point, RegionAnchor, RegionId, country_code};
use crate::error::{DorlingError, DorlingResult};
use crate::simulation::SimulationNode;

/// Raw inputs of one build: projected anchors plus statistics responses.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildInput {
    pub regions: Vec<RegionAnchor>,
    pub size: StatResponse,
    pub color: StatResponse,
    /// Denominators for percentage colors.
    pub color_totals: Option<StatResponse>,
}

impl BuildInput {
    #[must_use]
    pub fn new(regions: Vec<RegionAnchor>, size: StatResponse, color: StatResponse) -> Self {
        Self {
            regions,
            size,
            color,
            color_totals: None,
        }
    }

    #[must_use]
    pub fn with_color_totals(mut self, totals: StatResponse) -> Self {
        self.color_totals = Some(totals);
        self
    }
}

/// A region that takes part in the cartogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncludedRegion {
    pub id: RegionId,
    pub name: Option<String>,
    pub anchor: Point,
    pub size_value: f64,
    pub color_value: f64,
    pub radius: f64,
    pub color: Color,
}

/// Tooltip data for one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub id: RegionId,
    pub name: Option<String>,
    pub country_code: String,
    pub country_name: Option<&'static str>,
    pub size_value: f64,
    pub color_value: f64,
    /// Share of the country's size total in percent, one decimal.
    pub share_of_country: Option<f64>,
}

/// Immutable result of one build cycle.
///
/// Rebuilding produces a new snapshot; readers holding the previous one keep
/// a consistent view.
#[derive(Debug, Clone, PartialEq)]
pub struct CartogramData {
    size_indicator: IndicatorMap,
    color_indicator: IndicatorMap,
    country_totals: CountryTotals,
    color_scale: ColorScale,
    radius_function: RadiusFunction,
    regions: Vec<IncludedRegion>,
}

impl CartogramData {
    /// Runs the indexing pipeline and derives radii, colors and scales.
    pub fn build(config: &DorlingConfig, input: &BuildInput) -> DorlingResult<Self> {
        config.validate()?;
        let indexer = config.indexer();
        let radius_function = config.radius_function()?;

        let (size_indicator, country_totals) =
            match indexer.index(IndicatorRequest::Size(&input.size)) {
                IndexedIndicator::Size {
                    values,
                    country_totals,
                } => (values, country_totals),
                IndexedIndicator::Color { values } => (values, CountryTotals::default()),
            };

        let percentage_of = match (&config.color_percentage_dataset, &input.color_totals) {
            (Some(_), Some(totals)) => Some(totals),
            (Some(dataset), None) => {
                return Err(DorlingError::InvalidConfig(format!(
                    "percentage colors need the `{}` totals response",
                    dataset.code
                )));
            }
            (None, Some(_)) => {
                warn!("color totals supplied without percentage mode; ignoring them");
                None
            }
            (None, None) => None,
        };
        let color_indicator = indexer
            .index(IndicatorRequest::Color {
                values: &input.color,
                percentage_of,
            })
            .values()
            .clone();

        let color_extent = color_indicator.extent().unwrap_or((0.0, 0.0));
        let color_scale = ColorScale::build(&config.color_scale, color_extent)?;

        let labels = input.size.region_labels();
        let mut seen: HashSet<&str> = HashSet::with_capacity(input.regions.len());
        let mut regions = Vec::with_capacity(input.regions.len());
        let mut without_data = 0_usize;
        for anchor in &input.regions {
            if !seen.insert(anchor.id.as_str()) {
                warn!(region = %anchor.id, "duplicate region anchor skipped");
                continue;
            }
            if indexer.is_excluded_country(&anchor.id) {
                continue;
            }
            let (Some(size_value), Some(color_value)) = (
                size_indicator.get(&anchor.id),
                color_indicator.get(&anchor.id),
            ) else {
                without_data += 1;
                continue;
            };
            regions.push(IncludedRegion {
                id: anchor.id.clone(),
                name: anchor
                    .name
                    .clone()
                    .or_else(|| labels.get(&anchor.id).cloned()),
                anchor: anchor.anchor,
                size_value,
                color_value,
                radius: radius_function.radius(size_value),
                color: color_scale.color(color_value),
            });
        }

        debug!(
            anchors = input.regions.len(),
            included = regions.len(),
            without_data,
            size_regions = size_indicator.len(),
            color_regions = color_indicator.len(),
            "built cartogram data"
        );

        Ok(Self {
            size_indicator,
            color_indicator,
            country_totals,
            color_scale,
            radius_function,
            regions,
        })
    }

    #[must_use]
    pub fn size_indicator(&self) -> &IndicatorMap {
        &self.size_indicator
    }

    #[must_use]
    pub fn color_indicator(&self) -> &IndicatorMap {
        &self.color_indicator
    }

    #[must_use]
    pub fn country_totals(&self) -> &CountryTotals {
        &self.country_totals
    }

    #[must_use]
    pub fn color_scale(&self) -> &ColorScale {
        &self.color_scale
    }

    #[must_use]
    pub fn radius_function(&self) -> RadiusFunction {
        self.radius_function
    }

    #[must_use]
    pub fn regions(&self) -> &[IncludedRegion] {
        &self.regions
    }

    #[must_use]
    pub fn region(&self, id: &str) -> Option<&IncludedRegion> {
        self.regions.iter().find(|region| region.id == id)
    }

    #[must_use]
    pub fn included_ids(&self) -> Vec<&str> {
        self.regions.iter().map(|region| region.id.as_str()).collect()
    }

    /// Fresh simulation nodes sitting on their anchors.
    #[must_use]
    pub fn nodes(&self) -> Vec<SimulationNode> {
        self.regions
            .iter()
            .map(|region| SimulationNode::new(region.id.clone(), region.anchor, region.radius))
            .collect()
    }

    #[must_use]
    pub fn region_summary(&self, id: &str) -> Option<RegionSummary> {
        let region = self.region(id)?;
        let country = country_code(&region.id);
        Some(RegionSummary {
            id: region.id.clone(),
            name: region.name.clone(),
            country_code: country.to_owned(),
            country_name: country_name(country),
            size_value: region.size_value,
            color_value: region.color_value,
            share_of_country: self
                .country_totals
                .share_percent(&region.id, region.size_value)
                .map(round_to_one_decimal),
        })
    }

    /// Reference values for the size legend: the maximum, half and a tenth
    /// of it, floored.
    #[must_use]
    pub fn size_legend_values(&self) -> Vec<f64> {
        match self.size_indicator.extent() {
            Some((_, max)) => vec![max.floor(), (max / 2.0).floor(), (max / 10.0).floor()],
            None => Vec::new(),
        }
    }

    /// Regions drawn with `color`, e.g. for legend hover highlighting.
    pub fn regions_with_color(&self, color: Color) -> impl Iterator<Item = &IncludedRegion> + '_ {
        self.regions
            .iter()
            .filter(move |region| region.color == color)
    }
}
