//! Statistics indexing: raw JSON-stat responses to per-region indicators.
//!
//! A response carries a sparse `value` array and a `geo` dimension that maps
//! region codes to array positions. Indexing resolves every region code to
//! `Some(value)` or `None` (missing, non-numeric or non-finite). Size
//! indicators additionally yield per-country totals and drop excluded or
//! aggregate codes; color indicators can be expressed as a percentage of a
//! second dataset.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::primitives::value_extent;
use super::types::{RegionId, country_code};
use crate::error::{DorlingError, DorlingResult};

/// Aggregate-code marker removed from size indicators by default.
pub const DEFAULT_AGGREGATE_MARKERS: [&str; 1] = ["EU"];

/// Raw statistics response (JSON-stat subset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatResponse {
    pub dimension: StatDimensions,
    pub value: StatValues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatDimensions {
    pub geo: GeoDimension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoDimension {
    pub category: GeoCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCategory {
    pub index: CategoryIndex,
    #[serde(default)]
    pub label: IndexMap<String, String>,
}

/// Region code -> value position, either explicit or implied by list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryIndex {
    Positions(IndexMap<String, usize>),
    Ids(Vec<String>),
}

/// Value payload: sparse object keyed by stringified position, or dense array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValues {
    Sparse(IndexMap<String, Value>),
    Dense(Vec<Value>),
}

impl StatResponse {
    pub fn from_json_str(input: &str) -> DorlingResult<Self> {
        serde_json::from_str(input).map_err(|e| DorlingError::DataFormat(e.to_string()))
    }

    pub fn from_value(value: Value) -> DorlingResult<Self> {
        serde_json::from_value(value).map_err(|e| DorlingError::DataFormat(e.to_string()))
    }

    /// Builds a response from `(region, value)` pairs; positions follow order.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<f64>)>,
        S: Into<String>,
    {
        let mut index = IndexMap::new();
        let mut values = IndexMap::new();
        for (position, (id, value)) in entries.into_iter().enumerate() {
            index.insert(id.into(), position);
            if let Some(value) = value {
                values.insert(position.to_string(), Value::from(value));
            }
        }
        Self {
            dimension: StatDimensions {
                geo: GeoDimension {
                    category: GeoCategory {
                        index: CategoryIndex::Positions(index),
                        label: IndexMap::new(),
                    },
                },
            },
            value: StatValues::Sparse(values),
        }
    }

    /// Numeric value stored at `position`, if any.
    #[must_use]
    pub fn value_at(&self, position: usize) -> Option<f64> {
        let raw = match &self.value {
            StatValues::Sparse(values) => values.get(&position.to_string()),
            StatValues::Dense(values) => values.get(position),
        }?;
        coerce_number(raw)
    }

    /// Region codes with their resolved values, in dimension order.
    pub fn entries(&self) -> Box<dyn Iterator<Item = (&str, Option<f64>)> + '_> {
        match &self.dimension.geo.category.index {
            CategoryIndex::Positions(index) => Box::new(
                index
                    .iter()
                    .map(move |(id, position)| (id.as_str(), self.value_at(*position))),
            ),
            CategoryIndex::Ids(ids) => Box::new(
                ids.iter()
                    .enumerate()
                    .map(move |(position, id)| (id.as_str(), self.value_at(position))),
            ),
        }
    }

    /// Region display names from the `geo` dimension labels.
    #[must_use]
    pub fn region_labels(&self) -> &IndexMap<String, String> {
        &self.dimension.geo.category.label
    }
}

fn coerce_number(raw: &Value) -> Option<f64> {
    let number = match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Region -> optional numeric indicator, in source order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorMap {
    values: IndexMap<RegionId, Option<f64>>,
}

impl IndicatorMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<RegionId>, value: Option<f64>) {
        self.values.insert(id.into(), value.filter(|v| v.is_finite()));
    }

    /// Indicator value; `None` when the region is absent or has no data.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied().flatten()
    }

    /// Whether the region has an entry, with or without data.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    #[must_use]
    pub fn has_value(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> + '_ {
        self.values.iter().map(|(id, value)| (id.as_str(), *value))
    }

    pub fn present_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.values().filter_map(|value| *value)
    }

    #[must_use]
    pub fn extent(&self) -> Option<(f64, f64)> {
        value_extent(self.present_values())
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, Option<f64>) -> bool) {
        self.values.retain(|id, value| keep(id, *value));
    }
}

impl<S: Into<RegionId>> FromIterator<(S, Option<f64>)> for IndicatorMap {
    fn from_iter<T: IntoIterator<Item = (S, Option<f64>)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (id, value) in iter {
            map.insert(id, value);
        }
        map
    }
}

/// Sum of the size indicator per 2-letter country code.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryTotals {
    totals: IndexMap<String, f64>,
}

impl CountryTotals {
    #[must_use]
    pub fn get(&self, country: &str) -> Option<f64> {
        self.totals.get(country).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.totals.iter().map(|(code, total)| (code.as_str(), *total))
    }

    /// `value` as a percentage of the total of the region's country.
    #[must_use]
    pub fn share_percent(&self, region_id: &str, value: f64) -> Option<f64> {
        let total = self.get(country_code(region_id))?;
        if total == 0.0 {
            return None;
        }
        let share = value / total * 100.0;
        share.is_finite().then_some(share)
    }
}

/// Groups by the first two characters of each id and sums present values.
///
/// No filtering happens here; callers drop aggregate codes beforehand when
/// they must not count.
#[must_use]
pub fn country_totals(indicator: &IndicatorMap) -> CountryTotals {
    let mut totals: IndexMap<String, f64> = IndexMap::new();
    for (id, value) in indicator.iter() {
        *totals.entry(country_code(id).to_owned()).or_insert(0.0) += value.unwrap_or(0.0);
    }
    CountryTotals { totals }
}

/// `values / totals * 100`, joined by region id.
///
/// Every id of `values` is kept; the result is `None` unless both operands
/// are present and the total is non-zero. Ids only present in `totals` are
/// ignored, so membership and order may differ between the two sides.
#[must_use]
pub fn percentage_of(values: &IndicatorMap, totals: &IndicatorMap) -> IndicatorMap {
    values
        .iter()
        .map(|(id, value)| {
            let percentage = match (value, totals.get(id)) {
                (Some(value), Some(total)) if total != 0.0 => {
                    Some(value / total * 100.0).filter(|p| p.is_finite())
                }
                _ => None,
            };
            (id.to_owned(), percentage)
        })
        .collect()
}

/// What to index, and how to normalize it.
#[derive(Debug, Clone, Copy)]
pub enum IndicatorRequest<'a> {
    Size(&'a StatResponse),
    Color {
        values: &'a StatResponse,
        percentage_of: Option<&'a StatResponse>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexedIndicator {
    Size {
        values: IndicatorMap,
        country_totals: CountryTotals,
    },
    Color {
        values: IndicatorMap,
    },
}

impl IndexedIndicator {
    #[must_use]
    pub fn values(&self) -> &IndicatorMap {
        match self {
            Self::Size { values, .. } | Self::Color { values } => values,
        }
    }
}

/// Converts statistics responses into indicator maps.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticalIndexer {
    excluded_countries: Vec<String>,
    aggregate_markers: Vec<String>,
}

impl Default for StatisticalIndexer {
    fn default() -> Self {
        Self {
            excluded_countries: Vec::new(),
            aggregate_markers: DEFAULT_AGGREGATE_MARKERS
                .iter()
                .map(|marker| (*marker).to_owned())
                .collect(),
        }
    }
}

impl StatisticalIndexer {
    #[must_use]
    pub fn new(excluded_countries: Vec<String>, aggregate_markers: Vec<String>) -> Self {
        Self {
            excluded_countries,
            aggregate_markers,
        }
    }

    #[must_use]
    pub fn with_excluded_countries(mut self, excluded_countries: Vec<String>) -> Self {
        self.excluded_countries = excluded_countries;
        self
    }

    #[must_use]
    pub fn excluded_countries(&self) -> &[String] {
        &self.excluded_countries
    }

    #[must_use]
    pub fn is_excluded_country(&self, region_id: &str) -> bool {
        let country = country_code(region_id);
        self.excluded_countries.iter().any(|code| code == country)
    }

    #[must_use]
    pub fn is_aggregate(&self, region_id: &str) -> bool {
        self.aggregate_markers
            .iter()
            .any(|marker| !marker.is_empty() && region_id.contains(marker.as_str()))
    }

    /// Plain `region -> value` map of a response.
    #[must_use]
    pub fn index_response(response: &StatResponse) -> IndicatorMap {
        response
            .entries()
            .map(|(id, value)| (id.to_owned(), value))
            .collect()
    }

    #[must_use]
    pub fn index(&self, request: IndicatorRequest<'_>) -> IndexedIndicator {
        match request {
            IndicatorRequest::Size(response) => {
                let raw = Self::index_response(response);
                let country_totals = country_totals(&raw);
                let values = self.apply_size_exclusions(raw);
                debug!(
                    regions = values.len(),
                    countries = country_totals.len(),
                    "indexed size indicator"
                );
                IndexedIndicator::Size {
                    values,
                    country_totals,
                }
            }
            IndicatorRequest::Color {
                values,
                percentage_of: totals,
            } => {
                let raw = Self::index_response(values);
                let values = match totals {
                    Some(totals) => {
                        let totals = Self::index_response(totals);
                        let joined = percentage_of(&raw, &totals);
                        debug!(
                            regions = joined.len(),
                            denominators = totals.len(),
                            "indexed color indicator as percentage"
                        );
                        joined
                    }
                    None => {
                        debug!(regions = raw.len(), "indexed color indicator");
                        raw
                    }
                };
                IndexedIndicator::Color { values }
            }
        }
    }

    /// Drops excluded countries and aggregate codes from a size indicator.
    #[must_use]
    pub fn apply_size_exclusions(&self, mut indicator: IndicatorMap) -> IndicatorMap {
        indicator.retain(|id, _| !self.is_excluded_country(id) && !self.is_aggregate(id));
        indicator
    }
}
