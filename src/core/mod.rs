pub mod color;
pub mod color_scale;
pub mod color_scheme;
pub mod countries;
pub mod primitives;
pub mod radius;
pub mod scale;
pub mod stats;
pub mod types;

pub use color::Color;
pub use color_scale::{ColorClass, ColorScale, ColorScaleConfig, LegendEntry, ThresholdScale};
pub use color_scheme::ColorScheme;
pub use radius::RadiusFunction;
pub use scale::{DivergingScale, ScaleTransform};
pub use stats::{
    CountryTotals, IndexedIndicator, IndicatorMap, IndicatorRequest, StatResponse,
    StatisticalIndexer,
};
pub use types::{Point, RegionAnchor, RegionId};
