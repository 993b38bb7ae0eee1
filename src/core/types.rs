use serde::{Deserialize, Serialize};

use crate::error::{DorlingError, DorlingResult};

/// Region identifier, e.g. a NUTS code such as `"FR10"`.
pub type RegionId = String;

/// 2-D point in projected screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A region as supplied by the geometry source: id plus projected centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAnchor {
    pub id: RegionId,
    #[serde(default)]
    pub name: Option<String>,
    pub anchor: Point,
}

impl RegionAnchor {
    pub fn new(id: impl Into<RegionId>, anchor: Point) -> DorlingResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(DorlingError::InvalidData(
                "region id must not be empty".to_owned(),
            ));
        }
        if !anchor.is_finite() {
            return Err(DorlingError::InvalidData(format!(
                "anchor of region `{id}` must be finite"
            )));
        }
        Ok(Self {
            id,
            name: None,
            anchor,
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn country_code(&self) -> &str {
        country_code(&self.id)
    }
}

/// Returns the 2-letter country prefix of a region id.
///
/// Ids shorter than two characters are returned unchanged.
#[must_use]
pub fn country_code(id: &str) -> &str {
    match id.char_indices().nth(2) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, RegionAnchor, country_code};

    #[test]
    fn country_code_takes_two_leading_chars() {
        assert_eq!(country_code("FR10"), "FR");
        assert_eq!(country_code("DE"), "DE");
        assert_eq!(country_code("D"), "D");
        assert_eq!(country_code("EU27_2020"), "EU");
    }

    #[test]
    fn anchor_rejects_non_finite_position() {
        let err = RegionAnchor::new("FR1", Point::new(f64::NAN, 1.0)).expect_err("nan anchor");
        assert!(format!("{err}").contains("FR1"));
    }
}
