use std::collections::BTreeMap;

use geo::MultiPolygon;

use super::CellId;

/// A single grid cell: measured population and area, its polygon, and the
/// categorical attributes used by override rules and downstream labeling.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: CellId,
    pub pop: f64,
    pub area_km2: f64,
    pub geometry: MultiPolygon<f64>,
    pub attributes: BTreeMap<String, String>, // e.g. region id, region name, subdivision name
}

impl Cell {
    pub fn new(id: impl Into<CellId>, pop: f64, area_km2: f64, geometry: MultiPolygon<f64>) -> Self {
        Self { id: id.into(), pop, area_km2, geometry, attributes: BTreeMap::new() }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute by name.
    #[inline]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// True if the population is missing (non-finite), equals the no-data
    /// sentinel, or is zero when `zero_is_no_data` is set.
    /// Such cells (water bodies, masked areas) never enter the neighbor graph.
    pub fn is_no_data(&self, sentinel: Option<f64>, zero_is_no_data: bool) -> bool {
        !self.pop.is_finite()
            || (zero_is_no_data && self.pop == 0.0)
            || sentinel.is_some_and(|value| self.pop == value)
    }
}
