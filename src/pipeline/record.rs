use std::collections::BTreeMap;

use ahash::AHashMap;
use geo::MultiPolygon;

use crate::{cells::CellId, classify::Category, density::LocalMetrics, pipeline::Diagnostics};

/// Final per-cell output: measured values, local metrics, categories, and
/// everything passed through for export.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRecord {
    pub id: CellId,
    pub pop: f64,
    pub area_km2: f64,
    /// `None` when the local area was degenerate.
    pub metrics: Option<LocalMetrics>,
    /// Category from the threshold table, before overrides.
    pub base_category: Category,
    pub category: Category,
    /// Position of the override rule that set `category`, if any.
    pub override_rule: Option<usize>,
    pub neighbors: usize,
    pub attributes: BTreeMap<String, String>,
    pub geometry: MultiPolygon<f64>,
}

impl CellRecord {
    #[inline] pub fn pop_local(&self) -> Option<f64> { self.metrics.map(|m| m.pop_local) }

    #[inline] pub fn area_local(&self) -> Option<f64> { self.metrics.map(|m| m.area_local) }

    #[inline] pub fn density(&self) -> Option<f64> { self.metrics.map(|m| m.density) }
}

/// Number of cells and total population in one category.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryTotals {
    pub cells: usize,
    pub pop: f64,
}

/// The immutable result of a run: one record per classified cell, in input
/// order, plus the diagnostics report.
#[derive(Debug, Clone)]
pub struct Classification {
    records: Vec<CellRecord>,
    index: AHashMap<CellId, usize>,
    diagnostics: Diagnostics,
}

impl Classification {
    pub(crate) fn new(records: Vec<CellRecord>, diagnostics: Diagnostics) -> Self {
        Self {
            index: records.iter().enumerate().map(|(i, record)| (record.id.clone(), i)).collect(),
            records,
            diagnostics,
        }
    }

    #[inline] pub fn records(&self) -> &[CellRecord] { &self.records }

    #[inline] pub fn diagnostics(&self) -> &Diagnostics { &self.diagnostics }

    #[inline] pub fn len(&self) -> usize { self.records.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Look up a cell's record by id.
    pub fn get(&self, id: &CellId) -> Option<&CellRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// Final category of a cell, if it was classified.
    #[inline]
    pub fn category(&self, id: &CellId) -> Option<Category> { self.get(id).map(|record| record.category) }

    /// Cell counts and population per final category.
    pub fn summary(&self) -> BTreeMap<Category, CategoryTotals> {
        let mut summary = BTreeMap::<Category, CategoryTotals>::new();
        for record in &self.records {
            let totals = summary.entry(record.category).or_default();
            totals.cells += 1;
            totals.pop += record.pop;
        }
        summary
    }

    /// Split into records and diagnostics.
    pub fn into_parts(self) -> (Vec<CellRecord>, Diagnostics) { (self.records, self.diagnostics) }
}
