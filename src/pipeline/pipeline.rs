use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    cells::{Cell, CellId},
    classify::{Category, Thresholds},
    config::Config,
    density::{aggregate, LocalMetrics},
    error::Result,
    geom::AdjacencyBuilder,
    graph::normalize,
    overrides::{Applied, OverrideEngine},
    pipeline::{CellRecord, Classification, Diagnostics},
};

/// The classification stages, compiled from a validated configuration.
///
/// Each run is a chain of pure stages over the input cells:
/// no-data filter → adjacency → weights → local metrics → thresholds → overrides.
#[derive(Debug, Clone)]
pub struct Pipeline {
    adjacency: AdjacencyBuilder,
    thresholds: Thresholds,
    overrides: OverrideEngine,
    no_data_value: Option<f64>,
    zero_is_no_data: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_stages(AdjacencyBuilder::default(), Thresholds::default(), OverrideEngine::default())
    }
}

impl Pipeline {
    /// Validate the configuration. Any threshold, rule or adjacency error is
    /// fatal here, before a single cell is processed.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            adjacency: AdjacencyBuilder::new(config.adjacency_mode, config.adjacency_strategy.clone())?,
            thresholds: Thresholds::new(config.thresholds.clone())?,
            overrides: OverrideEngine::new(config.override_rules.clone())?,
            no_data_value: config.no_data_value,
            zero_is_no_data: config.zero_is_no_data,
        })
    }

    /// Assemble a pipeline from already-validated stages, with the default
    /// no-data policy (null or zero population).
    pub fn from_stages(adjacency: AdjacencyBuilder, thresholds: Thresholds, overrides: OverrideEngine) -> Self {
        Self { adjacency, thresholds, overrides, no_data_value: None, zero_is_no_data: true }
    }

    #[inline] pub fn thresholds(&self) -> &Thresholds { &self.thresholds }

    #[inline] pub fn overrides(&self) -> &OverrideEngine { &self.overrides }

    /// Classify a cell collection.
    ///
    /// Fails only on duplicate cell ids. Malformed polygons and degenerate
    /// areas are per-cell: they are reported in the diagnostics and the rest
    /// of the cells are classified as usual.
    pub fn run(&self, cells: Vec<Cell>) -> Result<Classification> {
        let total = cells.len();
        let (cells, no_data) = drop_no_data(cells, self.no_data_value, self.zero_is_no_data);
        info!("[pipeline] {total} cells loaded, {} without data", no_data.len());

        let adjacency = self.adjacency.build(&cells)?;
        for err in &adjacency.rejected { warn!("[pipeline] excluded: {err}") }
        debug!(
            "[pipeline] neighbor graph: {} nodes, {} edges, {} isolated",
            adjacency.graph.node_count(),
            adjacency.graph.edge_count(),
            adjacency.graph.isolated().count(),
        );

        let weights = normalize(&adjacency.graph);
        let node_cells = adjacency.kept.iter().map(|&i| &cells[i]).collect::<Vec<_>>();
        let metrics = aggregate(&node_cells, &weights);

        let labels = node_cells.par_iter()
            .zip(metrics.into_par_iter())
            .map(|(cell, metrics)| self.label(cell, metrics))
            .collect::<Vec<_>>();

        let mut diagnostics = Diagnostics { no_data, issues: adjacency.rejected, ..Default::default() };
        let mut slots = cells.into_iter().map(Some).collect::<Vec<_>>();
        let mut records = Vec::with_capacity(adjacency.kept.len());

        for ((node, &pos), (metrics, base, applied)) in adjacency.kept.iter().enumerate().zip(labels) {
            let Some(cell) = slots[pos].take() else { continue };

            let metrics = match metrics {
                Ok(metrics) => Some(metrics),
                Err(err) => {
                    warn!("[pipeline] {err}; classified as {}", Category::Unknown);
                    diagnostics.issues.push(err);
                    None
                }
            };
            if let Some(rule) = applied.rule { diagnostics.overridden.push((cell.id.clone(), rule)) }

            let neighbors = adjacency.graph.degree(node);
            if neighbors == 0 { diagnostics.isolated.push(cell.id.clone()) }

            records.push(CellRecord {
                id: cell.id,
                pop: cell.pop,
                area_km2: cell.area_km2,
                metrics,
                base_category: base,
                category: applied.category,
                override_rule: applied.rule,
                neighbors,
                attributes: cell.attributes,
                geometry: cell.geometry,
            });
        }

        info!(
            "[pipeline] classified {} cells ({} overridden, {} unknown)",
            records.len(),
            diagnostics.overridden.len(),
            records.iter().filter(|record| record.category == Category::Unknown).count(),
        );

        Ok(Classification::new(records, diagnostics))
    }

    /// Baseline category from the threshold table, then the override pass.
    fn label(&self, cell: &Cell, metrics: Result<LocalMetrics>) -> (Result<LocalMetrics>, Category, Applied) {
        let base = metrics.as_ref()
            .map_or(Category::Unknown, |metrics| self.thresholds.classify(metrics.density));
        let applied = self.overrides.apply(cell, base);
        (metrics, base, applied)
    }
}

/// Split off cells whose population is missing, zero (if enabled) or equal to the sentinel.
fn drop_no_data(cells: Vec<Cell>, sentinel: Option<f64>, zero: bool) -> (Vec<Cell>, Vec<CellId>) {
    let (no_data, cells): (Vec<_>, Vec<_>) = cells.into_iter()
        .partition(|cell| cell.is_no_data(sentinel, zero));
    (cells, no_data.into_iter().map(|cell| cell.id).collect())
}
