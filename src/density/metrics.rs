use rayon::prelude::*;
use serde::Serialize;

use crate::{
    cells::Cell,
    error::{Error, Result},
    graph::SpatialWeights,
};

/// Locally smoothed population and area of a cell, and the density they imply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocalMetrics {
    pub pop_local: f64,
    pub area_local: f64,
    pub density: f64,
}

impl LocalMetrics {
    /// `pop_local / area_local`, refusing non-positive or non-finite local area.
    fn new(pop_local: f64, area_local: f64) -> Option<Self> {
        (area_local.is_finite() && area_local > 0.0)
            .then(|| Self { pop_local, area_local, density: pop_local / area_local })
    }
}

/// Compute local metrics for every cell, in node order.
///
/// `cells[i]` must be the cell at node `i` of the graph the weights came from.
/// For each cell `c`: `pop_local = pop(c) + Σ w·pop(n)` over its weight row, and
/// likewise for area. A cell whose local area is not positive yields
/// `DegenerateArea` without affecting any other cell.
pub fn aggregate(cells: &[&Cell], weights: &SpatialWeights) -> Vec<Result<LocalMetrics>> {
    assert!(cells.len() == weights.node_count(), "cells.len() must equal weights.node_count()");

    let pop = cells.iter().map(|cell| cell.pop).collect::<Vec<_>>();
    let area = cells.iter().map(|cell| cell.area_km2).collect::<Vec<_>>();

    (0..cells.len()).into_par_iter()
        .map(|node| {
            let pop_local = pop[node] + weights.lag(node, &pop);
            let area_local = area[node] + weights.lag(node, &area);
            LocalMetrics::new(pop_local, area_local)
                .ok_or_else(|| Error::DegenerateArea { id: cells[node].id.clone(), area_local })
        })
        .collect()
}
