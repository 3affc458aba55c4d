use rayon::prelude::*;

use crate::graph::NeighborGraph;

/// Row-standardized spatial weights in CSR layout, sharing node order with the graph.
///
/// A node with `k >= 1` neighbors gives each of them weight `1/k`. A node with
/// no neighbors has an empty row (zero policy): it contributes no neighbor lag.
#[derive(Debug, Clone, Default)]
pub struct SpatialWeights {
    offsets: Vec<u32>,
    neighbors: Vec<u32>,
    weights: Vec<f64>,
}

impl SpatialWeights {
    /// Build row-standardized weights from a neighbor graph.
    pub fn row_standardized(graph: &NeighborGraph) -> Self {
        let rows = (0..graph.node_count()).into_par_iter()
            .map(|node| {
                let neighbors = graph.neighbors(node);
                let weight = 1.0 / neighbors.len() as f64;
                neighbors.iter().map(|&v| (v, weight)).collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        Self {
            offsets: std::iter::once(0u32).chain(
                rows.iter()
                    .map(|row| row.len() as u32)
                    .scan(0u32, |acc, len| { *acc += len; Some(*acc) })
            ).collect(),
            neighbors: rows.iter().flatten().map(|&(v, _)| v).collect(),
            weights: rows.iter().flatten().map(|&(_, w)| w).collect(),
        }
    }

    /// Get the number of rows (nodes).
    #[inline] pub fn node_count(&self) -> usize { self.offsets.len().saturating_sub(1) }

    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Iterate over (neighbor, weight) pairs of a node.
    #[inline]
    pub fn row(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.range(node).map(move |i| (self.neighbors[i] as usize, self.weights[i]))
    }

    /// Sum of the weights in a row: 1 with neighbors, 0 without.
    #[inline] pub fn row_sum(&self, node: usize) -> f64 { self.row(node).map(|(_, w)| w).sum() }

    /// Weighted neighbor sum of a per-node value (the spatial lag).
    #[inline]
    pub fn lag(&self, node: usize, values: &[f64]) -> f64 {
        self.row(node).map(|(v, w)| w * values[v]).sum()
    }
}

/// Turn a neighbor graph into row-standardized weights.
#[inline]
pub fn normalize(graph: &NeighborGraph) -> SpatialWeights { SpatialWeights::row_standardized(graph) }

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::cells::CellId;

    fn graph(adjacency: &[Vec<u32>]) -> NeighborGraph {
        let ids = (0..adjacency.len()).map(|i| CellId::new(&i.to_string())).collect();
        NeighborGraph::new(ids, adjacency)
    }

    #[test]
    fn rows_sum_to_one_when_neighbors_exist() {
        let weights = normalize(&graph(&[vec![1, 2, 3], vec![2], vec![], vec![]]));

        assert_eq!(weights.node_count(), 4);
        for node in 0..4 {
            assert_relative_eq!(weights.row_sum(node), 1.0, epsilon = 1e-12);
        }
        assert_eq!(weights.row(0).collect::<Vec<_>>(), vec![(1, 1.0 / 3.0), (2, 1.0 / 3.0), (3, 1.0 / 3.0)]);
        assert_eq!(weights.row(1).collect::<Vec<_>>(), vec![(0, 0.5), (2, 0.5)]);
    }

    #[test]
    fn isolated_rows_are_empty() {
        let weights = normalize(&graph(&[vec![], vec![2], vec![]]));

        assert!(weights.row(0).next().is_none());
        assert_eq!(weights.row_sum(0), 0.0);
        assert_eq!(weights.lag(0, &[5.0, 7.0, 9.0]), 0.0);
    }

    #[test]
    fn lag_is_weighted_neighbor_mean() {
        let weights = normalize(&graph(&[vec![1, 2], vec![], vec![]]));
        assert_relative_eq!(weights.lag(0, &[100.0, 10.0, 30.0]), 20.0);
    }

    #[test]
    fn empty_graph_has_no_rows() {
        let weights = normalize(&graph(&[]));
        assert_eq!(weights.node_count(), 0);
    }
}
