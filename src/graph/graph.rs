use ahash::AHashMap;

use crate::cells::CellId;

/// An undirected, unweighted neighbor graph over cells in compressed sparse row format.
///
/// Node `i` is the `i`-th cell handed to the builder. Rows are sorted, free of
/// duplicates and self-loops, and symmetric: `a` lists `b` iff `b` lists `a`.
#[derive(Debug, Clone, Default)]
pub struct NeighborGraph {
    ids: Vec<CellId>,
    index: AHashMap<CellId, u32>, // Map between cell ids and contiguous node indices.
    offsets: Vec<u32>,
    edges: Vec<u32>,
}

impl NeighborGraph {
    /// Construct a graph from (possibly one-sided) adjacency lists.
    /// Every listed pair is mirrored, so the result is always symmetric.
    pub(crate) fn new(ids: Vec<CellId>, adjacency: &[Vec<u32>]) -> Self {
        assert!(adjacency.len() == ids.len(), "adjacency.len() must equal ids.len()");

        let mut rows = vec![Vec::new(); ids.len()];
        for (i, row) in adjacency.iter().enumerate() {
            for &j in row {
                assert!((j as usize) < ids.len(), "adjacency[{i}] refers to unknown node {j}");
                if j as usize == i { continue }
                rows[i].push(j);
                rows[j as usize].push(i as u32);
            }
        }
        rows.iter_mut().for_each(|row| { row.sort_unstable(); row.dedup(); });

        Self {
            index: ids.iter().enumerate().map(|(i, id)| (id.clone(), i as u32)).collect(),
            ids,
            offsets: std::iter::once(0u32).chain(
                rows.iter()
                    .map(|row| row.len() as u32)
                    .scan(0u32, |acc, len| { *acc += len; Some(*acc) })
            ).collect(),
            edges: rows.into_iter().flatten().collect(),
        }
    }

    /// Get the number of nodes (cells) in the graph.
    #[inline] pub fn node_count(&self) -> usize { self.ids.len() }

    /// Get the number of undirected edges in the graph.
    #[inline] pub fn edge_count(&self) -> usize { self.edges.len() / 2 }

    /// Get the cell id of a node.
    #[inline] pub fn id(&self, node: usize) -> &CellId { &self.ids[node] }

    /// Get the cell ids of all nodes, in node order.
    #[inline] pub fn ids(&self) -> &[CellId] { &self.ids }

    /// Get the node index of a cell, if it is in the graph.
    #[inline] pub fn node(&self, id: &CellId) -> Option<usize> { self.index.get(id).map(|&i| i as usize) }

    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get the degree (number of neighbors) of a given node.
    #[inline] pub fn degree(&self, node: usize) -> usize { self.range(node).len() }

    /// Sorted neighbors of a given node.
    #[inline] pub fn neighbors(&self, node: usize) -> &[u32] { &self.edges[self.range(node)] }

    /// Neighbor ids of a cell, or `None` if the cell is not in the graph.
    pub fn neighbor_ids(&self, id: &CellId) -> Option<impl Iterator<Item = &CellId> + '_> {
        self.node(id).map(|node| self.neighbors(node).iter().map(|&v| &self.ids[v as usize]))
    }

    /// Returns `true` if `other` is adjacent to `node` (binary search).
    #[inline]
    pub fn contains(&self, node: usize, other: usize) -> bool {
        self.neighbors(node).binary_search(&(other as u32)).is_ok()
    }

    /// Nodes with no neighbors.
    pub fn isolated(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.node_count()).filter(|&node| self.degree(node) == 0)
    }

    /// Check the symmetry invariant: `a` in `neighbors(b)` iff `b` in `neighbors(a)`.
    pub fn is_symmetric(&self) -> bool {
        (0..self.node_count()).all(|u| {
            self.neighbors(u).iter().all(|&v| v as usize != u && self.contains(v as usize, u))
        })
    }
}
