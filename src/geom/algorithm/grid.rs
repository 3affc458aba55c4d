use ahash::AHashMap;
use geo::{BoundingRect, MultiPolygon};

use crate::geom::GeometryIssue;

use super::AdjacencyMode;

const ROOK: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const QUEEN: [(i64, i64); 8] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];

/// Allowed deviation from the lattice, as a fraction of `cell_size`.
const SNAP: f64 = 1e-6;

/// Slot index for cells laid out on a regular grid.
///
/// A cell's slot is the (column, row) of its bounding-box lower-left corner,
/// rounded to the nearest multiple of `cell_size` from `origin`.
#[derive(Debug, Clone)]
pub(super) struct GridIndex {
    cell_size: f64,
    origin: [f64; 2],
    slots: AHashMap<(i64, i64), u32>,
    keys: Vec<(i64, i64)>, // slot of each inserted node, in node order
}

impl GridIndex {
    pub(super) fn new(cell_size: f64, origin: [f64; 2]) -> Self {
        Self { cell_size, origin, slots: AHashMap::new(), keys: Vec::new() }
    }

    /// Slot of a shape whose bounding box is exactly one lattice square.
    fn key(&self, shape: &MultiPolygon<f64>) -> Result<(i64, i64), GeometryIssue> {
        let rect = shape.bounding_rect().ok_or(GeometryIssue::Empty)?;
        let col = (rect.min().x - self.origin[0]) / self.cell_size;
        let row = (rect.min().y - self.origin[1]) / self.cell_size;
        let on_grid = (col - col.round()).abs() <= SNAP
            && (row - row.round()).abs() <= SNAP
            && (rect.width() / self.cell_size - 1.0).abs() <= SNAP
            && (rect.height() / self.cell_size - 1.0).abs() <= SNAP;
        if !on_grid { return Err(GeometryIssue::OffGrid) }

        Ok((col.round() as i64, row.round() as i64))
    }

    /// Place `node` in the grid. Nodes must be inserted in order `0, 1, 2, ...`.
    pub(super) fn insert(&mut self, node: u32, shape: &MultiPolygon<f64>) -> Result<(), GeometryIssue> {
        debug_assert_eq!(node as usize, self.keys.len(), "nodes must be inserted in order");
        let key = self.key(shape)?;
        if self.slots.contains_key(&key) { return Err(GeometryIssue::GridCollision) }

        self.slots.insert(key, node);
        self.keys.push(key);
        Ok(())
    }

    /// One-sided adjacency lists read off the 4 (rook) or 8 (queen) surrounding slots.
    pub(super) fn adjacencies(&self, mode: AdjacencyMode) -> Vec<Vec<u32>> {
        let offsets: &[(i64, i64)] = match mode {
            AdjacencyMode::Edge => &ROOK,
            AdjacencyMode::EdgeOrCorner => &QUEEN,
        };

        self.keys.iter().enumerate()
            .map(|(node, &(col, row))| {
                let mut neighbors = offsets.iter()
                    .filter_map(|&(dc, dr)| self.slots.get(&(col + dc, row + dr)).copied())
                    .filter(|&other| other as usize > node)
                    .collect::<Vec<_>>();
                neighbors.sort_unstable();
                neighbors
            })
            .collect()
    }
}
