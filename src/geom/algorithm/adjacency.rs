use ahash::AHashSet;
use geo::{coordinate_position::CoordPos, dimensions::Dimensions, Coord, Distance, Euclidean, LineString, MultiPolygon, Point, Relate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    cells::{Cell, CellId},
    error::{Error, Result},
    geom::{validate, Geometries},
    graph::NeighborGraph,
};

use super::grid::GridIndex;

/// Which boundary contacts make two cells neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyMode {
    /// Rook: a shared boundary segment of positive length.
    Edge,
    /// Queen: any shared boundary point, including a single corner.
    #[default]
    EdgeOrCorner,
}

/// How candidate pairs are found and tested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdjacencyStrategy {
    /// R-tree candidates, confirmed with an exact DE-9IM boundary test.
    Spatial {
        /// Gap up to which boundaries still count as touching, for edges that
        /// do not line up exactly. At 0.0 only the exact test is used.
        #[serde(default)]
        tolerance: f64,
    },
    /// Regular grids: cells are keyed by the (column, row) of their lower-left
    /// corner and neighbors are read off the surrounding slots. No polygon tests;
    /// a cell that is not exactly one lattice square is rejected as `OffGrid`.
    GridIndex {
        cell_size: f64,
        #[serde(default)]
        origin: [f64; 2],
    },
}

impl Default for AdjacencyStrategy {
    fn default() -> Self { Self::Spatial { tolerance: 0.0 } }
}

impl AdjacencyStrategy {
    /// Reject parameters that cannot describe a search.
    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            Self::Spatial { tolerance } if !(tolerance.is_finite() && tolerance >= 0.0) => {
                Err(Error::InvalidAdjacencyConfig(format!("tolerance must be finite and >= 0, got {tolerance}")))
            }
            Self::GridIndex { cell_size, .. } if !(cell_size.is_finite() && cell_size > 0.0) => {
                Err(Error::InvalidAdjacencyConfig(format!("cell_size must be finite and > 0, got {cell_size}")))
            }
            Self::GridIndex { origin: [x, y], .. } if !(x.is_finite() && y.is_finite()) => {
                Err(Error::InvalidAdjacencyConfig("grid origin must be finite".into()))
            }
            _ => Ok(()),
        }
    }

    /// Contact tolerance; zero for the grid index.
    #[inline]
    fn tolerance(&self) -> f64 {
        match *self {
            Self::Spatial { tolerance } => tolerance,
            Self::GridIndex { .. } => 0.0,
        }
    }
}

/// The neighbor graph over the usable cells, plus the cells that were left out.
#[derive(Debug, Clone)]
pub struct Adjacency {
    pub graph: NeighborGraph,
    /// Input positions of the cells in the graph, in node order.
    pub kept: Vec<usize>,
    /// One `InvalidGeometry` per excluded cell, in input order.
    pub rejected: Vec<Error>,
}

/// Derives the neighbor graph from cell polygons.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyBuilder {
    mode: AdjacencyMode,
    strategy: AdjacencyStrategy,
}

impl AdjacencyBuilder {
    pub fn new(mode: AdjacencyMode, strategy: AdjacencyStrategy) -> Result<Self> {
        strategy.validate()?;
        Ok(Self { mode, strategy })
    }

    #[inline] pub fn mode(&self) -> AdjacencyMode { self.mode }

    #[inline] pub fn strategy(&self) -> &AdjacencyStrategy { &self.strategy }

    /// Build the neighbor graph. Cells with malformed polygons are excluded and
    /// reported; duplicate ids abort the build.
    pub fn build(&self, cells: &[Cell]) -> Result<Adjacency> {
        let mut seen = AHashSet::with_capacity(cells.len());
        if let Some(cell) = cells.iter().find(|cell| !seen.insert(&cell.id)) {
            return Err(Error::DuplicateCellId(cell.id.clone()));
        }

        let mut grid = match self.strategy {
            AdjacencyStrategy::GridIndex { cell_size, origin } => Some(GridIndex::new(cell_size, origin)),
            AdjacencyStrategy::Spatial { .. } => None,
        };

        let mut kept = Vec::with_capacity(cells.len());
        let mut rejected = Vec::new();
        for (i, cell) in cells.iter().enumerate() {
            let placed = validate(&cell.geometry).and_then(|()| match grid.as_mut() {
                Some(grid) => grid.insert(kept.len() as u32, &cell.geometry),
                None => Ok(()),
            });
            match placed {
                Ok(()) => kept.push(i),
                Err(issue) => rejected.push(Error::InvalidGeometry { id: cell.id.clone(), issue }),
            }
        }

        let adjacency = match grid {
            Some(grid) => grid.adjacencies(self.mode),
            None => {
                let geoms = Geometries::new(kept.iter().map(|&i| &cells[i].geometry).collect());
                spatial_adjacencies(&geoms, self.mode, self.strategy.tolerance())
            }
        };

        let ids = kept.iter().map(|&i| cells[i].id.clone()).collect::<Vec<CellId>>();
        Ok(Adjacency { graph: NeighborGraph::new(ids, &adjacency), kept, rejected })
    }
}

/// Boundary contact test between two polygons.
/// In the DE-9IM matrix, Boundary/Boundary is a point (dim 0) for a corner
/// touch and a line (dim 1) for a shared edge. Pairs the exact test rejects
/// are retried within `tol` when it is positive.
pub(crate) fn boundaries_meet(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>, mode: AdjacencyMode, tol: f64) -> bool {
    match a.relate(b).get(CoordPos::OnBoundary, CoordPos::OnBoundary) {
        Dimensions::OneDimensional | Dimensions::TwoDimensional => true,
        Dimensions::ZeroDimensional if mode == AdjacencyMode::EdgeOrCorner => true,
        _ if tol > 0.0 => near_contact(a, b, mode, tol),
        _ => false,
    }
}

/// Contact within a gap of `tol`. The closest approach of two polygons is
/// always at a vertex of one of them, so the contact points are the vertices
/// lying within `tol` of the other boundary. A corner touch leaves them all
/// in one clump; an edge leaves two that are further than `2 * tol` apart.
fn near_contact(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>, mode: AdjacencyMode, tol: f64) -> bool {
    let near = |c: &Coord<f64>, other: &MultiPolygon<f64>| {
        let point = Point::from(*c);
        rings(other).any(|ring| Euclidean.distance(&point, ring) <= tol)
    };
    let contacts = rings(a).flat_map(|ring| ring.coords()).filter(|c| near(*c, b))
        .chain(rings(b).flat_map(|ring| ring.coords()).filter(|c| near(*c, a)))
        .copied()
        .collect::<Vec<_>>();

    match mode {
        AdjacencyMode::EdgeOrCorner => !contacts.is_empty(),
        AdjacencyMode::Edge => contacts.iter().any(|p| {
            contacts.iter().any(|q| (p.x - q.x).hypot(p.y - q.y) > 2.0 * tol)
        }),
    }
}

fn rings(shape: &MultiPolygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    shape.0.iter().flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
}

/// One-sided adjacency lists (each unordered pair reported once, at the lower index).
fn spatial_adjacencies(geoms: &Geometries, mode: AdjacencyMode, tol: f64) -> Vec<Vec<u32>> {
    (0..geoms.len()).into_par_iter()
        .map(|i| {
            let Some(search) = geoms.search_envelope(i, tol) else { return Vec::new() };
            let mut row = geoms.query(&search)
                .filter(|&j| j > i) // check each unordered pair once
                .filter(|&j| boundaries_meet(geoms.shape(i), geoms.shape(j), mode, tol))
                .map(|j| j as u32)
                .collect::<Vec<_>>();
            row.sort_unstable();
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use geo::{coord, Rect};

    use super::*;
    use crate::geom::GeometryIssue;

    fn square(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Rect::new(coord! { x: x, y: y }, coord! { x: x + 1.0, y: y + 1.0 }).to_polygon()])
    }

    /// `n` x `n` unit grid, ids "r{row}c{col}", row-major.
    fn grid(n: usize) -> Vec<Cell> {
        (0..n * n)
            .map(|i| {
                let (row, col) = (i / n, i % n);
                Cell::new(format!("r{row}c{col}"), 1.0, 1.0, square(col as f64, row as f64))
            })
            .collect()
    }

    fn degrees(adjacency: &Adjacency) -> Vec<usize> {
        (0..adjacency.graph.node_count()).map(|n| adjacency.graph.degree(n)).collect()
    }

    #[test]
    fn queen_includes_corners() {
        let a = square(0.0, 0.0);
        assert!(boundaries_meet(&a, &square(1.0, 0.0), AdjacencyMode::EdgeOrCorner, 0.0));
        assert!(boundaries_meet(&a, &square(1.0, 1.0), AdjacencyMode::EdgeOrCorner, 0.0));
        assert!(!boundaries_meet(&a, &square(2.0, 0.0), AdjacencyMode::EdgeOrCorner, 0.0));
    }

    #[test]
    fn rook_excludes_corners() {
        let a = square(0.0, 0.0);
        assert!(boundaries_meet(&a, &square(0.0, 1.0), AdjacencyMode::Edge, 0.0));
        assert!(!boundaries_meet(&a, &square(1.0, 1.0), AdjacencyMode::Edge, 0.0));
    }

    #[test]
    fn tolerance_bridges_small_gaps() {
        let a = square(0.0, 0.0);
        let jittered = square(1.0 + 1e-9, 0.0);
        let corner = square(1.0 + 1e-9, 1.0 + 1e-9);

        assert!(!boundaries_meet(&a, &jittered, AdjacencyMode::Edge, 0.0));
        assert!(boundaries_meet(&a, &jittered, AdjacencyMode::Edge, 1e-6));
        assert!(boundaries_meet(&jittered, &a, AdjacencyMode::EdgeOrCorner, 1e-6));

        assert!(boundaries_meet(&a, &corner, AdjacencyMode::EdgeOrCorner, 1e-6));
        assert!(!boundaries_meet(&a, &corner, AdjacencyMode::Edge, 1e-6));
        assert!(!boundaries_meet(&a, &square(1.1, 0.0), AdjacencyMode::EdgeOrCorner, 1e-6));
    }

    #[test]
    fn spatial_tolerance_reaches_the_graph() {
        let cells = vec![
            Cell::new("a", 1.0, 1.0, square(0.0, 0.0)),
            Cell::new("b", 1.0, 1.0, square(1.0 + 1e-9, 0.0)),
        ];
        let exact = AdjacencyBuilder::new(AdjacencyMode::Edge, AdjacencyStrategy::Spatial { tolerance: 0.0 }).unwrap();
        let loose = AdjacencyBuilder::new(AdjacencyMode::Edge, AdjacencyStrategy::Spatial { tolerance: 1e-6 }).unwrap();

        assert_eq!(exact.build(&cells).unwrap().graph.degree(0), 0);
        assert_eq!(loose.build(&cells).unwrap().graph.neighbors(0), &[1]);
    }

    #[test]
    fn spatial_queen_on_3x3_grid() {
        let cells = grid(3);
        let adjacency = AdjacencyBuilder::default().build(&cells).unwrap();

        assert_eq!(adjacency.kept, (0..9).collect::<Vec<_>>());
        assert!(adjacency.rejected.is_empty());
        assert_eq!(degrees(&adjacency), vec![3, 5, 3, 5, 8, 5, 3, 5, 3]);
        assert!(adjacency.graph.is_symmetric());
    }

    #[test]
    fn spatial_rook_on_3x3_grid() {
        let builder = AdjacencyBuilder::new(AdjacencyMode::Edge, AdjacencyStrategy::default()).unwrap();
        let adjacency = builder.build(&grid(3)).unwrap();

        assert_eq!(degrees(&adjacency), vec![2, 3, 2, 3, 4, 3, 2, 3, 2]);
    }

    #[test]
    fn grid_index_matches_spatial_test() {
        for mode in [AdjacencyMode::Edge, AdjacencyMode::EdgeOrCorner] {
            let cells = grid(4);
            let spatial = AdjacencyBuilder::new(mode, AdjacencyStrategy::default()).unwrap()
                .build(&cells).unwrap();
            let indexed = AdjacencyBuilder::new(mode, AdjacencyStrategy::GridIndex { cell_size: 1.0, origin: [0.0, 0.0] }).unwrap()
                .build(&cells).unwrap();

            for node in 0..cells.len() {
                assert_eq!(spatial.graph.neighbors(node), indexed.graph.neighbors(node), "{mode:?} node {node}");
            }
        }
    }

    #[test]
    fn malformed_cells_are_excluded_and_reported() {
        let mut cells = grid(2);
        cells[1].geometry = MultiPolygon::new(vec![]);

        let adjacency = AdjacencyBuilder::default().build(&cells).unwrap();

        assert_eq!(adjacency.kept, vec![0, 2, 3]);
        assert_eq!(adjacency.graph.node(&CellId::new("r0c1")), None);
        assert_eq!(adjacency.rejected, vec![Error::InvalidGeometry {
            id: CellId::new("r0c1"),
            issue: GeometryIssue::Empty,
        }]);
        assert_eq!(adjacency.graph.degree(0), 2);
    }

    #[test]
    fn grid_collisions_are_rejected() {
        let mut cells = grid(2);
        cells.push(Cell::new("dup-slot", 1.0, 1.0, square(1.0, 1.0)));

        let builder = AdjacencyBuilder::new(
            AdjacencyMode::EdgeOrCorner,
            AdjacencyStrategy::GridIndex { cell_size: 1.0, origin: [0.0, 0.0] },
        ).unwrap();
        let adjacency = builder.build(&cells).unwrap();

        assert_eq!(adjacency.kept, vec![0, 1, 2, 3]);
        assert_eq!(adjacency.rejected, vec![Error::InvalidGeometry {
            id: CellId::new("dup-slot"),
            issue: GeometryIssue::GridCollision,
        }]);
        assert_eq!(degrees(&adjacency), vec![3, 3, 3, 3]);
    }

    #[test]
    fn grid_index_reports_cells_that_span_several_slots() {
        let big = MultiPolygon::new(vec![Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 2.0, y: 2.0 }).to_polygon()]);
        let cells = vec![Cell::new("big", 1.0, 4.0, big), Cell::new("small", 1.0, 1.0, square(2.0, 0.0))];

        let builder = AdjacencyBuilder::new(
            AdjacencyMode::EdgeOrCorner,
            AdjacencyStrategy::GridIndex { cell_size: 1.0, origin: [0.0, 0.0] },
        ).unwrap();
        let adjacency = builder.build(&cells).unwrap();

        assert_eq!(adjacency.kept, vec![1]);
        assert_eq!(adjacency.rejected, vec![Error::InvalidGeometry {
            id: CellId::new("big"),
            issue: GeometryIssue::OffGrid,
        }]);
    }

    #[test]
    fn duplicate_ids_abort() {
        let mut cells = grid(2);
        cells[3].id = CellId::new("r0c0");

        let err = AdjacencyBuilder::default().build(&cells).unwrap_err();
        assert_eq!(err, Error::DuplicateCellId(CellId::new("r0c0")));
    }

    #[test]
    fn bad_grid_parameters_are_rejected() {
        let strategy = AdjacencyStrategy::GridIndex { cell_size: 0.0, origin: [0.0, 0.0] };
        assert!(matches!(
            AdjacencyBuilder::new(AdjacencyMode::Edge, strategy),
            Err(Error::InvalidAdjacencyConfig(_))
        ));
        assert!(AdjacencyBuilder::new(AdjacencyMode::Edge, AdjacencyStrategy::Spatial { tolerance: -1.0 }).is_err());
    }
}
