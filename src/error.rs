use crate::{cells::CellId, geom::GeometryIssue};

/// Errors raised by the classification core.
///
/// `InvalidGeometry` and `DegenerateArea` are per-cell and end up in the run's
/// [`Diagnostics`](crate::Diagnostics); everything else is fatal and surfaces
/// before any cell is processed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A cell's polygon is empty or malformed; the cell is excluded from the graph.
    #[error("invalid geometry for cell {id}: {issue}")]
    InvalidGeometry { id: CellId, issue: GeometryIssue },

    /// The cell and its neighbors sum to a non-positive area; density is undefined.
    #[error("degenerate area for cell {id}: local area {area_local} is not positive")]
    DegenerateArea { id: CellId, area_local: f64 },

    /// Thresholds are not strictly descending, or the catch-all tier is missing.
    #[error("invalid threshold configuration: {0}")]
    InvalidThresholdConfig(String),

    /// An override rule has a malformed predicate or target.
    #[error("invalid override rule #{index}: {reason}")]
    InvalidOverrideRule { index: usize, reason: String },

    /// The adjacency strategy parameters cannot describe a grid.
    #[error("invalid adjacency configuration: {0}")]
    InvalidAdjacencyConfig(String),

    /// Two input cells share the same id.
    #[error("duplicate cell id {0}")]
    DuplicateCellId(CellId),
}

impl Error {
    /// The cell this error refers to, for per-cell errors.
    pub fn cell_id(&self) -> Option<&CellId> {
        match self {
            Error::InvalidGeometry { id, .. } | Error::DegenerateArea { id, .. } => Some(id),
            Error::DuplicateCellId(id) => Some(id),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
