use crate::{cells::CellId, error::Error, geom::GeometryIssue};

/// Per-cell problems and audit trail collected during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    /// Cells dropped before adjacency because their population is missing.
    pub no_data: Vec<CellId>,
    /// `InvalidGeometry` and `DegenerateArea` errors, one per affected cell.
    pub issues: Vec<Error>,
    /// Cells relabeled by an override rule, with the rule's position.
    pub overridden: Vec<(CellId, usize)>,
    /// Cells with no neighbors (their local values are their own).
    pub isolated: Vec<CellId>,
}

impl Diagnostics {
    /// Cells excluded for malformed polygons.
    pub fn invalid_geometry(&self) -> impl Iterator<Item = (&CellId, GeometryIssue)> + '_ {
        self.issues.iter().filter_map(|err| match err {
            Error::InvalidGeometry { id, issue } => Some((id, *issue)),
            _ => None,
        })
    }

    /// Cells whose local area was not positive (classified `Unknown`).
    pub fn degenerate_area(&self) -> impl Iterator<Item = &CellId> + '_ {
        self.issues.iter().filter_map(|err| match err {
            Error::DegenerateArea { id, .. } => Some(id),
            _ => None,
        })
    }

    /// True if no cell was excluded or left unclassified.
    #[inline] pub fn is_clean(&self) -> bool { self.issues.is_empty() }
}
