mod algorithm;
mod bbox;
mod geom;
mod validate;

use bbox::BoundingBox;
pub use algorithm::{Adjacency, AdjacencyBuilder, AdjacencyMode, AdjacencyStrategy};
pub(crate) use geom::Geometries;
pub use validate::GeometryIssue;
pub(crate) use validate::validate;
