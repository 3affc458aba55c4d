use geo::{BoundingRect, MultiPolygon};
use rstar::{RTree, AABB};

use super::BoundingBox;

/// A read-only collection of cell polygons with an R-tree over their bounding boxes.
///
/// The index is bulk-loaded once and never mutated afterwards, so it can be
/// queried from many threads at once.
#[derive(Debug)]
pub(crate) struct Geometries<'a> {
    shapes: Vec<&'a MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
}

impl<'a> Geometries<'a> {
    /// Index a list of (already validated) polygons. Shapes without a bounding
    /// box are kept in `shapes` but never returned by a query.
    pub(crate) fn new(shapes: Vec<&'a MultiPolygon<f64>>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            shapes,
        }
    }

    /// Get the number of MultiPolygons.
    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }

    /// Get the MultiPolygon at a given index.
    #[inline] pub(crate) fn shape(&self, idx: usize) -> &'a MultiPolygon<f64> { self.shapes[idx] }

    /// Search envelope around the shape at `idx`, padded by `tol`.
    pub(crate) fn search_envelope(&self, idx: usize, tol: f64) -> Option<AABB<[f64; 2]>> {
        self.shapes[idx].bounding_rect()
            .map(|rect| BoundingBox::new(idx, rect).padded(tol))
    }

    /// Indices of shapes whose bounding boxes intersect the given envelope.
    #[inline]
    pub(crate) fn query(&self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = usize> + '_ {
        self.rtree.locate_in_envelope_intersecting(envelope).map(|bbox| bbox.idx())
    }
}
