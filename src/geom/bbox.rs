use geo::Rect;
use rstar::{RTreeObject, AABB};

/// A cell's bounding box in the R-tree, associated with its geometry by index.
#[derive(Debug, Clone)]
pub(super) struct BoundingBox {
    idx: usize, // Index of the corresponding MultiPolygon in `Geometries`
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub(super) fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Get the index of the corresponding MultiPolygon.
    #[inline] pub(super) fn idx(&self) -> usize { self.idx }

    /// Search envelope grown by `tol` on every side, for FP jitter along shared edges.
    pub(super) fn padded(&self, tol: f64) -> AABB<[f64; 2]> {
        AABB::from_corners(
            [self.bbox.min().x - tol, self.bbox.min().y - tol],
            [self.bbox.max().x + tol, self.bbox.max().y + tol],
        )
    }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}
