use geo::{Area, LineString, MultiPolygon};

/// Why a cell polygon cannot take part in adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeometryIssue {
    #[error("geometry is empty")]
    Empty,
    #[error("ring has fewer than 4 coordinates")]
    ShortRing,
    #[error("geometry has a non-finite coordinate")]
    NonFinite,
    #[error("polygon has zero area")]
    ZeroArea,
    #[error("cell occupies the same grid slot as another cell")]
    GridCollision,
    #[error("cell is not a single square of the grid")]
    OffGrid,
}

/// Check that a polygon is usable: non-empty, finite, with closed rings and positive area.
pub(crate) fn validate(shape: &MultiPolygon<f64>) -> Result<(), GeometryIssue> {
    fn check_ring(ring: &LineString<f64>) -> Result<(), GeometryIssue> {
        if ring.0.len() < 4 { return Err(GeometryIssue::ShortRing) }
        if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(GeometryIssue::NonFinite)
        }
        Ok(())
    }

    if shape.0.is_empty() { return Err(GeometryIssue::Empty) }

    for polygon in &shape.0 {
        check_ring(polygon.exterior())?;
        polygon.interiors().iter().try_for_each(check_ring)?;
        if polygon.unsigned_area() <= 0.0 { return Err(GeometryIssue::ZeroArea) }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use geo::{coord, polygon, Rect};

    use super::*;

    #[test]
    fn accepts_unit_square() {
        let square = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }).to_polygon();
        assert_eq!(validate(&MultiPolygon::new(vec![square])), Ok(()));
    }

    #[test]
    fn rejects_empty_multipolygon() {
        assert_eq!(validate(&MultiPolygon::new(vec![])), Err(GeometryIssue::Empty));
    }

    #[test]
    fn rejects_degenerate_rings() {
        let line = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)];
        assert_eq!(validate(&MultiPolygon::new(vec![line])), Err(GeometryIssue::ShortRing));

        let flat = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0)];
        assert_eq!(validate(&MultiPolygon::new(vec![flat])), Err(GeometryIssue::ZeroArea));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let bad = polygon![(x: 0.0, y: 0.0), (x: f64::NAN, y: 0.0), (x: 1.0, y: 1.0)];
        assert_eq!(validate(&MultiPolygon::new(vec![bad])), Err(GeometryIssue::NonFinite));
    }
}
