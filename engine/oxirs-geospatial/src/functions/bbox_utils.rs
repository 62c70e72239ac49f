//! Bounding box pre-filters
//!
//! Cheap checks on axis-aligned bounding boxes that let predicates and
//! registry scans skip the exact computation when the answer is already
//! decided by the boxes.

use crate::geometry::Geometry;
use geo::algorithm::bounding_rect::BoundingRect;
use geo_types::Rect;

/// Quick check if two geometries' bounding boxes are disjoint
///
/// Returns true only when the boxes provably do not overlap. Touching boxes
/// are not disjoint. Empty geometries have no box and never count as
/// disjoint here.
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::geometry::Geometry;
/// use oxirs_geospatial::functions::bbox_utils::bboxes_disjoint;
///
/// let geom1 = Geometry::from_wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))").unwrap();
/// let geom2 = Geometry::from_wkt("POLYGON((5 5, 7 5, 7 7, 5 7, 5 5))").unwrap();
///
/// assert!(bboxes_disjoint(&geom1, &geom2));
/// ```
pub fn bboxes_disjoint(geom1: &Geometry, geom2: &Geometry) -> bool {
    match (geom1.geom.bounding_rect(), geom2.geom.bounding_rect()) {
        (Some(b1), Some(b2)) => rects_disjoint(&b1, &b2),
        _ => false,
    }
}

/// Quick check if two geometries' bounding boxes intersect
pub fn bboxes_intersect(geom1: &Geometry, geom2: &Geometry) -> bool {
    !bboxes_disjoint(geom1, geom2)
}

/// Check if the first geometry's bounding box lies inside the second's
///
/// A necessary condition for the first geometry to be within the second.
pub fn bbox_within(geom1: &Geometry, geom2: &Geometry) -> bool {
    match (geom1.geom.bounding_rect(), geom2.geom.bounding_rect()) {
        (Some(inner), Some(outer)) => {
            outer.min().x <= inner.min().x
                && outer.max().x >= inner.max().x
                && outer.min().y <= inner.min().y
                && outer.max().y >= inner.max().y
        }
        _ => false,
    }
}

/// Lower bound on the distance between two geometries
///
/// The gap between their bounding boxes, zero when the boxes overlap.
/// `None` when either geometry is empty.
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::geometry::Geometry;
/// use oxirs_geospatial::functions::bbox_utils::bbox_distance;
///
/// let a = Geometry::from_wkt("POINT(0 0)").unwrap();
/// let b = Geometry::from_wkt("LINESTRING(3 4, 3 10)").unwrap();
/// assert_eq!(bbox_distance(&a, &b), Some(5.0));
/// ```
pub fn bbox_distance(geom1: &Geometry, geom2: &Geometry) -> Option<f64> {
    let b1 = geom1.geom.bounding_rect()?;
    let b2 = geom2.geom.bounding_rect()?;
    let dx = gap(b1.min().x, b1.max().x, b2.min().x, b2.max().x);
    let dy = gap(b1.min().y, b1.max().y, b2.min().y, b2.max().y);
    Some(dx.hypot(dy))
}

fn rects_disjoint(b1: &Rect<f64>, b2: &Rect<f64>) -> bool {
    b1.max().x < b2.min().x
        || b2.max().x < b1.min().x
        || b1.max().y < b2.min().y
        || b2.max().y < b1.min().y
}

fn gap(min1: f64, max1: f64, min2: f64, max2: f64) -> f64 {
    (min2 - max1).max(min1 - max2).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Geometry as GeoGeometry, GeometryCollection};

    fn wkt(text: &str) -> Geometry {
        Geometry::from_wkt(text).unwrap()
    }

    #[test]
    fn test_bboxes_disjoint() {
        let geom1 = wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))");
        let geom2 = wkt("POLYGON((5 5, 7 5, 7 7, 5 7, 5 5))");
        assert!(bboxes_disjoint(&geom1, &geom2));
        assert!(!bboxes_intersect(&geom1, &geom2));

        let touching = wkt("POLYGON((2 0, 4 0, 4 2, 2 2, 2 0))");
        assert!(bboxes_intersect(&geom1, &touching));
    }

    #[test]
    fn test_bbox_within() {
        let large = wkt("POLYGON((0 0, 4 0, 4 4, 0 4, 0 0))");
        let small = wkt("POLYGON((1 1, 3 1, 3 3, 1 3, 1 1))");
        let point = wkt("POINT(2 2)");

        assert!(bbox_within(&small, &large));
        assert!(!bbox_within(&large, &small));
        assert!(bbox_within(&point, &large));
    }

    #[test]
    fn test_bbox_distance() {
        let a = wkt("POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))");
        let b = wkt("POLYGON((4 0, 5 0, 5 1, 4 1, 4 0))");
        let c = wkt("POINT(0.5 0.5)");

        assert_eq!(bbox_distance(&a, &b), Some(3.0));
        assert_eq!(bbox_distance(&b, &a), Some(3.0));
        assert_eq!(bbox_distance(&a, &c), Some(0.0));

        let empty = Geometry::new(GeoGeometry::GeometryCollection(GeometryCollection::default()));
        assert_eq!(bbox_distance(&a, &empty), None);
        assert!(!bboxes_disjoint(&a, &empty));
    }
}
