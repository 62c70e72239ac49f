//! Simple Features topological predicates
//!
//! Each predicate is answered from the DE-9IM matrix computed by `geo`.
//! Disjointness and intersection are decided from bounding boxes first
//! when the boxes do not overlap.

use crate::error::Result;
use crate::functions::bbox_utils::bboxes_disjoint;
use crate::functions::relate::relate;
use crate::geometry::Geometry;

/// Spatially equal: each geometry lies within the other
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::geometry::Geometry;
/// use oxirs_geospatial::functions::simple_features::sf_equals;
///
/// let a = Geometry::from_wkt("LINESTRING(0 0, 2 2)").unwrap();
/// let b = Geometry::from_wkt("LINESTRING(2 2, 1 1, 0 0)").unwrap();
/// assert!(sf_equals(&a, &b).unwrap());
/// ```
pub fn sf_equals(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(relate(geom1, geom2)?.is_equal_topo())
}

pub fn sf_disjoint(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    geom1.validate_crs_compatibility(geom2)?;
    if bboxes_disjoint(geom1, geom2) {
        return Ok(true);
    }
    Ok(relate(geom1, geom2)?.is_disjoint())
}

pub fn sf_intersects(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(!sf_disjoint(geom1, geom2)?)
}

pub fn sf_touches(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(relate(geom1, geom2)?.is_touches())
}

/// Interiors meet in a lower dimension than the geometries themselves
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::geometry::Geometry;
/// use oxirs_geospatial::functions::simple_features::sf_crosses;
///
/// let road = Geometry::from_wkt("LINESTRING(0 1, 4 1)").unwrap();
/// let river = Geometry::from_wkt("LINESTRING(2 0, 2 3)").unwrap();
/// assert!(sf_crosses(&road, &river).unwrap());
/// ```
pub fn sf_crosses(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(relate(geom1, geom2)?.is_crosses())
}

pub fn sf_within(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(relate(geom1, geom2)?.is_within())
}

pub fn sf_contains(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(relate(geom1, geom2)?.is_contains())
}

pub fn sf_overlaps(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(relate(geom1, geom2)?.is_overlaps())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpatialError;
    use crate::geometry::Crs;
    use crate::projection::CrsDescriptor;

    fn wkt(text: &str) -> Geometry {
        Geometry::from_wkt(text).unwrap()
    }

    #[test]
    fn test_polygon_predicates() {
        let outer = wkt("POLYGON((0 0, 10 0, 10 10, 0 10, 0 0))");
        let inner = wkt("POLYGON((2 2, 4 2, 4 4, 2 4, 2 2))");
        let shifted = wkt("POLYGON((5 5, 15 5, 15 15, 5 15, 5 5))");
        let far = wkt("POLYGON((20 20, 21 20, 21 21, 20 21, 20 20))");

        assert!(sf_contains(&outer, &inner).unwrap());
        assert!(sf_within(&inner, &outer).unwrap());
        assert!(sf_overlaps(&outer, &shifted).unwrap());
        assert!(!sf_overlaps(&outer, &inner).unwrap());
        assert!(sf_disjoint(&outer, &far).unwrap());
        assert!(sf_intersects(&outer, &shifted).unwrap());
        assert!(!sf_touches(&outer, &shifted).unwrap());
    }

    #[test]
    fn test_point_predicates() {
        let square = wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))");
        let corner = wkt("POINT(0 0)");
        let centre = wkt("POINT(1 1)");

        assert!(sf_touches(&corner, &square).unwrap());
        assert!(sf_within(&centre, &square).unwrap());
        assert!(sf_intersects(&corner, &square).unwrap());
        assert!(!sf_crosses(&centre, &square).unwrap());
    }

    #[test]
    fn test_self_intersects() {
        for text in [
            "POINT(9.18854 45.464664)",
            "LINESTRING(0 0, 1 1, 2 0)",
            "POLYGON((0 0, 4 0, 4 4, 0 4, 0 0))",
            "MULTIPOINT((1 2), (3 4))",
        ] {
            let g = wkt(text);
            assert!(sf_intersects(&g, &g).unwrap(), "{text}");
            assert!(sf_equals(&g, &g).unwrap(), "{text}");
        }
    }

    #[test]
    fn test_frames_must_match() {
        let a = wkt("POINT(1 1)");
        let b = Geometry::with_crs(a.geom.clone(), Crs::Projected(CrsDescriptor::EqualAreaFallback));
        assert!(matches!(
            sf_intersects(&a, &b),
            Err(SpatialError::CrsMismatch { .. })
        ));
    }
}
