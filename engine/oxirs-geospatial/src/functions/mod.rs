//! Planar geometry functions
//!
//! Topological predicates, DE-9IM pattern matching, the Egenhofer and RCC8
//! relation families, set operations and measures. Every function here
//! expects its operands to already share one planar frame.

pub mod bbox_utils;
pub mod egenhofer;
pub mod geometric_operations;
pub mod geometric_properties;
pub mod rcc8;
pub mod relate;
pub mod simple_features;

use crate::error::Result;
use crate::geometry::Geometry;

pub use egenhofer::EgenhoferRelation;
pub use rcc8::Rcc8Relation;

/// Trait for spatial relation predicates
pub trait SpatialRelation {
    /// Test the spatial relation between two geometries
    fn test(&self, geom1: &Geometry, geom2: &Geometry) -> Result<bool>;
}

/// Simple Features spatial relation types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimpleFeatureRelation {
    /// Geometries are spatially equal
    Equals,
    /// Geometries are spatially disjoint
    Disjoint,
    /// Geometries spatially intersect
    Intersects,
    /// Geometries touch at boundaries only
    Touches,
    /// Geometries cross
    Crosses,
    /// First geometry is within the second
    Within,
    /// First geometry contains the second
    Contains,
    /// Geometries spatially overlap
    Overlaps,
}

impl SimpleFeatureRelation {
    pub const ALL: [SimpleFeatureRelation; 8] = [
        SimpleFeatureRelation::Equals,
        SimpleFeatureRelation::Disjoint,
        SimpleFeatureRelation::Intersects,
        SimpleFeatureRelation::Touches,
        SimpleFeatureRelation::Crosses,
        SimpleFeatureRelation::Within,
        SimpleFeatureRelation::Contains,
        SimpleFeatureRelation::Overlaps,
    ];

    /// Local name in the `geof:` namespace
    pub fn local_name(&self) -> &'static str {
        match self {
            SimpleFeatureRelation::Equals => "sfEquals",
            SimpleFeatureRelation::Disjoint => "sfDisjoint",
            SimpleFeatureRelation::Intersects => "sfIntersects",
            SimpleFeatureRelation::Touches => "sfTouches",
            SimpleFeatureRelation::Crosses => "sfCrosses",
            SimpleFeatureRelation::Within => "sfWithin",
            SimpleFeatureRelation::Contains => "sfContains",
            SimpleFeatureRelation::Overlaps => "sfOverlaps",
        }
    }
}

impl SpatialRelation for SimpleFeatureRelation {
    fn test(&self, geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
        match self {
            SimpleFeatureRelation::Equals => simple_features::sf_equals(geom1, geom2),
            SimpleFeatureRelation::Disjoint => simple_features::sf_disjoint(geom1, geom2),
            SimpleFeatureRelation::Intersects => simple_features::sf_intersects(geom1, geom2),
            SimpleFeatureRelation::Touches => simple_features::sf_touches(geom1, geom2),
            SimpleFeatureRelation::Crosses => simple_features::sf_crosses(geom1, geom2),
            SimpleFeatureRelation::Within => simple_features::sf_within(geom1, geom2),
            SimpleFeatureRelation::Contains => simple_features::sf_contains(geom1, geom2),
            SimpleFeatureRelation::Overlaps => simple_features::sf_overlaps(geom1, geom2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Geometry as GeoGeometry, Point};

    #[test]
    fn test_spatial_relation_trait() {
        let point1 = Geometry::new(GeoGeometry::Point(Point::new(1.0, 1.0)));
        let point2 = Geometry::new(GeoGeometry::Point(Point::new(2.0, 2.0)));

        assert!(SimpleFeatureRelation::Disjoint.test(&point1, &point2).unwrap());
        assert!(!SimpleFeatureRelation::Intersects
            .test(&point1, &point2)
            .unwrap());
    }

    #[test]
    fn test_relation_families_share_trait() {
        let a = Geometry::from_wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))").unwrap();
        let b = Geometry::from_wkt("POLYGON((2 0, 4 0, 4 2, 2 2, 2 0))").unwrap();

        let relations: [&dyn SpatialRelation; 3] = [
            &SimpleFeatureRelation::Touches,
            &EgenhoferRelation::Meet,
            &Rcc8Relation::ExternallyConnected,
        ];
        for relation in relations {
            assert!(relation.test(&a, &b).unwrap());
        }
    }
}
