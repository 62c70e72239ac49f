//! RCC8 (Region Connection Calculus) topological relations
//!
//! This module implements the 8 RCC8 relations for qualitative spatial
//! reasoning, each as a single DE-9IM pattern over two regions.
//!
//! # Performance
//!
//! Bounding boxes are compared before the intersection matrix is computed.
//! When they are disjoint only `dc` can hold.
//!
//! Reference: Randell, D. A., Cui, Z., & Cohn, A. G. (1992). "A spatial logic based on regions and connection"

use crate::error::Result;
use crate::functions::bbox_utils::bboxes_disjoint;
use crate::functions::relate::relate_any;
use crate::functions::SpatialRelation;
use crate::geometry::Geometry;

/// One of the eight RCC8 relations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rcc8Relation {
    /// `eq`: regions are identical
    Equals,
    /// `dc`: regions share no point
    Disconnected,
    /// `ec`: regions touch only at their boundaries
    ExternallyConnected,
    /// `po`: interiors overlap, neither contains the other
    PartiallyOverlapping,
    /// `tppi`: second region is a tangential proper part of the first
    TangentialProperPartInverse,
    /// `tpp`: first region is a tangential proper part of the second
    TangentialProperPart,
    /// `ntpp`: first region lies strictly inside the second
    NonTangentialProperPart,
    /// `ntppi`: second region lies strictly inside the first
    NonTangentialProperPartInverse,
}

impl Rcc8Relation {
    pub const ALL: [Rcc8Relation; 8] = [
        Rcc8Relation::Equals,
        Rcc8Relation::Disconnected,
        Rcc8Relation::ExternallyConnected,
        Rcc8Relation::PartiallyOverlapping,
        Rcc8Relation::TangentialProperPartInverse,
        Rcc8Relation::TangentialProperPart,
        Rcc8Relation::NonTangentialProperPart,
        Rcc8Relation::NonTangentialProperPartInverse,
    ];

    /// DE-9IM pattern defining the relation
    pub fn pattern(&self) -> &'static str {
        match self {
            Rcc8Relation::Equals => "TFFFTFFFT",
            Rcc8Relation::Disconnected => "FFTFFTTTT",
            Rcc8Relation::ExternallyConnected => "FFTFTTTTT",
            Rcc8Relation::PartiallyOverlapping => "TTTTTTTTT",
            Rcc8Relation::TangentialProperPartInverse => "TTTFTTFFT",
            Rcc8Relation::TangentialProperPart => "TFFTTFTTT",
            Rcc8Relation::NonTangentialProperPart => "TFFTFFTTT",
            Rcc8Relation::NonTangentialProperPartInverse => "TTTFFTFFT",
        }
    }

    /// Local name in the `geof:` namespace
    pub fn local_name(&self) -> &'static str {
        match self {
            Rcc8Relation::Equals => "rcc8eq",
            Rcc8Relation::Disconnected => "rcc8dc",
            Rcc8Relation::ExternallyConnected => "rcc8ec",
            Rcc8Relation::PartiallyOverlapping => "rcc8po",
            Rcc8Relation::TangentialProperPartInverse => "rcc8tppi",
            Rcc8Relation::TangentialProperPart => "rcc8tpp",
            Rcc8Relation::NonTangentialProperPart => "rcc8ntpp",
            Rcc8Relation::NonTangentialProperPartInverse => "rcc8ntppi",
        }
    }
}

impl SpatialRelation for Rcc8Relation {
    /// # Examples
    ///
    /// ```
    /// use oxirs_geospatial::geometry::Geometry;
    /// use oxirs_geospatial::functions::{Rcc8Relation, SpatialRelation};
    ///
    /// let poly1 = Geometry::from_wkt("POLYGON((0 0, 3 0, 3 3, 0 3, 0 0))").unwrap();
    /// let poly2 = Geometry::from_wkt("POLYGON((2 2, 5 2, 5 5, 2 5, 2 2))").unwrap();
    ///
    /// assert!(Rcc8Relation::PartiallyOverlapping.test(&poly1, &poly2).unwrap());
    /// ```
    fn test(&self, geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
        geom1.validate_crs_compatibility(geom2)?;

        if bboxes_disjoint(geom1, geom2) {
            return Ok(*self == Rcc8Relation::Disconnected);
        }

        relate_any(geom1, geom2, &[self.pattern()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wkt(text: &str) -> Geometry {
        Geometry::from_wkt(text).unwrap()
    }

    fn holding(a: &Geometry, b: &Geometry) -> Vec<Rcc8Relation> {
        Rcc8Relation::ALL
            .into_iter()
            .filter(|r| r.test(a, b).unwrap())
            .collect()
    }

    #[test]
    fn test_relations_are_exclusive_for_regions() {
        let square = wkt("POLYGON((0 0, 4 0, 4 4, 0 4, 0 0))");
        let cases = [
            (square.clone(), Rcc8Relation::Equals),
            (
                wkt("POLYGON((10 10, 11 10, 11 11, 10 11, 10 10))"),
                Rcc8Relation::Disconnected,
            ),
            (
                wkt("POLYGON((4 0, 8 0, 8 4, 4 4, 4 0))"),
                Rcc8Relation::ExternallyConnected,
            ),
            (
                wkt("POLYGON((2 2, 6 2, 6 6, 2 6, 2 2))"),
                Rcc8Relation::PartiallyOverlapping,
            ),
            (
                wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))"),
                Rcc8Relation::TangentialProperPartInverse,
            ),
            (
                wkt("POLYGON((1 1, 2 1, 2 2, 1 2, 1 1))"),
                Rcc8Relation::NonTangentialProperPartInverse,
            ),
        ];

        for (other, expected) in cases {
            assert_eq!(holding(&square, &other), vec![expected], "{expected:?}");
        }
    }

    #[test]
    fn test_proper_parts() {
        let square = wkt("POLYGON((0 0, 4 0, 4 4, 0 4, 0 0))");
        let corner = wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))");
        let inner = wkt("POLYGON((1 1, 2 1, 2 2, 1 2, 1 1))");

        assert_eq!(
            holding(&corner, &square),
            vec![Rcc8Relation::TangentialProperPart]
        );
        assert_eq!(
            holding(&inner, &square),
            vec![Rcc8Relation::NonTangentialProperPart]
        );
    }

    #[test]
    fn test_touching_bboxes() {
        // Boxes touch along x = 2 so the matrix decides
        let a = wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))");
        let b = wkt("POLYGON((2 0, 4 0, 4 2, 2 2, 2 0))");
        assert!(Rcc8Relation::ExternallyConnected.test(&a, &b).unwrap());
        assert!(!Rcc8Relation::Disconnected.test(&a, &b).unwrap());
    }
}
