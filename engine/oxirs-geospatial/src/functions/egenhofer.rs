//! Egenhofer topological relations
//!
//! The eight relations of the 9-intersection model, each defined by one or
//! more DE-9IM patterns. `meet` is the only relation that needs several.
//!
//! Reference: Egenhofer, M. J., & Franzosa, R. D. (1991). "Point-set
//! topological spatial relations"

use crate::error::Result;
use crate::functions::bbox_utils::bboxes_disjoint;
use crate::functions::relate::relate_any;
use crate::functions::SpatialRelation;
use crate::geometry::Geometry;

/// One of the eight Egenhofer relations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EgenhoferRelation {
    Equals,
    Disjoint,
    Meet,
    Overlap,
    Covers,
    CoveredBy,
    Inside,
    Contains,
}

impl EgenhoferRelation {
    pub const ALL: [EgenhoferRelation; 8] = [
        EgenhoferRelation::Equals,
        EgenhoferRelation::Disjoint,
        EgenhoferRelation::Meet,
        EgenhoferRelation::Overlap,
        EgenhoferRelation::Covers,
        EgenhoferRelation::CoveredBy,
        EgenhoferRelation::Inside,
        EgenhoferRelation::Contains,
    ];

    /// DE-9IM patterns; the relation holds when any one matches
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            EgenhoferRelation::Equals => &["TFFFTFFFT"],
            EgenhoferRelation::Disjoint => &["FF*FF****"],
            EgenhoferRelation::Meet => &["FT*******", "F**T*****", "F***T****"],
            EgenhoferRelation::Overlap => &["T*T***T**"],
            EgenhoferRelation::Covers => &["T*TFT*FF*"],
            EgenhoferRelation::CoveredBy => &["TFF*TFT**"],
            EgenhoferRelation::Inside => &["TFF*FFT**"],
            EgenhoferRelation::Contains => &["T*TFF*FF*"],
        }
    }

    /// Local name in the `geof:` namespace
    pub fn local_name(&self) -> &'static str {
        match self {
            EgenhoferRelation::Equals => "ehEquals",
            EgenhoferRelation::Disjoint => "ehDisjoint",
            EgenhoferRelation::Meet => "ehMeet",
            EgenhoferRelation::Overlap => "ehOverlap",
            EgenhoferRelation::Covers => "ehCovers",
            EgenhoferRelation::CoveredBy => "ehCoveredBy",
            EgenhoferRelation::Inside => "ehInside",
            EgenhoferRelation::Contains => "ehContains",
        }
    }
}

impl SpatialRelation for EgenhoferRelation {
    /// # Examples
    ///
    /// ```
    /// use oxirs_geospatial::geometry::Geometry;
    /// use oxirs_geospatial::functions::{EgenhoferRelation, SpatialRelation};
    ///
    /// let a = Geometry::from_wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))").unwrap();
    /// let b = Geometry::from_wkt("POLYGON((2 0, 4 0, 4 2, 2 2, 2 0))").unwrap();
    ///
    /// assert!(EgenhoferRelation::Meet.test(&a, &b).unwrap());
    /// assert!(!EgenhoferRelation::Overlap.test(&a, &b).unwrap());
    /// ```
    fn test(&self, geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
        geom1.validate_crs_compatibility(geom2)?;

        // Only disjoint can hold between geometries with disjoint boxes
        if bboxes_disjoint(geom1, geom2) {
            return Ok(*self == EgenhoferRelation::Disjoint);
        }

        relate_any(geom1, geom2, self.patterns())
    }
}
