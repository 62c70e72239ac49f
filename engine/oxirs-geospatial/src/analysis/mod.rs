//! Spatial analysis over registered features
//!
//! Metric operations read the projected half of each [`GeometryPair`] and
//! report meters. A feature may carry several geometries; binary measures
//! take the closest pairing, size measures take the largest geometry, and
//! derived shapes are computed from the default geometry (or the first
//! secondary when there is no default) and returned in WGS84.
//!
//! Two geometries projected into different frames are compared by
//! re-projecting both WGS84 sources into one frame chosen from all of their
//! vertices.
//!
//! Nothing here fails loudly: an unknown feature, a feature without
//! geometry, or a geometry the library cannot handle all yield `None` or
//! leave the candidate out of the result list. The cause is logged at
//! `debug` level.

use crate::error::{Result, SpatialError};
use crate::functions::bbox_utils::{bbox_distance, bbox_within, bboxes_disjoint};
use crate::functions::{geometric_operations, geometric_properties, simple_features};
use crate::geometry::{GeographicPoint, Geometry};
use crate::projection::GeometryProjector;
use crate::registry::{FeatureGeometrySet, GeometryPair, SpatialFeatureRegistry};
use geo_types::{Coord, Geometry as GeoGeometry, Rect};
use std::borrow::Cow;
use tracing::debug;

/// Read-only analysis view over a registry
#[derive(Debug, Clone, Copy)]
pub struct SpatialAnalysisEngine<'a> {
    registry: &'a SpatialFeatureRegistry,
    projector: &'a GeometryProjector,
    max_candidates: Option<usize>,
}

impl<'a> SpatialAnalysisEngine<'a> {
    pub fn new(registry: &'a SpatialFeatureRegistry, projector: &'a GeometryProjector) -> Self {
        Self {
            registry,
            projector,
            max_candidates: None,
        }
    }

    /// Stop registry scans after this many matches
    pub fn with_max_candidates(mut self, max_candidates: Option<usize>) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Smallest distance in meters between any geometry of `a` and any of `b`
    pub fn distance(&self, a: &str, b: &str) -> Option<f64> {
        let (set_a, set_b) = (self.feature(a)?, self.feature(b)?);

        let mut closest: Option<f64> = None;
        for pair_a in set_a.all() {
            for pair_b in set_b.all() {
                match self.pair_distance(pair_a, pair_b) {
                    Ok(d) => closest = Some(closest.map_or(d, |c| c.min(d))),
                    Err(e) => debug!(a, b, error = %e, "Skipping geometry pairing"),
                }
            }
        }
        closest
    }

    /// Length in meters of the feature's longest geometry
    pub fn length(&self, id: &str) -> Option<f64> {
        self.largest(id, |pair| geometric_properties::length(pair.projected()))
    }

    /// Area in square meters of the feature's largest geometry
    pub fn area(&self, id: &str) -> Option<f64> {
        self.largest(id, |pair| geometric_properties::area(pair.projected()))
    }

    /// Centroid of the feature's primary geometry, in WGS84
    pub fn centroid(&self, id: &str) -> Option<Geometry> {
        self.derived(id, "centroid", geometric_operations::centroid)
    }

    /// Boundary of the feature's primary geometry, in WGS84
    pub fn boundary(&self, id: &str) -> Option<Geometry> {
        self.derived(id, "boundary", geometric_operations::boundary)
    }

    /// Buffer of `meters` around the feature's primary geometry, in WGS84
    pub fn buffer_around(&self, id: &str, meters: f64) -> Option<Geometry> {
        self.derived(id, "buffer", |projected| {
            geometric_operations::buffer(projected, meters)
        })
    }

    /// Other features whose primary geometry lies within `radius` meters of
    /// this feature's primary geometry
    pub fn near_by(&self, id: &str, radius: f64) -> Vec<String> {
        let Some(query) = self.feature(id).and_then(FeatureGeometrySet::primary) else {
            return Vec::new();
        };
        self.scan(Some(id), |candidate| {
            self.within_distance(query, candidate, radius)
        })
    }

    /// Features whose primary geometry lies within `radius` meters of `point`
    pub fn near_point(&self, point: &GeographicPoint, radius: f64) -> Vec<String> {
        let query = match self.projector.pair(Geometry::from(*point)) {
            Ok(pair) => pair,
            Err(e) => {
                debug!(error = %e, "Cannot project query point");
                return Vec::new();
            }
        };
        self.scan(None, |candidate| {
            self.within_distance(&query, candidate, radius)
        })
    }

    /// Features with at least one vertex north of `point`
    pub fn north_of(&self, point: &GeographicPoint) -> Vec<String> {
        self.any_vertex(|c| c.y > point.lat())
    }

    /// Features with at least one vertex south of `point`
    pub fn south_of(&self, point: &GeographicPoint) -> Vec<String> {
        self.any_vertex(|c| c.y < point.lat())
    }

    /// Features with at least one vertex east of `point`
    pub fn east_of(&self, point: &GeographicPoint) -> Vec<String> {
        self.any_vertex(|c| c.x > point.lon())
    }

    /// Features with at least one vertex west of `point`
    pub fn west_of(&self, point: &GeographicPoint) -> Vec<String> {
        self.any_vertex(|c| c.x < point.lon())
    }

    /// Features whose primary geometry lies within the box
    pub fn inside_box(
        &self,
        lower_left: &GeographicPoint,
        upper_right: &GeographicPoint,
    ) -> Vec<String> {
        self.box_scan(lower_left, upper_right, |candidate, area| {
            Ok(bbox_within(candidate, area) && simple_features::sf_within(candidate, area)?)
        })
    }

    /// Features whose primary geometry shares no point with the box
    pub fn outside_box(
        &self,
        lower_left: &GeographicPoint,
        upper_right: &GeographicPoint,
    ) -> Vec<String> {
        self.box_scan(lower_left, upper_right, |candidate, area| {
            Ok(bboxes_disjoint(candidate, area) || simple_features::sf_disjoint(candidate, area)?)
        })
    }

    /// Other features with a geometry crossed by any geometry of this feature
    pub fn crossed_by(&self, id: &str) -> Vec<String> {
        let Some(query) = self.feature(id) else {
            return Vec::new();
        };

        let mut crossed = Vec::new();
        for other in self.registry.entities().filter(|other| *other != id) {
            if self.cap_reached(crossed.len()) {
                break;
            }
            let Some(candidates) = self.registry.geometries_of(other) else {
                continue;
            };

            let crosses = query.all().any(|mine| {
                candidates.all().any(|theirs| {
                    self.in_shared_frame(mine, theirs)
                        .and_then(|(a, b)| simple_features::sf_crosses(&a, &b))
                        .unwrap_or_else(|e| {
                            debug!(entity = other, error = %e, "Skipping crossing test");
                            false
                        })
                })
            });
            if crosses {
                crossed.push(other.to_string());
            }
        }
        crossed
    }

    fn feature(&self, id: &str) -> Option<&'a FeatureGeometrySet> {
        let set = self.registry.geometries_of(id);
        if set.is_none() {
            debug!(entity = id, "No geometry registered");
        }
        set
    }

    fn largest(&self, id: &str, measure: impl Fn(&GeometryPair) -> f64) -> Option<f64> {
        self.feature(id)?
            .all()
            .map(measure)
            .fold(None, |largest, value| {
                Some(largest.map_or(value, |l: f64| l.max(value)))
            })
    }

    /// Apply `operation` to the primary projected geometry and unproject the result
    fn derived(
        &self,
        id: &str,
        operation: &str,
        apply: impl Fn(&Geometry) -> Result<Geometry>,
    ) -> Option<Geometry> {
        let pair = self.feature(id)?.primary()?;
        let result = apply(pair.projected())
            .and_then(|projected| self.projector.unproject(&projected, pair.crs()));
        match result {
            Ok(geometry) => Some(geometry),
            Err(e) => {
                debug!(entity = id, operation, error = %e, "Derived geometry unavailable");
                None
            }
        }
    }

    /// Both projected geometries in one frame
    fn in_shared_frame<'p>(
        &self,
        a: &'p GeometryPair,
        b: &'p GeometryPair,
    ) -> Result<(Cow<'p, Geometry>, Cow<'p, Geometry>)> {
        if a.crs() == b.crs() {
            return Ok((Cow::Borrowed(a.projected()), Cow::Borrowed(b.projected())));
        }

        let (_, mut projected) = self.projector.project_together(&[a.wgs84(), b.wgs84()])?;
        match (projected.pop(), projected.pop()) {
            (Some(second), Some(first)) => Ok((Cow::Owned(first), Cow::Owned(second))),
            _ => Err(SpatialError::GeometryOperationFailed(
                "Shared projection lost an operand".to_string(),
            )),
        }
    }

    fn pair_distance(&self, a: &GeometryPair, b: &GeometryPair) -> Result<f64> {
        let (a, b) = self.in_shared_frame(a, b)?;
        geometric_operations::distance(&a, &b)
    }

    fn within_distance(&self, a: &GeometryPair, b: &GeometryPair, radius: f64) -> Result<bool> {
        let (a, b) = self.in_shared_frame(a, b)?;
        if bbox_distance(&a, &b).is_some_and(|gap| gap > radius) {
            return Ok(false);
        }
        Ok(geometric_operations::distance(&a, &b)? <= radius)
    }

    fn any_vertex(&self, test: impl Fn(Coord<f64>) -> bool) -> Vec<String> {
        self.scan(None, |pair| Ok(pair.wgs84().vertices().any(&test)))
    }

    fn box_scan(
        &self,
        lower_left: &GeographicPoint,
        upper_right: &GeographicPoint,
        test: impl Fn(&Geometry, &Geometry) -> Result<bool>,
    ) -> Vec<String> {
        let area = match self.box_pair(lower_left, upper_right) {
            Ok(area) => area,
            Err(e) => {
                debug!(error = %e, "Invalid query box");
                return Vec::new();
            }
        };
        self.scan(None, |candidate| {
            let (candidate, area) = self.in_shared_frame(candidate, &area)?;
            test(&candidate, &area)
        })
    }

    fn box_pair(
        &self,
        lower_left: &GeographicPoint,
        upper_right: &GeographicPoint,
    ) -> Result<GeometryPair> {
        if lower_left.lon() >= upper_right.lon() || lower_left.lat() >= upper_right.lat() {
            return Err(SpatialError::GeometryOperationFailed(format!(
                "Box corners out of order: ({}, {}) / ({}, {})",
                lower_left.lon(),
                lower_left.lat(),
                upper_right.lon(),
                upper_right.lat()
            )));
        }
        let rect = Rect::new(lower_left.to_coord(), upper_right.to_coord());
        self.projector
            .pair(Geometry::new(GeoGeometry::Polygon(rect.to_polygon())))
    }

    /// Primary geometries matching `predicate`, in declaration order
    fn scan(
        &self,
        exclude: Option<&str>,
        predicate: impl Fn(&GeometryPair) -> Result<bool>,
    ) -> Vec<String> {
        let mut matches = Vec::new();
        for (id, pair) in self.registry.primaries() {
            if exclude == Some(id) {
                continue;
            }
            if self.cap_reached(matches.len()) {
                break;
            }
            match predicate(pair) {
                Ok(true) => matches.push(id.to_string()),
                Ok(false) => {}
                Err(e) => debug!(entity = id, error = %e, "Skipping candidate"),
            }
        }
        matches
    }

    fn cap_reached(&self, found: usize) -> bool {
        self.max_candidates.is_some_and(|max| found >= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::GeometryRole;
    use approx::assert_abs_diff_eq;

    struct Fixture {
        registry: SpatialFeatureRegistry,
        projector: GeometryProjector,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: SpatialFeatureRegistry::new(),
                projector: GeometryProjector::default(),
            }
        }

        fn add(&mut self, id: &str, wkt: &str, role: GeometryRole) {
            let pair = self
                .projector
                .pair(Geometry::from_wkt(wkt).unwrap())
                .unwrap();
            self.registry.insert_if_absent(id, pair, role);
        }

        fn engine(&self) -> SpatialAnalysisEngine<'_> {
            SpatialAnalysisEngine::new(&self.registry, &self.projector)
        }
    }

    fn point(lon: f64, lat: f64) -> GeographicPoint {
        GeographicPoint::new(lon, lat).unwrap()
    }

    #[test]
    fn test_distance_takes_closest_pairing() {
        let mut f = Fixture::new();
        f.add("a", "POINT(9.0 45.0)", GeometryRole::Default);
        f.add("a", "POINT(9.0 45.1)", GeometryRole::Secondary);
        f.add("b", "POINT(9.0 45.2)", GeometryRole::Default);

        let d = f.engine().distance("a", "b").unwrap();
        // 0.1 degree of latitude is about 11.1 km
        assert!(d > 10_900.0 && d < 11_300.0, "distance {d}");
        assert_eq!(f.engine().distance("a", "missing"), None);
    }

    #[test]
    fn test_length_and_area_take_largest() {
        let mut f = Fixture::new();
        f.add("road", "LINESTRING(9.0 45.0, 9.0 45.01)", GeometryRole::Default);
        f.add("road", "LINESTRING(9.0 45.0, 9.0 45.02)", GeometryRole::Secondary);
        f.add("spot", "POINT(9.0 45.0)", GeometryRole::Default);

        let engine = f.engine();
        let length = engine.length("road").unwrap();
        assert!(length > 2_200.0 && length < 2_250.0, "length {length}");
        assert_eq!(engine.area("road"), Some(0.0));
        assert_eq!(engine.length("spot"), Some(0.0));
        assert_eq!(engine.area("spot"), Some(0.0));
        assert_eq!(engine.length("missing"), None);
    }

    #[test]
    fn test_derived_shapes_use_primary() {
        let mut f = Fixture::new();
        f.add("p", "POINT(9.18854 45.464664)", GeometryRole::Secondary);

        let engine = f.engine();
        let centroid = engine.centroid("p").unwrap();
        assert!(centroid.crs.is_wgs84());
        let c = centroid.vertices().next().unwrap();
        assert_abs_diff_eq!(c.x, 9.18854, epsilon = 1e-6);
        assert_abs_diff_eq!(c.y, 45.464664, epsilon = 1e-6);

        assert_eq!(
            engine.boundary("p").unwrap().to_wkt(),
            "GEOMETRYCOLLECTION EMPTY"
        );
        assert!(engine.buffer_around("missing", 10.0).is_none());
        assert!(engine.centroid("missing").is_none());
    }

    #[test]
    fn test_polygon_boundary_is_line_string() {
        let mut f = Fixture::new();
        f.add(
            "park",
            "POLYGON((9.18 45.46, 9.19 45.46, 9.19 45.47, 9.18 45.47, 9.18 45.46))",
            GeometryRole::Default,
        );
        let boundary = f.engine().boundary("park").unwrap();
        assert_eq!(boundary.geometry_type(), "LineString");
    }

    #[test]
    fn test_directional_any_vertex() {
        let mut f = Fixture::new();
        f.add("north", "POINT(9.0 46.0)", GeometryRole::Default);
        f.add("south", "POINT(9.0 44.0)", GeometryRole::Default);
        // Straddles the reference latitude: north and south at once
        f.add("span", "LINESTRING(10.0 44.5, 10.0 45.5)", GeometryRole::Default);

        let engine = f.engine();
        let reference = point(9.5, 45.0);
        assert_eq!(engine.north_of(&reference), vec!["north", "span"]);
        assert_eq!(engine.south_of(&reference), vec!["south", "span"]);
        assert_eq!(engine.east_of(&reference), vec!["span"]);
        assert_eq!(engine.west_of(&reference), vec!["north", "south"]);
    }

    #[test]
    fn test_box_queries() {
        let mut f = Fixture::new();
        f.add("inside", "POINT(9.5 45.5)", GeometryRole::Default);
        f.add("outside", "POINT(12.0 42.0)", GeometryRole::Default);
        f.add("across", "LINESTRING(9.5 45.5, 11.0 45.5)", GeometryRole::Default);

        let engine = f.engine();
        let (ll, ur) = (point(9.0, 45.0), point(10.0, 46.0));
        assert_eq!(engine.inside_box(&ll, &ur), vec!["inside"]);
        assert_eq!(engine.outside_box(&ll, &ur), vec!["outside"]);
        assert!(engine.inside_box(&ur, &ll).is_empty());
    }

    #[test]
    fn test_proximity() {
        let mut f = Fixture::new();
        f.add("a", "POINT(9.18854 45.464664)", GeometryRole::Default);
        f.add("b", "POINT(9.19 45.465)", GeometryRole::Default);
        f.add("rome", "POINT(12.496366 41.902782)", GeometryRole::Default);

        let engine = f.engine();
        assert_eq!(engine.near_by("a", 1_000.0), vec!["b"]);
        assert_eq!(engine.near_point(&point(9.189, 45.4647), 500.0), vec!["a", "b"]);
        assert!(engine.near_by("missing", 1_000.0).is_empty());

        let capped = engine.with_max_candidates(Some(1));
        assert_eq!(capped.near_point(&point(9.189, 45.4647), 500.0), vec!["a"]);
    }

    #[test]
    fn test_crossed_by() {
        let mut f = Fixture::new();
        f.add("road", "LINESTRING(9.0 45.0, 9.2 45.0)", GeometryRole::Default);
        f.add("river", "LINESTRING(9.1 44.9, 9.1 45.1)", GeometryRole::Default);
        f.add("canal", "LINESTRING(9.0 45.3, 9.2 45.3)", GeometryRole::Default);
        f.add("canal", "LINESTRING(9.15 44.95, 9.15 45.05)", GeometryRole::Secondary);

        let engine = f.engine();
        assert_eq!(engine.crossed_by("road"), vec!["river", "canal"]);
        assert!(engine.crossed_by("missing").is_empty());
    }
}
