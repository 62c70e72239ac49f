//! Forward and inverse projection of whole geometries
//!
//! Every vertex of every component is transformed through `proj4rs` and
//! rounded to a fixed number of decimal digits, so that repeated
//! project/unproject round trips settle on the same values. Parsed PROJ.4
//! definitions are cached per frame.

use crate::config::{SpatialConfig, DEFAULT_COORDINATE_PRECISION};
use crate::error::{Result, SpatialError};
use crate::geometry::{Crs, Geometry};
use crate::projection::{selector, CrsDescriptor, WGS84_PROJ};
use crate::registry::GeometryPair;
use geo::algorithm::map_coords::MapCoords;
use geo_types::Coord;
use parking_lot::RwLock;
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Applies WGS84 ⇄ planar transforms to geometries
pub struct GeometryProjector {
    precision: u32,
    definitions: RwLock<HashMap<Crs, Arc<Proj>>>,
}

impl GeometryProjector {
    /// Create a projector rounding to `precision` decimal digits
    pub fn new(precision: u32) -> Self {
        Self {
            precision,
            definitions: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &SpatialConfig) -> Self {
        Self::new(config.coordinate_precision)
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Project a WGS84 geometry into `target`
    ///
    /// # Examples
    ///
    /// ```
    /// use oxirs_geospatial::geometry::Geometry;
    /// use oxirs_geospatial::projection::{CrsDescriptor, GeometryProjector};
    ///
    /// let projector = GeometryProjector::default();
    /// let milan = Geometry::from_wkt("POINT(9.18854 45.464664)").unwrap();
    /// let utm = CrsDescriptor::Utm { zone: 32, north: true };
    ///
    /// let projected = projector.project(&milan, utm).unwrap();
    /// assert_eq!(projected.crs.epsg_code(), 32632);
    ///
    /// let back = projector.unproject(&projected, utm).unwrap();
    /// assert!(back.crs.is_wgs84());
    /// ```
    pub fn project(&self, geometry: &Geometry, target: CrsDescriptor) -> Result<Geometry> {
        if geometry.crs == Crs::Projected(target) {
            return Ok(geometry.clone());
        }
        expect_frame(geometry, Crs::Wgs84)?;

        let from = self.definition(Crs::Wgs84)?;
        let to = self.definition(Crs::Projected(target))?;
        let factor = self.factor();

        let geom = geometry.geom.try_map_coords(|coord: Coord<f64>| {
            let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
            transform(&from, &to, &mut point).map_err(|e| {
                SpatialError::CrsTransformationFailed(format!(
                    "({}, {}) to {target}: {e:?}",
                    coord.x, coord.y
                ))
            })?;
            checked_coord(point.0, point.1, factor)
        })?;

        Ok(Geometry::with_crs(geom, Crs::Projected(target)))
    }

    /// Transform a geometry in `source` back to WGS84
    pub fn unproject(&self, geometry: &Geometry, source: CrsDescriptor) -> Result<Geometry> {
        expect_frame(geometry, Crs::Projected(source))?;

        let from = self.definition(Crs::Projected(source))?;
        let to = self.definition(Crs::Wgs84)?;
        let factor = self.factor();

        let geom = geometry.geom.try_map_coords(|coord: Coord<f64>| {
            let mut point = (coord.x, coord.y, 0.0);
            transform(&from, &to, &mut point).map_err(|e| {
                SpatialError::CrsTransformationFailed(format!(
                    "({}, {}) from {source}: {e:?}",
                    coord.x, coord.y
                ))
            })?;
            checked_coord(point.0.to_degrees(), point.1.to_degrees(), factor)
        })?;

        Ok(Geometry::new(geom))
    }

    /// Select the CRS for a WGS84 geometry and build its pair
    pub fn pair(&self, wgs84: Geometry) -> Result<GeometryPair> {
        let crs = selector::select_crs_for_geometry(&wgs84)?;
        self.pair_in(wgs84, crs)
    }

    /// Build a pair projected into a given CRS
    pub fn pair_in(&self, wgs84: Geometry, crs: CrsDescriptor) -> Result<GeometryPair> {
        let projected = self.project(&wgs84, crs)?;
        Ok(GeometryPair::from_parts(wgs84, projected, crs))
    }

    /// Project several WGS84 geometries into one CRS selected from all of them
    pub fn project_together(
        &self,
        geometries: &[&Geometry],
    ) -> Result<(CrsDescriptor, Vec<Geometry>)> {
        let crs = selector::select_crs_for_geometries(geometries.iter().copied())?;
        let projected = geometries
            .iter()
            .map(|geometry| self.project(geometry, crs))
            .collect::<Result<Vec<_>>>()?;
        Ok((crs, projected))
    }

    /// Round a single value to the configured precision
    pub fn round(&self, value: f64) -> f64 {
        round_with(value, self.factor())
    }

    fn factor(&self) -> f64 {
        10f64.powi(self.precision as i32)
    }

    fn definition(&self, crs: Crs) -> Result<Arc<Proj>> {
        if let Some(proj) = self.definitions.read().get(&crs) {
            return Ok(Arc::clone(proj));
        }

        let definition = match crs {
            Crs::Wgs84 => WGS84_PROJ.to_string(),
            Crs::Projected(descriptor) => descriptor.proj_string(),
        };
        let proj = Proj::from_proj_string(&definition).map_err(|e| {
            SpatialError::CrsTransformationFailed(format!(
                "Invalid projection definition {definition:?}: {e:?}"
            ))
        })?;

        let proj = Arc::new(proj);
        self.definitions.write().insert(crs, Arc::clone(&proj));
        Ok(proj)
    }
}

impl Default for GeometryProjector {
    fn default() -> Self {
        Self::new(DEFAULT_COORDINATE_PRECISION)
    }
}

impl Clone for GeometryProjector {
    fn clone(&self) -> Self {
        Self {
            precision: self.precision,
            definitions: RwLock::new(self.definitions.read().clone()),
        }
    }
}

impl fmt::Debug for GeometryProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryProjector")
            .field("precision", &self.precision)
            .field("cached_definitions", &self.definitions.read().len())
            .finish()
    }
}

fn expect_frame(geometry: &Geometry, expected: Crs) -> Result<()> {
    if geometry.crs != expected {
        return Err(SpatialError::CrsMismatch {
            expected: expected.uri(),
            found: geometry.crs.uri(),
        });
    }
    Ok(())
}

fn round_with(value: f64, factor: f64) -> f64 {
    (value * factor).round() / factor
}

fn checked_coord(x: f64, y: f64, factor: f64) -> Result<Coord<f64>> {
    if !x.is_finite() || !y.is_finite() {
        return Err(SpatialError::CrsTransformationFailed(
            "Projection produced a non-finite coordinate".to_string(),
        ));
    }
    Ok(Coord {
        x: round_with(x, factor),
        y: round_with(y, factor),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeographicPoint;
    use crate::projection::select_crs;
    use approx::assert_abs_diff_eq;
    use geo_types::{Geometry as GeoGeometry, Point};

    fn point(geometry: &Geometry) -> Point<f64> {
        match geometry.geom {
            GeoGeometry::Point(p) => p,
            ref other => panic!("Expected point, got {other:?}"),
        }
    }

    #[test]
    fn test_project_milan_utm32() {
        let projector = GeometryProjector::default();
        let milan = Geometry::from_wkt("POINT(9.18854 45.464664)").unwrap();
        let projected = projector
            .project(
                &milan,
                CrsDescriptor::Utm {
                    zone: 32,
                    north: true,
                },
            )
            .unwrap();

        // Milan sits a little east of the zone 32 central meridian (9°E)
        let p = point(&projected);
        assert!(p.x() > 500_000.0 && p.x() < 520_000.0, "easting {}", p.x());
        assert!(p.y() > 5_030_000.0 && p.y() < 5_040_000.0, "northing {}", p.y());
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let projector = GeometryProjector::default();
        let samples = [
            (9.18854, 45.464664),
            (9.18854, -45.464664),
            (4.18854, 58.464664),
            (8.18854, 73.464664),
            (22.18854, 73.464664),
            (-122.4194, 37.7749),
            (151.2093, -33.8688),
            (0.0, 0.0),
        ];

        for (lon, lat) in samples {
            let gp = GeographicPoint::new(lon, lat).unwrap();
            let crs = select_crs(&[gp]).unwrap();
            let geometry = Geometry::from(gp);

            let projected = projector.project(&geometry, crs).unwrap();
            let back = point(&projector.unproject(&projected, crs).unwrap());
            assert_abs_diff_eq!(back.x(), lon, epsilon = 1e-6);
            assert_abs_diff_eq!(back.y(), lat, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_equal_area_round_trip() {
        let projector = GeometryProjector::default();
        let line = Geometry::from_wkt("LINESTRING(9.18854 45.464664, 12.496366 41.902782)").unwrap();

        let projected = projector
            .project(&line, CrsDescriptor::EqualAreaFallback)
            .unwrap();
        assert_eq!(projected.crs.epsg_code(), 3035);

        let back = projector
            .unproject(&projected, CrsDescriptor::EqualAreaFallback)
            .unwrap();
        for (a, b) in back.vertices().zip(line.vertices()) {
            assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-6);
            assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rounding_contract() {
        let projector = GeometryProjector::default();
        let milan = Geometry::from_wkt("POINT(9.18854 45.464664)").unwrap();
        let crs = CrsDescriptor::Utm {
            zone: 32,
            north: true,
        };
        let p = point(&projector.project(&milan, crs).unwrap());
        assert_eq!(p.x(), projector.round(p.x()));
        assert_eq!(p.y(), projector.round(p.y()));

        let coarse = GeometryProjector::new(2);
        assert_eq!(coarse.round(1.23456), 1.23);
    }

    #[test]
    fn test_project_does_not_mutate_input() {
        let projector = GeometryProjector::default();
        let polygon =
            Geometry::from_wkt("POLYGON((9 45, 9.1 45, 9.1 45.1, 9 45.1, 9 45))").unwrap();
        let copy = polygon.clone();
        let pair = projector.pair(polygon).unwrap();
        assert_eq!(pair.wgs84(), &copy);
        assert!(!pair.projected().crs.is_wgs84());
    }

    #[test]
    fn test_frame_checks() {
        let projector = GeometryProjector::default();
        let milan = Geometry::from_wkt("POINT(9.18854 45.464664)").unwrap();
        let utm32 = CrsDescriptor::Utm {
            zone: 32,
            north: true,
        };
        let utm33 = CrsDescriptor::Utm {
            zone: 33,
            north: true,
        };

        assert!(matches!(
            projector.unproject(&milan, utm32),
            Err(SpatialError::CrsMismatch { .. })
        ));

        let projected = projector.project(&milan, utm32).unwrap();
        assert!(projector.project(&projected, utm33).is_err());
        assert_eq!(projector.project(&projected, utm32).unwrap(), projected);
    }

    #[test]
    fn test_project_together() {
        let projector = GeometryProjector::default();
        let milan = Geometry::from_wkt("POINT(9.18854 45.464664)").unwrap();
        let rome = Geometry::from_wkt("POINT(12.496366 41.902782)").unwrap();

        let (crs, projected) = projector.project_together(&[&milan, &rome]).unwrap();
        assert_eq!(crs, CrsDescriptor::EqualAreaFallback);
        assert_eq!(projected.len(), 2);
        assert!(projected.iter().all(|g| g.crs == Crs::Projected(crs)));
    }
}
