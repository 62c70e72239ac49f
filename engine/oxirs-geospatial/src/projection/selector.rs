//! Planar CRS selection
//!
//! A single vertex maps to a UTM zone, with the Norway and Svalbard zone
//! exceptions applied before the regular 6° grid. A vertex set maps to the
//! shared zone when every vertex agrees on zone and hemisphere, and to the
//! equal-area fallback otherwise.

use crate::error::{Result, SpatialError};
use crate::geometry::{GeographicPoint, Geometry};
use crate::projection::CrsDescriptor;
use tracing::trace;

/// UTM zone number (1..=60) of a point
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::geometry::GeographicPoint;
/// use oxirs_geospatial::projection::utm_zone;
///
/// let milan = GeographicPoint::new(9.18854, 45.464664).unwrap();
/// assert_eq!(utm_zone(&milan), 32);
///
/// // Southwest Norway belongs to the widened zone 32
/// let bergen = GeographicPoint::new(4.18854, 58.464664).unwrap();
/// assert_eq!(utm_zone(&bergen), 32);
/// ```
pub fn utm_zone(point: &GeographicPoint) -> u8 {
    let (lon, lat) = (point.lon(), point.lat());

    if lat > 55.0 && lat < 64.0 && lon > 2.0 && lon < 6.0 {
        return 32;
    }
    if lat > 71.0 {
        if (6.0..9.0).contains(&lon) {
            return 31;
        }
        if (9.0..12.0).contains(&lon) || (18.0..21.0).contains(&lon) {
            return 33;
        }
        if (21.0..24.0).contains(&lon) || (30.0..33.0).contains(&lon) {
            return 35;
        }
    }

    // lon == 180 wraps back to zone 1
    (((lon + 180.0) / 6.0).floor() as i64).rem_euclid(60) as u8 + 1
}

/// UTM descriptor of a single point
fn point_crs(point: &GeographicPoint) -> CrsDescriptor {
    CrsDescriptor::Utm {
        zone: utm_zone(point),
        north: point.lat() >= 0.0,
    }
}

/// Choose the planar CRS for a set of WGS84 vertices
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::geometry::GeographicPoint;
/// use oxirs_geospatial::projection::{select_crs, CrsDescriptor};
///
/// let milan = GeographicPoint::new(9.18854, 45.464664).unwrap();
/// let rome = GeographicPoint::new(12.496366, 41.902782).unwrap();
///
/// assert_eq!(
///     select_crs(&[milan]).unwrap(),
///     CrsDescriptor::Utm { zone: 32, north: true }
/// );
/// // Rome lies in zone 33
/// assert_eq!(select_crs(&[milan, rome]).unwrap(), CrsDescriptor::EqualAreaFallback);
/// ```
pub fn select_crs(points: &[GeographicPoint]) -> Result<CrsDescriptor> {
    let (first, rest) = points.split_first().ok_or_else(|| {
        SpatialError::GeometryOperationFailed(
            "Cannot select a CRS for a geometry without vertices".to_string(),
        )
    })?;

    let candidate = point_crs(first);
    if rest.iter().all(|p| point_crs(p) == candidate) {
        Ok(candidate)
    } else {
        trace!(
            vertices = points.len(),
            "Vertices span several UTM zones, using equal-area fallback"
        );
        Ok(CrsDescriptor::EqualAreaFallback)
    }
}

/// Choose the planar CRS for a WGS84 geometry
pub fn select_crs_for_geometry(geometry: &Geometry) -> Result<CrsDescriptor> {
    select_crs(&geometry.geographic_points()?)
}

/// Choose one planar CRS shared by several WGS84 geometries
///
/// Used when geometries are combined, so that both operands are measured
/// in the same frame.
pub fn select_crs_for_geometries<'a, I>(geometries: I) -> Result<CrsDescriptor>
where
    I: IntoIterator<Item = &'a Geometry>,
{
    let mut points = Vec::new();
    for geometry in geometries {
        points.extend(geometry.geographic_points()?);
    }
    select_crs(&points)
}
