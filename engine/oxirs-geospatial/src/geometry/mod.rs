//! Geometry types
//!
//! This module provides the geometry wrapper used throughout the engine: a
//! `geo` shape tagged with the reference frame its coordinates live in, plus
//! the validated [`GeographicPoint`] used by the declaration API, the
//! WKT/GML text encodings and the typed [`GeoLiteral`].

pub mod gml_parser;
pub mod literal;
pub mod wkt_parser;

pub use literal::{GeoLiteral, GeometryEncoding};

use crate::error::{Result, SpatialError};
use crate::projection::CrsDescriptor;
use crate::vocabulary;
use geo::algorithm::{CoordsIter, HasDimensions};
use geo::algorithm::dimensions::Dimensions;
use geo_types::{Coord, Geometry as GeoGeometry};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated WGS84 coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicPoint {
    lon: f64,
    lat: f64,
}

impl GeographicPoint {
    /// Create a point, rejecting coordinates outside the WGS84 range
    ///
    /// # Examples
    ///
    /// ```
    /// use oxirs_geospatial::geometry::GeographicPoint;
    ///
    /// let milan = GeographicPoint::new(9.18854, 45.464664).unwrap();
    /// assert_eq!(milan.lon(), 9.18854);
    ///
    /// assert!(GeographicPoint::new(181.0, 0.0).is_err());
    /// assert!(GeographicPoint::new(0.0, -90.5).is_err());
    /// ```
    pub fn new(lon: f64, lat: f64) -> Result<Self> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(SpatialError::InvalidCoordinate {
                lon,
                lat,
                reason: "coordinates must be finite".to_string(),
            });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(SpatialError::InvalidCoordinate {
                lon,
                lat,
                reason: "longitude must be within [-180, 180]".to_string(),
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(SpatialError::InvalidCoordinate {
                lon,
                lat,
                reason: "latitude must be within [-90, 90]".to_string(),
            });
        }
        Ok(Self { lon, lat })
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

impl TryFrom<Coord<f64>> for GeographicPoint {
    type Error = SpatialError;

    fn try_from(coord: Coord<f64>) -> Result<Self> {
        Self::new(coord.x, coord.y)
    }
}

/// Reference frame of a geometry's coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// Longitude/latitude degrees
    #[default]
    Wgs84,
    /// Planar meters in one of the supported projections
    Projected(CrsDescriptor),
}

impl Crs {
    /// EPSG code of this reference frame
    pub fn epsg_code(&self) -> u32 {
        match self {
            Crs::Wgs84 => vocabulary::WGS84_EPSG,
            Crs::Projected(descriptor) => descriptor.epsg_code(),
        }
    }

    /// EPSG URI of this reference frame
    pub fn uri(&self) -> String {
        vocabulary::epsg_uri(self.epsg_code())
    }

    pub fn is_wgs84(&self) -> bool {
        matches!(self, Crs::Wgs84)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

/// A geometry with an associated reference frame
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// The underlying shape
    pub geom: GeoGeometry<f64>,
    /// Frame the coordinates are expressed in
    pub crs: Crs,
}

impl Geometry {
    /// Create a WGS84 geometry
    pub fn new(geom: GeoGeometry<f64>) -> Self {
        Self {
            geom,
            crs: Crs::Wgs84,
        }
    }

    /// Create a geometry in a specific frame
    pub fn with_crs(geom: GeoGeometry<f64>, crs: Crs) -> Self {
        Self { geom, crs }
    }

    /// Parse from WKT, accepting an optional leading `<crs-uri>`
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        wkt_parser::parse_wkt(wkt)
    }

    /// Render as WKT
    pub fn to_wkt(&self) -> String {
        wkt_parser::geometry_to_wkt(&self.geom)
    }

    /// Parse from a GML 3.2 fragment
    pub fn from_gml(gml: &str) -> Result<Self> {
        gml_parser::parse_gml(gml)
    }

    /// Render as a GML 3.2 fragment
    pub fn to_gml(&self) -> Result<String> {
        gml_parser::geometry_to_gml(self)
    }

    /// Topological dimension: 0 for points, 1 for curves, 2 for surfaces
    ///
    /// Collections report the largest dimension of their members. Empty
    /// geometries report `None`.
    pub fn spatial_dimension(&self) -> Option<u8> {
        match self.geom.dimensions() {
            Dimensions::Empty => None,
            Dimensions::ZeroDimensional => Some(0),
            Dimensions::OneDimensional => Some(1),
            Dimensions::TwoDimensional => Some(2),
        }
    }

    /// Check if the geometry has no points
    pub fn is_empty(&self) -> bool {
        self.geom.is_empty()
    }

    /// Check if the geometry is simple (no self-intersections)
    ///
    /// - Point and MultiPoint: always simple
    /// - LineString: segments only meet at shared endpoints
    /// - Polygon: every ring is simple
    /// - Multi*/GeometryCollection: all members are simple
    pub fn is_simple(&self) -> bool {
        is_simple_geometry(&self.geom)
    }

    /// Geometry type name as used in WKT
    pub fn geometry_type(&self) -> &'static str {
        match &self.geom {
            GeoGeometry::Point(_) => "Point",
            GeoGeometry::Line(_) => "Line",
            GeoGeometry::LineString(_) => "LineString",
            GeoGeometry::Polygon(_) => "Polygon",
            GeoGeometry::MultiPoint(_) => "MultiPoint",
            GeoGeometry::MultiLineString(_) => "MultiLineString",
            GeoGeometry::MultiPolygon(_) => "MultiPolygon",
            GeoGeometry::GeometryCollection(_) => "GeometryCollection",
            GeoGeometry::Triangle(_) => "Triangle",
            GeoGeometry::Rect(_) => "Rect",
        }
    }

    /// Every vertex of every component, in order
    pub fn vertices(&self) -> impl Iterator<Item = Coord<f64>> + '_ {
        self.geom.coords_iter()
    }

    /// Vertices as validated geographic points
    ///
    /// Fails when the geometry is not in WGS84 or a vertex is out of range.
    pub fn geographic_points(&self) -> Result<Vec<GeographicPoint>> {
        if !self.crs.is_wgs84() {
            return Err(SpatialError::CrsMismatch {
                expected: Crs::Wgs84.uri(),
                found: self.crs.uri(),
            });
        }
        self.vertices().map(GeographicPoint::try_from).collect()
    }

    /// Validate that two geometries share a frame
    pub fn validate_crs_compatibility(&self, other: &Geometry) -> Result<()> {
        if self.crs != other.crs {
            return Err(SpatialError::CrsMismatch {
                expected: self.crs.uri(),
                found: other.crs.uri(),
            });
        }
        Ok(())
    }
}

impl From<GeographicPoint> for Geometry {
    fn from(point: GeographicPoint) -> Self {
        Geometry::new(GeoGeometry::Point(point.to_coord().into()))
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (CRS: {})", self.to_wkt(), self.crs)
    }
}

fn is_simple_geometry(geom: &GeoGeometry<f64>) -> bool {
    match geom {
        GeoGeometry::Point(_) | GeoGeometry::Line(_) | GeoGeometry::MultiPoint(_) => true,
        GeoGeometry::LineString(ls) => is_simple_line_string(&ls.0),
        GeoGeometry::Polygon(poly) => {
            is_simple_line_string(&poly.exterior().0)
                && poly.interiors().iter().all(|hole| is_simple_line_string(&hole.0))
        }
        GeoGeometry::MultiLineString(mls) => mls.0.iter().all(|ls| is_simple_line_string(&ls.0)),
        GeoGeometry::MultiPolygon(mp) => mp
            .0
            .iter()
            .all(|poly| is_simple_geometry(&GeoGeometry::Polygon(poly.clone()))),
        GeoGeometry::GeometryCollection(gc) => gc.0.iter().all(is_simple_geometry),
        GeoGeometry::Triangle(_) | GeoGeometry::Rect(_) => true,
    }
}

fn is_simple_line_string(coords: &[Coord<f64>]) -> bool {
    use geo::algorithm::line_intersection::line_intersection;
    use geo::{Line, LineIntersection};

    if coords.len() < 3 {
        return true;
    }

    let is_closed = coords.first() == coords.last();
    let segment_count = coords.len() - 1;

    for i in 0..segment_count {
        let first = Line::new(coords[i], coords[i + 1]);

        for j in (i + 2)..segment_count {
            // First and last segments of a ring share the closing vertex
            if is_closed && i == 0 && j == segment_count - 1 {
                continue;
            }

            let second = Line::new(coords[j], coords[j + 1]);
            match line_intersection(first, second) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    let at_endpoint = intersection == coords[i]
                        || intersection == coords[i + 1]
                        || intersection == coords[j]
                        || intersection == coords[j + 1];
                    if !at_endpoint {
                        return false;
                    }
                }
                Some(LineIntersection::Collinear { .. }) => return false,
                None => {}
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Point};

    #[test]
    fn test_geographic_point_bounds() {
        assert!(GeographicPoint::new(180.0, 90.0).is_ok());
        assert!(GeographicPoint::new(-180.0, -90.0).is_ok());
        assert!(matches!(
            GeographicPoint::new(-180.1, 0.0),
            Err(SpatialError::InvalidCoordinate { .. })
        ));
        assert!(GeographicPoint::new(0.0, 90.1).is_err());
        assert!(GeographicPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_crs_uri() {
        assert_eq!(Crs::Wgs84.uri(), "http://www.opengis.net/def/crs/EPSG/0/4326");
        let utm = Crs::Projected(CrsDescriptor::Utm {
            zone: 32,
            north: false,
        });
        assert_eq!(utm.epsg_code(), 32732);
        assert_eq!(
            Crs::Projected(CrsDescriptor::EqualAreaFallback).epsg_code(),
            3035
        );
    }

    #[test]
    fn test_geometry_types() {
        let point = Geometry::new(GeoGeometry::Point(Point::new(1.0, 2.0)));
        assert_eq!(point.geometry_type(), "Point");
        assert_eq!(point.spatial_dimension(), Some(0));
        assert!(!point.is_empty());

        let line = Geometry::new(GeoGeometry::LineString(LineString::new(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
        ])));
        assert_eq!(line.geometry_type(), "LineString");
        assert_eq!(line.spatial_dimension(), Some(1));

        let empty = Geometry::new(GeoGeometry::GeometryCollection(
            geo_types::GeometryCollection::default(),
        ));
        assert!(empty.is_empty());
        assert_eq!(empty.spatial_dimension(), None);
    }

    #[test]
    fn test_is_simple() {
        let simple = Geometry::from_wkt("LINESTRING(0 0, 1 1, 2 0)").unwrap();
        assert!(simple.is_simple());

        let bow_tie = Geometry::from_wkt("LINESTRING(0 0, 2 2, 2 0, 0 2)").unwrap();
        assert!(!bow_tie.is_simple());

        let ring = Geometry::from_wkt("POLYGON((0 0, 4 0, 4 4, 0 4, 0 0))").unwrap();
        assert!(ring.is_simple());
    }

    #[test]
    fn test_geographic_points_requires_wgs84() {
        let projected = Geometry::with_crs(
            GeoGeometry::Point(Point::new(500000.0, 5000000.0)),
            Crs::Projected(CrsDescriptor::Utm {
                zone: 32,
                north: true,
            }),
        );
        assert!(matches!(
            projected.geographic_points(),
            Err(SpatialError::CrsMismatch { .. })
        ));

        let out_of_range = Geometry::new(GeoGeometry::Point(Point::new(200.0, 0.0)));
        assert!(out_of_range.geographic_points().is_err());
    }

    #[test]
    fn test_crs_compatibility() {
        let a = Geometry::new(GeoGeometry::Point(Point::new(1.0, 2.0)));
        let b = Geometry::new(GeoGeometry::Point(Point::new(3.0, 4.0)));
        let c = Geometry::with_crs(
            GeoGeometry::Point(Point::new(5.0, 6.0)),
            Crs::Projected(CrsDescriptor::EqualAreaFallback),
        );

        assert!(a.validate_crs_compatibility(&b).is_ok());
        assert!(a.validate_crs_compatibility(&c).is_err());
    }
}
