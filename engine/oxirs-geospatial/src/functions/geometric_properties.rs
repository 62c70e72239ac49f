//! Planar measures: length, area and dimension
//!
//! Measures are in the units of the geometry's frame, meters for projected
//! geometries. Points have zero length and area, curves have zero area, and
//! the length of a surface is the perimeter of all its rings.

use crate::geometry::Geometry;
use geo::algorithm::Area;
use geo::{Euclidean, Length};
use geo_types::{Geometry as GeoGeometry, LineString, Polygon};

/// Length of a geometry
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::geometry::Geometry;
/// use oxirs_geospatial::functions::geometric_properties::length;
///
/// let line = Geometry::from_wkt("LINESTRING(0 0, 3 4, 3 10)").unwrap();
/// assert_eq!(length(&line), 11.0);
///
/// let square = Geometry::from_wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))").unwrap();
/// assert_eq!(length(&square), 8.0);
/// ```
pub fn length(geom: &Geometry) -> f64 {
    geometry_length(&geom.geom)
}

/// Unsigned area of a geometry
pub fn area(geom: &Geometry) -> f64 {
    geom.geom.unsigned_area()
}

/// Topological dimension, `None` for empty geometries
pub fn dimension(geom: &Geometry) -> Option<u8> {
    geom.spatial_dimension()
}

fn geometry_length(geom: &GeoGeometry<f64>) -> f64 {
    match geom {
        GeoGeometry::Point(_) | GeoGeometry::MultiPoint(_) => 0.0,
        GeoGeometry::Line(line) => Euclidean.length(line),
        GeoGeometry::LineString(ls) => Euclidean.length(ls),
        GeoGeometry::MultiLineString(mls) => mls.iter().map(|ls| Euclidean.length(ls)).sum(),
        GeoGeometry::Polygon(polygon) => perimeter(polygon),
        GeoGeometry::MultiPolygon(mp) => mp.iter().map(perimeter).sum(),
        GeoGeometry::Rect(rect) => perimeter(&rect.to_polygon()),
        GeoGeometry::Triangle(triangle) => perimeter(&triangle.to_polygon()),
        GeoGeometry::GeometryCollection(gc) => gc.iter().map(geometry_length).sum(),
    }
}

fn perimeter(polygon: &Polygon<f64>) -> f64 {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring: &LineString<f64>| Euclidean.length(ring))
        .sum()
}
