//! WKT (Well-Known Text) parsing and serialization
//!
//! Parsing delegates to the `wkt` crate. Serialization is done here so the
//! output is stable: no space between the type keyword and the coordinate
//! list, coordinates printed with Rust's shortest round-trip formatting, and
//! empty geometries rendered as `<TYPE> EMPTY`.
//!
//! GeoSPARQL literals may start with a CRS URI in angle brackets. Only
//! WGS84 (CRS84 or EPSG:4326) is accepted.

use crate::error::{Result, SpatialError};
use crate::geometry::Geometry;
use crate::vocabulary;
use geo_types::{
    Coord, Geometry as GeoGeometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Polygon,
};
use wkt::TryFromWkt;

/// Parse a WKT string, with an optional leading `<crs-uri>`, into a WGS84 geometry
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::geometry::wkt_parser::parse_wkt;
///
/// let geom = parse_wkt("POINT(9.18854 45.464664)").unwrap();
/// assert_eq!(geom.geometry_type(), "Point");
///
/// let prefixed = parse_wkt(
///     "<http://www.opengis.net/def/crs/OGC/1.3/CRS84> POINT(9.18854 45.464664)",
/// )
/// .unwrap();
/// assert_eq!(geom, prefixed);
/// ```
pub fn parse_wkt(wkt: &str) -> Result<Geometry> {
    let body = strip_crs_prefix(wkt)?;
    if body.is_empty() {
        return Err(SpatialError::ParseError("Empty WKT string".to_string()));
    }

    let normalized = normalize_linear_ring(body);
    let geom = GeoGeometry::<f64>::try_from_wkt_str(&normalized)
        .map_err(|e| SpatialError::ParseError(format!("Invalid WKT {body:?}: {e}")))?;

    Ok(Geometry::new(geom))
}

/// Split off a leading `<crs-uri>` and check that it names WGS84
fn strip_crs_prefix(wkt: &str) -> Result<&str> {
    let trimmed = wkt.trim();
    let Some(rest) = trimmed.strip_prefix('<') else {
        return Ok(trimmed);
    };

    let (uri, body) = rest
        .split_once('>')
        .ok_or_else(|| SpatialError::ParseError("Unterminated CRS URI".to_string()))?;

    if !vocabulary::is_wgs84_uri(uri.trim()) {
        return Err(SpatialError::UnsupportedCrs(uri.trim().to_string()));
    }
    Ok(body.trim())
}

/// Ring output of some producers uses `LINEARRING`, which is a `LINESTRING`
/// as far as the geometry model is concerned
fn normalize_linear_ring(body: &str) -> String {
    let upper = body.trim_start().to_ascii_uppercase();
    if upper.starts_with("LINEARRING") {
        let offset = body.len() - body.trim_start().len() + "LINEARRING".len();
        format!("LINESTRING{}", &body[offset..])
    } else {
        body.to_string()
    }
}

/// Render a geometry as WKT
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::geometry::wkt_parser::geometry_to_wkt;
/// use geo_types::{Geometry, GeometryCollection, Point};
///
/// assert_eq!(geometry_to_wkt(&Geometry::Point(Point::new(1.0, 2.5))), "POINT(1 2.5)");
/// assert_eq!(
///     geometry_to_wkt(&Geometry::GeometryCollection(GeometryCollection::default())),
///     "GEOMETRYCOLLECTION EMPTY"
/// );
/// ```
pub fn geometry_to_wkt(geom: &GeoGeometry<f64>) -> String {
    match geom {
        GeoGeometry::Point(p) => format!("POINT({})", coord_text(&p.0)),
        GeoGeometry::Line(line) => format!(
            "LINESTRING({}, {})",
            coord_text(&line.start),
            coord_text(&line.end)
        ),
        GeoGeometry::LineString(ls) => tagged("LINESTRING", ls.0.is_empty(), || {
            coord_sequence(ls)
        }),
        GeoGeometry::Polygon(poly) => {
            tagged("POLYGON", poly.exterior().0.is_empty(), || polygon_text(poly))
        }
        GeoGeometry::MultiPoint(mp) => tagged("MULTIPOINT", mp.0.is_empty(), || {
            multi_point_text(mp)
        }),
        GeoGeometry::MultiLineString(mls) => {
            tagged("MULTILINESTRING", mls.0.is_empty(), || {
                multi_line_string_text(mls)
            })
        }
        GeoGeometry::MultiPolygon(mp) => tagged("MULTIPOLYGON", mp.0.is_empty(), || {
            multi_polygon_text(mp)
        }),
        GeoGeometry::GeometryCollection(gc) => {
            tagged("GEOMETRYCOLLECTION", gc.0.is_empty(), || {
                gc.0.iter().map(geometry_to_wkt).collect::<Vec<_>>().join(", ")
            })
        }
        GeoGeometry::Rect(rect) => format!("POLYGON({})", polygon_text(&rect.to_polygon())),
        GeoGeometry::Triangle(triangle) => {
            format!("POLYGON({})", polygon_text(&triangle.to_polygon()))
        }
    }
}

fn tagged(keyword: &str, empty: bool, body: impl FnOnce() -> String) -> String {
    if empty {
        format!("{keyword} EMPTY")
    } else {
        format!("{keyword}({})", body())
    }
}

fn coord_text(coord: &Coord<f64>) -> String {
    format!("{} {}", coord.x, coord.y)
}

fn coord_sequence(ls: &LineString<f64>) -> String {
    ls.0.iter().map(coord_text).collect::<Vec<_>>().join(", ")
}

fn polygon_text(poly: &Polygon<f64>) -> String {
    std::iter::once(poly.exterior())
        .chain(poly.interiors())
        .map(|ring| format!("({})", coord_sequence(ring)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn multi_point_text(mp: &MultiPoint<f64>) -> String {
    mp.0.iter()
        .map(|p| format!("({})", coord_text(&p.0)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn multi_line_string_text(mls: &MultiLineString<f64>) -> String {
    mls.0
        .iter()
        .map(|ls| format!("({})", coord_sequence(ls)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn multi_polygon_text(mp: &MultiPolygon<f64>) -> String {
    mp.0.iter()
        .map(|poly| format!("({})", polygon_text(poly)))
        .collect::<Vec<_>>()
        .join(", ")
}
