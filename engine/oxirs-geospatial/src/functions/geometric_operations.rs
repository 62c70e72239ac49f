//! Geometric operations (distance, buffer, convex hull, set operations,
//! envelope, boundary, centroid)
//!
//! Results keep the frame of the first operand. Single-member collections
//! produced by the geometry library are unwrapped to their member so that
//! buffering a point yields a `Polygon`, not a one-element `MultiPolygon`.

use crate::error::{Result, SpatialError};
use crate::geometry::Geometry;
use geo::algorithm::{Area, BooleanOps, Buffer, Centroid, ConvexHull, Intersects};
use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{BoundingRect, Distance, Euclidean};
use geo_types::{
    Coord, Geometry as GeoGeometry, GeometryCollection, Line, LineString, MultiLineString,
    MultiPoint, MultiPolygon, Point, Polygon,
};

/// Calculate the distance between two geometries
pub fn distance(geom1: &Geometry, geom2: &Geometry) -> Result<f64> {
    geom1.validate_crs_compatibility(geom2)?;
    if geom1.is_empty() || geom2.is_empty() {
        return Err(SpatialError::GeometryOperationFailed(
            "Distance to an empty geometry is undefined".to_string(),
        ));
    }
    Ok(Euclidean.distance(&geom1.geom, &geom2.geom))
}

/// Create a buffer around a geometry with round caps and joins
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::geometry::Geometry;
/// use oxirs_geospatial::functions::geometric_operations::buffer;
///
/// let point = Geometry::from_wkt("POINT(0 0)").unwrap();
/// let circle = buffer(&point, 10.0).unwrap();
/// assert_eq!(circle.geometry_type(), "Polygon");
/// ```
pub fn buffer(geom: &Geometry, distance: f64) -> Result<Geometry> {
    if !distance.is_finite() {
        return Err(SpatialError::GeometryOperationFailed(format!(
            "Buffer distance must be finite, got {distance}"
        )));
    }
    let buffered = geom.geom.buffer(distance);
    Ok(Geometry::with_crs(from_multi_polygon(buffered), geom.crs))
}

/// Calculate the convex hull of a geometry
///
/// Degenerate hulls collapse to a point or a line string.
pub fn convex_hull(geom: &Geometry) -> Result<Geometry> {
    if geom.is_empty() {
        return Ok(Geometry::with_crs(empty_collection(), geom.crs));
    }

    let hull = geom.geom.convex_hull();
    let mut distinct: Vec<Coord<f64>> = Vec::new();
    for coord in hull.exterior().coords() {
        if !distinct.contains(coord) {
            distinct.push(*coord);
        }
    }

    let result = match distinct.len() {
        0 => empty_collection(),
        1 => GeoGeometry::Point(Point(distinct[0])),
        _ if distinct.len() == 2 || hull.unsigned_area() == 0.0 => {
            // Collinear input: the hull is the segment between the extremes
            let lexicographic = |a: &&Coord<f64>, b: &&Coord<f64>| {
                a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
            };
            match (
                distinct.iter().min_by(lexicographic),
                distinct.iter().max_by(lexicographic),
            ) {
                (Some(min), Some(max)) => GeoGeometry::LineString(LineString::new(vec![*min, *max])),
                _ => empty_collection(),
            }
        }
        _ => GeoGeometry::Polygon(hull),
    };
    Ok(Geometry::with_crs(result, geom.crs))
}

/// Calculate the intersection of two geometries
///
/// Supported combinations:
/// - Polygonal with polygonal
/// - Lineal with polygonal (the lines are clipped)
/// - Lineal with lineal (crossing points and shared segments)
/// - Points with anything (the points covered by the other operand)
pub fn intersection(geom1: &Geometry, geom2: &Geometry) -> Result<Geometry> {
    geom1.validate_crs_compatibility(geom2)?;

    let (a, b) = (&geom1.geom, &geom2.geom);
    let result = if let (Some(p1), Some(p2)) = (polygonal(a), polygonal(b)) {
        from_multi_polygon(p1.intersection(&p2))
    } else if let (Some(lines), Some(area)) = (lineal(a), polygonal(b)) {
        from_multi_line_string(area.clip(&lines, false))
    } else if let (Some(area), Some(lines)) = (polygonal(a), lineal(b)) {
        from_multi_line_string(area.clip(&lines, false))
    } else if let (Some(l1), Some(l2)) = (lineal(a), lineal(b)) {
        line_crossings(&l1, &l2)
    } else if let Some(points) = puntal(a) {
        from_multi_point(filter_points(&points, b, true))
    } else if let Some(points) = puntal(b) {
        from_multi_point(filter_points(&points, a, true))
    } else {
        return Err(unsupported("Intersection", geom1, geom2));
    };

    Ok(Geometry::with_crs(result, geom1.crs))
}

/// Calculate the union of two geometries
///
/// Supported for two polygonal, two lineal or two puntal operands. Lineal
/// members are collected as they are, without splitting at crossings.
pub fn union(geom1: &Geometry, geom2: &Geometry) -> Result<Geometry> {
    geom1.validate_crs_compatibility(geom2)?;

    let result = if let (Some(p1), Some(p2)) = (polygonal(&geom1.geom), polygonal(&geom2.geom)) {
        from_multi_polygon(p1.union(&p2))
    } else if let (Some(l1), Some(l2)) = (lineal(&geom1.geom), lineal(&geom2.geom)) {
        let mut lines = l1.0;
        for line in l2.0 {
            if !lines.contains(&line) {
                lines.push(line);
            }
        }
        from_multi_line_string(MultiLineString::new(lines))
    } else if let (Some(m1), Some(m2)) = (puntal(&geom1.geom), puntal(&geom2.geom)) {
        let mut points = m1.0;
        for point in m2.0 {
            if !points.contains(&point) {
                points.push(point);
            }
        }
        from_multi_point(MultiPoint::new(points))
    } else {
        return Err(unsupported("Union", geom1, geom2));
    };

    Ok(Geometry::with_crs(result, geom1.crs))
}

/// Calculate the difference of two geometries (geom1 - geom2)
pub fn difference(geom1: &Geometry, geom2: &Geometry) -> Result<Geometry> {
    geom1.validate_crs_compatibility(geom2)?;

    let result = if let (Some(p1), Some(p2)) = (polygonal(&geom1.geom), polygonal(&geom2.geom)) {
        from_multi_polygon(p1.difference(&p2))
    } else if let (Some(lines), Some(area)) = (lineal(&geom1.geom), polygonal(&geom2.geom)) {
        from_multi_line_string(area.clip(&lines, true))
    } else if let Some(points) = puntal(&geom1.geom) {
        from_multi_point(filter_points(&points, &geom2.geom, false))
    } else {
        return Err(unsupported("Difference", geom1, geom2));
    };

    Ok(Geometry::with_crs(result, geom1.crs))
}

/// Calculate the symmetric difference of two polygonal geometries
pub fn sym_difference(geom1: &Geometry, geom2: &Geometry) -> Result<Geometry> {
    geom1.validate_crs_compatibility(geom2)?;

    match (polygonal(&geom1.geom), polygonal(&geom2.geom)) {
        (Some(p1), Some(p2)) => Ok(Geometry::with_crs(
            from_multi_polygon(p1.xor(&p2)),
            geom1.crs,
        )),
        _ => Err(unsupported("Symmetric difference", geom1, geom2)),
    }
}

/// Calculate the envelope (bounding box) of a geometry
///
/// A degenerate box collapses to a point or a line string.
pub fn envelope(geom: &Geometry) -> Result<Geometry> {
    let Some(rect) = geom.geom.bounding_rect() else {
        return Ok(Geometry::with_crs(empty_collection(), geom.crs));
    };

    let (min, max) = (rect.min(), rect.max());
    let result = if min == max {
        GeoGeometry::Point(Point(min))
    } else if min.x == max.x || min.y == max.y {
        GeoGeometry::LineString(LineString::new(vec![min, max]))
    } else {
        GeoGeometry::Polygon(rect.to_polygon())
    };
    Ok(Geometry::with_crs(result, geom.crs))
}

/// Calculate the boundary of a geometry
///
/// Returns the boundary according to the OGC Simple Features specification:
/// - Point/MultiPoint: empty geometry collection
/// - LineString: the two end points, empty when closed
/// - MultiLineString: end points shared by an odd number of members
/// - Polygon: its rings as line strings
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::geometry::Geometry;
/// use oxirs_geospatial::functions::geometric_operations::boundary;
///
/// let square = Geometry::from_wkt("POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))").unwrap();
/// assert_eq!(boundary(&square).unwrap().to_wkt(), "LINESTRING(0 0, 1 0, 1 1, 0 1, 0 0)");
///
/// let point = Geometry::from_wkt("POINT(3 4)").unwrap();
/// assert_eq!(boundary(&point).unwrap().to_wkt(), "GEOMETRYCOLLECTION EMPTY");
/// ```
pub fn boundary(geom: &Geometry) -> Result<Geometry> {
    let result = match &geom.geom {
        GeoGeometry::Point(_) | GeoGeometry::MultiPoint(_) => empty_collection(),
        GeoGeometry::Line(line) => line_boundary(&[line.start, line.end]),
        GeoGeometry::LineString(ls) => line_boundary(&ls.0),
        GeoGeometry::MultiLineString(mls) => multi_line_boundary(mls),
        GeoGeometry::Polygon(polygon) => rings_boundary(std::slice::from_ref(polygon)),
        GeoGeometry::MultiPolygon(mp) => rings_boundary(&mp.0),
        GeoGeometry::Rect(rect) => rings_boundary(&[rect.to_polygon()]),
        GeoGeometry::Triangle(triangle) => rings_boundary(&[triangle.to_polygon()]),
        GeoGeometry::GeometryCollection(_) => {
            return Err(SpatialError::UnsupportedOperation(
                "Boundary is not defined for geometry collections".to_string(),
            ))
        }
    };
    Ok(Geometry::with_crs(result, geom.crs))
}

/// Calculate the centroid of a geometry
pub fn centroid(geom: &Geometry) -> Result<Geometry> {
    let point = geom.geom.centroid().ok_or_else(|| {
        SpatialError::GeometryOperationFailed("Centroid of an empty geometry".to_string())
    })?;
    Ok(Geometry::with_crs(GeoGeometry::Point(point), geom.crs))
}

fn unsupported(operation: &str, geom1: &Geometry, geom2: &Geometry) -> SpatialError {
    SpatialError::UnsupportedOperation(format!(
        "{operation} not supported for {} and {}",
        geom1.geometry_type(),
        geom2.geometry_type()
    ))
}

fn empty_collection() -> GeoGeometry<f64> {
    GeoGeometry::GeometryCollection(GeometryCollection::default())
}

fn polygonal(geom: &GeoGeometry<f64>) -> Option<MultiPolygon<f64>> {
    match geom {
        GeoGeometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        GeoGeometry::MultiPolygon(mp) => Some(mp.clone()),
        GeoGeometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        GeoGeometry::Triangle(t) => Some(MultiPolygon::new(vec![t.to_polygon()])),
        _ => None,
    }
}

fn lineal(geom: &GeoGeometry<f64>) -> Option<MultiLineString<f64>> {
    match geom {
        GeoGeometry::Line(line) => Some(MultiLineString::new(vec![LineString::new(vec![
            line.start, line.end,
        ])])),
        GeoGeometry::LineString(ls) => Some(MultiLineString::new(vec![ls.clone()])),
        GeoGeometry::MultiLineString(mls) => Some(mls.clone()),
        _ => None,
    }
}

fn puntal(geom: &GeoGeometry<f64>) -> Option<MultiPoint<f64>> {
    match geom {
        GeoGeometry::Point(p) => Some(MultiPoint::new(vec![*p])),
        GeoGeometry::MultiPoint(mp) => Some(mp.clone()),
        _ => None,
    }
}

/// Points that do (`keep_covered`) or do not intersect `other`
fn filter_points(
    points: &MultiPoint<f64>,
    other: &GeoGeometry<f64>,
    keep_covered: bool,
) -> MultiPoint<f64> {
    MultiPoint::new(
        points
            .iter()
            .filter(|p| other.intersects(*p) == keep_covered)
            .copied()
            .collect(),
    )
}

/// Pairwise segment intersection of two lineal geometries
///
/// Crossing points that lie on a shared segment are dropped. The result is
/// puntal, lineal, a collection of both, or empty.
fn line_crossings(l1: &MultiLineString<f64>, l2: &MultiLineString<f64>) -> GeoGeometry<f64> {
    let mut points: Vec<Point<f64>> = Vec::new();
    let mut shared: Vec<Line<f64>> = Vec::new();

    for s1 in l1.iter().flat_map(|ls| ls.lines()) {
        for s2 in l2.iter().flat_map(|ls| ls.lines()) {
            match line_intersection(s1, s2) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    let point = Point(intersection);
                    if !points.contains(&point) {
                        points.push(point);
                    }
                }
                Some(LineIntersection::Collinear { intersection })
                    if intersection.start != intersection.end =>
                {
                    if !shared.contains(&intersection) {
                        shared.push(intersection);
                    }
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    let point = Point(intersection.start);
                    if !points.contains(&point) {
                        points.push(point);
                    }
                }
                None => {}
            }
        }
    }
    points.retain(|p| !shared.iter().any(|segment| segment.intersects(p)));

    let lines = MultiLineString::new(
        shared
            .into_iter()
            .map(|segment| LineString::new(vec![segment.start, segment.end]))
            .collect(),
    );
    match (points.is_empty(), lines.0.is_empty()) {
        (true, true) => empty_collection(),
        (false, true) => from_multi_point(MultiPoint::new(points)),
        (true, false) => from_multi_line_string(lines),
        (false, false) => GeoGeometry::GeometryCollection(GeometryCollection(vec![
            from_multi_line_string(lines),
            from_multi_point(MultiPoint::new(points)),
        ])),
    }
}

fn from_multi_polygon(mut mp: MultiPolygon<f64>) -> GeoGeometry<f64> {
    if mp.0.len() == 1 {
        GeoGeometry::Polygon(mp.0.remove(0))
    } else {
        GeoGeometry::MultiPolygon(mp)
    }
}

fn from_multi_line_string(mut mls: MultiLineString<f64>) -> GeoGeometry<f64> {
    if mls.0.len() == 1 {
        GeoGeometry::LineString(mls.0.remove(0))
    } else {
        GeoGeometry::MultiLineString(mls)
    }
}

fn from_multi_point(mut mp: MultiPoint<f64>) -> GeoGeometry<f64> {
    if mp.0.len() == 1 {
        GeoGeometry::Point(mp.0.remove(0))
    } else {
        GeoGeometry::MultiPoint(mp)
    }
}

fn line_boundary(coords: &[Coord<f64>]) -> GeoGeometry<f64> {
    match (coords.first(), coords.last()) {
        (Some(first), Some(last)) if first != last => GeoGeometry::MultiPoint(MultiPoint::new(
            vec![Point(*first), Point(*last)],
        )),
        _ => GeoGeometry::MultiPoint(MultiPoint::new(vec![])),
    }
}

/// Mod-2 rule: an end point is on the boundary when it ends an odd number of members
fn multi_line_boundary(mls: &MultiLineString<f64>) -> GeoGeometry<f64> {
    let mut endpoints: Vec<(Coord<f64>, usize)> = Vec::new();
    for ls in mls.iter().filter(|ls| !ls.is_closed()) {
        for end in [ls.0.first(), ls.0.last()].into_iter().flatten() {
            match endpoints.iter_mut().find(|(c, _)| c == end) {
                Some((_, count)) => *count += 1,
                None => endpoints.push((*end, 1)),
            }
        }
    }

    GeoGeometry::MultiPoint(MultiPoint::new(
        endpoints
            .into_iter()
            .filter(|(_, count)| count % 2 == 1)
            .map(|(coord, _)| Point(coord))
            .collect(),
    ))
}

fn rings_boundary(polygons: &[Polygon<f64>]) -> GeoGeometry<f64> {
    let rings: Vec<LineString<f64>> = polygons
        .iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
        .filter(|ring| !ring.0.is_empty())
        .cloned()
        .collect();
    from_multi_line_string(MultiLineString::new(rings))
}
