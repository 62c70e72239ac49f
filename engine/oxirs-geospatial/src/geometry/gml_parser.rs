//! GML (Geography Markup Language) 3.2 parser and serializer
//!
//! Supports Point, LineString, LinearRing, Polygon, MultiPoint,
//! MultiCurve/MultiLineString, MultiSurface/MultiPolygon and MultiGeometry.
//! Coordinates are read longitude first (CRS84 axis order), two per position.
//! The fragment is read into a small element tree before conversion so that
//! nested members are handled by plain recursion.

use crate::error::{Result, SpatialError};
use crate::geometry::Geometry;
use crate::vocabulary;
use geo_types::{
    Coord, Geometry as GeoGeometry, GeometryCollection, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// Element of a parsed GML fragment, with namespace prefixes stripped
#[derive(Debug, Default)]
struct GmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<GmlElement>,
    text: String,
}

impl GmlElement {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local_name(key) == name)
            .map(|(_, value)| value.as_str())
    }

    fn child(&self, name: &str) -> Option<&GmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a GmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn local_name(qualified: &str) -> &str {
    qualified
        .rsplit_once(':')
        .map(|(_, local)| local)
        .unwrap_or(qualified)
}

/// Parse a GML string into a WGS84 geometry
///
/// # Examples
/// ```
/// use oxirs_geospatial::geometry::gml_parser::parse_gml;
///
/// let gml = r#"<gml:Point xmlns:gml="http://www.opengis.net/gml/3.2">
///     <gml:pos>9.18854 45.464664</gml:pos>
/// </gml:Point>"#;
///
/// let geometry = parse_gml(gml).unwrap();
/// assert_eq!(geometry.geometry_type(), "Point");
/// ```
pub fn parse_gml(gml_str: &str) -> Result<Geometry> {
    let root = read_element_tree(gml_str)?;

    if let Some(srs) = root.attribute("srsName") {
        if !vocabulary::is_wgs84_uri(srs) {
            return Err(SpatialError::UnsupportedCrs(srs.to_string()));
        }
    }

    Ok(Geometry::new(element_to_geometry(&root)?))
}

fn read_element_tree(gml_str: &str) -> Result<GmlElement> {
    let mut reader = Reader::from_str(gml_str);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<GmlElement> = Vec::new();
    let mut root: Option<GmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(start_element(&e)?),
            Ok(Event::Empty(e)) => {
                let element = start_element(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = String::from_utf8_lossy(e.as_ref());
                    if !current.text.is_empty() {
                        current.text.push(' ');
                    }
                    current.text.push_str(text.trim());
                }
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| {
                    SpatialError::ParseError("Unbalanced GML end tag".to_string())
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SpatialError::ParseError(format!(
                    "XML parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(SpatialError::ParseError(
            "Unterminated GML element".to_string(),
        ));
    }
    root.ok_or_else(|| SpatialError::ParseError("No GML geometry element found".to_string()))
}

fn start_element(e: &BytesStart<'_>) -> Result<GmlElement> {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr
            .map_err(|err| SpatialError::ParseError(format!("Invalid GML attribute: {err}")))?;
        attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).to_string(),
            String::from_utf8_lossy(&attr.value).to_string(),
        ));
    }
    Ok(GmlElement {
        name: local_name(&name).to_string(),
        attributes,
        ..GmlElement::default()
    })
}

fn attach(
    stack: &mut [GmlElement],
    root: &mut Option<GmlElement>,
    element: GmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(SpatialError::ParseError(
                "GML fragment has more than one root element".to_string(),
            ))
        }
    }
    Ok(())
}

fn element_to_geometry(element: &GmlElement) -> Result<GeoGeometry<f64>> {
    match element.name.as_str() {
        "Point" => Ok(GeoGeometry::Point(parse_point(element)?)),
        "LineString" | "LinearRing" => Ok(GeoGeometry::LineString(parse_line(element)?)),
        "Polygon" => Ok(GeoGeometry::Polygon(parse_polygon(element)?)),
        "MultiPoint" => {
            let points = members(element, &["pointMember", "pointMembers"])
                .map(parse_point)
                .collect::<Result<Vec<_>>>()?;
            Ok(GeoGeometry::MultiPoint(MultiPoint::new(points)))
        }
        "MultiCurve" | "MultiLineString" => {
            let lines = members(
                element,
                &["curveMember", "curveMembers", "lineStringMember"],
            )
            .map(parse_line)
            .collect::<Result<Vec<_>>>()?;
            Ok(GeoGeometry::MultiLineString(MultiLineString::new(lines)))
        }
        "MultiSurface" | "MultiPolygon" => {
            let polygons = members(
                element,
                &["surfaceMember", "surfaceMembers", "polygonMember"],
            )
            .map(parse_polygon)
            .collect::<Result<Vec<_>>>()?;
            Ok(GeoGeometry::MultiPolygon(MultiPolygon::new(polygons)))
        }
        "MultiGeometry" => {
            let geometries = members(element, &["geometryMember", "geometryMembers"])
                .map(element_to_geometry)
                .collect::<Result<Vec<_>>>()?;
            Ok(GeoGeometry::GeometryCollection(GeometryCollection::new_from(
                geometries,
            )))
        }
        other => Err(SpatialError::ParseError(format!(
            "Unsupported GML geometry element: {other}"
        ))),
    }
}

/// Geometry elements wrapped by any of the given member properties
fn members<'a>(
    element: &'a GmlElement,
    properties: &'a [&'a str],
) -> impl Iterator<Item = &'a GmlElement> {
    element
        .children
        .iter()
        .filter(move |c| properties.contains(&c.name.as_str()))
        .flat_map(|property| property.children.iter())
}

fn parse_point(element: &GmlElement) -> Result<Point<f64>> {
    if element.name != "Point" {
        return Err(SpatialError::ParseError(format!(
            "Expected gml:Point, found gml:{}",
            element.name
        )));
    }
    let coords = element_coords(element)?;
    match coords.as_slice() {
        [coord] => Ok(Point(*coord)),
        _ => Err(SpatialError::ParseError(format!(
            "gml:Point needs exactly one position, found {}",
            coords.len()
        ))),
    }
}

fn parse_line(element: &GmlElement) -> Result<LineString<f64>> {
    if element.name != "LineString" && element.name != "LinearRing" {
        return Err(SpatialError::ParseError(format!(
            "Expected gml:LineString, found gml:{}",
            element.name
        )));
    }
    Ok(LineString::new(element_coords(element)?))
}

fn parse_polygon(element: &GmlElement) -> Result<Polygon<f64>> {
    if element.name != "Polygon" {
        return Err(SpatialError::ParseError(format!(
            "Expected gml:Polygon, found gml:{}",
            element.name
        )));
    }

    let exterior = element
        .child("exterior")
        .and_then(|boundary| boundary.child("LinearRing"))
        .ok_or_else(|| SpatialError::ParseError("gml:Polygon without exterior".to_string()))?;

    let interiors = element
        .children_named("interior")
        .filter_map(|boundary| boundary.child("LinearRing"))
        .map(parse_line)
        .collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(parse_line(exterior)?, interiors))
}

/// Coordinates from `posList`, a sequence of `pos`, or legacy `coordinates`
fn element_coords(element: &GmlElement) -> Result<Vec<Coord<f64>>> {
    if let Some(pos_list) = element.child("posList") {
        check_dimension(pos_list)?;
        return pairs(&pos_list.text);
    }

    if let Some(coordinates) = element.child("coordinates") {
        return coordinates
            .text
            .split_whitespace()
            .map(|tuple| {
                let values = tuple.split(',').collect::<Vec<_>>();
                if values.len() < 2 {
                    return Err(SpatialError::ParseError(format!(
                        "Invalid gml:coordinates tuple: {tuple}"
                    )));
                }
                Ok(Coord {
                    x: parse_number(values[0])?,
                    y: parse_number(values[1])?,
                })
            })
            .collect();
    }

    let mut coords = Vec::new();
    for pos in element.children_named("pos") {
        check_dimension(pos)?;
        coords.extend(pairs(&pos.text)?);
    }
    if coords.is_empty() {
        return Err(SpatialError::ParseError(format!(
            "gml:{} has no coordinates",
            element.name
        )));
    }
    Ok(coords)
}

fn check_dimension(element: &GmlElement) -> Result<()> {
    match element.attribute("srsDimension") {
        None | Some("2") => Ok(()),
        Some(other) => Err(SpatialError::ParseError(format!(
            "Only two-dimensional GML positions are supported, got srsDimension={other}"
        ))),
    }
}

fn pairs(text: &str) -> Result<Vec<Coord<f64>>> {
    let values = text
        .split_whitespace()
        .map(parse_number)
        .collect::<Result<Vec<_>>>()?;
    if values.len() % 2 != 0 {
        return Err(SpatialError::ParseError(format!(
            "Odd number of ordinates in GML position list: {}",
            values.len()
        )));
    }
    Ok(values
        .chunks_exact(2)
        .map(|pair| Coord {
            x: pair[0],
            y: pair[1],
        })
        .collect())
}

fn parse_number(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| SpatialError::ParseError(format!("Invalid GML ordinate: {value}")))
}

/// Convert a Geometry to a GML 3.2 string
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::geometry::Geometry;
/// use oxirs_geospatial::geometry::gml_parser::geometry_to_gml;
/// use geo_types::{Point, Geometry as GeoGeometry};
///
/// let geom = Geometry::new(GeoGeometry::Point(Point::new(9.18854, 45.464664)));
/// let gml = geometry_to_gml(&geom).unwrap();
/// assert!(gml.contains("<gml:pos>9.18854 45.464664</gml:pos>"));
/// ```
pub fn geometry_to_gml(geometry: &Geometry) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let srs_name = if geometry.crs.is_wgs84() {
        vocabulary::DEFAULT_CRS.to_string()
    } else {
        geometry.crs.uri()
    };

    write_geometry(&mut writer, &geometry.geom, Some(&srs_name))?;

    let result = writer.into_inner().into_inner();
    String::from_utf8(result)
        .map_err(|e| SpatialError::SerializationError(format!("UTF-8 conversion error: {e}")))
}

type GmlWriter = Writer<Cursor<Vec<u8>>>;

fn xml_error(e: impl std::fmt::Display) -> SpatialError {
    SpatialError::SerializationError(format!("XML write error: {e}"))
}

/// Opening tag; the root element also carries the namespace and CRS
fn open(writer: &mut GmlWriter, name: &str, root_srs: Option<&str>) -> Result<()> {
    let mut start = BytesStart::new(name);
    if let Some(srs) = root_srs {
        start.push_attribute(("xmlns:gml", vocabulary::GML_NAMESPACE));
        start.push_attribute(("srsName", srs));
    }
    writer.write_event(Event::Start(start)).map_err(xml_error)
}

fn close(writer: &mut GmlWriter, name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)
}

fn text_element(writer: &mut GmlWriter, name: &str, text: &str) -> Result<()> {
    open(writer, name, None)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_error)?;
    close(writer, name)
}

fn pos_list(coords: &[Coord<f64>]) -> String {
    coords
        .iter()
        .map(|c| format!("{} {}", c.x, c.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_geometry(
    writer: &mut GmlWriter,
    geom: &GeoGeometry<f64>,
    root_srs: Option<&str>,
) -> Result<()> {
    match geom {
        GeoGeometry::Point(point) => {
            open(writer, "gml:Point", root_srs)?;
            text_element(writer, "gml:pos", &format!("{} {}", point.x(), point.y()))?;
            close(writer, "gml:Point")
        }
        GeoGeometry::Line(line) => {
            let ls = LineString::new(vec![line.start, line.end]);
            write_geometry(writer, &GeoGeometry::LineString(ls), root_srs)
        }
        GeoGeometry::LineString(ls) => {
            open(writer, "gml:LineString", root_srs)?;
            text_element(writer, "gml:posList", &pos_list(&ls.0))?;
            close(writer, "gml:LineString")
        }
        GeoGeometry::Polygon(polygon) => write_polygon(writer, polygon, root_srs),
        GeoGeometry::MultiPoint(mp) => {
            open(writer, "gml:MultiPoint", root_srs)?;
            for point in &mp.0 {
                open(writer, "gml:pointMember", None)?;
                write_geometry(writer, &GeoGeometry::Point(*point), None)?;
                close(writer, "gml:pointMember")?;
            }
            close(writer, "gml:MultiPoint")
        }
        GeoGeometry::MultiLineString(mls) => {
            open(writer, "gml:MultiCurve", root_srs)?;
            for ls in &mls.0 {
                open(writer, "gml:curveMember", None)?;
                write_geometry(writer, &GeoGeometry::LineString(ls.clone()), None)?;
                close(writer, "gml:curveMember")?;
            }
            close(writer, "gml:MultiCurve")
        }
        GeoGeometry::MultiPolygon(mp) => {
            open(writer, "gml:MultiSurface", root_srs)?;
            for polygon in &mp.0 {
                open(writer, "gml:surfaceMember", None)?;
                write_polygon(writer, polygon, None)?;
                close(writer, "gml:surfaceMember")?;
            }
            close(writer, "gml:MultiSurface")
        }
        GeoGeometry::GeometryCollection(gc) => {
            open(writer, "gml:MultiGeometry", root_srs)?;
            for member in &gc.0 {
                open(writer, "gml:geometryMember", None)?;
                write_geometry(writer, member, None)?;
                close(writer, "gml:geometryMember")?;
            }
            close(writer, "gml:MultiGeometry")
        }
        GeoGeometry::Rect(rect) => write_polygon(writer, &rect.to_polygon(), root_srs),
        GeoGeometry::Triangle(triangle) => {
            write_polygon(writer, &triangle.to_polygon(), root_srs)
        }
    }
}

fn write_polygon(
    writer: &mut GmlWriter,
    polygon: &Polygon<f64>,
    root_srs: Option<&str>,
) -> Result<()> {
    open(writer, "gml:Polygon", root_srs)?;
    write_ring(writer, "gml:exterior", polygon.exterior())?;
    for hole in polygon.interiors() {
        write_ring(writer, "gml:interior", hole)?;
    }
    close(writer, "gml:Polygon")
}

fn write_ring(writer: &mut GmlWriter, boundary: &str, ring: &LineString<f64>) -> Result<()> {
    open(writer, boundary, None)?;
    open(writer, "gml:LinearRing", None)?;
    text_element(writer, "gml:posList", &pos_list(&ring.0))?;
    close(writer, "gml:LinearRing")?;
    close(writer, boundary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_gml_point() {
        let gml = r#"<gml:Point xmlns:gml="http://www.opengis.net/gml/3.2"
            srsName="http://www.opengis.net/def/crs/OGC/1.3/CRS84">
            <gml:pos>12.4964 41.9028</gml:pos>
        </gml:Point>"#;
        let geom = parse_gml(gml).unwrap();
        match geom.geom {
            GeoGeometry::Point(p) => {
                assert_relative_eq!(p.x(), 12.4964);
                assert_relative_eq!(p.y(), 41.9028);
            }
            _ => panic!("Expected Point geometry"),
        }
    }

    #[test]
    fn test_parse_gml_polygon_with_hole() {
        let gml = r#"<gml:Polygon xmlns:gml="http://www.opengis.net/gml/3.2">
            <gml:exterior><gml:LinearRing>
                <gml:posList>0 0 10 0 10 10 0 10 0 0</gml:posList>
            </gml:LinearRing></gml:exterior>
            <gml:interior><gml:LinearRing>
                <gml:posList>2 2 4 2 4 4 2 2</gml:posList>
            </gml:LinearRing></gml:interior>
        </gml:Polygon>"#;
        let geom = parse_gml(gml).unwrap();
        match geom.geom {
            GeoGeometry::Polygon(p) => {
                assert_eq!(p.exterior().0.len(), 5);
                assert_eq!(p.interiors().len(), 1);
            }
            _ => panic!("Expected Polygon geometry"),
        }
    }

    #[test]
    fn test_parse_gml_multi_curve() {
        let gml = r#"<gml:MultiCurve xmlns:gml="http://www.opengis.net/gml/3.2">
            <gml:curveMember><gml:LineString><gml:posList>0 0 1 1</gml:posList></gml:LineString></gml:curveMember>
            <gml:curveMember><gml:LineString><gml:pos>2 2</gml:pos><gml:pos>3 3</gml:pos></gml:LineString></gml:curveMember>
        </gml:MultiCurve>"#;
        let geom = parse_gml(gml).unwrap();
        assert_eq!(geom.to_wkt(), "MULTILINESTRING((0 0, 1 1), (2 2, 3 3))");
    }

    #[test]
    fn test_parse_gml_errors() {
        assert!(parse_gml("<gml:Point><gml:pos>1</gml:pos></gml:Point>").is_err());
        assert!(parse_gml("<gml:Curve/>").is_err());
        assert!(parse_gml("not xml at all").is_err());
        assert!(matches!(
            parse_gml(
                r#"<gml:Point srsName="http://www.opengis.net/def/crs/EPSG/0/3857"><gml:pos>1 2</gml:pos></gml:Point>"#
            ),
            Err(SpatialError::UnsupportedCrs(_))
        ));
    }

    #[test]
    fn test_gml_round_trip() {
        let wkts = [
            "POINT(9.18854 45.464664)",
            "LINESTRING(0 0, 1 1, 2 0)",
            "POLYGON((0 0, 4 0, 4 4, 0 4, 0 0))",
            "MULTIPOINT((1 2), (3 4))",
            "MULTIPOLYGON(((0 0, 1 0, 1 1, 0 0)), ((5 5, 6 5, 6 6, 5 5)))",
            "GEOMETRYCOLLECTION(POINT(1 2), LINESTRING(0 0, 1 1))",
        ];
        for wkt in wkts {
            let geom = Geometry::from_wkt(wkt).unwrap();
            let gml = geom.to_gml().unwrap();
            let parsed = parse_gml(&gml).unwrap();
            assert_eq!(parsed, geom, "round trip through GML failed for {wkt}");
        }
    }

    #[test]
    fn test_empty_collection_gml() {
        let geom = Geometry::new(GeoGeometry::GeometryCollection(
            GeometryCollection::default(),
        ));
        let gml = geom.to_gml().unwrap();
        assert!(gml.starts_with("<gml:MultiGeometry"));
        assert!(parse_gml(&gml).unwrap().is_empty());
    }
}
