//! Integration tests for spatial query scenarios over declared features
//!
//! These tests walk through the declaration and query API the way an
//! ontology loader and a query layer would use it.

use oxirs_geospatial::error::Result;
use oxirs_geospatial::geometry::GeoLiteral;
use oxirs_geospatial::{GeometryRole, SpatialOntology};

fn italian_cities() -> Result<SpatialOntology> {
    let mut ontology = SpatialOntology::new();
    let cities = [
        ("milan", 9.18854, 45.464664),
        ("rome", 12.496366, 41.902782),
        ("turin", 7.686864, 45.070312),
        ("naples", 14.268124, 40.851775),
    ];
    for (id, lon, lat) in cities {
        ontology.declare_point(id, lon, lat, GeometryRole::Default)?;
    }
    Ok(ontology)
}

/// Test scenario: distance between two cities in different UTM zones
/// Milan lies in zone 32, Rome in zone 33; the pair is measured in the
/// equal-area frame.
#[test]
fn test_city_distance_scenario() -> Result<()> {
    let ontology = italian_cities()?;

    let meters = ontology.distance("milan", "rome").expect("both cities declared");
    println!("Milan to Rome: {:.0} m", meters);
    assert!((450_000.0..=480_000.0).contains(&meters));

    // Symmetric, and zero to itself
    let back = ontology.distance("rome", "milan").expect("both cities declared");
    assert!((meters - back).abs() < 1e-6);
    assert_eq!(ontology.distance("milan", "milan"), Some(0.0));

    assert_eq!(ontology.distance("milan", "atlantis"), None);
    Ok(())
}

/// Test scenario: a feature tracked by several position fixes
/// The closest fix decides the distance; the largest shape decides the area.
#[test]
fn test_multi_geometry_calibration_scenario() -> Result<()> {
    let mut ontology = italian_cities()?;

    ontology.declare_point("ferry", 12.0, 42.5, GeometryRole::Default)?;
    ontology.declare_point("ferry", 12.45, 41.95, GeometryRole::Secondary)?;
    ontology.declare_point("ferry", 11.0, 43.0, GeometryRole::Secondary)?;

    let to_rome = ontology.distance("ferry", "rome").expect("declared");
    println!("Closest ferry fix to Rome: {:.0} m", to_rome);
    assert!(to_rome < 10_000.0);

    ontology.declare_polygon(
        "lake",
        &[(12.0, 42.0), (12.01, 42.0), (12.01, 42.01), (12.0, 42.01)],
        GeometryRole::Default,
    )?;
    ontology.declare_polygon(
        "lake",
        &[(12.0, 42.0), (12.02, 42.0), (12.02, 42.02), (12.0, 42.02), (12.0, 42.0)],
        GeometryRole::Secondary,
    )?;

    let area = ontology.area("lake").expect("declared");
    let perimeter = ontology.length("lake").expect("declared");
    println!("Lake: {:.0} m², perimeter {:.0} m", area, perimeter);
    // The larger survey, about 1.66 km by 2.22 km
    assert!(area > 3_500_000.0 && area < 3_900_000.0);
    assert!(perimeter > 7_500.0 && perimeter < 8_000.0);

    Ok(())
}

/// Test scenario: zero measures are answers, missing geometry is not
#[test]
fn test_zero_versus_missing_scenario() -> Result<()> {
    let mut ontology = italian_cities()?;
    ontology.declare_line_string(
        "a1",
        &[(9.18854, 45.464664), (11.342616, 44.494887)],
        GeometryRole::Default,
    )?;

    assert_eq!(ontology.length("milan"), Some(0.0));
    assert_eq!(ontology.area("milan"), Some(0.0));
    assert_eq!(ontology.area("a1"), Some(0.0));
    assert!(ontology.length("a1").expect("declared") > 150_000.0);

    assert_eq!(ontology.length("atlantis"), None);
    assert_eq!(ontology.area("atlantis"), None);
    assert!(ontology.centroid("atlantis").is_none());
    assert!(ontology.boundary("atlantis").is_none());
    assert!(ontology.buffer_around("atlantis", 10.0).is_none());

    Ok(())
}

/// Test scenario: buffering a point of interest
#[test]
fn test_buffer_scenario() -> Result<()> {
    let ontology = italian_cities()?;
    let radius = 250.0;

    let buffer = ontology
        .buffer_around("milan", radius)
        .expect("milan is declared")
        .to_geometry()?;
    assert_eq!(buffer.geometry_type(), "Polygon");

    // Every vertex lies on the circle, measured back from Milan
    let mut probe = SpatialOntology::new();
    probe.declare_point("center", 9.18854, 45.464664, GeometryRole::Default)?;
    for (i, vertex) in buffer.vertices().enumerate() {
        let id = format!("v{i}");
        probe.declare_point(&id, vertex.x, vertex.y, GeometryRole::Default)?;
        let d = probe.distance("center", &id).expect("declared");
        assert!(d <= radius + 0.01, "vertex {i} at {d} m");
        assert!(d >= radius * 0.99, "vertex {i} at {d} m");
    }

    assert_eq!(
        ontology.boundary("milan").map(|l| l.lexical().to_string()),
        Some("GEOMETRYCOLLECTION EMPTY".to_string())
    );
    Ok(())
}

/// Test scenario: "which cities lie north of Florence"
/// SELECT ?city WHERE { ?city geo:hasGeometry ?g . FILTER(northOf(?g, Florence)) }
#[test]
fn test_directional_scenario() -> Result<()> {
    let mut ontology = italian_cities()?;
    let florence = (11.255814, 43.769562);

    assert_eq!(ontology.north_of(florence.0, florence.1)?, vec!["milan", "turin"]);
    assert_eq!(ontology.south_of(florence.0, florence.1)?, vec!["rome", "naples"]);
    assert_eq!(ontology.east_of(florence.0, florence.1)?, vec!["rome", "naples"]);
    assert_eq!(ontology.west_of(florence.0, florence.1)?, vec!["milan", "turin"]);

    // A road reaching from south of Florence to north of it counts as both
    ontology.declare_line_string(
        "a1",
        &[(11.342616, 44.494887), (11.1, 43.3)],
        GeometryRole::Default,
    )?;
    assert!(ontology.north_of(florence.0, florence.1)?.contains(&"a1".to_string()));
    assert!(ontology.south_of(florence.0, florence.1)?.contains(&"a1".to_string()));

    Ok(())
}

/// Test scenario: features inside and outside a bounding box over Lombardy
#[test]
fn test_bbox_query_scenario() -> Result<()> {
    let mut ontology = italian_cities()?;
    ontology.declare_line_string(
        "a4",
        &[(7.686864, 45.070312), (9.18854, 45.464664), (12.315515, 45.440847)],
        GeometryRole::Default,
    )?;

    let inside = ontology.inside_box((8.5, 45.0), (10.5, 46.5))?;
    let outside = ontology.outside_box((8.5, 45.0), (10.5, 46.5))?;
    println!("Inside Lombardy: {:?}, outside: {:?}", inside, outside);

    assert_eq!(inside, vec!["milan"]);
    assert_eq!(outside, vec!["rome", "turin", "naples"]);
    // The motorway is neither inside nor outside
    assert!(!inside.contains(&"a4".to_string()));
    assert!(!outside.contains(&"a4".to_string()));

    assert!(ontology.inside_box((8.5, 45.0), (200.0, 46.5)).is_err());
    Ok(())
}

/// Test scenario: proximity around a feature and around a coordinate
#[test]
fn test_proximity_scenario() -> Result<()> {
    let mut ontology = italian_cities()?;
    ontology.declare_point("duomo", 9.191926, 45.464211, GeometryRole::Default)?;
    ontology.declare_point("linate", 9.278372, 45.449548, GeometryRole::Default)?;

    assert_eq!(ontology.near_by("milan", 1_000.0), vec!["duomo"]);
    assert_eq!(ontology.near_by("milan", 10_000.0), vec!["duomo", "linate"]);
    assert!(ontology.near_by("atlantis", 10_000.0).is_empty());

    assert_eq!(
        ontology.near_point(9.19, 45.464, 1_000.0)?,
        vec!["milan", "duomo"]
    );
    Ok(())
}

/// Test scenario: rivers crossed by a motorway
#[test]
fn test_crossed_by_scenario() -> Result<()> {
    let mut ontology = SpatialOntology::new();
    ontology.declare_line_string(
        "a4",
        &[(7.686864, 45.070312), (9.18854, 45.464664), (12.315515, 45.440847)],
        GeometryRole::Default,
    )?;
    ontology.declare_literal(
        "ticino",
        &GeoLiteral::wkt("LINESTRING(8.9 45.8, 8.9 45.1)"),
        GeometryRole::Default,
    )?;
    ontology.declare_literal(
        "adda",
        &GeoLiteral::wkt("LINESTRING(9.5 45.9, 9.5 45.0)"),
        GeometryRole::Default,
    )?;
    ontology.declare_literal(
        "tevere",
        &GeoLiteral::wkt("LINESTRING(12.4 42.5, 12.4 41.7)"),
        GeometryRole::Default,
    )?;

    assert_eq!(ontology.crossed_by("a4"), vec!["ticino", "adda"]);
    assert!(ontology.crossed_by("tevere").is_empty());
    Ok(())
}

/// Test scenario: repeated loads do not change what was declared first
#[test]
fn test_idempotent_declaration_scenario() -> Result<()> {
    let mut ontology = italian_cities()?;

    let before = ontology.distance("milan", "rome");
    assert!(!ontology.declare_point("milan", 2.3522, 48.8566, GeometryRole::Default)?);
    assert_eq!(ontology.distance("milan", "rome"), before);
    assert_eq!(ontology.registry().len(), 4);

    Ok(())
}
