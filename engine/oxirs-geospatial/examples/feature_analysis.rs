//! Feature analysis walkthrough for oxirs-geospatial
//!
//! Declares a handful of places around Milan and Rome, runs the analysis
//! queries over them, and evaluates GeoSPARQL function expressions over a
//! small result table.

use oxirs_geospatial::error::Result;
use oxirs_geospatial::geometry::GeoLiteral;
use oxirs_geospatial::{
    EvalValue, ExpressionEvaluator, ExpressionNode, GeometryRole, Operation, SpatialConfig,
    SpatialOntology,
};
use std::collections::HashMap;

// ============================================================================
// Step 1: Declaring features
// ============================================================================

fn declare_features() -> Result<SpatialOntology> {
    println!("\n=== Step 1: Declaring features ===\n");

    let config = SpatialConfig::from_toml_str(
        r#"
        coordinate_precision = 8
        max_relation_candidates = 10
        "#,
    )?;
    let mut ontology = SpatialOntology::with_config(config)?;

    ontology.declare_point("milan", 9.18854, 45.464664, GeometryRole::Default)?;
    ontology.declare_point("rome", 12.496366, 41.902782, GeometryRole::Default)?;
    ontology.declare_point("duomo", 9.191926, 45.464211, GeometryRole::Default)?;
    ontology.declare_polygon(
        "parco_sempione",
        &[(9.170, 45.470), (9.182, 45.470), (9.182, 45.478), (9.170, 45.478)],
        GeometryRole::Default,
    )?;
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

    // A second fix for Rome; distance queries use whichever fix is closest
    ontology.declare_point("rome", 12.4534, 41.9029, GeometryRole::Secondary)?;

    // Declaring a default twice keeps the first one
    let changed = ontology.declare_point("milan", 0.0, 0.0, GeometryRole::Default)?;
    println!("✓ Re-declaring milan changed the registry: {}", changed);

    for id in ontology.registry().entities() {
        let count = ontology.registry().geometries_of(id).map_or(0, |s| s.len());
        println!("  {id}: {count} geometr{}", if count == 1 { "y" } else { "ies" });
    }

    Ok(ontology)
}

// ============================================================================
// Step 2: Metric queries
// ============================================================================

fn metric_queries(ontology: &SpatialOntology) {
    println!("\n=== Step 2: Metric queries ===\n");

    if let Some(meters) = ontology.distance("milan", "rome") {
        println!("✓ Milan to Rome: {:.1} km", meters / 1000.0);
    }
    if let Some(area) = ontology.area("parco_sempione") {
        println!("✓ Parco Sempione area: {:.1} ha", area / 10_000.0);
    }
    if let Some(length) = ontology.length("a4") {
        println!("✓ A4 length: {:.1} km", length / 1000.0);
    }
    if let Some(centroid) = ontology.centroid("parco_sempione") {
        println!("✓ Park centroid: {}", centroid.lexical());
    }
    if let Some(boundary) = ontology.boundary("duomo") {
        println!("✓ Boundary of a point: {}", boundary.lexical());
    }

    println!(
        "  Unknown feature gives no answer: {:?}",
        ontology.distance("milan", "atlantis")
    );
}

// ============================================================================
// Step 3: Registry scans
// ============================================================================

fn registry_scans(ontology: &SpatialOntology) -> Result<()> {
    println!("\n=== Step 3: Registry scans ===\n");

    println!("✓ Within 1 km of milan: {:?}", ontology.near_by("milan", 1_000.0));
    println!(
        "✓ Within 500 m of (9.19, 45.464): {:?}",
        ontology.near_point(9.19, 45.464, 500.0)?
    );
    println!("✓ North of Florence: {:?}", ontology.north_of(11.255814, 43.769562)?);
    println!("✓ South of Florence: {:?}", ontology.south_of(11.255814, 43.769562)?);
    println!(
        "✓ Inside the Milan box: {:?}",
        ontology.inside_box((9.1, 45.4), (9.3, 45.5))?
    );
    println!("✓ Crossed by the A4: {:?}", ontology.crossed_by("a4"));

    Ok(())
}

// ============================================================================
// Step 4: Function expressions over rows
// ============================================================================

fn evaluate_expressions() -> Result<()> {
    println!("\n=== Step 4: Function expressions ===\n");

    // FILTER(geof:sfWithin(?place, <Lombardy box>))
    let within = ExpressionNode::call(
        "geof:sfWithin".parse::<Operation>()?,
        vec![
            ExpressionNode::variable("?place"),
            ExpressionNode::literal(GeoLiteral::wkt(
                "POLYGON((8.5 45.0, 10.5 45.0, 10.5 46.5, 8.5 46.5, 8.5 45.0))",
            )),
        ],
    )?;

    // BIND(geof:buffer(?place, 250) AS ?zone)
    let zone = ExpressionNode::call(
        Operation::Buffer,
        vec![
            ExpressionNode::variable("?place"),
            ExpressionNode::literal(GeoLiteral::double(250.0)),
        ],
    )?;

    let places = [
        ("milan", GeoLiteral::wkt("POINT(9.18854 45.464664)")),
        ("rome", GeoLiteral::wkt("POINT(12.496366 41.902782)")),
        ("label", GeoLiteral::string("not a geometry")),
    ];
    let rows: Vec<HashMap<String, GeoLiteral>> = places
        .iter()
        .map(|(_, literal)| HashMap::from([("place".to_string(), literal.clone())]))
        .collect();

    let evaluator = ExpressionEvaluator::new();
    let inside = evaluator.evaluate_rows(&within, &rows);
    for ((name, _), result) in places.iter().zip(&inside) {
        println!("  {name}: sfWithin = {:?}", result.as_ref().and_then(EvalValue::as_bool));
    }

    if let Some(EvalValue::Geometry(buffer)) = evaluator.evaluate(&zone, &rows[0]) {
        let vertices = buffer.to_geometry()?.vertices().count();
        println!("✓ 250 m buffer around milan has {vertices} vertices");
    }

    println!("\nFunction names:");
    for operation in [Operation::Buffer, Operation::Distance, Operation::GetSrid] {
        println!("  {} = <{}>", operation.prefixed_name(), operation.iri());
    }

    Ok(())
}

fn main() -> Result<()> {
    println!("oxirs-geospatial feature analysis");
    println!("=================================");

    let ontology = declare_features()?;
    metric_queries(&ontology);
    registry_scans(&ontology)?;
    evaluate_expressions()?;

    println!("\n✓ Done");
    Ok(())
}
