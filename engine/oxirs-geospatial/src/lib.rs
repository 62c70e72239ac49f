//! # OxiRS Geospatial
//!
//! Coordinate projection and spatial analysis for GeoSPARQL knowledge graphs.
//!
//! Geometries are declared in WGS84 and stored next to a planar projection
//! chosen for them: the UTM zone of their vertices, or an equal-area
//! projection for Europe-wide shapes that span several zones. Metric
//! operations run on the planar form and report meters. It provides:
//!
//! - UTM zone selection with the Norway and Svalbard exceptions
//! - Forward and inverse projection with a fixed coordinate precision
//! - A feature registry with one default and any number of secondary geometries per entity
//! - Distance, length, area, centroid, boundary and buffer over registered features
//! - Proximity, directional, bounding box and crossing queries
//! - Simple Features, Egenhofer and RCC8 relations over DE-9IM patterns
//! - WKT and GML geometry literals
//! - An evaluator for GeoSPARQL function expressions over result rows
//!
//! ## Quick Start
//!
//! ### Declaring and querying features
//!
//! ```rust
//! use oxirs_geospatial::{GeometryRole, SpatialOntology};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut ontology = SpatialOntology::new();
//! ontology.declare_point("milan", 9.18854, 45.464664, GeometryRole::Default)?;
//! ontology.declare_polygon(
//!     "parco_sempione",
//!     &[(9.170, 45.470), (9.182, 45.470), (9.182, 45.478), (9.170, 45.478)],
//!     GeometryRole::Default,
//! )?;
//!
//! let area = ontology.area("parco_sempione").unwrap();
//! println!("Park area: {area:.0} m²");
//!
//! let nearby = ontology.near_by("milan", 2_000.0);
//! assert_eq!(nearby, vec!["parco_sempione"]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Evaluating function expressions
//!
//! ```rust
//! use std::collections::HashMap;
//! use oxirs_geospatial::{EvalValue, ExpressionEvaluator, ExpressionNode, GeoLiteral, Operation};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let distance = ExpressionNode::call(
//!     Operation::from_name("geof:distance").unwrap(),
//!     vec![
//!         ExpressionNode::variable("?a"),
//!         ExpressionNode::literal(GeoLiteral::wkt("POINT(12.496366 41.902782)")),
//!     ],
//! )?;
//!
//! let mut row = HashMap::new();
//! row.insert("a".to_string(), GeoLiteral::wkt("POINT(9.18854 45.464664)"));
//!
//! let evaluator = ExpressionEvaluator::new();
//! let meters = evaluator.evaluate(&distance, &row).and_then(|v| v.as_f64()).unwrap();
//! assert!(meters > 450_000.0 && meters < 480_000.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure model
//!
//! Declarations and expression construction return [`SpatialError`] for
//! invalid input. Queries and evaluation return `None` or an empty list
//! when there is nothing to compute, and log the reason at `debug` level.
//!
//! ## Feature flags
//!
//! - `parallel`: evaluate expressions over many rows with rayon

pub mod analysis;
pub mod config;
pub mod error;
pub mod expression;
pub mod functions;
pub mod geometry;
pub mod ontology;
pub mod projection;
pub mod registry;
pub mod vocabulary;

pub use analysis::SpatialAnalysisEngine;
pub use config::SpatialConfig;
pub use error::{Result, SpatialError};
pub use expression::{EvalValue, ExpressionEvaluator, ExpressionNode, Operation, RowBindings};
pub use geometry::{GeoLiteral, GeographicPoint, Geometry, GeometryEncoding};
pub use ontology::{SharedSpatialOntology, SpatialOntology};
pub use projection::{CrsDescriptor, GeometryProjector};
pub use registry::{FeatureGeometrySet, GeometryPair, GeometryRole, SpatialFeatureRegistry};
