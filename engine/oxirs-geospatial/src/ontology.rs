//! Declaration and query facade
//!
//! [`SpatialOntology`] owns the feature registry and the projector. Shapes
//! are declared once per entity and never overwritten; queries go through
//! the [`SpatialAnalysisEngine`] and hand geometry results back as WKT
//! literals.
//!
//! Declarations validate eagerly and fail with an error. Queries never fail
//! on missing data: unknown entities give `None` or an empty list.
//!
//! # Examples
//!
//! ```
//! use oxirs_geospatial::ontology::SpatialOntology;
//! use oxirs_geospatial::registry::GeometryRole;
//!
//! let mut ontology = SpatialOntology::new();
//! ontology.declare_point("milan", 9.18854, 45.464664, GeometryRole::Default)?;
//! ontology.declare_point("rome", 12.496366, 41.902782, GeometryRole::Default)?;
//!
//! let meters = ontology.distance("milan", "rome").unwrap();
//! assert!((450_000.0..=480_000.0).contains(&meters));
//! assert_eq!(ontology.north_of(10.0, 43.0)?, vec!["milan"]);
//! # Ok::<(), oxirs_geospatial::SpatialError>(())
//! ```

use crate::analysis::SpatialAnalysisEngine;
use crate::config::SpatialConfig;
use crate::error::{Result, SpatialError};
use crate::functions::geometric_operations;
use crate::geometry::{GeoLiteral, GeographicPoint, Geometry, GeometryEncoding};
use crate::projection::GeometryProjector;
use crate::registry::{GeometryRole, SpatialFeatureRegistry};
use geo_types::{
    Geometry as GeoGeometry, LineString, MultiLineString, MultiPoint, Point, Polygon,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Ontology handle shared between threads
///
/// Declarations take the write lock, queries the read lock.
pub type SharedSpatialOntology = Arc<RwLock<SpatialOntology>>;

/// Spatial entities and the operations over them
#[derive(Debug, Clone, Default)]
pub struct SpatialOntology {
    registry: SpatialFeatureRegistry,
    projector: GeometryProjector,
    config: SpatialConfig,
}

impl SpatialOntology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an ontology with a validated configuration
    pub fn with_config(config: SpatialConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: SpatialFeatureRegistry::new(),
            projector: GeometryProjector::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &SpatialConfig {
        &self.config
    }

    pub fn registry(&self) -> &SpatialFeatureRegistry {
        &self.registry
    }

    pub fn projector(&self) -> &GeometryProjector {
        &self.projector
    }

    /// Analysis view over the declared features
    pub fn analysis(&self) -> SpatialAnalysisEngine<'_> {
        SpatialAnalysisEngine::new(&self.registry, &self.projector)
            .with_max_candidates(self.config.max_relation_candidates)
    }

    /// Wrap the ontology for use from several threads
    pub fn into_shared(self) -> SharedSpatialOntology {
        Arc::new(RwLock::new(self))
    }

    /// Declare a point
    ///
    /// Returns whether the registry changed; a second default geometry for
    /// the same entity is ignored.
    pub fn declare_point(
        &mut self,
        id: &str,
        lon: f64,
        lat: f64,
        role: GeometryRole,
    ) -> Result<bool> {
        let point = GeographicPoint::new(lon, lat)?;
        self.register(id, Geometry::from(point), role)
    }

    /// Declare a line string of at least two points
    pub fn declare_line_string(
        &mut self,
        id: &str,
        coords: &[(f64, f64)],
        role: GeometryRole,
    ) -> Result<bool> {
        let line = line_string("LineString", coords)?;
        self.register(id, Geometry::new(GeoGeometry::LineString(line)), role)
    }

    /// Declare a polygon from its exterior ring
    ///
    /// The ring needs at least three distinct vertices and is closed
    /// automatically when the last point differs from the first.
    pub fn declare_polygon(
        &mut self,
        id: &str,
        coords: &[(f64, f64)],
        role: GeometryRole,
    ) -> Result<bool> {
        let open_len = match (coords.first(), coords.last()) {
            (Some(first), Some(last)) if coords.len() > 1 && first == last => coords.len() - 1,
            _ => coords.len(),
        };
        if open_len < 3 {
            return Err(SpatialError::TooFewPoints {
                shape: "Polygon",
                required: 3,
                found: open_len,
            });
        }

        let mut ring = validated(coords)?;
        if ring.first() != ring.last() {
            ring.push(ring[0]);
        }
        let polygon = Polygon::new(LineString::from(ring), vec![]);
        self.register(id, Geometry::new(GeoGeometry::Polygon(polygon)), role)
    }

    /// Declare a multi-point of at least two points
    pub fn declare_multi_point(
        &mut self,
        id: &str,
        coords: &[(f64, f64)],
        role: GeometryRole,
    ) -> Result<bool> {
        if coords.len() < 2 {
            return Err(SpatialError::TooFewPoints {
                shape: "MultiPoint",
                required: 2,
                found: coords.len(),
            });
        }
        let points = validated(coords)?.into_iter().map(Point).collect::<Vec<_>>();
        let geometry = GeoGeometry::MultiPoint(MultiPoint::new(points));
        self.register(id, Geometry::new(geometry), role)
    }

    /// Declare a multi-line string of at least two lines of two points each
    pub fn declare_multi_line_string<L>(
        &mut self,
        id: &str,
        lines: &[L],
        role: GeometryRole,
    ) -> Result<bool>
    where
        L: AsRef<[(f64, f64)]>,
    {
        if lines.len() < 2 {
            return Err(SpatialError::TooFewPoints {
                shape: "MultiLineString",
                required: 2,
                found: lines.len(),
            });
        }
        let lines = lines
            .iter()
            .map(|line| line_string("MultiLineString member", line.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let geometry = GeoGeometry::MultiLineString(MultiLineString::new(lines));
        self.register(id, Geometry::new(geometry), role)
    }

    /// Declare an already built WGS84 geometry
    pub fn declare_geometry(
        &mut self,
        id: &str,
        geometry: Geometry,
        role: GeometryRole,
    ) -> Result<bool> {
        // Range-checks every vertex and rejects projected input
        geometry.geographic_points()?;
        self.register(id, geometry, role)
    }

    /// Declare a geometry from a WKT or GML literal
    pub fn declare_literal(
        &mut self,
        id: &str,
        literal: &GeoLiteral,
        role: GeometryRole,
    ) -> Result<bool> {
        let geometry = literal.to_geometry()?;
        self.declare_geometry(id, geometry, role)
    }

    fn register(&mut self, id: &str, geometry: Geometry, role: GeometryRole) -> Result<bool> {
        if id.trim().is_empty() {
            return Err(SpatialError::InvalidIdentifier(id.to_string()));
        }

        let kind = geometry.geometry_type();
        let pair = self.projector.pair(geometry)?;
        let crs = pair.crs();
        let inserted = self.registry.insert_if_absent(id, pair, role);
        if inserted {
            debug!(entity = id, geometry = kind, ?role, %crs, "Declared geometry");
        }
        Ok(inserted)
    }

    /// Distance in meters between the closest geometries of two entities
    pub fn distance(&self, a: &str, b: &str) -> Option<f64> {
        self.analysis().distance(a, b)
    }

    /// Distance in meters between two geometry literals
    pub fn distance_between_literals(&self, a: &GeoLiteral, b: &GeoLiteral) -> Option<f64> {
        let result = a
            .to_geometry()
            .and_then(|a| Ok((a, b.to_geometry()?)))
            .and_then(|(a, b)| self.projector.project_together(&[&a, &b]))
            .and_then(|(_, projected)| match projected.as_slice() {
                [a, b] => geometric_operations::distance(a, b),
                _ => Err(SpatialError::GeometryOperationFailed(
                    "Expected two projected operands".to_string(),
                )),
            });
        match result {
            Ok(meters) => Some(meters),
            Err(e) => {
                debug!(error = %e, "Literal distance unavailable");
                None
            }
        }
    }

    /// Length in meters of the entity's longest geometry
    pub fn length(&self, id: &str) -> Option<f64> {
        self.analysis().length(id)
    }

    /// Area in square meters of the entity's largest geometry
    pub fn area(&self, id: &str) -> Option<f64> {
        self.analysis().area(id)
    }

    pub fn centroid(&self, id: &str) -> Option<GeoLiteral> {
        self.analysis().centroid(id).and_then(to_literal)
    }

    pub fn boundary(&self, id: &str) -> Option<GeoLiteral> {
        self.analysis().boundary(id).and_then(to_literal)
    }

    pub fn buffer_around(&self, id: &str, meters: f64) -> Option<GeoLiteral> {
        self.analysis().buffer_around(id, meters).and_then(to_literal)
    }

    pub fn near_by(&self, id: &str, radius: f64) -> Vec<String> {
        self.analysis().near_by(id, radius)
    }

    /// Entities within `radius` meters of a coordinate
    pub fn near_point(&self, lon: f64, lat: f64, radius: f64) -> Result<Vec<String>> {
        let point = GeographicPoint::new(lon, lat)?;
        Ok(self.analysis().near_point(&point, radius))
    }

    pub fn north_of(&self, lon: f64, lat: f64) -> Result<Vec<String>> {
        let point = GeographicPoint::new(lon, lat)?;
        Ok(self.analysis().north_of(&point))
    }

    pub fn south_of(&self, lon: f64, lat: f64) -> Result<Vec<String>> {
        let point = GeographicPoint::new(lon, lat)?;
        Ok(self.analysis().south_of(&point))
    }

    pub fn east_of(&self, lon: f64, lat: f64) -> Result<Vec<String>> {
        let point = GeographicPoint::new(lon, lat)?;
        Ok(self.analysis().east_of(&point))
    }

    pub fn west_of(&self, lon: f64, lat: f64) -> Result<Vec<String>> {
        let point = GeographicPoint::new(lon, lat)?;
        Ok(self.analysis().west_of(&point))
    }

    /// Entities inside the box spanned by `(lon, lat)` corners
    pub fn inside_box(
        &self,
        lower_left: (f64, f64),
        upper_right: (f64, f64),
    ) -> Result<Vec<String>> {
        let (ll, ur) = corners(lower_left, upper_right)?;
        Ok(self.analysis().inside_box(&ll, &ur))
    }

    /// Entities sharing no point with the box spanned by `(lon, lat)` corners
    pub fn outside_box(
        &self,
        lower_left: (f64, f64),
        upper_right: (f64, f64),
    ) -> Result<Vec<String>> {
        let (ll, ur) = corners(lower_left, upper_right)?;
        Ok(self.analysis().outside_box(&ll, &ur))
    }

    pub fn crossed_by(&self, id: &str) -> Vec<String> {
        self.analysis().crossed_by(id)
    }
}

fn validated(coords: &[(f64, f64)]) -> Result<Vec<geo_types::Coord<f64>>> {
    coords
        .iter()
        .map(|&(lon, lat)| GeographicPoint::new(lon, lat).map(GeographicPoint::to_coord))
        .collect()
}

fn line_string(shape: &'static str, coords: &[(f64, f64)]) -> Result<LineString<f64>> {
    if coords.len() < 2 {
        return Err(SpatialError::TooFewPoints {
            shape,
            required: 2,
            found: coords.len(),
        });
    }
    Ok(LineString::from(validated(coords)?))
}

fn corners(
    lower_left: (f64, f64),
    upper_right: (f64, f64),
) -> Result<(GeographicPoint, GeographicPoint)> {
    Ok((
        GeographicPoint::new(lower_left.0, lower_left.1)?,
        GeographicPoint::new(upper_right.0, upper_right.1)?,
    ))
}

fn to_literal(geometry: Geometry) -> Option<GeoLiteral> {
    GeoLiteral::from_geometry(&geometry, GeometryEncoding::Wkt)
        .map_err(|e| debug!(error = %e, "Cannot encode result geometry"))
        .ok()
}
