//! Typed literals exchanged with the expression layer
//!
//! A literal is a lexical form plus a datatype IRI. Geometry literals use
//! `geo:wktLiteral` or `geo:gmlLiteral`; numbers, booleans and strings use
//! the XSD datatypes.

use crate::error::{Result, SpatialError};
use crate::geometry::Geometry;
use crate::vocabulary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text encoding of a geometry literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryEncoding {
    Wkt,
    Gml,
}

impl GeometryEncoding {
    pub fn datatype(&self) -> &'static str {
        match self {
            GeometryEncoding::Wkt => vocabulary::WKT_LITERAL,
            GeometryEncoding::Gml => vocabulary::GML_LITERAL,
        }
    }

    pub fn from_datatype(datatype: &str) -> Option<Self> {
        match datatype {
            vocabulary::WKT_LITERAL => Some(GeometryEncoding::Wkt),
            vocabulary::GML_LITERAL => Some(GeometryEncoding::Gml),
            _ => None,
        }
    }
}

/// A lexical value with its datatype IRI
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoLiteral {
    lexical: String,
    datatype: String,
}

impl GeoLiteral {
    /// Literal with an arbitrary datatype
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: datatype.into(),
        }
    }

    /// A `geo:wktLiteral`
    ///
    /// # Examples
    ///
    /// ```
    /// use oxirs_geospatial::geometry::{GeoLiteral, GeometryEncoding};
    ///
    /// let literal = GeoLiteral::wkt("POINT(9.18854 45.464664)");
    /// assert_eq!(literal.encoding(), Some(GeometryEncoding::Wkt));
    /// assert_eq!(literal.to_geometry().unwrap().geometry_type(), "Point");
    ///
    /// assert!(GeoLiteral::string("POINT(1 2)").to_geometry().is_err());
    /// ```
    pub fn wkt(text: impl Into<String>) -> Self {
        Self::typed(text, vocabulary::WKT_LITERAL)
    }

    /// A `geo:gmlLiteral`
    pub fn gml(text: impl Into<String>) -> Self {
        Self::typed(text, vocabulary::GML_LITERAL)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::typed(value, vocabulary::XSD_STRING)
    }

    pub fn boolean(value: bool) -> Self {
        Self::typed(value.to_string(), vocabulary::XSD_BOOLEAN)
    }

    pub fn double(value: f64) -> Self {
        Self::typed(value.to_string(), vocabulary::XSD_DOUBLE)
    }

    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), vocabulary::XSD_INTEGER)
    }

    pub fn any_uri(value: impl Into<String>) -> Self {
        Self::typed(value, vocabulary::XSD_ANY_URI)
    }

    /// Encode a geometry; only WGS84 geometries can be written as literals
    pub fn from_geometry(geometry: &Geometry, encoding: GeometryEncoding) -> Result<Self> {
        if !geometry.crs.is_wgs84() {
            return Err(SpatialError::CrsMismatch {
                expected: vocabulary::DEFAULT_CRS.to_string(),
                found: geometry.crs.uri(),
            });
        }
        Ok(match encoding {
            GeometryEncoding::Wkt => Self::wkt(geometry.to_wkt()),
            GeometryEncoding::Gml => Self::gml(geometry.to_gml()?),
        })
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn datatype(&self) -> &str {
        &self.datatype
    }

    /// Geometry encoding of this literal, `None` for non-geometry datatypes
    pub fn encoding(&self) -> Option<GeometryEncoding> {
        GeometryEncoding::from_datatype(&self.datatype)
    }

    pub fn is_geometry(&self) -> bool {
        self.encoding().is_some()
    }

    /// Parse the literal as a WGS84 geometry
    pub fn to_geometry(&self) -> Result<Geometry> {
        match self.encoding() {
            Some(GeometryEncoding::Wkt) => Geometry::from_wkt(&self.lexical),
            Some(GeometryEncoding::Gml) => Geometry::from_gml(&self.lexical),
            None => Err(SpatialError::UnsupportedDatatype(self.datatype.clone())),
        }
    }

    /// Numeric value of an XSD numeric literal
    pub fn as_f64(&self) -> Option<f64> {
        match self.datatype.as_str() {
            vocabulary::XSD_DOUBLE
            | vocabulary::XSD_DECIMAL
            | vocabulary::XSD_FLOAT
            | vocabulary::XSD_INTEGER => self.lexical.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean value of an `xsd:boolean` literal
    pub fn as_bool(&self) -> Option<bool> {
        if self.datatype != vocabulary::XSD_BOOLEAN {
            return None;
        }
        match self.lexical.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for GeoLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}^^<{}>", self.lexical, self.datatype)
    }
}
