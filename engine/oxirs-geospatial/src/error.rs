//! Error types for the geospatial engine
//!
//! Errors fall into two tiers. Declaration and construction errors (bad
//! coordinates, too few points, malformed constants) are returned to the
//! caller as `Err`. Query-time failures use the same type internally but are
//! collapsed into `None` at the public query and evaluation boundary.

use thiserror::Error;

/// Result type for geospatial operations
pub type Result<T> = std::result::Result<T, SpatialError>;

/// Errors raised by the geospatial engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpatialError {
    /// Longitude or latitude outside the WGS84 range
    #[error("Invalid coordinate ({lon}, {lat}): {reason}")]
    InvalidCoordinate { lon: f64, lat: f64, reason: String },

    /// Not enough vertices for the requested shape
    #[error("{shape} requires at least {required} points, got {found}")]
    TooFewPoints {
        shape: &'static str,
        required: usize,
        found: usize,
    },

    /// Entity identifier missing or blank
    #[error("Invalid entity identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Geometry text could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Geometry could not be serialized
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A literal whose datatype is not a geometry encoding
    #[error("Unsupported literal datatype: {0}")]
    UnsupportedDatatype(String),

    /// A literal referencing a CRS other than WGS84
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// Geometries that must share a CRS do not
    #[error("CRS mismatch: expected {expected}, found {found}")]
    CrsMismatch { expected: String, found: String },

    /// The projection library rejected a definition or a coordinate
    #[error("CRS transformation failed: {0}")]
    CrsTransformationFailed(String),

    /// Operation not defined for the given geometry types
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The geometry library could not compute a result
    #[error("Geometry operation failed: {0}")]
    GeometryOperationFailed(String),

    /// DE-9IM pattern is not nine characters drawn from `TF*012`
    #[error("Invalid DE-9IM pattern: {0:?}")]
    InvalidPattern(String),

    /// Wrong number of operands for an operation
    #[error("{operation} expects {expected} operand(s), got {found}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        found: usize,
    },

    /// A constant operand of the wrong kind
    #[error("Invalid operand for {operation}: {reason}")]
    InvalidOperand { operation: String, reason: String },

    /// Variable referenced by an expression has no value in the row
    #[error("Unbound variable: ?{0}")]
    UnboundVariable(String),

    /// Entity not registered or registered without geometry
    #[error("No geometry registered for {0}")]
    NoGeometry(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
