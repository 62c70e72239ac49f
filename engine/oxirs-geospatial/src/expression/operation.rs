//! Closed table of GeoSPARQL function tags
//!
//! Every [`Operation`] knows its local name, its operand signature and the
//! kind of value it produces. The full IRI and the `geof:` prefixed name are
//! both derived from the local name, and either form parses back.

use crate::error::SpatialError;
use crate::functions::{EgenhoferRelation, Rcc8Relation, SimpleFeatureRelation};
use crate::vocabulary::{GEOF, GEOF_PREFIX};
use std::fmt;
use std::str::FromStr;

/// Kind of value an operand must resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// A WKT or GML geometry literal
    Geometry,
    /// An XSD numeric literal
    Numeric,
    /// A DE-9IM pattern string
    Pattern,
}

/// Kind of value an operation produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    Boolean,
    Double,
    Integer,
    Uri,
    Geometry,
}

const UNARY: &[ValueType] = &[ValueType::Geometry];
const BINARY: &[ValueType] = &[ValueType::Geometry, ValueType::Geometry];
const BUFFER: &[ValueType] = &[ValueType::Geometry, ValueType::Numeric];
const RELATE: &[ValueType] = &[ValueType::Geometry, ValueType::Geometry, ValueType::Pattern];

/// A GeoSPARQL function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Buffer,
    Distance,
    SimpleFeature(SimpleFeatureRelation),
    Egenhofer(EgenhoferRelation),
    Rcc8(Rcc8Relation),
    /// DE-9IM relate with an explicit pattern
    Relate,
    Union,
    Intersection,
    Difference,
    SymDifference,
    ConvexHull,
    Envelope,
    Boundary,
    Centroid,
    Dimension,
    IsSimple,
    IsEmpty,
    GetSrid,
}

impl Operation {
    /// Every operation, relation families expanded
    pub fn all() -> impl Iterator<Item = Operation> {
        [
            Operation::Buffer,
            Operation::Distance,
            Operation::Relate,
            Operation::Union,
            Operation::Intersection,
            Operation::Difference,
            Operation::SymDifference,
            Operation::ConvexHull,
            Operation::Envelope,
            Operation::Boundary,
            Operation::Centroid,
            Operation::Dimension,
            Operation::IsSimple,
            Operation::IsEmpty,
            Operation::GetSrid,
        ]
        .into_iter()
        .chain(SimpleFeatureRelation::ALL.into_iter().map(Operation::SimpleFeature))
        .chain(EgenhoferRelation::ALL.into_iter().map(Operation::Egenhofer))
        .chain(Rcc8Relation::ALL.into_iter().map(Operation::Rcc8))
    }

    /// Local name within the `geof:` namespace
    pub fn local_name(&self) -> &'static str {
        match self {
            Operation::Buffer => "buffer",
            Operation::Distance => "distance",
            Operation::SimpleFeature(relation) => relation.local_name(),
            Operation::Egenhofer(relation) => relation.local_name(),
            Operation::Rcc8(relation) => relation.local_name(),
            Operation::Relate => "relate",
            Operation::Union => "union",
            Operation::Intersection => "intersection",
            Operation::Difference => "difference",
            Operation::SymDifference => "symDifference",
            Operation::ConvexHull => "convexHull",
            Operation::Envelope => "envelope",
            Operation::Boundary => "boundary",
            Operation::Centroid => "centroid",
            Operation::Dimension => "dimension",
            Operation::IsSimple => "isSimple",
            Operation::IsEmpty => "isEmpty",
            Operation::GetSrid => "getSRID",
        }
    }

    /// Fully qualified function IRI
    pub fn iri(&self) -> String {
        format!("{GEOF}{}", self.local_name())
    }

    /// `geof:`-prefixed name
    pub fn prefixed_name(&self) -> String {
        format!("{GEOF_PREFIX}:{}", self.local_name())
    }

    /// Look an operation up by full IRI or prefixed name
    ///
    /// # Examples
    ///
    /// ```
    /// use oxirs_geospatial::expression::Operation;
    ///
    /// let op = Operation::from_name("geof:sfIntersects").unwrap();
    /// assert_eq!(
    ///     Operation::from_name(&op.iri()),
    ///     Some(op)
    /// );
    /// assert_eq!(op.iri(), "http://www.opengis.net/def/function/geosparql/sfIntersects");
    /// assert!(Operation::from_name("sfIntersects").is_none());
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let local = name.strip_prefix(GEOF).or_else(|| {
            name.strip_prefix(GEOF_PREFIX)
                .and_then(|rest| rest.strip_prefix(':'))
        })?;
        Self::all().find(|operation| operation.local_name() == local)
    }

    /// Kinds of the operands, in order
    pub fn signature(&self) -> &'static [ValueType] {
        match self {
            Operation::Buffer => BUFFER,
            Operation::Relate => RELATE,
            Operation::Distance
            | Operation::SimpleFeature(_)
            | Operation::Egenhofer(_)
            | Operation::Rcc8(_)
            | Operation::Union
            | Operation::Intersection
            | Operation::Difference
            | Operation::SymDifference => BINARY,
            Operation::ConvexHull
            | Operation::Envelope
            | Operation::Boundary
            | Operation::Centroid
            | Operation::Dimension
            | Operation::IsSimple
            | Operation::IsEmpty
            | Operation::GetSrid => UNARY,
        }
    }

    pub fn arity(&self) -> usize {
        self.signature().len()
    }

    pub fn result_type(&self) -> ResultType {
        match self {
            Operation::SimpleFeature(_)
            | Operation::Egenhofer(_)
            | Operation::Rcc8(_)
            | Operation::Relate
            | Operation::IsSimple
            | Operation::IsEmpty => ResultType::Boolean,
            Operation::Distance => ResultType::Double,
            Operation::Dimension => ResultType::Integer,
            Operation::GetSrid => ResultType::Uri,
            Operation::Buffer
            | Operation::Union
            | Operation::Intersection
            | Operation::Difference
            | Operation::SymDifference
            | Operation::ConvexHull
            | Operation::Envelope
            | Operation::Boundary
            | Operation::Centroid => ResultType::Geometry,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{GEOF_PREFIX}:{}", self.local_name())
    }
}

impl FromStr for Operation {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| SpatialError::UnsupportedOperation(format!("Unknown function {s:?}")))
    }
}
