//! GeoSPARQL function expressions evaluated against result rows
//!
//! An [`ExpressionNode`] is a constant literal, a variable, or a call of an
//! [`Operation`] on nested nodes. Calls are checked when they are built:
//! wrong arity, a constant geometry that does not parse, a non-numeric
//! buffer radius or a malformed DE-9IM pattern are rejected immediately.
//! Evaluation against a row never fails; see [`ExpressionEvaluator`].
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use oxirs_geospatial::expression::{EvalValue, ExpressionEvaluator, ExpressionNode, Operation};
//! use oxirs_geospatial::geometry::GeoLiteral;
//!
//! let within = ExpressionNode::call(
//!     "geof:sfWithin".parse::<Operation>()?,
//!     vec![
//!         ExpressionNode::variable("?place"),
//!         ExpressionNode::literal(GeoLiteral::wkt(
//!             "POLYGON((9 45, 10 45, 10 46, 9 46, 9 45))",
//!         )),
//!     ],
//! )?;
//!
//! let mut row = HashMap::new();
//! row.insert("place".to_string(), GeoLiteral::wkt("POINT(9.18854 45.464664)"));
//!
//! let evaluator = ExpressionEvaluator::new();
//! assert_eq!(evaluator.evaluate(&within, &row), Some(EvalValue::Boolean(true)));
//! assert_eq!(evaluator.evaluate(&within, &HashMap::<String, GeoLiteral>::new()), None);
//! # Ok::<(), oxirs_geospatial::SpatialError>(())
//! ```

pub mod evaluator;
pub mod operation;

pub use evaluator::ExpressionEvaluator;
pub use operation::{Operation, ResultType, ValueType};

use crate::error::{Result, SpatialError};
use crate::functions::relate::validate_pattern;
use crate::geometry::GeoLiteral;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// A node of a function expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// A constant literal
    Literal(GeoLiteral),
    /// A variable bound by the row, named without the leading `?`
    Variable(String),
    /// A function call
    Call {
        operation: Operation,
        operands: Vec<ExpressionNode>,
    },
}

impl ExpressionNode {
    pub fn literal(literal: GeoLiteral) -> Self {
        ExpressionNode::Literal(literal)
    }

    /// Variable reference; a leading `?` or `$` is dropped
    pub fn variable(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let name = name
            .strip_prefix('?')
            .or_else(|| name.strip_prefix('$'))
            .unwrap_or(name);
        ExpressionNode::Variable(name.to_string())
    }

    /// Build a call, checking arity and every operand against the signature
    pub fn call(operation: Operation, operands: Vec<ExpressionNode>) -> Result<Self> {
        let signature = operation.signature();
        if operands.len() != signature.len() {
            return Err(SpatialError::ArityMismatch {
                operation: operation.to_string(),
                expected: signature.len(),
                found: operands.len(),
            });
        }

        for (position, (operand, expected)) in operands.iter().zip(signature).enumerate() {
            check_operand(operation, position, operand, *expected)?;
        }

        Ok(ExpressionNode::Call {
            operation,
            operands,
        })
    }

    /// Variables referenced anywhere below this node
    pub fn variables(&self) -> Vec<&str> {
        let mut found = Vec::new();
        self.collect_variables(&mut found);
        found
    }

    fn collect_variables<'a>(&'a self, found: &mut Vec<&'a str>) {
        match self {
            ExpressionNode::Literal(_) => {}
            ExpressionNode::Variable(name) => {
                if !found.contains(&name.as_str()) {
                    found.push(name.as_str());
                }
            }
            ExpressionNode::Call { operands, .. } => {
                for operand in operands {
                    operand.collect_variables(found);
                }
            }
        }
    }
}

fn check_operand(
    operation: Operation,
    position: usize,
    operand: &ExpressionNode,
    expected: ValueType,
) -> Result<()> {
    let invalid = |reason: String| SpatialError::InvalidOperand {
        operation: operation.to_string(),
        reason: format!("operand {}: {reason}", position + 1),
    };

    match operand {
        ExpressionNode::Variable(name) if name.is_empty() => {
            Err(invalid("empty variable name".to_string()))
        }
        ExpressionNode::Variable(_) => Ok(()),
        ExpressionNode::Literal(literal) => match expected {
            ValueType::Geometry => literal
                .to_geometry()
                .map(|_| ())
                .map_err(|e| invalid(e.to_string())),
            ValueType::Numeric => literal
                .as_f64()
                .map(|_| ())
                .ok_or_else(|| invalid(format!("{literal} is not numeric"))),
            ValueType::Pattern => {
                validate_pattern(literal.lexical()).map_err(|e| invalid(e.to_string()))
            }
        },
        ExpressionNode::Call {
            operation: nested, ..
        } => {
            let produced = nested.result_type();
            let accepted = match expected {
                ValueType::Geometry => produced == ResultType::Geometry,
                ValueType::Numeric => {
                    matches!(produced, ResultType::Double | ResultType::Integer)
                }
                ValueType::Pattern => false,
            };
            if accepted {
                Ok(())
            } else {
                Err(invalid(format!(
                    "{nested} produces {produced:?}, expected {expected:?}"
                )))
            }
        }
    }
}

/// Variable bindings of one result row
pub trait RowBindings {
    /// Literal bound to `variable` (named without `?`)
    fn binding(&self, variable: &str) -> Option<&GeoLiteral>;
}

impl<S: BuildHasher> RowBindings for HashMap<String, GeoLiteral, S> {
    fn binding(&self, variable: &str) -> Option<&GeoLiteral> {
        self.get(variable)
    }
}

impl RowBindings for BTreeMap<String, GeoLiteral> {
    fn binding(&self, variable: &str) -> Option<&GeoLiteral> {
        self.get(variable)
    }
}

impl<T: RowBindings + ?Sized> RowBindings for &T {
    fn binding(&self, variable: &str) -> Option<&GeoLiteral> {
        (**self).binding(variable)
    }
}

/// Result of evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    Boolean(bool),
    Double(f64),
    Integer(i64),
    Uri(String),
    /// A WGS84 geometry literal
    Geometry(GeoLiteral),
}

impl EvalValue {
    /// Interpret a literal as a value; `None` for plain strings
    pub fn from_literal(literal: &GeoLiteral) -> Option<Self> {
        if literal.is_geometry() {
            return Some(EvalValue::Geometry(literal.clone()));
        }
        if let Some(value) = literal.as_bool() {
            return Some(EvalValue::Boolean(value));
        }
        if literal.datatype() == crate::vocabulary::XSD_INTEGER {
            if let Ok(value) = literal.lexical().trim().parse() {
                return Some(EvalValue::Integer(value));
            }
        }
        if let Some(value) = literal.as_f64() {
            return Some(EvalValue::Double(value));
        }
        if literal.datatype() == crate::vocabulary::XSD_ANY_URI {
            return Some(EvalValue::Uri(literal.lexical().to_string()));
        }
        None
    }

    /// Typed literal form of the value
    pub fn into_literal(self) -> GeoLiteral {
        match self {
            EvalValue::Boolean(value) => GeoLiteral::boolean(value),
            EvalValue::Double(value) => GeoLiteral::double(value),
            EvalValue::Integer(value) => GeoLiteral::integer(value),
            EvalValue::Uri(value) => GeoLiteral::any_uri(value),
            EvalValue::Geometry(literal) => literal,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EvalValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EvalValue::Double(value) => Some(*value),
            EvalValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&GeoLiteral> {
        match self {
            EvalValue::Geometry(literal) => Some(literal),
            _ => None,
        }
    }
}
