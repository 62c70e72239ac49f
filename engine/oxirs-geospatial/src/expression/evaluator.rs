//! Row-by-row evaluation of function expressions
//!
//! Each call resolves its operands against the row, parses geometry
//! literals as WGS84, projects all geometry operands of the call into one
//! planar frame chosen from their combined vertices, applies the operation
//! there, and unprojects geometry results before encoding them in the
//! left operand's encoding.
//!
//! Evaluation holds no state between calls: geometries are parsed from the
//! literal text every time. Anything that goes wrong yields `None`, with the
//! cause logged at `debug` level. [`ExpressionEvaluator::try_evaluate`]
//! returns the cause instead.

use crate::config::SpatialConfig;
use crate::error::{Result, SpatialError};
use crate::expression::{EvalValue, ExpressionNode, Operation, RowBindings, ValueType};
use crate::functions::{geometric_operations, geometric_properties, relate, SpatialRelation};
use crate::geometry::{GeoLiteral, Geometry, GeometryEncoding};
use crate::projection::{CrsDescriptor, GeometryProjector};
use tracing::debug;

/// Operands of one call after resolution
#[derive(Default)]
struct Arguments {
    geometries: Vec<Geometry>,
    number: Option<f64>,
    pattern: Option<String>,
    encoding: Option<GeometryEncoding>,
}

/// Evaluator for [`ExpressionNode`] trees
#[derive(Debug, Clone, Default)]
pub struct ExpressionEvaluator {
    projector: GeometryProjector,
}

impl ExpressionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &SpatialConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            projector: GeometryProjector::from_config(config),
        })
    }

    /// Evaluate against one row; `None` when the row does not yield a value
    pub fn evaluate<R>(&self, node: &ExpressionNode, row: &R) -> Option<EvalValue>
    where
        R: RowBindings + ?Sized,
    {
        match self.try_evaluate(node, row) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(expression = ?node, error = %e, "Expression evaluated to null");
                None
            }
        }
    }

    /// Evaluate against one row, reporting why no value was produced
    pub fn try_evaluate<R>(&self, node: &ExpressionNode, row: &R) -> Result<EvalValue>
    where
        R: RowBindings + ?Sized,
    {
        match node {
            ExpressionNode::Call {
                operation,
                operands,
            } => self.evaluate_call(*operation, operands, row),
            other => {
                let literal = self.resolve(other, row)?;
                EvalValue::from_literal(&literal).ok_or_else(|| {
                    SpatialError::UnsupportedDatatype(literal.datatype().to_string())
                })
            }
        }
    }

    /// Evaluate one expression against many rows
    ///
    /// With the `parallel` feature the rows are spread over the rayon pool.
    pub fn evaluate_rows<R>(&self, node: &ExpressionNode, rows: &[R]) -> Vec<Option<EvalValue>>
    where
        R: RowBindings + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            rows.par_iter().map(|row| self.evaluate(node, row)).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            rows.iter().map(|row| self.evaluate(node, row)).collect()
        }
    }

    fn resolve<R>(&self, node: &ExpressionNode, row: &R) -> Result<GeoLiteral>
    where
        R: RowBindings + ?Sized,
    {
        match node {
            ExpressionNode::Literal(literal) => Ok(literal.clone()),
            ExpressionNode::Variable(name) => row
                .binding(name)
                .cloned()
                .ok_or_else(|| SpatialError::UnboundVariable(name.clone())),
            ExpressionNode::Call {
                operation,
                operands,
            } => Ok(self.evaluate_call(*operation, operands, row)?.into_literal()),
        }
    }

    fn evaluate_call<R>(
        &self,
        operation: Operation,
        operands: &[ExpressionNode],
        row: &R,
    ) -> Result<EvalValue>
    where
        R: RowBindings + ?Sized,
    {
        let signature = operation.signature();
        if operands.len() != signature.len() {
            return Err(SpatialError::ArityMismatch {
                operation: operation.to_string(),
                expected: signature.len(),
                found: operands.len(),
            });
        }

        let mut args = Arguments::default();
        for (operand, kind) in operands.iter().zip(signature) {
            let literal = self.resolve(operand, row)?;
            match kind {
                ValueType::Geometry => {
                    if args.encoding.is_none() {
                        args.encoding = literal.encoding();
                    }
                    let geometry = literal.to_geometry()?;
                    if operation == Operation::IsEmpty {
                        return Ok(EvalValue::Boolean(geometry.is_empty()));
                    }
                    args.geometries.push(geometry);
                }
                ValueType::Numeric => {
                    let value = literal.as_f64().ok_or_else(|| SpatialError::InvalidOperand {
                        operation: operation.to_string(),
                        reason: format!("{literal} is not numeric"),
                    })?;
                    args.number = Some(value);
                }
                ValueType::Pattern => {
                    relate::validate_pattern(literal.lexical())?;
                    args.pattern = Some(literal.lexical().to_string());
                }
            }
        }

        let refs: Vec<&Geometry> = args.geometries.iter().collect();
        let (crs, projected) = self.projector.project_together(&refs)?;
        self.dispatch(operation, crs, &projected, &args)
    }

    fn dispatch(
        &self,
        operation: Operation,
        crs: CrsDescriptor,
        projected: &[Geometry],
        args: &Arguments,
    ) -> Result<EvalValue> {
        let first = operand(projected, 0)?;

        match operation {
            Operation::SimpleFeature(relation) => {
                Ok(EvalValue::Boolean(relation.test(first, operand(projected, 1)?)?))
            }
            Operation::Egenhofer(relation) => {
                Ok(EvalValue::Boolean(relation.test(first, operand(projected, 1)?)?))
            }
            Operation::Rcc8(relation) => {
                Ok(EvalValue::Boolean(relation.test(first, operand(projected, 1)?)?))
            }
            Operation::Relate => {
                let pattern = args.pattern.as_deref().ok_or_else(|| missing(operation))?;
                Ok(EvalValue::Boolean(relate::relate_pattern(
                    first,
                    operand(projected, 1)?,
                    pattern,
                )?))
            }
            Operation::Distance => Ok(EvalValue::Double(geometric_operations::distance(
                first,
                operand(projected, 1)?,
            )?)),
            Operation::Dimension => geometric_properties::dimension(first)
                .map(|dimension| EvalValue::Integer(i64::from(dimension)))
                .ok_or_else(|| {
                    SpatialError::GeometryOperationFailed(
                        "Dimension of an empty geometry".to_string(),
                    )
                }),
            Operation::IsSimple => Ok(EvalValue::Boolean(first.is_simple())),
            Operation::IsEmpty => Ok(EvalValue::Boolean(first.is_empty())),
            Operation::GetSrid => Ok(EvalValue::Uri(crs.uri())),
            Operation::Buffer => {
                let radius = args.number.ok_or_else(|| missing(operation))?;
                self.geometry_result(geometric_operations::buffer(first, radius)?, crs, args)
            }
            Operation::Union => self.geometry_result(
                geometric_operations::union(first, operand(projected, 1)?)?,
                crs,
                args,
            ),
            Operation::Intersection => self.geometry_result(
                geometric_operations::intersection(first, operand(projected, 1)?)?,
                crs,
                args,
            ),
            Operation::Difference => self.geometry_result(
                geometric_operations::difference(first, operand(projected, 1)?)?,
                crs,
                args,
            ),
            Operation::SymDifference => self.geometry_result(
                geometric_operations::sym_difference(first, operand(projected, 1)?)?,
                crs,
                args,
            ),
            Operation::ConvexHull => {
                self.geometry_result(geometric_operations::convex_hull(first)?, crs, args)
            }
            Operation::Envelope => {
                self.geometry_result(geometric_operations::envelope(first)?, crs, args)
            }
            Operation::Boundary => {
                self.geometry_result(geometric_operations::boundary(first)?, crs, args)
            }
            Operation::Centroid => {
                self.geometry_result(geometric_operations::centroid(first)?, crs, args)
            }
        }
    }

    fn geometry_result(
        &self,
        projected: Geometry,
        crs: CrsDescriptor,
        args: &Arguments,
    ) -> Result<EvalValue> {
        let wgs84 = self.projector.unproject(&projected, crs)?;
        let encoding = args.encoding.unwrap_or(GeometryEncoding::Wkt);
        Ok(EvalValue::Geometry(GeoLiteral::from_geometry(&wgs84, encoding)?))
    }
}

fn operand(projected: &[Geometry], index: usize) -> Result<&Geometry> {
    projected.get(index).ok_or_else(|| {
        SpatialError::GeometryOperationFailed(format!("Missing geometry operand {}", index + 1))
    })
}

fn missing(operation: Operation) -> SpatialError {
    SpatialError::InvalidOperand {
        operation: operation.to_string(),
        reason: "operand was not resolved".to_string(),
    }
}
