//! Formula evaluator
//!
//! Evaluates formula ASTs to numbers. Cell values are resolved through an
//! [`EvaluationContext`]; any error it raises aborts the evaluation and
//! becomes the result.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use tabula_core::{CellError, Position};

/// Source of cell values during evaluation
///
/// Implemented for any `Fn(Position) -> Result<f64, CellError>`, so a closure
/// over the sheet is usually all a caller needs.
pub trait EvaluationContext {
    /// Numeric value of the cell at `pos`, or the error that reading it raises
    fn number_at(&self, pos: Position) -> Result<f64, CellError>;
}

impl<F> EvaluationContext for F
where
    F: Fn(Position) -> Result<f64, CellError>,
{
    fn number_at(&self, pos: Position) -> Result<f64, CellError> {
        self(pos)
    }
}

/// Evaluate a formula expression
///
/// Operands are evaluated left to right and the first error wins.
pub fn evaluate<C>(expr: &FormulaExpr, ctx: &C) -> Result<f64, CellError>
where
    C: EvaluationContext + ?Sized,
{
    match expr {
        FormulaExpr::Number(n) => Ok(*n),

        FormulaExpr::CellRef(pos) => {
            if !pos.is_valid() {
                return Err(CellError::Ref);
            }
            ctx.number_at(*pos)
        }

        FormulaExpr::BinaryOp { op, left, right } => {
            let left_val = evaluate(left, ctx)?;
            let right_val = evaluate(right, ctx)?;
            evaluate_binary_op(*op, left_val, right_val)
        }

        FormulaExpr::UnaryOp { op, operand } => {
            let value = evaluate(operand, ctx)?;
            Ok(match op {
                UnaryOperator::Plus => value,
                UnaryOperator::Negate => -value,
            })
        }
    }
}

/// Evaluate a binary operation on already evaluated operands
fn evaluate_binary_op(op: BinaryOperator, left: f64, right: f64) -> Result<f64, CellError> {
    let result = match op {
        BinaryOperator::Add => left + right,
        BinaryOperator::Subtract => left - right,
        BinaryOperator::Multiply => left * right,
        BinaryOperator::Divide => {
            if right == 0.0 {
                return Err(CellError::Div0);
            }
            left / right
        }
    };

    // Overflow to infinity is reported like a division by zero
    if result.is_finite() {
        Ok(result)
    } else {
        Err(CellError::Div0)
    }
}
