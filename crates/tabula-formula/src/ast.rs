//! Formula Abstract Syntax Tree types

use std::fmt;
use tabula_core::Position;

/// Precedence of unary operators, above every binary operator
const UNARY_PRECEDENCE: u8 = 3;

/// Precedence of literals and references
const ATOM_PRECEDENCE: u8 = 4;

/// Formula expression AST
///
/// `Display` prints the canonical form: no whitespace and only the
/// parentheses needed to reproduce exactly this tree when re-parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Numeric literal (always finite and non-negative)
    Number(f64),

    /// Single cell reference; an invalid position prints as `#REF!`
    CellRef(Position),

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },

    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },
}

impl FormulaExpr {
    /// Binding strength of the expression's outermost construct
    pub fn precedence(&self) -> u8 {
        match self {
            FormulaExpr::Number(_) | FormulaExpr::CellRef(_) => ATOM_PRECEDENCE,
            FormulaExpr::BinaryOp { op, .. } => op.precedence(),
            FormulaExpr::UnaryOp { .. } => UNARY_PRECEDENCE,
        }
    }

    /// Append every cell position referenced by this expression, in
    /// left-to-right order, duplicates and invalid positions included
    pub fn collect_cell_refs(&self, out: &mut Vec<Position>) {
        match self {
            FormulaExpr::Number(_) => {}
            FormulaExpr::CellRef(pos) => out.push(*pos),
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.collect_cell_refs(out);
                right.collect_cell_refs(out);
            }
            FormulaExpr::UnaryOp { operand, .. } => operand.collect_cell_refs(out),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &FormulaExpr, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl fmt::Display for FormulaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaExpr::Number(n) => write!(f, "{}", n),
            FormulaExpr::CellRef(pos) => write!(f, "{}", pos),
            FormulaExpr::BinaryOp { op, left, right } => {
                write_operand(f, left, left.precedence() < op.precedence())?;
                write!(f, "{}", op.symbol())?;
                // Operators associate to the left, so an equal-precedence right
                // operand only exists if it was written in parentheses.
                write_operand(f, right, right.precedence() <= op.precedence())
            }
            FormulaExpr::UnaryOp { op, operand } => {
                write!(f, "{}", op.symbol())?;
                write_operand(f, operand, operand.precedence() < UNARY_PRECEDENCE)
            }
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => 1,
            BinaryOperator::Multiply | BinaryOperator::Divide => 2,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Negate,
}

impl UnaryOperator {
    pub fn symbol(&self) -> char {
        match self {
            UnaryOperator::Plus => '+',
            UnaryOperator::Negate => '-',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Box<FormulaExpr> {
        Box::new(FormulaExpr::Number(n))
    }

    fn binary(op: BinaryOperator, left: Box<FormulaExpr>, right: Box<FormulaExpr>) -> Box<FormulaExpr> {
        Box::new(FormulaExpr::BinaryOp { op, left, right })
    }

    #[test]
    fn test_display_minimal_parentheses() {
        let expr = binary(
            BinaryOperator::Multiply,
            binary(BinaryOperator::Add, num(1.0), num(2.0)),
            num(3.0),
        );
        assert_eq!(expr.to_string(), "(1+2)*3");

        let expr = binary(
            BinaryOperator::Add,
            num(1.0),
            binary(BinaryOperator::Multiply, num(2.0), num(3.0)),
        );
        assert_eq!(expr.to_string(), "1+2*3");
    }

    #[test]
    fn test_display_right_operand_of_equal_precedence() {
        let expr = binary(
            BinaryOperator::Subtract,
            num(1.0),
            binary(BinaryOperator::Subtract, num(2.0), num(3.0)),
        );
        assert_eq!(expr.to_string(), "1-(2-3)");

        let expr = binary(
            BinaryOperator::Subtract,
            binary(BinaryOperator::Subtract, num(1.0), num(2.0)),
            num(3.0),
        );
        assert_eq!(expr.to_string(), "1-2-3");
    }

    #[test]
    fn test_display_unary() {
        let expr = FormulaExpr::UnaryOp {
            op: UnaryOperator::Negate,
            operand: binary(BinaryOperator::Add, num(1.0), num(2.0)),
        };
        assert_eq!(expr.to_string(), "-(1+2)");

        let expr = FormulaExpr::UnaryOp {
            op: UnaryOperator::Negate,
            operand: Box::new(FormulaExpr::CellRef(Position::new(0, 0))),
        };
        assert_eq!(expr.to_string(), "-A1");
    }

    #[test]
    fn test_display_invalid_reference() {
        let expr = FormulaExpr::CellRef(Position::NONE);
        assert_eq!(expr.to_string(), "#REF!");
    }

    #[test]
    fn test_collect_cell_refs() {
        let expr = binary(
            BinaryOperator::Add,
            Box::new(FormulaExpr::CellRef(Position::new(1, 0))),
            Box::new(FormulaExpr::CellRef(Position::new(0, 0))),
        );
        let mut refs = Vec::new();
        expr.collect_cell_refs(&mut refs);
        assert_eq!(refs, vec![Position::new(1, 0), Position::new(0, 0)]);
    }
}
