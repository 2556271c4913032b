//! Parsed formula with its reference set

use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::{evaluate, EvaluationContext};
use crate::parser::parse_formula;
use tabula_core::{CellError, Position};

/// A parsed formula, ready to evaluate
///
/// The referenced cells are computed once at parse time: sorted row-major,
/// de-duplicated, and limited to positions inside the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: FormulaExpr,
    referenced_cells: Vec<Position>,
}

impl Formula {
    /// Parse formula text (without the leading `=`)
    pub fn parse(expression: &str) -> FormulaResult<Self> {
        let expr = parse_formula(expression)?;

        let mut referenced_cells = Vec::new();
        expr.collect_cell_refs(&mut referenced_cells);
        referenced_cells.retain(Position::is_valid);
        referenced_cells.sort_unstable();
        referenced_cells.dedup();

        Ok(Self {
            expr,
            referenced_cells,
        })
    }

    /// Evaluate against a cell lookup
    pub fn evaluate<C>(&self, ctx: &C) -> Result<f64, CellError>
    where
        C: EvaluationContext + ?Sized,
    {
        evaluate(&self.expr, ctx)
    }

    /// Canonical text of the expression (without the leading `=`)
    pub fn expression(&self) -> String {
        self.expr.to_string()
    }

    /// Cells read by this formula
    pub fn referenced_cells(&self) -> &[Position] {
        &self.referenced_cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_canonical_expression() {
        let cases = [
            ("1 + 2", "1+2"),
            ("(1+2)*3", "(1+2)*3"),
            ("((1))+(2*3)", "1+2*3"),
            ("1-(2-3)", "1-(2-3)"),
            ("1-(2+3)", "1-(2+3)"),
            ("(1-2)-3", "1-2-3"),
            ("2*(3/4)", "2*(3/4)"),
            ("-(A1)", "-A1"),
            ("- ( A1 + B2 )", "-(A1+B2)"),
            ("1e3 / .5", "1000/0.5"),
            ("ZZZZ1 * 2", "#REF!*2"),
        ];

        for (input, expected) in cases {
            let formula = Formula::parse(input).unwrap();
            assert_eq!(formula.expression(), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_canonical_text_reparses_to_same_tree() {
        for input in ["1-(2-3)*4", "-(1+2)/-B3", "((A1+A2)+(A3+A4))", "+1--2", "#REF!+C7"] {
            let formula = Formula::parse(input).unwrap();
            let reparsed = Formula::parse(&formula.expression()).unwrap();
            assert_eq!(reparsed, formula, "input {:?}", input);
        }
    }

    #[test]
    fn test_referenced_cells_sorted_and_deduplicated() {
        let formula = Formula::parse("B2+A1+B2+A3*A1+ZZZZ9").unwrap();
        assert_eq!(
            formula.referenced_cells(),
            &[Position::new(0, 0), Position::new(1, 1), Position::new(2, 0)]
        );

        let formula = Formula::parse("1+2").unwrap();
        assert!(formula.referenced_cells().is_empty());
    }

    #[test]
    fn test_evaluate_through_formula() {
        let formula = Formula::parse("A1/B1").unwrap();
        let lookup = |pos: Position| -> Result<f64, CellError> {
            Ok(if pos.col == 0 { 6.0 } else { 3.0 })
        };
        assert_eq!(formula.evaluate(&lookup), Ok(2.0));
    }
}
