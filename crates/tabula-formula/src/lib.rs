//! # tabula-formula
//!
//! Formula parser and evaluator for tabula.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Canonical re-printing of a parsed formula
//! - Formula evaluation against a cell lookup
//! - Extraction of the cells a formula references
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{CellError, Position};
//! use tabula_formula::Formula;
//!
//! let formula = Formula::parse("( A1 + 2 ) * B1").unwrap();
//! assert_eq!(formula.expression(), "(A1+2)*B1");
//! assert_eq!(formula.referenced_cells(), &[Position::new(0, 0), Position::new(0, 1)]);
//!
//! let lookup = |pos: Position| -> Result<f64, CellError> { Ok(pos.col as f64 + 1.0) };
//! assert_eq!(formula.evaluate(&lookup), Ok(6.0));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, EvaluationContext};
pub use formula::Formula;
pub use parser::parse_formula;
