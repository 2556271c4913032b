//! # tabula
//!
//! An in-memory spreadsheet engine.
//!
//! A [`Sheet`] holds a sparse grid of cells. Each cell contains text, a
//! number, or an arithmetic formula over other cells. Values are computed on
//! demand and cached; editing a cell invalidates exactly the formulas that
//! read it, and edits that would introduce a circular dependency are rejected.
//!
//! ## Features
//!
//! - Formulas with `+ - * /`, unary signs, parentheses and cell references
//! - Lazy evaluation with per-cell caching
//! - Cycle rejection on every edit
//! - Error values (`#REF!`, `#VALUE!`, `#DIV/0!`) that propagate through formulas
//! - Tab-separated printing of values or raw texts
//!
//! ## Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! let mut sheet = Sheet::new();
//! let pos = |addr: &str| -> Position { addr.parse().unwrap() };
//!
//! sheet.set_cell(pos("A1"), "10").unwrap();
//! sheet.set_cell(pos("A2"), "=A1/4").unwrap();
//! sheet.set_cell(pos("B1"), "'=not a formula").unwrap();
//!
//! assert_eq!(sheet.value(pos("A2")).unwrap(), Value::Number(2.5));
//! assert_eq!(sheet.printable_size(), Size::new(2, 2));
//!
//! let mut out = Vec::new();
//! sheet.print_values(&mut out).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "10\t=not a formula\n2.5\t\n");
//! ```

pub mod cell;
mod dependency;
pub mod prelude;
pub mod sheet;
mod storage;

pub use cell::{Cell, CellContent};
pub use sheet::{CellView, Sheet, SheetStats};

// Re-export core types
pub use tabula_core::{
    CellError, Error, Position, Result, Size, Value, ESCAPE_SIGN, FORMULA_SIGN, MAX_COLS,
    MAX_ROWS,
};

// Re-export formula types
pub use tabula_formula::{Formula, FormulaError, FormulaExpr, FormulaResult};
