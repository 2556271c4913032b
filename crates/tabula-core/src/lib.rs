//! # tabula-core
//!
//! Core value types for the tabula spreadsheet engine.
//!
//! This crate provides the fundamental types used throughout tabula:
//! - [`Position`] and [`Size`] - Grid coordinates and printable extents
//! - [`Value`] and [`CellError`] - Computed cell values
//! - [`Error`] - Failures raised by sheet operations
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{Position, Value, CellError};
//!
//! let pos = Position::parse("B3").unwrap();
//! assert_eq!(pos, Position::new(2, 1));
//! assert_eq!(pos.to_string(), "B3");
//!
//! let value = Value::from(CellError::Div0);
//! assert_eq!(value.to_string(), "#DIV/0!");
//! ```

pub mod error;
pub mod position;
pub mod value;

// Re-exports for convenience
pub use error::{Error, Result};
pub use position::{Position, Size};
pub use value::{CellError, Value};

/// Maximum number of rows in a sheet
pub const MAX_ROWS: u32 = 16_384;

/// Maximum number of columns in a sheet
pub const MAX_COLS: u16 = 16_384;

/// Maximum number of column letters accepted in A1 notation
pub const MAX_COL_LETTERS: usize = 3;

/// Leading character that marks cell text as a formula
pub const FORMULA_SIGN: char = '=';

/// Leading character that forces cell text to be kept as literal text
pub const ESCAPE_SIGN: char = '\'';
