//! Error types for tabula-core

use crate::Position;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating a sheet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Position outside the grid limits
    #[error("Invalid position: row {}, column {}", .0.row, .0.col)]
    InvalidPosition(Position),

    /// Malformed A1-style address text
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// New content would close a reference cycle
    #[error("Circular dependency detected involving cell {0}")]
    CircularDependency(Position),

    /// Formula text could not be parsed
    #[error("Formula parse error: {0}")]
    FormulaParse(String),
}
