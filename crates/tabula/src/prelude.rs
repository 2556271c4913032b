//! Prelude module - common imports for tabula users
//!
//! ```rust
//! use tabula::prelude::*;
//! ```

pub use crate::{
    // Cell types
    Cell,
    CellContent,
    CellError,
    CellView,
    // Error types
    Error,
    Position,
    Result,
    // Main types
    Sheet,
    SheetStats,
    Size,
    Value,
};
