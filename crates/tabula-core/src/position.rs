//! Grid position and size types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_COL_LETTERS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A zero-based grid coordinate (e.g., "A1" is row 0, column 0)
///
/// Positions are plain coordinates and may lie outside the grid; use
/// [`Position::is_valid`] before touching a sheet. Ordering is row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ...)
    pub col: u16,
}

impl Position {
    /// A position that is never valid; prints as `#REF!`
    pub const NONE: Position = Position {
        row: u32::MAX,
        col: u16::MAX,
    };

    /// Create a new position
    pub const fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Whether the position lies within the grid limits
    pub fn is_valid(&self) -> bool {
        self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Parse a position from A1-style notation
    ///
    /// Column letters must be uppercase and at most three long; the row is
    /// 1-based. Addresses outside the grid are rejected.
    ///
    /// # Examples
    /// ```
    /// use tabula_core::Position;
    ///
    /// let pos = Position::parse("A1").unwrap();
    /// assert_eq!(pos, Position::new(0, 0));
    ///
    /// let pos = Position::parse("AB12").unwrap();
    /// assert_eq!(pos.row, 11);
    /// assert_eq!(pos.col, 27);
    ///
    /// assert!(Position::parse("a1").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let letters_end = s
            .find(|c: char| !c.is_ascii_uppercase())
            .unwrap_or(s.len());

        if letters_end == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }
        if letters_end > MAX_COL_LETTERS {
            return Err(Error::InvalidAddress(format!(
                "too many column letters in '{}'",
                s
            )));
        }

        let row_str = &s[letters_end..];
        if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("row number too large in '{}'", s)))?;

        // Rows are 1-based in A1 notation
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        let pos = Self {
            row: row - 1,
            col: Self::letters_to_column(&s[..letters_end])?,
        };

        if !pos.is_valid() {
            return Err(Error::InvalidAddress(format!("'{}' is outside the grid", s)));
        }

        Ok(pos)
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_uppercase() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(c as u32 - 'A' as u32 + 1))
                .ok_or_else(|| Error::InvalidAddress(format!("column '{}' too large", letters)))?;
        }

        let col = col - 1; // Convert to 0-based

        if col >= MAX_COLS as u32 {
            return Err(Error::InvalidAddress(format!(
                "column '{}' is outside the grid",
                letters
            )));
        }

        Ok(col as u16)
    }

    /// Format as A1-style string, or `#REF!` when the position is invalid
    pub fn to_a1_string(&self) -> String {
        if !self.is_valid() {
            return "#REF!".to_string();
        }
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Extent of the printable area of a sheet, anchored at A1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// Number of rows
    pub rows: u32,
    /// Number of columns
    pub cols: u32,
}

impl Size {
    /// Create a new size
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Whether the area covers no cells
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
