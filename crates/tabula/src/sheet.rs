//! The spreadsheet grid

use std::io::{self, Write};

use ahash::AHashSet;
use tabula_core::{CellError, Error, Position, Result, Size, Value};

use crate::cell::{Cell, CellContent};
use crate::dependency;
use crate::storage::CellStorage;

/// Counters describing the work a sheet has done
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetStats {
    /// Formula evaluations performed (cache misses on formula cells)
    pub evaluations: u64,
    /// Cached values dropped by invalidation
    pub invalidations: u64,
}

/// A spreadsheet: a sparse grid of cells with dependency tracking
///
/// Values are computed lazily and cached per cell. Changing a cell drops the
/// cached values of every formula that reads it, directly or transitively.
/// Edits that would make a formula depend on itself are rejected.
///
/// # Example
///
/// ```rust
/// use tabula::prelude::*;
///
/// let mut sheet = Sheet::new();
/// let a1: Position = "A1".parse().unwrap();
/// let b1: Position = "B1".parse().unwrap();
///
/// sheet.set_cell(a1, "2").unwrap();
/// sheet.set_cell(b1, "=A1*21").unwrap();
/// assert_eq!(sheet.value(b1).unwrap(), Value::Number(42.0));
///
/// assert!(matches!(
///     sheet.set_cell(a1, "=B1"),
///     Err(Error::CircularDependency(_))
/// ));
/// ```
#[derive(Debug, Default)]
pub struct Sheet {
    storage: CellStorage,
    evaluations: std::cell::Cell<u64>,
    invalidations: u64,
}

impl Sheet {
    /// Create an empty sheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content of a cell from user text
    ///
    /// The cell is created if absent. Setting the text the cell already has
    /// does nothing. On a parse error nothing changes; on a circular
    /// dependency only the empty cells created while walking the references
    /// remain.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        check_position(pos)?;

        if let Some(cell) = self.storage.get(pos) {
            if cell.text() == text {
                tracing::trace!(cell = %pos, "unchanged");
                return Ok(());
            }
        }

        let content = CellContent::from_text(text)?;

        if dependency::creates_cycle(&mut self.storage, pos, content.referenced_cells()) {
            tracing::debug!(cell = %pos, text, "rejected circular dependency");
            return Err(Error::CircularDependency(pos));
        }

        self.commit(pos, content);
        tracing::debug!(cell = %pos, text, "set");
        Ok(())
    }

    /// Replace content, rewire edges and invalidate
    fn commit(&mut self, pos: Position, content: CellContent) {
        let old_references = self.storage.get_or_create(pos).referenced_cells().to_vec();
        dependency::relink(
            &mut self.storage,
            pos,
            &old_references,
            content.referenced_cells(),
        );
        self.storage.get_or_create(pos).replace_content(content);
        self.invalidate(pos);
    }

    fn invalidate(&mut self, pos: Position) {
        self.invalidations += dependency::invalidate(&mut self.storage, pos);
    }

    /// Read access to a cell, `None` if absent
    pub fn cell(&self, pos: Position) -> Result<Option<CellView<'_>>> {
        check_position(pos)?;
        Ok(self.storage.get(pos).map(|cell| CellView {
            sheet: self,
            pos,
            cell,
        }))
    }

    /// Get a cell, creating an empty one if absent
    pub fn get_or_create_cell(&mut self, pos: Position) -> Result<&Cell> {
        check_position(pos)?;
        Ok(self.storage.get_or_create(pos))
    }

    /// Empty a cell's content, keeping the cell itself
    ///
    /// Does nothing if the cell is absent.
    pub fn blank_cell(&mut self, pos: Position) -> Result<()> {
        check_position(pos)?;
        if self.storage.contains(pos) {
            self.set_cell(pos, "")?;
        }
        Ok(())
    }

    /// Remove a cell from the grid
    ///
    /// Formulas that read it see an absent cell (zero) from now on. Does
    /// nothing if the cell is absent.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        check_position(pos)?;
        let Some(cell) = self.storage.get(pos) else {
            return Ok(());
        };

        let old_references = cell.referenced_cells().to_vec();
        dependency::relink(&mut self.storage, pos, &old_references, &[]);
        self.invalidate(pos);
        self.storage.remove(pos);

        tracing::debug!(cell = %pos, "cleared");
        Ok(())
    }

    /// Computed value of a cell; an absent cell reads as zero
    pub fn value(&self, pos: Position) -> Result<Value> {
        check_position(pos)?;
        Ok(self
            .storage
            .get(pos)
            .map_or_else(Value::default, |cell| cell.value(self)))
    }

    /// Raw text of a cell; an absent cell has empty text
    pub fn text(&self, pos: Position) -> Result<String> {
        check_position(pos)?;
        Ok(self.storage.get(pos).map(Cell::text).unwrap_or_default())
    }

    /// Whether a cell is present at `pos`
    ///
    /// A presence query rather than an accessor: positions outside the grid
    /// can never hold a cell, so they answer `false` instead of an error.
    pub fn contains(&self, pos: Position) -> bool {
        self.storage.contains(pos)
    }

    /// Number of present cells
    pub fn cell_count(&self) -> usize {
        self.storage.cell_count()
    }

    /// Iterate over present cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = CellView<'_>> {
        self.storage
            .iter()
            .map(move |(pos, cell)| CellView { sheet: self, pos, cell })
    }

    /// Smallest rectangle anchored at A1 that covers every present cell
    pub fn printable_size(&self) -> Size {
        match self.storage.max_bounds() {
            Some((max_row, max_col)) => Size::new(max_row + 1, u32::from(max_col) + 1),
            None => Size::default(),
        }
    }

    /// Write the computed values of the printable area, tab separated
    pub fn print_values<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_cells(out, |cell| cell.value(self).to_string())
    }

    /// Write the raw texts of the printable area, tab separated
    pub fn print_texts<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_cells(out, Cell::text)
    }

    fn print_cells<W, F>(&self, out: &mut W, render: F) -> io::Result<()>
    where
        W: Write,
        F: Fn(&Cell) -> String,
    {
        let size = self.printable_size();

        for row in 0..size.rows {
            let mut cells = self.storage.iter_row(row).peekable();
            for col in 0..size.cols {
                if col > 0 {
                    out.write_all(b"\t")?;
                }
                if let Some((_, cell)) = cells.next_if(|&(c, _)| u32::from(c) == col) {
                    out.write_all(render(cell).as_bytes())?;
                }
            }
            out.write_all(b"\n")?;
        }

        Ok(())
    }

    /// Work counters since the sheet was created
    pub fn stats(&self) -> SheetStats {
        SheetStats {
            evaluations: self.evaluations.get(),
            invalidations: self.invalidations,
        }
    }

    pub(crate) fn record_evaluation(&self) {
        tracing::trace!("evaluating formula");
        self.evaluations.set(self.evaluations.get() + 1);
    }

    /// Compute and cache the values `roots` depend on, dependencies first
    ///
    /// Walks uncached forward references with an explicit stack and fills
    /// each cache in post-order, so a long chain of formulas never nests
    /// evaluations. The graph is acyclic, so every reference of a cell is
    /// cached by the time the cell itself is computed.
    pub(crate) fn fill_caches(&self, roots: &[Position]) {
        let mut visited = AHashSet::new();
        let mut stack: Vec<(Position, bool)> =
            roots.iter().rev().map(|&pos| (pos, false)).collect();

        while let Some((pos, expanded)) = stack.pop() {
            let Some(cell) = self.storage.get(pos) else {
                continue;
            };
            if expanded {
                cell.value(self);
                continue;
            }
            if cell.cached_value().is_some() || !visited.insert(pos) {
                continue;
            }

            stack.push((pos, true));
            stack.extend(cell.referenced_cells().iter().rev().map(|&r| (r, false)));
        }
    }

    /// Numeric reading of a cell as seen by formulas
    pub(crate) fn number_at(&self, pos: Position) -> std::result::Result<f64, CellError> {
        let Some(cell) = self.storage.get(pos) else {
            return Ok(0.0);
        };
        match cell.value(self) {
            Value::Number(n) => Ok(n),
            Value::Error(e) => Err(e),
            Value::Text(_) => Err(CellError::Value),
        }
    }
}

fn check_position(pos: Position) -> Result<()> {
    if pos.is_valid() {
        Ok(())
    } else {
        Err(Error::InvalidPosition(pos))
    }
}

/// A present cell together with the sheet it lives in
#[derive(Debug, Clone, Copy)]
pub struct CellView<'a> {
    sheet: &'a Sheet,
    pos: Position,
    cell: &'a Cell,
}

impl<'a> CellView<'a> {
    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn cell(&self) -> &'a Cell {
        self.cell
    }

    /// Computed value, cached after the first read
    pub fn value(&self) -> Value {
        self.cell.value(self.sheet)
    }

    pub fn text(&self) -> String {
        self.cell.text()
    }

    pub fn referenced_cells(&self) -> &'a [Position] {
        self.cell.referenced_cells()
    }
}
