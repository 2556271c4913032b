//! Sparse cell storage
//!
//! Only present cells are stored, in a row-major `BTreeMap` so iteration and
//! bounds queries follow grid order.

use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};
use tabula_core::Position;

use crate::cell::Cell;

/// Sparse row-based storage for sheet cells
///
/// Structure: `BTreeMap<row_index, BTreeMap<col_index, Cell>>`
///
/// Removing a cell that formulas still read parks its back-edges; they are
/// handed back to whichever cell is next created at that position, so those
/// formulas keep being invalidated when it changes.
#[derive(Debug, Default)]
pub(crate) struct CellStorage {
    /// Row index → column map
    rows: BTreeMap<u32, BTreeMap<u16, Cell>>,

    /// Back-edges of removed cells, keyed by their position
    parked_dependents: AHashMap<Position, AHashSet<Position>>,
}

impl CellStorage {
    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.rows.get(&pos.row).and_then(|r| r.get(&pos.col))
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.rows.get_mut(&pos.row).and_then(|r| r.get_mut(&pos.col))
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.get(pos).is_some()
    }

    /// Get the cell at `pos`, creating an empty one if absent
    pub fn get_or_create(&mut self, pos: Position) -> &mut Cell {
        let parked = &mut self.parked_dependents;
        self.rows
            .entry(pos.row)
            .or_default()
            .entry(pos.col)
            .or_insert_with(|| {
                let dependents = parked.remove(&pos).unwrap_or_default();
                if !dependents.is_empty() {
                    tracing::trace!(cell = %pos, count = dependents.len(), "restoring parked dependents");
                }
                Cell::with_dependents(dependents)
            })
    }

    /// Remove a cell, parking its back-edges
    pub fn remove(&mut self, pos: Position) -> Option<Cell> {
        let mut cell = self.rows.get_mut(&pos.row).and_then(|r| r.remove(&pos.col))?;

        // Clean up empty rows
        if self.rows.get(&pos.row).map_or(false, BTreeMap::is_empty) {
            self.rows.remove(&pos.row);
        }

        let dependents = cell.take_dependents();
        if !dependents.is_empty() {
            self.parked_dependents.insert(pos, dependents);
        }

        Some(cell)
    }

    /// Remove `dependent` from the back-edges of the cell at `pos`, whether
    /// that cell is present or parked
    pub fn detach_dependent(&mut self, pos: Position, dependent: Position) {
        if let Some(cell) = self.get_mut(pos) {
            cell.remove_dependent(dependent);
        } else if let Some(parked) = self.parked_dependents.get_mut(&pos) {
            parked.remove(&dependent);
            if parked.is_empty() {
                self.parked_dependents.remove(&pos);
            }
        }
    }

    /// Number of present cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Largest row and column holding a cell, or `None` if empty
    pub fn max_bounds(&self) -> Option<(u32, u16)> {
        let max_row = *self.rows.keys().next_back()?;
        let max_col = self
            .rows
            .values()
            .filter_map(|cols| cols.keys().next_back().copied())
            .max()?;
        Some((max_row, max_col))
    }

    /// Iterate over all cells in row order
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> {
        self.rows.iter().flat_map(|(&row, cols)| {
            cols.iter()
                .map(move |(&col, cell)| (Position::new(row, col), cell))
        })
    }

    /// Iterate over the cells of one row in column order
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &Cell)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cols| cols.iter().map(|(&col, cell)| (col, cell)))
    }
}
