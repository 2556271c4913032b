//! Dependency graph maintenance
//!
//! Edges live in the cells themselves: a formula's referenced cells are its
//! forward edges and every cell keeps the positions of the formulas reading
//! it. These functions keep both directions in step.

use ahash::AHashSet;
use tabula_core::Position;

use crate::storage::CellStorage;

/// Check whether `target` would depend on itself through `references`
///
/// Walks forward references depth-first. Absent cells on the way are created
/// empty, and stay created even when a cycle is found.
pub(crate) fn creates_cycle(
    storage: &mut CellStorage,
    target: Position,
    references: &[Position],
) -> bool {
    let mut visited = AHashSet::new();
    let mut stack: Vec<Position> = references.iter().rev().copied().collect();

    while let Some(pos) = stack.pop() {
        if pos == target {
            return true;
        }
        if !visited.insert(pos) {
            continue;
        }

        let cell = storage.get_or_create(pos);
        stack.extend(cell.referenced_cells().iter().rev());
    }

    false
}

/// Move `target`'s back-edges from its old references to its new ones
pub(crate) fn relink(
    storage: &mut CellStorage,
    target: Position,
    old_references: &[Position],
    new_references: &[Position],
) {
    for &pos in old_references {
        storage.detach_dependent(pos, target);
    }
    for &pos in new_references {
        storage.get_or_create(pos).add_dependent(target);
    }
}

/// Clear the cache of `origin` and of everything that transitively reads it
///
/// Returns the number of cached values dropped. Nothing is recomputed.
pub(crate) fn invalidate(storage: &mut CellStorage, origin: Position) -> u64 {
    let mut visited = AHashSet::new();
    let mut worklist = vec![origin];
    let mut cleared = 0;

    while let Some(pos) = worklist.pop() {
        if !visited.insert(pos) {
            continue;
        }
        if let Some(cell) = storage.get_mut(pos) {
            if cell.invalidate() {
                cleared += 1;
            }
            worklist.extend(cell.dependents());
        }
    }

    tracing::trace!(cell = %origin, visited = visited.len(), cleared, "invalidated");
    cleared
}
