//! Ordering policy: position arithmetic for sibling sequences.
//!
//! Everything here is pure and synchronous. Sibling slices are expected in
//! display order (ascending position). Reorder, insert and remove all renumber
//! the affected container to a dense run starting at the configured base, so
//! positions stay strictly increasing regardless of earlier gaps.

use crate::error::{KanbanError, Result};
use crate::types::{Position, PositionBase, Positioned};

/// Result of a reorder request
#[derive(Debug, Clone, PartialEq)]
pub enum Reordered<T> {
    /// The item already sits at the target index. Nothing to persist.
    Unchanged,
    /// New sibling sequence, densely renumbered
    Moved(Vec<T>),
}

/// Computes sibling positions for inserts, removals and reorders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderingPolicy {
    base: PositionBase,
}

impl OrderingPolicy {
    pub fn new(base: PositionBase) -> Self {
        Self { base }
    }

    pub fn base(&self) -> PositionBase {
        self.base
    }

    /// Position for an item appended after all live siblings.
    ///
    /// Computed from the current siblings only, so a deleted maximum can be
    /// handed out again once it is gone.
    pub fn append_position<T: Positioned>(&self, siblings: &[T]) -> Position {
        siblings
            .iter()
            .map(Positioned::position)
            .max()
            .map(Position::next)
            .unwrap_or_else(|| self.base.first())
    }

    /// Renumber in slice order: base, base + 1, ...
    pub fn densify<T: Positioned>(&self, siblings: &mut [T]) {
        for (index, sibling) in siblings.iter_mut().enumerate() {
            sibling.set_position(self.base.at(index));
        }
    }

    /// Move `moving` to `target_index` within the same container.
    ///
    /// The target is clamped to the end of the sequence. A target equal to the
    /// item's current index yields [`Reordered::Unchanged`].
    pub fn reorder<T>(
        &self,
        siblings: &[T],
        moving: &T::Id,
        target_index: usize,
    ) -> Result<Reordered<T>>
    where
        T: Positioned + Clone,
    {
        let from = siblings
            .iter()
            .position(|s| s.id() == moving)
            .ok_or_else(|| KanbanError::not_found("sibling", moving))?;

        let mut items = siblings.to_vec();
        let item = items.remove(from);
        let to = target_index.min(items.len());
        if to == from {
            return Ok(Reordered::Unchanged);
        }

        items.insert(to, item);
        self.densify(&mut items);
        Ok(Reordered::Moved(items))
    }

    /// Insert `item` into another container at `target_index` (clamped) and
    /// renumber the destination.
    pub fn cross_container_insert<T>(
        &self,
        target_siblings: &[T],
        item: T,
        target_index: usize,
    ) -> Vec<T>
    where
        T: Positioned + Clone,
    {
        let mut items = target_siblings.to_vec();
        let to = target_index.min(items.len());
        items.insert(to, item);
        self.densify(&mut items);
        items
    }

    /// Take `id` out of its container and renumber what remains.
    pub fn remove<T>(&self, siblings: &[T], id: &T::Id) -> Result<(T, Vec<T>)>
    where
        T: Positioned + Clone,
    {
        let index = siblings
            .iter()
            .position(|s| s.id() == id)
            .ok_or_else(|| KanbanError::not_found("sibling", id))?;

        let mut items = siblings.to_vec();
        let removed = items.remove(index);
        self.densify(&mut items);
        Ok((removed, items))
    }

    /// Items of `after` whose position differs from their position in `before`
    /// (or that are new to the container).
    pub fn changed_positions<'a, T: Positioned>(&self, before: &[T], after: &'a [T]) -> Vec<&'a T> {
        after
            .iter()
            .filter(|item| {
                before
                    .iter()
                    .find(|b| b.id() == item.id())
                    .map(|b| b.position() != item.position())
                    .unwrap_or(true)
            })
            .collect()
    }

    /// Check that positions are strictly increasing in slice order.
    pub fn verify<T: Positioned>(&self, siblings: &[T]) -> Result<()> {
        for pair in siblings.windows(2) {
            if pair[0].position() >= pair[1].position() {
                return Err(KanbanError::invariant(format!(
                    "{} at {} is not before {} at {}",
                    pair[0].id(),
                    pair[0].position(),
                    pair[1].id(),
                    pair[1].position()
                )));
            }
        }
        Ok(())
    }

    /// Whether positions form a dense run from the base
    pub fn is_dense<T: Positioned>(&self, siblings: &[T]) -> bool {
        siblings
            .iter()
            .enumerate()
            .all(|(index, s)| s.position() == self.base.at(index))
    }
}
