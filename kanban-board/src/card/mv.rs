//! MoveCard command

use super::renumber_writes;
use crate::engine::{IdMap, Mutation, Plan, PlanContext, RemoteWrite, Speculation};
use crate::error::{KanbanError, Result};
use crate::ordering::Reordered;
use crate::types::{Board, Card, CardId, CardPatch, ColumnId, Position};
use serde::{Deserialize, Serialize};

/// Move a card to an index within the same or another column
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoveCard {
    /// The card to move
    pub id: CardId,
    /// Destination column
    pub column_id: ColumnId,
    /// Index in the destination's display order, clamped to its length
    pub index: usize,
}

impl MoveCard {
    /// Create a new MoveCard command
    pub fn new(id: impl Into<CardId>, column_id: impl Into<ColumnId>, index: usize) -> Self {
        Self {
            id: id.into(),
            column_id: column_id.into(),
            index,
        }
    }

    /// Move to the end of `column_id`
    pub fn to_column(id: impl Into<CardId>, column_id: impl Into<ColumnId>) -> Self {
        Self::new(id, column_id, usize::MAX)
    }

    fn position_in(&self, cards: &[Card]) -> Result<Position> {
        cards
            .iter()
            .find(|card| card.id == self.id)
            .map(|card| card.position)
            .ok_or_else(|| KanbanError::invariant(format!("card {} lost while moving", self.id)))
    }
}

impl Mutation for MoveCard {
    fn op_string(&self) -> &'static str {
        "move card"
    }

    fn remap_ids(&mut self, ids: &IdMap) {
        self.id = ids.card(&self.id);
        self.column_id = ids.column(&self.column_id);
    }

    fn plan(&self, board: &Board, ctx: &PlanContext) -> Result<Plan> {
        let (source, _) = board
            .locate_card(&self.id)
            .ok_or_else(|| KanbanError::not_found("card", &self.id))?;
        let target = board
            .column_index(&self.column_id)
            .ok_or_else(|| KanbanError::not_found("column", &self.column_id))?;
        let ordering = &ctx.ordering;
        let mut candidate = board.clone();
        let mut followups = Vec::new();

        let primary = if source == target {
            let before = &board.columns[source].cards;
            let after = match ordering.reorder(before, &self.id, self.index)? {
                Reordered::Unchanged => return Ok(Plan::Unchanged),
                Reordered::Moved(after) => after,
            };

            let position = self.position_in(&after)?;
            if ctx.persist_renumbering {
                followups = renumber_writes(ordering.changed_positions(before, &after), &self.id);
            }
            candidate.columns[source].cards = after;
            CardPatch::position(position)
        } else {
            let source_before = &board.columns[source].cards;
            let target_before = &board.columns[target].cards;

            let (mut card, source_after) = ordering.remove(source_before, &self.id)?;
            card.column_id = self.column_id.clone();
            let target_after = ordering.cross_container_insert(target_before, card, self.index);

            let position = self.position_in(&target_after)?;
            if ctx.persist_renumbering {
                followups = renumber_writes(
                    ordering
                        .changed_positions(source_before, &source_after)
                        .into_iter()
                        .chain(ordering.changed_positions(target_before, &target_after)),
                    &self.id,
                );
            }
            candidate.columns[source].cards = source_after;
            candidate.columns[target].cards = target_after;
            CardPatch::relocate(self.column_id.clone(), position)
        };

        Ok(Plan::Apply(
            Speculation::new(
                candidate,
                RemoteWrite::UpdateCard {
                    id: self.id.clone(),
                    patch: primary,
                },
            )
            .with_followups(followups),
        ))
    }
}
