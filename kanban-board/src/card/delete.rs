//! DeleteCard command

use crate::engine::{IdMap, Mutation, Plan, PlanContext, RemoteWrite, Speculation};
use crate::error::{KanbanError, Result};
use crate::types::{Board, CardId};
use serde::{Deserialize, Serialize};

/// Delete a card.
///
/// Remaining siblings keep their positions; the gap is harmless because
/// ordering is by relative value.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteCard {
    pub id: CardId,
}

impl DeleteCard {
    pub fn new(id: impl Into<CardId>) -> Self {
        Self { id: id.into() }
    }
}

impl Mutation for DeleteCard {
    fn op_string(&self) -> &'static str {
        "delete card"
    }

    fn remap_ids(&mut self, ids: &IdMap) {
        self.id = ids.card(&self.id);
    }

    fn plan(&self, board: &Board, _ctx: &PlanContext) -> Result<Plan> {
        let (column_index, card_index) = board
            .locate_card(&self.id)
            .ok_or_else(|| KanbanError::not_found("card", &self.id))?;

        let mut candidate = board.clone();
        candidate.columns[column_index].cards.remove(card_index);

        Ok(Plan::Apply(Speculation::new(
            candidate,
            RemoteWrite::DeleteCard {
                id: self.id.clone(),
            },
        )))
    }
}
