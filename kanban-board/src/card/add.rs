//! AddCard command

use crate::engine::{
    optional_text, required_title, IdMap, Mutation, Plan, PlanContext, RemoteWrite, Speculation,
};
use crate::error::{KanbanError, Result};
use crate::types::{Board, Card, CardId, ColumnId, NewCard};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Add a card at the end of a column
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddCard {
    /// The column to add to
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AddCard {
    /// Create a new AddCard command
    pub fn new(column_id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            title: title.into(),
            description: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Mutation for AddCard {
    fn op_string(&self) -> &'static str {
        "add card"
    }

    fn remap_ids(&mut self, ids: &IdMap) {
        self.column_id = ids.column(&self.column_id);
    }

    fn plan(&self, board: &Board, ctx: &PlanContext) -> Result<Plan> {
        let title = required_title(&self.title)?;
        let description = optional_text(self.description.as_deref());
        let column_index = board
            .column_index(&self.column_id)
            .ok_or_else(|| KanbanError::not_found("column", &self.column_id))?;

        let position = ctx
            .ordering
            .append_position(&board.columns[column_index].cards);

        // Shown under a provisional id until the store assigns the real one
        let provisional = CardId::new();
        let card = Card {
            id: provisional.clone(),
            board_id: board.id.clone(),
            column_id: self.column_id.clone(),
            title: title.clone(),
            description: description.clone(),
            position,
            created_at: Utc::now(),
        };

        let mut candidate = board.clone();
        candidate.columns[column_index].cards.push(card);

        Ok(Plan::Apply(Speculation::new(
            candidate,
            RemoteWrite::CreateCard {
                provisional,
                column: self.column_id.clone(),
                fields: NewCard {
                    board_id: board.id.clone(),
                    title,
                    description,
                    position,
                },
            },
        )))
    }
}
