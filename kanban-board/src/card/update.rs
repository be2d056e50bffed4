//! UpdateCard command

use crate::engine::{
    optional_text, required_title, IdMap, Mutation, Plan, PlanContext, RemoteWrite, Speculation,
};
use crate::error::{KanbanError, Result};
use crate::types::{Board, CardId, CardPatch};
use serde::{Deserialize, Serialize};

/// Edit a card's title and/or description
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateCard {
    pub id: CardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `Some(None)` clears the description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl UpdateCard {
    /// Create a new UpdateCard command
    pub fn new(id: impl Into<CardId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Remove the description
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }
}

impl Mutation for UpdateCard {
    fn op_string(&self) -> &'static str {
        "update card"
    }

    fn remap_ids(&mut self, ids: &IdMap) {
        self.id = ids.card(&self.id);
    }

    fn plan(&self, board: &Board, _ctx: &PlanContext) -> Result<Plan> {
        let card = board
            .find_card(&self.id)
            .ok_or_else(|| KanbanError::not_found("card", &self.id))?;

        let mut patch = CardPatch::default();
        if let Some(title) = &self.title {
            let title = required_title(title)?;
            if title != card.title {
                patch.title = Some(title);
            }
        }
        if let Some(description) = &self.description {
            let description = optional_text(description.as_deref());
            if description != card.description {
                patch.description = Some(description);
            }
        }

        if patch.is_empty() {
            return Ok(Plan::Unchanged);
        }

        let mut candidate = board.clone();
        if let Some(card) = candidate.find_card_mut(&self.id) {
            patch.apply(card);
        }

        Ok(Plan::Apply(Speculation::new(
            candidate,
            RemoteWrite::UpdateCard {
                id: self.id.clone(),
                patch,
            },
        )))
    }
}
