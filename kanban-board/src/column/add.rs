//! AddColumn command

use crate::engine::{required_title, Mutation, Plan, PlanContext, RemoteWrite, Speculation};
use crate::error::Result;
use crate::types::{Board, Column, ColumnId, NewColumn};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Add a new column after the existing ones
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddColumn {
    /// The column display name
    pub title: String,
}

impl AddColumn {
    /// Create a new AddColumn command
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Mutation for AddColumn {
    fn op_string(&self) -> &'static str {
        "add column"
    }

    fn plan(&self, board: &Board, ctx: &PlanContext) -> Result<Plan> {
        let title = required_title(&self.title)?;
        let position = ctx.ordering.append_position(&board.columns);
        let provisional = ColumnId::new();

        let mut candidate = board.clone();
        candidate.columns.push(Column {
            id: provisional.clone(),
            board_id: board.id.clone(),
            title: title.clone(),
            position,
            created_at: Utc::now(),
            cards: Vec::new(),
        });

        Ok(Plan::Apply(Speculation::new(
            candidate,
            RemoteWrite::CreateColumn {
                provisional,
                board: board.id.clone(),
                fields: NewColumn { title, position },
            },
        )))
    }
}
