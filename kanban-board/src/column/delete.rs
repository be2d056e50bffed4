//! DeleteColumn command

use crate::engine::{IdMap, Mutation, Plan, PlanContext, RemoteWrite, Speculation};
use crate::error::{KanbanError, Result};
use crate::types::{Board, ColumnId};
use serde::{Deserialize, Serialize};

/// Delete a column together with its cards
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteColumn {
    pub id: ColumnId,
}

impl DeleteColumn {
    pub fn new(id: impl Into<ColumnId>) -> Self {
        Self { id: id.into() }
    }
}

impl Mutation for DeleteColumn {
    fn op_string(&self) -> &'static str {
        "delete column"
    }

    fn remap_ids(&mut self, ids: &IdMap) {
        self.id = ids.column(&self.id);
    }

    fn plan(&self, board: &Board, _ctx: &PlanContext) -> Result<Plan> {
        let index = board
            .column_index(&self.id)
            .ok_or_else(|| KanbanError::not_found("column", &self.id))?;

        let mut candidate = board.clone();
        candidate.columns.remove(index);

        Ok(Plan::Apply(Speculation::new(
            candidate,
            RemoteWrite::DeleteColumn {
                id: self.id.clone(),
            },
        )))
    }
}
