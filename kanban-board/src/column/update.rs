//! UpdateColumn command

use crate::engine::{required_title, IdMap, Mutation, Plan, PlanContext, RemoteWrite, Speculation};
use crate::error::{KanbanError, Result};
use crate::types::{Board, ColumnId, ColumnPatch};
use serde::{Deserialize, Serialize};

/// Rename a column
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateColumn {
    pub id: ColumnId,
    pub title: String,
}

impl UpdateColumn {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

impl Mutation for UpdateColumn {
    fn op_string(&self) -> &'static str {
        "update column"
    }

    fn remap_ids(&mut self, ids: &IdMap) {
        self.id = ids.column(&self.id);
    }

    fn plan(&self, board: &Board, _ctx: &PlanContext) -> Result<Plan> {
        let title = required_title(&self.title)?;
        let index = board
            .column_index(&self.id)
            .ok_or_else(|| KanbanError::not_found("column", &self.id))?;
        if board.columns[index].title == title {
            return Ok(Plan::Unchanged);
        }

        let mut candidate = board.clone();
        candidate.columns[index].title = title.clone();

        Ok(Plan::Apply(Speculation::new(
            candidate,
            RemoteWrite::UpdateColumn {
                id: self.id.clone(),
                patch: ColumnPatch {
                    title: Some(title),
                    ..ColumnPatch::default()
                },
            },
        )))
    }
}
