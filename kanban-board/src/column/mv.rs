//! MoveColumn command

use crate::engine::{IdMap, Mutation, Plan, PlanContext, RemoteWrite, Speculation};
use crate::error::{KanbanError, Result};
use crate::ordering::Reordered;
use crate::types::{Board, ColumnId, ColumnPatch};
use serde::{Deserialize, Serialize};

/// Move a column to another index in the board
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoveColumn {
    pub id: ColumnId,
    /// Target index, clamped to the number of columns
    pub index: usize,
}

impl MoveColumn {
    pub fn new(id: impl Into<ColumnId>, index: usize) -> Self {
        Self {
            id: id.into(),
            index,
        }
    }
}

impl Mutation for MoveColumn {
    fn op_string(&self) -> &'static str {
        "move column"
    }

    fn remap_ids(&mut self, ids: &IdMap) {
        self.id = ids.column(&self.id);
    }

    fn plan(&self, board: &Board, ctx: &PlanContext) -> Result<Plan> {
        if board.find_column(&self.id).is_none() {
            return Err(KanbanError::not_found("column", &self.id));
        }

        let after = match ctx.ordering.reorder(&board.columns, &self.id, self.index)? {
            Reordered::Unchanged => return Ok(Plan::Unchanged),
            Reordered::Moved(after) => after,
        };

        let mut primary = None;
        let mut followups = Vec::new();
        for column in ctx.ordering.changed_positions(&board.columns, &after) {
            let write = RemoteWrite::UpdateColumn {
                id: column.id.clone(),
                patch: ColumnPatch::position(column.position),
            };
            if column.id == self.id {
                primary = Some(write);
            } else if ctx.persist_renumbering {
                followups.push(write);
            }
        }

        // Columns may already have sat at their new positions, the moved one included
        let primary = match primary {
            Some(write) => write,
            None => {
                let position = after
                    .iter()
                    .find(|column| column.id == self.id)
                    .map(|column| column.position)
                    .ok_or_else(|| KanbanError::invariant("column lost while moving"))?;
                RemoteWrite::UpdateColumn {
                    id: self.id.clone(),
                    patch: ColumnPatch::position(position),
                }
            }
        };

        let mut candidate = board.clone();
        candidate.columns = after;
        Ok(Plan::Apply(
            Speculation::new(candidate, primary).with_followups(followups),
        ))
    }
}
