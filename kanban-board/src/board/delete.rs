//! DeleteBoard command

use super::{DashboardContext, Execute};
use crate::error::{KanbanError, Result};
use crate::types::BoardId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Delete one of the signed-in user's boards with everything on it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteBoard {
    pub id: BoardId,
}

impl DeleteBoard {
    pub fn new(id: impl Into<BoardId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute for DeleteBoard {
    type Output = ();

    fn op_string(&self) -> &'static str {
        "delete board"
    }

    async fn execute(&self, ctx: &DashboardContext) -> Result<()> {
        let owner = ctx.session.require_user()?;

        // Boards of other users are reported as missing
        match ctx.store.get_board(&self.id).await? {
            Some(board) if board.owner_id == owner => {}
            _ => return Err(KanbanError::not_found("board", &self.id)),
        }

        ctx.store.delete_board(&self.id).await?;
        info!(board = %self.id, "board deleted");
        Ok(())
    }
}
