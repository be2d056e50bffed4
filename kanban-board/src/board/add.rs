//! AddBoard command

use super::{DashboardContext, Execute};
use crate::engine::required_title;
use crate::error::Result;
use crate::types::{BoardRecord, NewBoard};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Create a board owned by the signed-in user
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddBoard {
    pub title: String,
}

impl AddBoard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[async_trait]
impl Execute for AddBoard {
    type Output = BoardRecord;

    fn op_string(&self) -> &'static str {
        "add board"
    }

    async fn execute(&self, ctx: &DashboardContext) -> Result<BoardRecord> {
        let owner = ctx.session.require_user()?;
        let title = required_title(&self.title)?;

        let board = ctx.store.create_board(&owner, NewBoard { title }).await?;
        info!(board = %board.id, owner = %owner, "board created");
        Ok(board)
    }
}
