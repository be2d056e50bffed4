//! ListBoards command

use super::{DashboardContext, Execute};
use crate::error::Result;
use crate::types::BoardRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Boards of the signed-in user, newest first
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListBoards;

impl ListBoards {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Execute for ListBoards {
    type Output = Vec<BoardRecord>;

    fn op_string(&self) -> &'static str {
        "list boards"
    }

    async fn execute(&self, ctx: &DashboardContext) -> Result<Vec<BoardRecord>> {
        let owner = ctx.session.require_user()?;
        ctx.store.list_boards(&owner).await
    }
}
