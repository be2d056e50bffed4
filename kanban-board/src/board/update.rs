//! UpdateBoard command

use crate::engine::{required_title, Mutation, Plan, PlanContext, RemoteWrite, Speculation};
use crate::error::Result;
use crate::types::{Board, BoardPatch};
use serde::{Deserialize, Serialize};

/// Rename the loaded board
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateBoard {
    pub title: String,
}

impl UpdateBoard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Mutation for UpdateBoard {
    fn op_string(&self) -> &'static str {
        "update board"
    }

    fn plan(&self, board: &Board, _ctx: &PlanContext) -> Result<Plan> {
        let title = required_title(&self.title)?;
        if title == board.title {
            return Ok(Plan::Unchanged);
        }

        let mut candidate = board.clone();
        candidate.title = title.clone();

        Ok(Plan::Apply(Speculation::new(
            candidate,
            RemoteWrite::UpdateBoard {
                id: board.id.clone(),
                patch: BoardPatch { title: Some(title) },
            },
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::{BoardEngine, MutationOutcome};
    use crate::error::KanbanError;
    use crate::store::{MemoryStore, RecordStore};
    use crate::test_support::seed_board;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_rename_board() {
        let store = Arc::new(MemoryStore::new());
        let seeded = seed_board(store.as_ref()).await;
        let engine = BoardEngine::new(store.clone(), EngineConfig::default());
        engine.load(&seeded.board).await.unwrap();

        let outcome = engine.apply(UpdateBoard::new("Q3 Sprint")).await.unwrap();
        assert_eq!(outcome, MutationOutcome::Committed);
        assert_eq!(engine.board().unwrap().title, "Q3 Sprint");

        let stored = store.get_board(&seeded.board).await.unwrap().unwrap();
        assert_eq!(stored.title, "Q3 Sprint");
        assert_eq!(stored.owner_id, seeded.owner);
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let store = Arc::new(MemoryStore::new());
        let seeded = seed_board(store.as_ref()).await;
        let engine = BoardEngine::new(store.clone(), EngineConfig::default());
        engine.load(&seeded.board).await.unwrap();

        let result = engine.apply(UpdateBoard::new("")).await;
        assert!(matches!(result, Err(KanbanError::InvalidValue { .. })));
    }
}
