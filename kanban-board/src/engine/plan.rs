//! Mutation planning: local recompute plus the remote writes that realize it

use crate::config::EngineConfig;
use crate::error::{KanbanError, Result};
use crate::ordering::OrderingPolicy;
use crate::store::RecordStore;
use crate::types::{
    Board, BoardId, BoardPatch, BoardRecord, Card, CardId, CardPatch, ColumnId, ColumnPatch,
    ColumnRecord, NewCard, NewColumn,
};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// What a planner may consult besides the board itself
#[derive(Debug, Clone, Copy)]
pub struct PlanContext {
    pub ordering: OrderingPolicy,
    /// Persist positions of siblings a move renumbered
    pub persist_renumbering: bool,
}

impl PlanContext {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            ordering: config.ordering(),
            persist_renumbering: config.persist_sibling_renumbering,
        }
    }
}

impl Default for PlanContext {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// A user intent the engine can apply optimistically
pub trait Mutation: Serialize + fmt::Debug + Send + Sync {
    /// Operation name used in logs and mutation records, e.g. "move card"
    fn op_string(&self) -> &'static str;

    /// Compute the candidate board and the writes that persist it.
    ///
    /// Must be pure: the input board is never modified and no I/O happens.
    fn plan(&self, board: &Board, ctx: &PlanContext) -> Result<Plan>;

    /// Point ids the intent captured while a record was still provisional at
    /// the record the store created. Called before planning.
    fn remap_ids(&mut self, _ids: &IdMap) {}
}

/// Server ids adopted for records that were first shown under provisional ids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdMap {
    cards: HashMap<CardId, CardId>,
    columns: HashMap<ColumnId, ColumnId>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed id for `id`, or `id` itself when it was never provisional
    pub fn card(&self, id: &CardId) -> CardId {
        self.cards.get(id).cloned().unwrap_or_else(|| id.clone())
    }

    pub fn column(&self, id: &ColumnId) -> ColumnId {
        self.columns.get(id).cloned().unwrap_or_else(|| id.clone())
    }

    pub fn adopt_card(&mut self, provisional: CardId, committed: CardId) {
        self.cards.insert(provisional, committed);
    }

    pub fn adopt_column(&mut self, provisional: ColumnId, committed: ColumnId) {
        self.columns.insert(provisional, committed);
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty() && self.columns.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.columns.clear();
    }
}

/// Outcome of planning
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Nothing would change; no speculation and no remote call
    Unchanged,
    Apply(Speculation),
}

/// A candidate board and how to realize it remotely
#[derive(Debug, Clone, PartialEq)]
pub struct Speculation {
    pub candidate: Board,
    /// Write for the record the user acted on. Issued first.
    pub primary: RemoteWrite,
    /// Sibling renumbering, issued concurrently once the primary succeeded
    pub followups: Vec<RemoteWrite>,
}

impl Speculation {
    pub fn new(candidate: Board, primary: RemoteWrite) -> Self {
        Self {
            candidate,
            primary,
            followups: Vec::new(),
        }
    }

    pub fn with_followups(mut self, followups: Vec<RemoteWrite>) -> Self {
        self.followups = followups;
        self
    }

    pub fn write_count(&self) -> usize {
        1 + self.followups.len()
    }
}

/// One remote round trip
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "write", rename_all = "snake_case")]
pub enum RemoteWrite {
    CreateCard {
        provisional: CardId,
        column: ColumnId,
        fields: NewCard,
    },
    UpdateCard {
        id: CardId,
        patch: CardPatch,
    },
    DeleteCard {
        id: CardId,
    },
    CreateColumn {
        provisional: ColumnId,
        board: BoardId,
        fields: NewColumn,
    },
    UpdateColumn {
        id: ColumnId,
        patch: ColumnPatch,
    },
    DeleteColumn {
        id: ColumnId,
    },
    UpdateBoard {
        id: BoardId,
        patch: BoardPatch,
    },
}

/// What the store handed back for a write
#[derive(Debug, Clone, PartialEq)]
pub enum Written {
    Card(Card),
    Column(ColumnRecord),
    Board(BoardRecord),
    Deleted,
}

impl RemoteWrite {
    pub async fn execute(&self, store: &dyn RecordStore) -> Result<Written> {
        match self {
            Self::CreateCard { column, fields, .. } => store
                .create_card(column, fields.clone())
                .await
                .map(Written::Card),
            Self::UpdateCard { id, patch } => {
                store.update_card(id, patch.clone()).await.map(Written::Card)
            }
            Self::DeleteCard { id } => store.delete_card(id).await.map(|_| Written::Deleted),
            Self::CreateColumn { board, fields, .. } => store
                .create_column(board, fields.clone())
                .await
                .map(Written::Column),
            Self::UpdateColumn { id, patch } => store
                .update_column(id, patch.clone())
                .await
                .map(Written::Column),
            Self::DeleteColumn { id } => store.delete_column(id).await.map(|_| Written::Deleted),
            Self::UpdateBoard { id, patch } => store
                .update_board(id, patch.clone())
                .await
                .map(Written::Board),
        }
    }

    /// Adopt server-assigned identity for a record created under a provisional id.
    ///
    /// Only the id and creation time are taken from the store; every other
    /// field keeps its speculative value. The pairing is kept in `ids` so
    /// intents formed against the provisional record still find it.
    pub fn reconcile(&self, written: &Written, board: &mut Board, ids: &mut IdMap) {
        match (self, written) {
            (Self::CreateCard { provisional, .. }, Written::Card(created)) => {
                ids.adopt_card(provisional.clone(), created.id.clone());
                if let Some(card) = board.find_card_mut(provisional) {
                    card.id = created.id.clone();
                    card.created_at = created.created_at;
                }
            }
            (Self::CreateColumn { provisional, .. }, Written::Column(created)) => {
                ids.adopt_column(provisional.clone(), created.id.clone());
                if let Some(column) = board.find_column_mut(provisional) {
                    column.id = created.id.clone();
                    column.created_at = created.created_at;
                    for card in &mut column.cards {
                        card.column_id = created.id.clone();
                    }
                }
            }
            _ => {}
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::CreateCard { column, .. } => format!("create card in {}", column),
            Self::UpdateCard { id, .. } => format!("update card {}", id),
            Self::DeleteCard { id } => format!("delete card {}", id),
            Self::CreateColumn { board, .. } => format!("create column in {}", board),
            Self::UpdateColumn { id, .. } => format!("update column {}", id),
            Self::DeleteColumn { id } => format!("delete column {}", id),
            Self::UpdateBoard { id, .. } => format!("update board {}", id),
        }
    }
}

/// Trimmed title; blank titles are rejected
pub(crate) fn required_title(value: &str) -> Result<String> {
    let title = value.trim();
    if title.is_empty() {
        return Err(KanbanError::invalid_value("title", "must not be empty"));
    }
    Ok(title.to_string())
}

/// Trimmed free text; blank means none
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
