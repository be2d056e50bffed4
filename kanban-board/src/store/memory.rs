//! In-process record store with latency and failure injection.

use super::RecordStore;
use crate::error::{KanbanError, Result};
use crate::types::{
    BoardId, BoardPatch, BoardRecord, Card, CardId, CardPatch, ColumnId, ColumnPatch,
    ColumnRecord, NewBoard, NewCard, NewColumn, UserId,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

/// Kind of record a call touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Board,
    Column,
    Card,
}

/// Kind of call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreOp {
    Create,
    Get,
    List,
    Update,
    Delete,
}

impl StoreOp {
    pub fn is_write(self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Delete)
    }
}

/// One recorded call against the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreCall {
    pub op: StoreOp,
    pub kind: RecordKind,
    /// Record id for get/update/delete, parent id for create/list
    pub target: String,
    /// Serialized fields or patch for writes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl StoreCall {
    pub fn is_write(&self) -> bool {
        self.op.is_write()
    }
}

/// Makes matching calls fail with a message
#[derive(Debug, Clone)]
pub struct FailureRule {
    op: Option<StoreOp>,
    kind: Option<RecordKind>,
    writes_only: bool,
    skip: usize,
    remaining: Option<usize>,
    message: String,
}

impl FailureRule {
    /// Fail every write until healed
    pub fn writes(message: impl Into<String>) -> Self {
        Self {
            op: None,
            kind: None,
            writes_only: true,
            skip: 0,
            remaining: None,
            message: message.into(),
        }
    }

    /// Fail every call of `op` on `kind` until healed
    pub fn on(op: StoreOp, kind: RecordKind, message: impl Into<String>) -> Self {
        Self {
            op: Some(op),
            kind: Some(kind),
            writes_only: false,
            skip: 0,
            remaining: None,
            message: message.into(),
        }
    }

    /// Only fail the first `count` matching calls
    pub fn times(mut self, count: usize) -> Self {
        self.remaining = Some(count);
        self
    }

    /// Let the first `count` matching calls through before failing
    pub fn after(mut self, count: usize) -> Self {
        self.skip = count;
        self
    }

    fn matches(&self, op: StoreOp, kind: RecordKind) -> bool {
        (!self.writes_only || op.is_write())
            && self.op.map_or(true, |o| o == op)
            && self.kind.map_or(true, |k| k == kind)
            && self.remaining.map_or(true, |n| n > 0)
    }
}

#[derive(Default)]
struct Tables {
    boards: HashMap<BoardId, BoardRecord>,
    columns: HashMap<ColumnId, ColumnRecord>,
    cards: HashMap<CardId, Card>,
    calls: Vec<StoreCall>,
    failures: Vec<FailureRule>,
}

impl Tables {
    /// Record the call and return the injected failure, if any
    fn enter(
        &mut self,
        op: StoreOp,
        kind: RecordKind,
        target: &str,
        payload: Option<serde_json::Value>,
    ) -> Result<()> {
        self.calls.push(StoreCall {
            op,
            kind,
            target: target.to_string(),
            payload,
        });

        if let Some(rule) = self.failures.iter_mut().find(|r| r.matches(op, kind)) {
            if rule.skip > 0 {
                rule.skip -= 1;
                return Ok(());
            }
            if let Some(remaining) = rule.remaining.as_mut() {
                *remaining -= 1;
            }
            return Err(KanbanError::remote(rule.message.clone()));
        }
        Ok(())
    }
}

/// Record store held in memory.
///
/// Behaves like a hosted relational store: ids and timestamps are assigned on
/// insert, children are listed by position, deletes cascade. Writes can be
/// delayed and calls can be made to fail, which makes it the test double for
/// everything above the adapter.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    write_latency: Option<Duration>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every write by `latency` before it takes effect
    pub fn with_write_latency(mut self, latency: Duration) -> Self {
        self.write_latency = Some(latency);
        self
    }

    /// Add a failure rule
    pub async fn inject(&self, rule: FailureRule) {
        self.tables.lock().await.failures.push(rule);
    }

    /// Remove all failure rules
    pub async fn heal(&self) {
        self.tables.lock().await.failures.clear();
    }

    /// All calls made so far, oldest first
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.tables.lock().await.calls.clone()
    }

    /// Write calls made so far, oldest first
    pub async fn write_calls(&self) -> Vec<StoreCall> {
        self.tables
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.is_write())
            .cloned()
            .collect()
    }

    /// Forget recorded calls
    pub async fn clear_calls(&self) {
        self.tables.lock().await.calls.clear();
    }

    /// Read a card without recording a call
    pub async fn peek_card(&self, id: &CardId) -> Option<Card> {
        self.tables.lock().await.cards.get(id).cloned()
    }

    async fn delay_write(&self) {
        if let Some(latency) = self.write_latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn payload<T: Serialize>(value: &T) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}

fn sorted_by_position<T: crate::types::Positioned>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by_key(|item| item.position());
    items
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_board(&self, owner: &UserId, fields: NewBoard) -> Result<BoardRecord> {
        self.delay_write().await;
        let mut tables = self.tables.lock().await;
        tables.enter(StoreOp::Create, RecordKind::Board, owner.as_str(), payload(&fields))?;

        let board = BoardRecord {
            id: BoardId::new(),
            owner_id: owner.clone(),
            title: fields.title,
            created_at: Utc::now(),
        };
        tables.boards.insert(board.id.clone(), board.clone());
        Ok(board)
    }

    async fn get_board(&self, id: &BoardId) -> Result<Option<BoardRecord>> {
        let mut tables = self.tables.lock().await;
        tables.enter(StoreOp::Get, RecordKind::Board, id.as_str(), None)?;
        Ok(tables.boards.get(id).cloned())
    }

    async fn list_boards(&self, owner: &UserId) -> Result<Vec<BoardRecord>> {
        let mut tables = self.tables.lock().await;
        tables.enter(StoreOp::List, RecordKind::Board, owner.as_str(), None)?;

        let mut boards: Vec<BoardRecord> = tables
            .boards
            .values()
            .filter(|b| &b.owner_id == owner)
            .cloned()
            .collect();
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(boards)
    }

    async fn update_board(&self, id: &BoardId, patch: BoardPatch) -> Result<BoardRecord> {
        self.delay_write().await;
        let mut tables = self.tables.lock().await;
        tables.enter(StoreOp::Update, RecordKind::Board, id.as_str(), payload(&patch))?;

        let board = tables
            .boards
            .get_mut(id)
            .ok_or_else(|| KanbanError::remote(format!("no board with id {id}")))?;
        patch.apply(board);
        Ok(board.clone())
    }

    async fn delete_board(&self, id: &BoardId) -> Result<()> {
        self.delay_write().await;
        let mut tables = self.tables.lock().await;
        tables.enter(StoreOp::Delete, RecordKind::Board, id.as_str(), None)?;

        tables.boards.remove(id);
        tables.columns.retain(|_, c| &c.board_id != id);
        tables.cards.retain(|_, c| &c.board_id != id);
        Ok(())
    }

    async fn create_column(&self, board: &BoardId, fields: NewColumn) -> Result<ColumnRecord> {
        self.delay_write().await;
        let mut tables = self.tables.lock().await;
        tables.enter(StoreOp::Create, RecordKind::Column, board.as_str(), payload(&fields))?;

        if !tables.boards.contains_key(board) {
            return Err(KanbanError::remote(format!(
                "insert violates foreign key: board {board} does not exist"
            )));
        }
        let column = ColumnRecord {
            id: ColumnId::new(),
            board_id: board.clone(),
            title: fields.title,
            position: fields.position,
            created_at: Utc::now(),
        };
        tables.columns.insert(column.id.clone(), column.clone());
        Ok(column)
    }

    async fn list_columns(&self, board: &BoardId) -> Result<Vec<ColumnRecord>> {
        let mut tables = self.tables.lock().await;
        tables.enter(StoreOp::List, RecordKind::Column, board.as_str(), None)?;

        let columns = tables
            .columns
            .values()
            .filter(|c| &c.board_id == board)
            .cloned()
            .collect();
        Ok(sorted_by_position(columns))
    }

    async fn update_column(&self, id: &ColumnId, patch: ColumnPatch) -> Result<ColumnRecord> {
        self.delay_write().await;
        let mut tables = self.tables.lock().await;
        tables.enter(StoreOp::Update, RecordKind::Column, id.as_str(), payload(&patch))?;

        let column = tables
            .columns
            .get_mut(id)
            .ok_or_else(|| KanbanError::remote(format!("no column with id {id}")))?;
        patch.apply(column);
        Ok(column.clone())
    }

    async fn delete_column(&self, id: &ColumnId) -> Result<()> {
        self.delay_write().await;
        let mut tables = self.tables.lock().await;
        tables.enter(StoreOp::Delete, RecordKind::Column, id.as_str(), None)?;

        tables.columns.remove(id);
        tables.cards.retain(|_, c| &c.column_id != id);
        Ok(())
    }

    async fn create_card(&self, column: &ColumnId, fields: NewCard) -> Result<Card> {
        self.delay_write().await;
        let mut tables = self.tables.lock().await;
        tables.enter(StoreOp::Create, RecordKind::Card, column.as_str(), payload(&fields))?;

        if !tables.columns.contains_key(column) {
            return Err(KanbanError::remote(format!(
                "insert violates foreign key: column {column} does not exist"
            )));
        }
        let card = Card {
            id: CardId::new(),
            board_id: fields.board_id,
            column_id: column.clone(),
            title: fields.title,
            description: fields.description,
            position: fields.position,
            created_at: Utc::now(),
        };
        tables.cards.insert(card.id.clone(), card.clone());
        Ok(card)
    }

    async fn list_cards(&self, column: &ColumnId) -> Result<Vec<Card>> {
        let mut tables = self.tables.lock().await;
        tables.enter(StoreOp::List, RecordKind::Card, column.as_str(), None)?;

        let cards = tables
            .cards
            .values()
            .filter(|c| &c.column_id == column)
            .cloned()
            .collect();
        Ok(sorted_by_position(cards))
    }

    async fn update_card(&self, id: &CardId, patch: CardPatch) -> Result<Card> {
        self.delay_write().await;
        let mut tables = self.tables.lock().await;
        tables.enter(StoreOp::Update, RecordKind::Card, id.as_str(), payload(&patch))?;

        let card = tables
            .cards
            .get_mut(id)
            .ok_or_else(|| KanbanError::remote(format!("no card with id {id}")))?;
        patch.apply(card);
        Ok(card.clone())
    }

    async fn delete_card(&self, id: &CardId) -> Result<()> {
        self.delay_write().await;
        let mut tables = self.tables.lock().await;
        tables.enter(StoreOp::Delete, RecordKind::Card, id.as_str(), None)?;

        tables.cards.remove(id);
        Ok(())
    }
}
