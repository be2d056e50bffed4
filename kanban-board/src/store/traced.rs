//! Tracing decorator for record stores.

use super::RecordStore;
use crate::error::Result;
use crate::types::{
    BoardId, BoardPatch, BoardRecord, Card, CardId, CardPatch, ColumnId, ColumnPatch,
    ColumnRecord, NewBoard, NewCard, NewColumn, UserId,
};
use async_trait::async_trait;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, warn};

/// Wraps a store and reports every call with its duration and outcome
pub struct TracedStore<S> {
    inner: S,
}

impl<S: RecordStore> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

async fn traced<T>(
    op: &'static str,
    record: &str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    let start = Instant::now();
    let result = call.await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match &result {
        Ok(_) => debug!(op, record, duration_ms, "store call succeeded"),
        Err(error) => warn!(op, record, duration_ms, %error, "store call failed"),
    }
    result
}

#[async_trait]
impl<S: RecordStore> RecordStore for TracedStore<S> {
    async fn create_board(&self, owner: &UserId, fields: NewBoard) -> Result<BoardRecord> {
        traced("create board", owner.as_str(), self.inner.create_board(owner, fields)).await
    }

    async fn get_board(&self, id: &BoardId) -> Result<Option<BoardRecord>> {
        traced("get board", id.as_str(), self.inner.get_board(id)).await
    }

    async fn list_boards(&self, owner: &UserId) -> Result<Vec<BoardRecord>> {
        traced("list boards", owner.as_str(), self.inner.list_boards(owner)).await
    }

    async fn update_board(&self, id: &BoardId, patch: BoardPatch) -> Result<BoardRecord> {
        traced("update board", id.as_str(), self.inner.update_board(id, patch)).await
    }

    async fn delete_board(&self, id: &BoardId) -> Result<()> {
        traced("delete board", id.as_str(), self.inner.delete_board(id)).await
    }

    async fn create_column(&self, board: &BoardId, fields: NewColumn) -> Result<ColumnRecord> {
        traced("create column", board.as_str(), self.inner.create_column(board, fields)).await
    }

    async fn list_columns(&self, board: &BoardId) -> Result<Vec<ColumnRecord>> {
        traced("list columns", board.as_str(), self.inner.list_columns(board)).await
    }

    async fn update_column(&self, id: &ColumnId, patch: ColumnPatch) -> Result<ColumnRecord> {
        traced("update column", id.as_str(), self.inner.update_column(id, patch)).await
    }

    async fn delete_column(&self, id: &ColumnId) -> Result<()> {
        traced("delete column", id.as_str(), self.inner.delete_column(id)).await
    }

    async fn create_card(&self, column: &ColumnId, fields: NewCard) -> Result<Card> {
        traced("create card", column.as_str(), self.inner.create_card(column, fields)).await
    }

    async fn list_cards(&self, column: &ColumnId) -> Result<Vec<Card>> {
        traced("list cards", column.as_str(), self.inner.list_cards(column)).await
    }

    async fn update_card(&self, id: &CardId, patch: CardPatch) -> Result<Card> {
        traced("update card", id.as_str(), self.inner.update_card(id, patch)).await
    }

    async fn delete_card(&self, id: &CardId) -> Result<()> {
        traced("delete card", id.as_str(), self.inner.delete_card(id)).await
    }
}
