//! Record store adapter: remote CRUD for boards, columns and cards.
//!
//! Each call is one independent round trip. Nothing spans calls
//! transactionally and nothing is retried; failures come back as
//! [`KanbanError::Remote`](crate::KanbanError::Remote) (or IO/JSON errors for
//! the file store), all of which classify as remote failures.

mod file;
mod memory;
mod traced;

pub use file::FileStore;
pub use memory::{FailureRule, MemoryStore, RecordKind, StoreCall, StoreOp};
pub use traced::TracedStore;

use crate::error::Result;
use crate::types::{
    BoardId, BoardPatch, BoardRecord, Card, CardId, CardPatch, ColumnId, ColumnPatch,
    ColumnRecord, NewBoard, NewCard, NewColumn, UserId,
};
use async_trait::async_trait;

/// Storage abstraction for board records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a board owned by `owner`; the store assigns id and timestamp
    async fn create_board(&self, owner: &UserId, fields: NewBoard) -> Result<BoardRecord>;

    /// Get a board by id. `None` when it does not exist.
    async fn get_board(&self, id: &BoardId) -> Result<Option<BoardRecord>>;

    /// Boards of `owner`, newest first
    async fn list_boards(&self, owner: &UserId) -> Result<Vec<BoardRecord>>;

    async fn update_board(&self, id: &BoardId, patch: BoardPatch) -> Result<BoardRecord>;

    /// Delete a board with its columns and cards
    async fn delete_board(&self, id: &BoardId) -> Result<()>;

    async fn create_column(&self, board: &BoardId, fields: NewColumn) -> Result<ColumnRecord>;

    /// Columns of a board ordered by position
    async fn list_columns(&self, board: &BoardId) -> Result<Vec<ColumnRecord>>;

    async fn update_column(&self, id: &ColumnId, patch: ColumnPatch) -> Result<ColumnRecord>;

    /// Delete a column with its cards
    async fn delete_column(&self, id: &ColumnId) -> Result<()>;

    async fn create_card(&self, column: &ColumnId, fields: NewCard) -> Result<Card>;

    /// Cards of a column ordered by position
    async fn list_cards(&self, column: &ColumnId) -> Result<Vec<Card>>;

    async fn update_card(&self, id: &CardId, patch: CardPatch) -> Result<Card>;

    async fn delete_card(&self, id: &CardId) -> Result<()>;
}
