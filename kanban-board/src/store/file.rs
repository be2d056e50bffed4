//! FileStore - JSON-file-per-record storage
//!
//! ```text
//! root/
//! ├── boards/{id}.json
//! ├── columns/{id}.json
//! └── cards/{id}.json
//! ```
//!
//! Records are written atomically (temp file + rename). Children are found by
//! scanning their directory and filtering on the parent reference. A record
//! file that cannot be read fails the whole listing.

use super::RecordStore;
use crate::error::{KanbanError, Result};
use crate::types::{
    BoardId, BoardPatch, BoardRecord, Card, CardId, CardPatch, ColumnId, ColumnPatch,
    ColumnRecord, NewBoard, NewCard, NewColumn, Positioned, UserId,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// Record store backed by a directory of JSON files
pub struct FileStore {
    /// Path to the store root directory
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    // =========================================================================
    // Path helpers
    // =========================================================================

    /// Get the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn boards_dir(&self) -> PathBuf {
        self.root.join("boards")
    }

    pub fn columns_dir(&self) -> PathBuf {
        self.root.join("columns")
    }

    pub fn cards_dir(&self) -> PathBuf {
        self.root.join("cards")
    }

    pub fn board_path(&self, id: &BoardId) -> Result<PathBuf> {
        record_path(self.boards_dir(), id.as_str())
    }

    pub fn column_path(&self, id: &ColumnId) -> Result<PathBuf> {
        record_path(self.columns_dir(), id.as_str())
    }

    pub fn card_path(&self, id: &CardId) -> Result<PathBuf> {
        record_path(self.cards_dir(), id.as_str())
    }

    /// Create the directory structure. Idempotent.
    pub async fn create_directories(&self) -> Result<()> {
        fs::create_dir_all(self.boards_dir()).await?;
        fs::create_dir_all(self.columns_dir()).await?;
        fs::create_dir_all(self.cards_dir()).await?;
        Ok(())
    }

    // =========================================================================
    // Record I/O
    // =========================================================================

    async fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(record)?;
        atomic_write(path, content.as_bytes()).await
    }

    async fn remove_record(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path).await?;
        }
        Ok(())
    }

    /// Read every record in a directory
    async fn read_all<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut entries = fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let record = Self::read_record::<T>(&path).await.map_err(|e| {
                KanbanError::remote(format!("unreadable record {}: {e}", path.display()))
            })?;
            records.extend(record);
        }

        Ok(records)
    }

    async fn cards_where(&self, keep: impl Fn(&Card) -> bool) -> Result<Vec<Card>> {
        let cards: Vec<Card> = Self::read_all(&self.cards_dir()).await?;
        Ok(cards.into_iter().filter(|c| keep(c)).collect())
    }
}

/// Path of a record file. Ids that could escape `dir` are refused.
fn record_path(dir: PathBuf, id: &str) -> Result<PathBuf> {
    let unsafe_id = id.is_empty()
        || id.starts_with('.')
        || id.contains(['/', '\\', '\0'])
        || Path::new(id).is_absolute();
    if unsafe_id {
        return Err(KanbanError::remote(format!("invalid record id {id:?}")));
    }
    Ok(dir.join(format!("{id}.json")))
}

fn by_position<T: Positioned>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by_key(|item| item.position());
    items
}

#[async_trait]
impl RecordStore for FileStore {
    async fn create_board(&self, owner: &UserId, fields: NewBoard) -> Result<BoardRecord> {
        let _lock = self.write_lock.lock().await;
        let board = BoardRecord {
            id: BoardId::new(),
            owner_id: owner.clone(),
            title: fields.title,
            created_at: Utc::now(),
        };
        Self::write_record(&self.board_path(&board.id)?, &board).await?;
        Ok(board)
    }

    async fn get_board(&self, id: &BoardId) -> Result<Option<BoardRecord>> {
        Self::read_record(&self.board_path(id)?).await
    }

    async fn list_boards(&self, owner: &UserId) -> Result<Vec<BoardRecord>> {
        let boards: Vec<BoardRecord> = Self::read_all(&self.boards_dir()).await?;
        let mut boards: Vec<BoardRecord> =
            boards.into_iter().filter(|b| &b.owner_id == owner).collect();
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(boards)
    }

    async fn update_board(&self, id: &BoardId, patch: BoardPatch) -> Result<BoardRecord> {
        let _lock = self.write_lock.lock().await;
        let path = self.board_path(id)?;
        let mut board: BoardRecord = Self::read_record(&path)
            .await?
            .ok_or_else(|| KanbanError::remote(format!("no board with id {id}")))?;
        patch.apply(&mut board);
        Self::write_record(&path, &board).await?;
        Ok(board)
    }

    async fn delete_board(&self, id: &BoardId) -> Result<()> {
        let _lock = self.write_lock.lock().await;
        for card in self.cards_where(|c| &c.board_id == id).await? {
            Self::remove_record(&self.card_path(&card.id)?).await?;
        }
        let columns: Vec<ColumnRecord> = Self::read_all(&self.columns_dir()).await?;
        for column in columns.iter().filter(|c| &c.board_id == id) {
            Self::remove_record(&self.column_path(&column.id)?).await?;
        }
        Self::remove_record(&self.board_path(id)?).await
    }

    async fn create_column(&self, board: &BoardId, fields: NewColumn) -> Result<ColumnRecord> {
        let _lock = self.write_lock.lock().await;
        if !self.board_path(board)?.exists() {
            return Err(KanbanError::remote(format!("board {board} does not exist")));
        }
        let column = ColumnRecord {
            id: ColumnId::new(),
            board_id: board.clone(),
            title: fields.title,
            position: fields.position,
            created_at: Utc::now(),
        };
        Self::write_record(&self.column_path(&column.id)?, &column).await?;
        Ok(column)
    }

    async fn list_columns(&self, board: &BoardId) -> Result<Vec<ColumnRecord>> {
        let columns: Vec<ColumnRecord> = Self::read_all(&self.columns_dir()).await?;
        Ok(by_position(
            columns.into_iter().filter(|c| &c.board_id == board).collect(),
        ))
    }

    async fn update_column(&self, id: &ColumnId, patch: ColumnPatch) -> Result<ColumnRecord> {
        let _lock = self.write_lock.lock().await;
        let path = self.column_path(id)?;
        let mut column: ColumnRecord = Self::read_record(&path)
            .await?
            .ok_or_else(|| KanbanError::remote(format!("no column with id {id}")))?;
        patch.apply(&mut column);
        Self::write_record(&path, &column).await?;
        Ok(column)
    }

    async fn delete_column(&self, id: &ColumnId) -> Result<()> {
        let _lock = self.write_lock.lock().await;
        for card in self.cards_where(|c| &c.column_id == id).await? {
            Self::remove_record(&self.card_path(&card.id)?).await?;
        }
        Self::remove_record(&self.column_path(id)?).await
    }

    async fn create_card(&self, column: &ColumnId, fields: NewCard) -> Result<Card> {
        let _lock = self.write_lock.lock().await;
        if !self.column_path(column)?.exists() {
            return Err(KanbanError::remote(format!("column {column} does not exist")));
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
        Self::write_record(&self.card_path(&card.id)?, &card).await?;
        Ok(card)
    }

    async fn list_cards(&self, column: &ColumnId) -> Result<Vec<Card>> {
        Ok(by_position(self.cards_where(|c| &c.column_id == column).await?))
    }

    async fn update_card(&self, id: &CardId, patch: CardPatch) -> Result<Card> {
        let _lock = self.write_lock.lock().await;
        let path = self.card_path(id)?;
        let mut card: Card = Self::read_record(&path)
            .await?
            .ok_or_else(|| KanbanError::remote(format!("no card with id {id}")))?;
        patch.apply(&mut card);
        Self::write_record(&path, &card).await?;
        Ok(card)
    }

    async fn delete_card(&self, id: &CardId) -> Result<()> {
        let _lock = self.write_lock.lock().await;
        Self::remove_record(&self.card_path(id)?).await
    }
}

/// Atomic write via temp file and rename
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;

    // Rename (atomic on same filesystem)
    fs::rename(&temp_path, path).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, FileStore) {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join(".kanban"));
        store.create_directories().await.unwrap();
        (temp, store)
    }

    #[tokio::test]
    async fn test_paths() {
        let (_temp, store) = setup().await;
        let id = CardId::from_string("c1");
        assert!(store.card_path(&id).unwrap().ends_with("cards/c1.json"));
        assert!(store.boards_dir().exists());
    }

    #[tokio::test]
    async fn test_ids_cannot_escape_the_store() {
        let (_temp, store) = setup().await;
        for id in ["../boards/x", "a/b", "..", "", "c\\d"] {
            assert!(store.card_path(&CardId::from_string(id)).is_err(), "{id:?}");
        }

        let result = store.get_board(&BoardId::from_string("../../etc/passwd")).await;
        assert!(matches!(result, Err(KanbanError::Remote { .. })));
        let result = store.delete_card(&CardId::from_string("../columns/x")).await;
        assert!(matches!(result, Err(KanbanError::Remote { .. })));
    }

    #[tokio::test]
    async fn test_corrupt_record_fails_listing() {
        let (_temp, store) = setup().await;
        let board = store
            .create_board(&UserId::from_string("u1"), NewBoard { title: "B".into() })
            .await
            .unwrap();
        let column = store
            .create_column(
                &board.id,
                NewColumn {
                    title: "Todo".into(),
                    position: Position::new(0),
                },
            )
            .await
            .unwrap();
        tokio::fs::write(store.cards_dir().join("broken.json"), "{ not json")
            .await
            .unwrap();

        let result = store.list_cards(&column.id).await;
        assert!(matches!(result, Err(KanbanError::Remote { .. })));

        // The loader surfaces it instead of returning a partial board
        let loaded = crate::loader::load_board(&store, &board.id).await;
        assert!(loaded.is_err());
    }

    #[tokio::test]
    async fn test_board_round_trip() {
        let (_temp, store) = setup().await;
        let owner = UserId::from_string("u1");

        let board = store
            .create_board(&owner, NewBoard { title: "Home".into() })
            .await
            .unwrap();
        let loaded = store.get_board(&board.id).await.unwrap();
        assert_eq!(loaded, Some(board.clone()));

        let renamed = store
            .update_board(
                &board.id,
                BoardPatch {
                    title: Some("House".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.title, "House");
        assert_eq!(store.list_boards(&owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_board_is_none() {
        let (_temp, store) = setup().await;
        let result = store.get_board(&BoardId::from_string("nope")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_cards_ordered_and_column_delete_cascades() {
        let (_temp, store) = setup().await;
        let board = store
            .create_board(&UserId::from_string("u1"), NewBoard { title: "B".into() })
            .await
            .unwrap();
        let column = store
            .create_column(
                &board.id,
                NewColumn {
                    title: "Todo".into(),
                    position: Position::new(0),
                },
            )
            .await
            .unwrap();

        for (title, pos) in [("second", 1), ("first", 0)] {
            store
                .create_card(
                    &column.id,
                    NewCard {
                        board_id: board.id.clone(),
                        title: title.into(),
                        description: None,
                        position: Position::new(pos),
                    },
                )
                .await
                .unwrap();
        }

        let cards = store.list_cards(&column.id).await.unwrap();
        assert_eq!(cards[0].title, "first");
        assert_eq!(cards[1].title, "second");

        store.delete_column(&column.id).await.unwrap();
        assert!(store.list_cards(&column.id).await.unwrap().is_empty());
        assert!(store.list_columns(&board.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_card_fails() {
        let (_temp, store) = setup().await;
        let result = store
            .update_card(&CardId::from_string("ghost"), CardPatch::position(Position::new(0)))
            .await;
        assert!(matches!(result, Err(KanbanError::Remote { .. })));
    }
}
