//! Board-level records: Board, Column

use super::ids::{BoardId, ColumnId, UserId};
use super::position::{Position, Positioned};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A board as stored remotely, without its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRecord {
    pub id: BoardId,
    pub owner_id: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBoard {
    pub title: String,
}

/// Partial update of a board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl BoardPatch {
    pub fn apply(&self, board: &mut BoardRecord) {
        if let Some(title) = &self.title {
            board.title = title.clone();
        }
    }
}

/// A column as stored remotely, without its cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRecord {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    pub position: Position,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewColumn {
    pub title: String,
    pub position: Position,
}

/// Partial update of a column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl ColumnPatch {
    /// Patch that only moves the column
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn apply(&self, column: &mut ColumnRecord) {
        if let Some(title) = &self.title {
            column.title = title.clone();
        }
        if let Some(position) = self.position {
            column.position = position;
        }
    }
}

impl Positioned for ColumnRecord {
    type Id = ColumnId;

    fn id(&self) -> &ColumnId {
        &self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_patch_apply() {
        let mut column = ColumnRecord {
            id: ColumnId::from_string("todo"),
            board_id: BoardId::from_string("b"),
            title: "Todo".into(),
            position: Position::new(0),
            created_at: Utc::now(),
        };

        ColumnPatch::position(Position::new(3)).apply(&mut column);
        assert_eq!(column.position, Position::new(3));
        assert_eq!(column.title, "Todo");
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = ColumnPatch::position(Position::new(2));
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({ "position": 2 }));
    }
}
