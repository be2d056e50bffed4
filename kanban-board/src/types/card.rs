//! Card records

use super::ids::{BoardId, CardId, ColumnId};
use super::position::{Position, Positioned};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A card/task on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// Owning board, denormalized for queries
    pub board_id: BoardId,
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub position: Position,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    pub board_id: BoardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub position: Position,
}

/// Partial update of a card.
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl CardPatch {
    /// Patch that only renumbers the card
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Patch that moves the card into another column
    pub fn relocate(column_id: ColumnId, position: Position) -> Self {
        Self {
            column_id: Some(column_id),
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.column_id.is_none()
            && self.position.is_none()
    }

    pub fn apply(&self, card: &mut Card) {
        if let Some(title) = &self.title {
            card.title = title.clone();
        }
        if let Some(description) = &self.description {
            card.description = description.clone();
        }
        if let Some(column_id) = &self.column_id {
            card.column_id = column_id.clone();
        }
        if let Some(position) = self.position {
            card.position = position;
        }
    }
}

impl Positioned for Card {
    type Id = CardId;

    fn id(&self) -> &CardId {
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

    fn card() -> Card {
        Card {
            id: CardId::from_string("a"),
            board_id: BoardId::from_string("b"),
            column_id: ColumnId::from_string("todo"),
            title: "Write docs".into(),
            description: Some("README".into()),
            position: Position::new(0),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_patch_clears_description() {
        let mut card = card();
        let patch = CardPatch {
            description: Some(None),
            ..CardPatch::default()
        };
        patch.apply(&mut card);
        assert_eq!(card.description, None);
        assert_eq!(card.title, "Write docs");
    }

    #[test]
    fn test_relocate_patch() {
        let mut card = card();
        CardPatch::relocate(ColumnId::from_string("done"), Position::new(4)).apply(&mut card);
        assert_eq!(card.column_id.as_str(), "done");
        assert_eq!(card.position, Position::new(4));
    }

    #[test]
    fn test_empty_patch() {
        assert!(CardPatch::default().is_empty());
        assert!(!CardPatch::position(Position::new(1)).is_empty());
    }
}
