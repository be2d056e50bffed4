//! The in-memory board tree: Board → Columns → Cards.

use super::board::{BoardRecord, ColumnRecord};
use super::card::Card;
use super::ids::{BoardId, CardId, ColumnId, UserId};
use super::position::{Position, Positioned};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fully loaded board with its ordered columns and their ordered cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub owner_id: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub columns: Vec<Column>,
}

/// A column together with its ordered cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    pub position: Position,
    pub created_at: DateTime<Utc>,
    pub cards: Vec<Card>,
}

impl Board {
    /// Assemble a board from its record and already ordered columns
    pub fn from_parts(record: BoardRecord, columns: Vec<Column>) -> Self {
        Self {
            id: record.id,
            owner_id: record.owner_id,
            title: record.title,
            created_at: record.created_at,
            columns,
        }
    }

    /// The board record without children
    pub fn record(&self) -> BoardRecord {
        BoardRecord {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
        }
    }

    pub fn find_column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    pub fn find_column_mut(&mut self, id: &ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| &c.id == id)
    }

    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| &c.id == id)
    }

    /// Find a card: (column index, card index)
    pub fn locate_card(&self, id: &CardId) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(ci, column)| {
            column
                .cards
                .iter()
                .position(|card| &card.id == id)
                .map(|ki| (ci, ki))
        })
    }

    pub fn find_card(&self, id: &CardId) -> Option<&Card> {
        self.locate_card(id)
            .map(|(ci, ki)| &self.columns[ci].cards[ki])
    }

    pub fn find_card_mut(&mut self, id: &CardId) -> Option<&mut Card> {
        self.locate_card(id)
            .map(move |(ci, ki)| &mut self.columns[ci].cards[ki])
    }

    /// Total number of cards across all columns
    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }
}

impl Column {
    /// Assemble a column from its record and already ordered cards
    pub fn from_parts(record: ColumnRecord, cards: Vec<Card>) -> Self {
        Self {
            id: record.id,
            board_id: record.board_id,
            title: record.title,
            position: record.position,
            created_at: record.created_at,
            cards,
        }
    }

    /// The column record without cards
    pub fn record(&self) -> ColumnRecord {
        ColumnRecord {
            id: self.id.clone(),
            board_id: self.board_id.clone(),
            title: self.title.clone(),
            position: self.position,
            created_at: self.created_at,
        }
    }

    pub fn card_index(&self, id: &CardId) -> Option<usize> {
        self.cards.iter().position(|c| &c.id == id)
    }
}

impl Positioned for Column {
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
