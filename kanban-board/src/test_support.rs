//! Shared fixtures for unit tests

use crate::store::RecordStore;
use crate::types::{BoardId, CardId, ColumnId, NewBoard, NewCard, NewColumn, Position, UserId};

/// Ids of a seeded board: Todo [A, B, C], Doing [], Done []
pub(crate) struct Seeded {
    pub board: BoardId,
    pub owner: UserId,
    pub todo: ColumnId,
    pub doing: ColumnId,
    pub done: ColumnId,
    pub cards: Vec<CardId>,
}

pub(crate) async fn seed_board(store: &dyn RecordStore) -> Seeded {
    let owner = UserId::from_string("user-1");
    let board = store
        .create_board(&owner, NewBoard { title: "Sprint".into() })
        .await
        .unwrap();

    let mut columns = Vec::new();
    for (index, title) in ["Todo", "Doing", "Done"].into_iter().enumerate() {
        let column = store
            .create_column(
                &board.id,
                NewColumn {
                    title: title.into(),
                    position: Position::new(index as i64),
                },
            )
            .await
            .unwrap();
        columns.push(column.id);
    }

    let mut cards = Vec::new();
    for (index, title) in ["A", "B", "C"].into_iter().enumerate() {
        let card = store
            .create_card(
                &columns[0],
                NewCard {
                    board_id: board.id.clone(),
                    title: title.into(),
                    description: None,
                    position: Position::new(index as i64),
                },
            )
            .await
            .unwrap();
        cards.push(card.id);
    }

    let done = columns.pop().unwrap();
    let doing = columns.pop().unwrap();
    let todo = columns.pop().unwrap();
    Seeded {
        board: board.id,
        owner,
        todo,
        doing,
        done,
        cards,
    }
}
