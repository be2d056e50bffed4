//! Fixtures shared by the integration tests
#![allow(dead_code)]

use kanban_board::store::RecordStore;
use kanban_board::types::{NewBoard, NewCard, NewColumn};
use kanban_board::{
    Board, BoardEngine, BoardId, CardId, ColumnId, EngineConfig, MemoryStore, Position, UserId,
};
use std::sync::Arc;

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub engine: BoardEngine,
    pub board: BoardId,
    pub todo: ColumnId,
    pub doing: ColumnId,
    /// A, B, C in Todo at positions 0, 1, 2
    pub cards: Vec<CardId>,
}

/// Seed Todo [A0, B1, C2] and an empty Doing, then load the board
pub async fn fixture(store: MemoryStore, config: EngineConfig) -> Fixture {
    let store = Arc::new(store);
    let (board, todo, doing, cards) = seed(store.as_ref()).await;
    store.clear_calls().await;

    let engine = BoardEngine::new(store.clone(), config);
    engine.load(&board).await.unwrap();

    Fixture {
        store,
        engine,
        board,
        todo,
        doing,
        cards,
    }
}

pub async fn seed(store: &dyn RecordStore) -> (BoardId, ColumnId, ColumnId, Vec<CardId>) {
    let board = store
        .create_board(&UserId::from_string("user-1"), NewBoard { title: "Sprint".into() })
        .await
        .unwrap();

    let mut columns = Vec::new();
    for (index, title) in ["Todo", "Doing"].into_iter().enumerate() {
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

    (board.id, columns[0].clone(), columns[1].clone(), cards)
}

/// Card titles of a column in display order
pub fn titles(board: &Board, column: &ColumnId) -> Vec<String> {
    board
        .find_column(column)
        .map(|c| c.cards.iter().map(|card| card.title.clone()).collect())
        .unwrap_or_default()
}

/// Card positions of a column in display order
pub fn positions(board: &Board, column: &ColumnId) -> Vec<i64> {
    board
        .find_column(column)
        .map(|c| c.cards.iter().map(|card| card.position.value()).collect())
        .unwrap_or_default()
}
