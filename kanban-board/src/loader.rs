//! Board aggregate loader

use crate::error::{KanbanError, Result};
use crate::store::RecordStore;
use crate::types::{Board, BoardId, Column};
use futures::future::try_join_all;
use tracing::{debug, instrument};

/// Load a board with all its columns and cards.
///
/// Returns `Ok(None)` when no board has this id. Any failing nested fetch
/// fails the whole load; a partial tree is never returned.
#[instrument(skip_all, fields(board = %board_id))]
pub async fn load_board(store: &dyn RecordStore, board_id: &BoardId) -> Result<Option<Board>> {
    let Some(record) = store.get_board(board_id).await? else {
        debug!("board not found");
        return Ok(None);
    };

    let mut column_records = store.list_columns(board_id).await?;
    column_records.sort_by_key(|c| c.position);

    let columns = try_join_all(column_records.into_iter().map(|column| async move {
        let mut cards = store.list_cards(&column.id).await?;
        cards.sort_by_key(|c| c.position);
        Ok::<_, KanbanError>(Column::from_parts(column, cards))
    }))
    .await?;

    let board = Board::from_parts(record, columns);
    debug!(
        columns = board.columns.len(),
        cards = board.card_count(),
        "board loaded"
    );
    Ok(Some(board))
}
