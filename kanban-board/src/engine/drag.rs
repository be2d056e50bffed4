//! Drag-and-drop glue.
//!
//! Start and over events only move drag feedback in the view state; a drop
//! with an active drag becomes exactly one [`MoveCard`].

use super::{BoardEngine, DropTarget, MutationOutcome, ViewEvent};
use crate::card::MoveCard;
use crate::error::Result;
use crate::types::{CardId, ColumnId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Events reported by the interaction surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DragEvent {
    Start { card_id: CardId },
    Over { column_id: ColumnId, index: usize },
    Drop { column_id: ColumnId, index: usize },
    Cancel,
}

impl BoardEngine {
    /// Feed a drag event into the view.
    ///
    /// Returns the outcome of the move when the event was a drop that
    /// completed an active drag, `None` otherwise.
    pub async fn handle_drag(&self, event: DragEvent) -> Result<Option<MutationOutcome>> {
        match event {
            DragEvent::Start { card_id } => {
                self.dispatch(ViewEvent::DragStarted(card_id));
                Ok(None)
            }
            DragEvent::Over { column_id, index } => {
                self.dispatch(ViewEvent::DraggedOver(DropTarget { column_id, index }));
                Ok(None)
            }
            DragEvent::Cancel => {
                self.dispatch(ViewEvent::DragEnded);
                Ok(None)
            }
            DragEvent::Drop { column_id, index } => {
                let dragged = self
                    .inner
                    .view
                    .borrow()
                    .ready()
                    .and_then(|view| view.drag.as_ref())
                    .map(|drag| drag.card_id.clone());
                let Some(card_id) = dragged else {
                    debug!("drop without an active drag");
                    return Ok(None);
                };

                self.dispatch(ViewEvent::DragEnded);
                self.apply(MoveCard::new(card_id, column_id, index))
                    .await
                    .map(Some)
            }
        }
    }
}
