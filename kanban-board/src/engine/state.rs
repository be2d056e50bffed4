//! View state and its pure transitions.
//!
//! Renderers read a [`ViewState`]; the engine is the only writer and moves it
//! forward exclusively through [`transition`].

use crate::types::{Board, BoardId, CardId, ColumnId, Settlement};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Whether a mutation occupies the in-flight slot.
///
/// Settling clears the pending mutation, so a settled view reads `Idle` and
/// reports how it settled through [`ReadyView::last_settlement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationPhase {
    Idle,
    Speculating,
}

/// The mutation currently in flight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingMutation {
    pub op: String,
    pub phase: MutationPhase,
    pub started_at: DateTime<Utc>,
}

/// Where a dragged card would land
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropTarget {
    pub column_id: ColumnId,
    pub index: usize,
}

/// Visual feedback for an active drag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragFeedback {
    pub card_id: CardId,
    pub over: Option<DropTarget>,
}

impl DragFeedback {
    /// Index at which to draw the insertion indicator in `column_id`, if any
    pub fn insertion_indicator(&self, column_id: &ColumnId) -> Option<usize> {
        self.over
            .as_ref()
            .filter(|target| &target.column_id == column_id)
            .map(|target| target.index)
    }
}

/// A user-visible error that clears itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransientError {
    pub id: u64,
    pub message: String,
}

/// A loaded board and everything rendered around it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadyView {
    pub board: Board,
    pub pending: Option<PendingMutation>,
    pub drag: Option<DragFeedback>,
    pub error: Option<TransientError>,
    /// How the most recent mutation settled
    pub last_settlement: Option<Settlement>,
    /// Remote state may differ from `board` after a partially applied mutation
    pub stale: bool,
}

impl ReadyView {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            pending: None,
            drag: None,
            error: None,
            last_settlement: None,
            stale: false,
        }
    }

    pub fn phase(&self) -> MutationPhase {
        self.pending
            .as_ref()
            .map(|p| p.phase)
            .unwrap_or(MutationPhase::Idle)
    }
}

/// Everything a board view can be showing
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Idle,
    Loading {
        board_id: BoardId,
    },
    Ready(ReadyView),
    NotFound {
        board_id: BoardId,
    },
    LoadError {
        board_id: BoardId,
        message: String,
    },
}

impl ViewState {
    pub fn ready(&self) -> Option<&ReadyView> {
        match self {
            Self::Ready(view) => Some(view),
            _ => None,
        }
    }

    pub fn board(&self) -> Option<&Board> {
        self.ready().map(|view| &view.board)
    }

    /// Board this view is about, whatever its state
    pub fn board_id(&self) -> Option<&BoardId> {
        match self {
            Self::Idle => None,
            Self::Loading { board_id }
            | Self::NotFound { board_id }
            | Self::LoadError { board_id, .. } => Some(board_id),
            Self::Ready(view) => Some(&view.board.id),
        }
    }
}

/// Inputs that move the view state
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    LoadStarted(BoardId),
    Loaded {
        board_id: BoardId,
        board: Option<Board>,
    },
    LoadFailed {
        board_id: BoardId,
        message: String,
    },
    Speculated {
        op: String,
        candidate: Board,
    },
    Committed {
        board: Board,
    },
    RolledBack {
        snapshot: Board,
        error: TransientError,
        stale: bool,
    },
    ErrorExpired {
        id: u64,
    },
    DragStarted(CardId),
    DraggedOver(DropTarget),
    DragEnded,
}

/// Compute the next view state. Events that do not apply leave the state as is.
pub fn transition(state: ViewState, event: ViewEvent) -> ViewState {
    match (state, event) {
        (_, ViewEvent::LoadStarted(board_id)) => ViewState::Loading { board_id },

        (ViewState::Loading { board_id }, ViewEvent::Loaded { board_id: id, board })
            if board_id == id =>
        {
            match board {
                Some(board) => ViewState::Ready(ReadyView::new(board)),
                None => ViewState::NotFound { board_id },
            }
        }

        (ViewState::Loading { board_id }, ViewEvent::LoadFailed { board_id: id, message })
            if board_id == id =>
        {
            ViewState::LoadError { board_id, message }
        }

        (ViewState::Ready(mut view), ViewEvent::Speculated { op, candidate }) => {
            view.board = candidate;
            view.pending = Some(PendingMutation {
                op,
                phase: MutationPhase::Speculating,
                started_at: Utc::now(),
            });
            ViewState::Ready(view)
        }

        (ViewState::Ready(mut view), ViewEvent::Committed { board }) => {
            view.board = board;
            view.pending = None;
            view.last_settlement = Some(Settlement::Committed);
            ViewState::Ready(view)
        }

        (ViewState::Ready(mut view), ViewEvent::RolledBack { snapshot, error, stale }) => {
            view.board = snapshot;
            view.pending = None;
            view.error = Some(error);
            view.last_settlement = Some(Settlement::RolledBack);
            view.stale |= stale;
            // The dragged card may no longer exist in the restored board
            if let Some(drag) = &view.drag {
                if view.board.find_card(&drag.card_id).is_none() {
                    view.drag = None;
                }
            }
            ViewState::Ready(view)
        }

        (ViewState::Ready(mut view), ViewEvent::ErrorExpired { id }) => {
            if view.error.as_ref().is_some_and(|e| e.id == id) {
                view.error = None;
            }
            ViewState::Ready(view)
        }

        (ViewState::Ready(mut view), ViewEvent::DragStarted(card_id)) => {
            if view.board.find_card(&card_id).is_some() {
                view.drag = Some(DragFeedback { card_id, over: None });
            }
            ViewState::Ready(view)
        }

        (ViewState::Ready(mut view), ViewEvent::DraggedOver(target)) => {
            let known_column = view.board.find_column(&target.column_id).is_some();
            if let Some(drag) = view.drag.as_mut() {
                if known_column {
                    drag.over = Some(target);
                }
            }
            ViewState::Ready(view)
        }

        (ViewState::Ready(mut view), ViewEvent::DragEnded) => {
            view.drag = None;
            ViewState::Ready(view)
        }

        (state, _) => state,
    }
}
