//! Core types for the kanban engine

mod aggregate;
mod board;
mod card;
mod ids;
mod log;
mod position;

// Re-export all types
pub use aggregate::{Board, Column};
pub use board::{BoardPatch, BoardRecord, ColumnPatch, ColumnRecord, NewBoard, NewColumn};
pub use card::{Card, CardPatch, NewCard};
pub use ids::{BoardId, CardId, ColumnId, MutationId, UserId};
pub use log::{MutationRecord, Settlement};
pub use position::{Position, PositionBase, Positioned};
