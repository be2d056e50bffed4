//! Kanban board engine with ordered columns and cards
//!
//! This crate keeps a board (columns holding cards) in memory, orders siblings
//! by integer position, and applies user intents optimistically against a
//! remote record store: the new layout is shown at once, and rolled back
//! exactly if the store rejects it.
//!
//! ## Overview
//!
//! - **Ordering** - Pure position arithmetic; reorders renumber densely
//! - **Record store** - Async CRUD trait with in-memory and JSON-file backends
//! - **Engine** - Speculate, write, then commit or roll back, one mutation at a time
//! - **View state** - A single observable state with pure transitions
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use kanban_board::{card::MoveCard, BoardEngine, BoardId, EngineConfig, MemoryStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = BoardEngine::new(Arc::new(MemoryStore::new()), EngineConfig::load()?);
//! engine.load(&BoardId::from_string("01J...")).await?;
//!
//! // Shown immediately, persisted in the background of this call
//! let outcome = engine.apply(MoveCard::new("card-id", "column-id", 0)).await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```
//!
//! Renderers subscribe to [`BoardEngine::subscribe`] and redraw on every
//! published [`ViewState`].

mod config;
mod error;
mod loader;
pub mod logging;
pub mod ordering;
mod session;
pub mod store;
pub mod types;

// Engine and command modules
pub mod board;
pub mod card;
pub mod column;
pub mod engine;

#[cfg(test)]
mod test_support;

pub use config::{ConcurrencyPolicy, EngineConfig, ENV_PREFIX};
pub use engine::{BoardEngine, DragEvent, Mutation, MutationOutcome, ViewState};
pub use error::{KanbanError, Result};
pub use loader::load_board;
pub use session::{Session, StaticSession};
pub use store::{FileStore, MemoryStore, RecordStore, TracedStore};

// Re-export commonly used types
pub use types::{
    Board, BoardId, Card, CardId, Column, ColumnId, MutationRecord, Position, PositionBase,
    Settlement, UserId,
};
