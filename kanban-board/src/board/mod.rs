//! Board commands.
//!
//! Dashboard operations (add, list, delete) run straight against the store
//! for the signed-in user: there is no board view to speculate on yet.
//! Renaming a loaded board is an engine intent like any other.

mod add;
mod delete;
mod list;
mod update;

pub use add::AddBoard;
pub use delete::DeleteBoard;
pub use list::ListBoards;
pub use update::UpdateBoard;

use crate::error::Result;
use crate::session::Session;
use crate::store::RecordStore;
use async_trait::async_trait;
use std::sync::Arc;

/// What dashboard operations run against
#[derive(Clone)]
pub struct DashboardContext {
    pub store: Arc<dyn RecordStore>,
    pub session: Arc<dyn Session>,
}

impl DashboardContext {
    pub fn new(store: Arc<dyn RecordStore>, session: Arc<dyn Session>) -> Self {
        Self { store, session }
    }
}

/// A non-speculative operation against the store
#[async_trait]
pub trait Execute: Send + Sync {
    type Output;

    /// Operation name used in logs, e.g. "add board"
    fn op_string(&self) -> &'static str;

    async fn execute(&self, ctx: &DashboardContext) -> Result<Self::Output>;
}
