//! Who is signed in

use crate::error::{KanbanError, Result};
use crate::types::UserId;
use std::sync::RwLock;

/// Identity provider for owner-scoped operations
pub trait Session: Send + Sync {
    /// The signed-in user, if any
    fn current_user(&self) -> Option<UserId>;

    /// The signed-in user, or `Unauthenticated`
    fn require_user(&self) -> Result<UserId> {
        self.current_user().ok_or(KanbanError::Unauthenticated)
    }

    /// End the session. Later owner-scoped operations fail with `Unauthenticated`.
    fn sign_out(&self);
}

/// A session holding one user until it is signed out
#[derive(Debug, Default)]
pub struct StaticSession {
    user: RwLock<Option<UserId>>,
}

impl StaticSession {
    pub fn signed_in(user: impl Into<UserId>) -> Self {
        Self {
            user: RwLock::new(Some(user.into())),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl Session for StaticSession {
    fn current_user(&self) -> Option<UserId> {
        match self.user.read() {
            Ok(user) => user.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn sign_out(&self) {
        let mut user = match self.user.write() {
            Ok(user) => user,
            Err(poisoned) => poisoned.into_inner(),
        };
        *user = None;
    }
}
