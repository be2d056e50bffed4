//! Error types for the kanban engine

use thiserror::Error;

/// Result type for kanban operations
pub type Result<T> = std::result::Result<T, KanbanError>;

/// Errors that can occur in kanban operations
#[derive(Debug, Error)]
pub enum KanbanError {
    /// A board, column or card is not present where the caller expected it
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// The record store rejected a call (network, validation, backend)
    #[error("remote error: {message}")]
    Remote { message: String },

    /// A remote call did not settle in time
    #[error("remote call timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// Another mutation is in flight and the engine rejects instead of queueing
    #[error("busy - another mutation is in flight")]
    Busy,

    /// The caller stopped waiting on a mutation before its writes settled
    #[error("mutation interrupted before it settled")]
    Interrupted,

    /// No board is loaded in the view
    #[error("no board loaded")]
    NotReady,

    /// Sibling positions are not strictly increasing
    #[error("ordering invariant violated: {message}")]
    InvariantViolation { message: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// No signed-in user
    #[error("no current user")]
    Unauthenticated,

    /// Configuration could not be loaded or failed validation
    #[error("configuration error: {message}")]
    Config { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KanbanError {
    /// Create a not found error
    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Create a remote error
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invariant violation error
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Errors raised by a remote call. These roll back a speculative mutation.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            Self::Remote { .. } | Self::Timeout { .. } | Self::Io(_) | Self::Json(_)
        )
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote { message } => message.clone(),
            Self::Timeout { .. } => "The server took too long to respond".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<figment::Error> for KanbanError {
    fn from(err: figment::Error) -> Self {
        Self::config(err.to_string())
    }
}
