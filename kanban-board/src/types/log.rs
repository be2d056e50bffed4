//! Mutation records for engine activity reporting

use super::ids::MutationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a mutation settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    /// Remote writes succeeded; the speculative state became committed
    Committed,
    /// A remote write failed; the view was restored to its snapshot
    RolledBack,
    /// The intent changed nothing; no remote call was made
    Unchanged,
}

/// A record of one settled mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Unique ID for this record
    pub id: MutationId,

    /// When the mutation settled
    pub timestamp: DateTime<Utc>,

    /// Canonical op string (e.g., "move card")
    pub op: String,

    /// The intent's parameters
    pub input: Value,

    pub settlement: Settlement,

    /// Number of remote writes issued
    pub writes: usize,

    /// Error message when rolled back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// How long the mutation took, speculation to settlement
    pub duration_ms: u64,
}

impl MutationRecord {
    /// Create a new record
    pub fn new(
        op: impl Into<String>,
        input: Value,
        settlement: Settlement,
        writes: usize,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: MutationId::new(),
            timestamp: Utc::now(),
            op: op.into(),
            input,
            settlement,
            writes,
            error: None,
            duration_ms,
        }
    }

    /// Attach the failure message
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_committed(&self) -> bool {
        self.settlement == Settlement::Committed
    }
}
