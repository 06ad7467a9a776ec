// error.rs — Error types for run and goal records and their stores.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while handling runs, goals, and notifications.
#[derive(Debug, Error)]
pub enum GoalError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize/deserialize a record.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The requested goal was not found.
    #[error("goal not found: {0}")]
    NotFound(Uuid),

    /// Invalid status transition.
    #[error("invalid transition from {from} to {to} for goal {goal_id}")]
    InvalidTransition {
        goal_id: Uuid,
        from: String,
        to: String,
    },

    /// A run record violates the run invariants (distance/duration).
    #[error("invalid run {run_id}: {reason}")]
    InvalidRun { run_id: Uuid, reason: String },

    /// The backing store rejected a write.
    #[error("store error: {0}")]
    StoreError(String),

    /// A notification dispatch failed (non-fatal).
    #[error("notification error: {0}")]
    NotificationError(String),
}
