//! Task synchronization core.
//!
//! Owns the canonical in-memory task collection for the signed-in
//! user, applies mutations through the gateway (optimistically only
//! for the star toggle), and derives filtered/sorted/aggregated views
//! for display. The view layer never touches task data except through
//! snapshots of this collection.

pub mod merge;
pub mod store;
pub mod views;

pub use merge::merge_task;
pub use store::{LoadState, TaskDraft, TaskStore};
pub use views::{SortKey, StatusFilter, TaskStats, ViewParams, compute_stats, derive_view};

use taskflow_proto::task::{MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, TaskId};

use crate::gateway::GatewayError;

/// Errors surfaced by core operations, one variant per class of the
/// failure taxonomy: validation (rejected before any network call),
/// auth (session ended), fetch/mutation (server rejected a read or
/// write), and network (transport failure).
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Task title cannot be empty.
    #[error("task title cannot be empty")]
    TitleEmpty,

    /// Task title exceeds the maximum length.
    #[error("task title too long (max {MAX_TITLE_LENGTH} characters)")]
    TitleTooLong,

    /// Task description exceeds the maximum length.
    #[error("task description too long (max {MAX_DESCRIPTION_LENGTH} characters)")]
    DescriptionTooLong,

    /// No task with the given ID in the canonical collection.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The session is no longer valid; the caller must re-authenticate.
    #[error("session expired: {0}")]
    Auth(String),

    /// A read operation failed; the prior collection is untouched.
    #[error("{0}")]
    Fetch(String),

    /// A write operation failed; no partial state change was applied
    /// (bulk operations keep their confirmed per-item progress).
    #[error("{0}")]
    Mutation(String),

    /// The server could not be reached at all.
    #[error("network error: {0}")]
    Network(String),
}

impl SyncError {
    /// Whether this error was raised before any network call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TitleEmpty | Self::TitleTooLong | Self::DescriptionTooLong
        )
    }

    /// Map a gateway failure on a read operation.
    pub(crate) fn from_read(err: GatewayError) -> Self {
        match err {
            GatewayError::Unauthorized { message } => Self::Auth(message),
            GatewayError::Status { message, .. } => Self::Fetch(message),
            GatewayError::Network(e) => Self::Network(e.to_string()),
        }
    }

    /// Map a gateway failure on a write operation.
    pub(crate) fn from_write(err: GatewayError) -> Self {
        match err {
            GatewayError::Unauthorized { message } => Self::Auth(message),
            GatewayError::Status { message, .. } => Self::Mutation(message),
            GatewayError::Network(e) => Self::Network(e.to_string()),
        }
    }
}
