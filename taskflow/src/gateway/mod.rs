//! Remote gateway abstraction for the `TaskFlow` server.
//!
//! Defines the [`TaskGateway`] trait the synchronization core is
//! generic over. The production implementation is
//! [`http::HttpGateway`]; tests substitute in-memory fakes.

pub mod http;

pub use http::HttpGateway;

use taskflow_proto::task::{CompletionUpdate, Task, TaskCreate, TaskId, TaskUpdate, UserId};

/// Errors produced by gateway calls.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The server rejected the credential (HTTP 401). The session
    /// store has already been cleared by the time this is returned.
    #[error("{message}")]
    Unauthorized {
        /// Message extracted from the response body, or the generic fallback.
        message: String,
    },

    /// Any other non-2xx response.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body, or the generic fallback.
        message: String,
    },

    /// The request never produced a response (connect, timeout, or
    /// body-decode failure in the underlying client).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl GatewayError {
    /// Whether this failure means the session is no longer valid.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Typed task operations against the remote server.
///
/// One method per server operation from the HTTP contract. The core
/// never constructs URLs or inspects status codes; everything arrives
/// as typed results or a [`GatewayError`].
pub trait TaskGateway {
    /// Fetch the full task list for a user.
    fn list_tasks(
        &self,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Task>, GatewayError>> + Send;

    /// Create a task; the server assigns `id` and timestamps.
    fn create_task(
        &self,
        user_id: UserId,
        fields: &TaskCreate,
    ) -> impl std::future::Future<Output = Result<Task, GatewayError>> + Send;

    /// Apply a partial update to a task, returning the server's
    /// representation.
    fn update_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
        fields: &TaskUpdate,
    ) -> impl std::future::Future<Output = Result<Task, GatewayError>> + Send;

    /// Set the completion state through the dedicated endpoint.
    fn set_completion(
        &self,
        user_id: UserId,
        task_id: TaskId,
        update: CompletionUpdate,
    ) -> impl std::future::Future<Output = Result<Task, GatewayError>> + Send;

    /// Delete a task. A 204 or a `{message}` body both count as success.
    fn delete_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
    ) -> impl std::future::Future<Output = Result<(), GatewayError>> + Send;
}
