//! Task wire types for the `TaskFlow` HTTP API.
//!
//! [`Task`] mirrors the server's JSON representation. The enhanced
//! fields (`description`, `priority`, `starred`, `tags`, `due_date`)
//! are optional on the wire (older servers omit them entirely), so
//! they decode as `Option` and omission stays distinguishable from an
//! explicit value. The accessor methods provide the normalized view
//! (`starred: false`, `priority: medium`, `tags: []`) that clients
//! display.

use serde::{Deserialize, Serialize};

/// Maximum allowed task title length in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum allowed task description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Server-assigned task identifier, unique per user.
pub type TaskId = i64;

/// Server-assigned user identifier.
pub type UserId = i64;

/// Task priority level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Medium priority (the default when the field is absent).
    #[default]
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// Numeric rank used for priority ordering: high=3, medium=2, low=1.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    /// Cycle to the next priority level (low → medium → high → low).
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Error returned when parsing a priority from user input.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority: {0} (expected low, medium, or high)")]
pub struct ParsePriorityError(pub String);

impl std::str::FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

/// A task as represented on the wire.
///
/// `created_at` / `updated_at` are ISO-8601 strings as sent by the
/// server; ISO-8601 orders chronologically under plain string
/// comparison, which is what the sort keys rely on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier, unique per user.
    pub id: TaskId,
    /// Task title (non-empty, at most [`MAX_TITLE_LENGTH`] chars).
    pub title: String,
    /// Free-form description; absent on the wire means empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the task is completed.
    pub completed: bool,
    /// Owning user.
    pub user_id: UserId,
    /// Priority level; absent on the wire means medium.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Starred flag; absent on the wire means false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
    /// Tags in insertion order; absent on the wire means empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Optional due date string (e.g. `2026-09-15`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Server-assigned creation timestamp (ISO-8601).
    pub created_at: String,
    /// Server-assigned last-update timestamp (ISO-8601).
    pub updated_at: String,
}

impl Task {
    /// The description, empty when the server omitted it.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// The priority, medium when the server omitted it.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority.unwrap_or_default()
    }

    /// The starred flag, false when the server omitted it.
    #[must_use]
    pub fn starred(&self) -> bool {
        self.starred.unwrap_or(false)
    }

    /// The tags, empty when the server omitted them.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }

    /// Fill every omitted optional field with its default so the
    /// record round-trips with explicit values from here on.
    pub fn normalize(&mut self) {
        self.description.get_or_insert_with(String::new);
        self.priority.get_or_insert_with(Priority::default);
        self.starred.get_or_insert(false);
        self.tags.get_or_insert_with(Vec::new);
    }
}

/// Request body for creating a task (`POST /{user_id}/tasks`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskCreate {
    /// Task title.
    pub title: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional priority (server defaults to medium).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Optional starred flag (server defaults to false).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
    /// Optional tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Optional due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Partial update body for `PUT /{user_id}/tasks/{task_id}`.
///
/// Only the fields present on the wire are touched by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    /// New title, if changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description, if changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New priority, if changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New starred flag, if changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
    /// New tags, if changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// New due date, if changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Request body for `PATCH /{user_id}/tasks/{task_id}/complete`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CompletionUpdate {
    /// The new completion state.
    pub completed: bool,
}
