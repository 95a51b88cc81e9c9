//! Merging server task representations over prior local state.
//!
//! The server is authoritative for everything it sends, but older
//! servers omit the enhanced fields (`description`, `priority`,
//! `starred`, `tags`, `due_date`) from their responses. Taking such a
//! response wholesale would silently wipe those fields locally, so a
//! merged task keeps the prior value wherever the response left the
//! field absent.

use taskflow_proto::task::Task;

/// Merge a server response over the prior local record.
///
/// Fields present in `server` win; fields the server omitted keep
/// their prior values. The result is normalized.
#[must_use]
pub fn merge_task(prior: &Task, mut server: Task) -> Task {
    server.description = server.description.or_else(|| prior.description.clone());
    server.priority = server.priority.or(prior.priority);
    server.starred = server.starred.or(prior.starred);
    server.tags = server.tags.or_else(|| prior.tags.clone());
    server.due_date = server.due_date.or_else(|| prior.due_date.clone());
    server.normalize();
    server
}
