//! The canonical task collection and its mutation operations.
//!
//! `TaskStore` is generic over [`TaskGateway`] so the whole mutation
//! surface is testable against an in-memory fake. All operations run
//! on the single-threaded core worker; interleaved responses can only
//! target the task id (or wholesale list) they were issued for, so an
//! overlapping edit of the same task resolves as last-response-wins,
//! an accepted race rather than a consistency guarantee.

use taskflow_proto::task::{
    CompletionUpdate, Priority, Task, TaskCreate, TaskId, TaskUpdate, UserId,
    MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH,
};

use super::SyncError;
use super::merge::merge_task;
use crate::gateway::{GatewayError, TaskGateway};

/// Lifecycle of the canonical collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No fetch has happened yet (or the session ended).
    Empty,
    /// A full-list fetch is in flight.
    Loading,
    /// The collection reflects the last successful fetch plus
    /// confirmed mutations.
    Loaded,
}

/// User-entered task fields, shared by create and edit.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    /// Task title (validated non-empty after trimming).
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Priority level.
    pub priority: Priority,
    /// Tags in entry order.
    pub tags: Vec<String>,
    /// Optional due date.
    pub due_date: Option<String>,
}

impl TaskDraft {
    /// Validate the draft, returning the trimmed title.
    ///
    /// Runs before any network call: an invalid draft never reaches
    /// the gateway.
    fn validate(&self) -> Result<String, SyncError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(SyncError::TitleEmpty);
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(SyncError::TitleTooLong);
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(SyncError::DescriptionTooLong);
        }
        Ok(title.to_string())
    }
}

/// Owns the canonical in-memory task collection for one user session.
pub struct TaskStore<G> {
    gateway: G,
    user_id: UserId,
    tasks: Vec<Task>,
    state: LoadState,
}

impl<G: TaskGateway> TaskStore<G> {
    /// Create an empty store for the given user.
    pub const fn new(gateway: G, user_id: UserId) -> Self {
        Self {
            gateway,
            user_id,
            tasks: Vec::new(),
            state: LoadState::Empty,
        }
    }

    /// The canonical collection, in server order plus appends.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Current collection lifecycle state.
    #[must_use]
    pub const fn state(&self) -> LoadState {
        self.state
    }

    /// The user this collection belongs to.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The underlying gateway.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Fetch the full task list and replace the collection wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Fetch`] (or `Auth`/`Network`) on failure;
    /// the prior collection and state are left untouched.
    pub async fn load(&mut self) -> Result<(), SyncError> {
        let prior_state = std::mem::replace(&mut self.state, LoadState::Loading);
        match self.gateway.list_tasks(self.user_id).await {
            Ok(mut tasks) => {
                for task in &mut tasks {
                    task.normalize();
                }
                tracing::debug!(count = tasks.len(), "task list loaded");
                self.tasks = tasks;
                self.state = LoadState::Loaded;
                Ok(())
            }
            Err(e) => {
                self.state = prior_state;
                Err(SyncError::from_read(e))
            }
        }
    }

    /// Create a task from the draft, appending the server's record.
    ///
    /// No optimistic insert: the server owns id assignment, so the UI
    /// waits for confirmation.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before any network call; gateway
    /// failures leave the collection unchanged.
    pub async fn create(&mut self, draft: &TaskDraft) -> Result<TaskId, SyncError> {
        let title = draft.validate()?;
        let fields = TaskCreate {
            title,
            description: none_if_empty(&draft.description),
            priority: Some(draft.priority),
            starred: Some(false),
            tags: (!draft.tags.is_empty()).then(|| draft.tags.clone()),
            due_date: draft.due_date.clone(),
        };
        let mut task = self
            .gateway
            .create_task(self.user_id, &fields)
            .await
            .map_err(SyncError::from_write)?;
        task.normalize();
        let id = task.id;
        tracing::info!(task_id = id, "task created");
        self.tasks.push(task);
        Ok(id)
    }

    /// Replace a task's editable fields with the draft.
    ///
    /// Sends the full edited field set, including the task's current
    /// starred flag so a concurrent star is not clobbered. On success
    /// the server response is merged over the prior record.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before any network call; on
    /// gateway failure the collection is unchanged so the edit can be
    /// retried.
    pub async fn edit(&mut self, task_id: TaskId, draft: &TaskDraft) -> Result<(), SyncError> {
        let title = draft.validate()?;
        let idx = self.index_of(task_id)?;
        let fields = TaskUpdate {
            title: Some(title),
            description: Some(draft.description.clone()),
            priority: Some(draft.priority),
            starred: Some(self.tasks[idx].starred()),
            tags: Some(draft.tags.clone()),
            due_date: draft.due_date.clone(),
        };
        let server = self
            .gateway
            .update_task(self.user_id, task_id, &fields)
            .await
            .map_err(SyncError::from_write)?;
        self.tasks[idx] = merge_task(&self.tasks[idx], server);
        Ok(())
    }

    /// Delete a task, removing it locally only once confirmed.
    ///
    /// No optimistic removal: a failed delete must not make the task
    /// flicker out and back.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::TaskNotFound`] for an unknown id, or the
    /// mapped gateway failure with the collection unchanged.
    pub async fn delete(&mut self, task_id: TaskId) -> Result<(), SyncError> {
        let _ = self.index_of(task_id)?;
        self.gateway
            .delete_task(self.user_id, task_id)
            .await
            .map_err(SyncError::from_write)?;
        self.tasks.retain(|t| t.id != task_id);
        tracing::info!(task_id, "task deleted");
        Ok(())
    }

    /// Flip a task's completion state through the dedicated endpoint.
    ///
    /// A full round trip, not optimistic: completion may trigger
    /// server-side effects. The response is merged over prior optional
    /// fields the server might omit.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::TaskNotFound`] or the mapped gateway failure.
    pub async fn toggle_completion(&mut self, task_id: TaskId) -> Result<(), SyncError> {
        let idx = self.index_of(task_id)?;
        let update = CompletionUpdate {
            completed: !self.tasks[idx].completed,
        };
        let server = self
            .gateway
            .set_completion(self.user_id, task_id, update)
            .await
            .map_err(SyncError::from_write)?;
        self.tasks[idx] = merge_task(&self.tasks[idx], server);
        Ok(())
    }

    /// Flip a task's starred flag, optimistically.
    ///
    /// The one optimistic path: starring is cosmetic and low-risk to
    /// mis-render briefly. Snapshot, apply locally, then commit or
    /// revert on the gateway outcome.
    ///
    /// # Errors
    ///
    /// On gateway failure the exact prior starred value is restored
    /// and the error surfaced.
    pub async fn toggle_star(&mut self, task_id: TaskId) -> Result<(), SyncError> {
        let idx = self.index_of(task_id)?;
        let snapshot = self.tasks[idx].starred;
        let applied = Some(!self.tasks[idx].starred());
        let fields = TaskUpdate {
            starred: applied,
            ..TaskUpdate::default()
        };
        let call = self.gateway.update_task(self.user_id, task_id, &fields);
        let slot = &mut self.tasks[idx].starred;
        commit_or_revert(slot, applied, snapshot, call)
            .await
            .map(|_task| ())
            .map_err(SyncError::from_write)
    }

    /// Delete every completed task, one gateway call per task in
    /// collection order.
    ///
    /// An at-least-attempted batch, not a transaction: every target is
    /// attempted, confirmed deletions stick, a failing item stays in
    /// the collection, and the first error is surfaced after the whole
    /// batch ran. Returns the number of tasks actually deleted.
    ///
    /// # Errors
    ///
    /// The first per-item failure, mapped as a write error.
    pub async fn delete_completed(&mut self) -> Result<usize, SyncError> {
        let targets: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.id)
            .collect();
        let mut first_error = None;
        let mut deleted = 0;
        for id in targets {
            match self.gateway.delete_task(self.user_id, id).await {
                Ok(()) => {
                    self.tasks.retain(|t| t.id != id);
                    deleted += 1;
                }
                Err(e) => {
                    tracing::warn!(task_id = id, error = %e, "bulk delete item failed");
                    first_error.get_or_insert(SyncError::from_write(e));
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(deleted),
        }
    }

    /// Mark every incomplete task completed, one gateway call per task
    /// in collection order.
    ///
    /// Same partial-failure policy as [`Self::delete_completed`]:
    /// confirmed completions stick, the collection reflects real
    /// per-item outcomes. Returns the number of tasks completed.
    ///
    /// # Errors
    ///
    /// The first per-item failure, mapped as a write error.
    pub async fn complete_all(&mut self) -> Result<usize, SyncError> {
        let targets: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|t| !t.completed)
            .map(|t| t.id)
            .collect();
        let mut first_error = None;
        let mut completed = 0;
        for id in targets {
            let update = CompletionUpdate { completed: true };
            match self.gateway.set_completion(self.user_id, id, update).await {
                Ok(server) => {
                    if let Ok(idx) = self.index_of(id) {
                        self.tasks[idx] = merge_task(&self.tasks[idx], server);
                    }
                    completed += 1;
                }
                Err(e) => {
                    tracing::warn!(task_id = id, error = %e, "bulk complete item failed");
                    first_error.get_or_insert(SyncError::from_write(e));
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(completed),
        }
    }

    /// Drop the collection on logout: back to `Empty`.
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.state = LoadState::Empty;
    }

    fn index_of(&self, task_id: TaskId) -> Result<usize, SyncError> {
        self.tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or(SyncError::TaskNotFound(task_id))
    }
}

/// Three-phase optimistic mutation: apply the new value to `slot`,
/// await the gateway call, and restore the exact snapshot on failure.
async fn commit_or_revert<T, Out, Fut>(
    slot: &mut T,
    applied: T,
    snapshot: T,
    call: Fut,
) -> Result<Out, GatewayError>
where
    Fut: std::future::Future<Output = Result<Out, GatewayError>>,
{
    *slot = applied;
    match call.await {
        Ok(out) => Ok(out),
        Err(e) => {
            *slot = snapshot;
            Err(e)
        }
    }
}

fn none_if_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
