//! Core worker wiring the TUI to the async sync layer.
//!
//! This module bridges the synchronous TUI event loop (crossterm
//! poll-based) with the async [`HttpGateway`] / [`TaskStore`] stack.
//! It spawns a background tokio task and communicates with the main
//! thread via [`CoreCommand`] / [`CoreEvent`] channels.
//!
//! # Architecture
//!
//! ```text
//! TUI (main thread)  ←── CoreEvent ───  tokio worker task
//!                     ─── CoreCommand →
//! ```
//!
//! The main thread sends [`CoreCommand`]s (e.g. create a task) and
//! drains [`CoreEvent`]s (e.g. collection changed) on each tick of the
//! poll-based event loop. A single worker task owns the [`TaskStore`]
//! and runs commands one at a time, so mutations are serialized and
//! every response is applied against the state that issued it.

use tokio::sync::mpsc;

use taskflow_proto::auth::User;
use taskflow_proto::task::{Task, TaskId};

use crate::gateway::HttpGateway;
use crate::sync::{SyncError, TaskDraft, TaskStore};

/// Commands sent from the TUI main loop to the core worker.
#[derive(Debug)]
pub enum CoreCommand {
    /// Sign in with an existing account.
    Login {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// Create a new account and sign in.
    Register {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
        /// Optional display name.
        name: Option<String>,
    },
    /// End the session and drop the collection.
    Logout,
    /// Re-fetch the full task list.
    Refresh,
    /// Create a task from a draft.
    Create(TaskDraft),
    /// Replace a task's editable fields.
    Edit {
        /// Target task.
        task_id: TaskId,
        /// Replacement fields.
        draft: TaskDraft,
    },
    /// Delete one task.
    Delete(TaskId),
    /// Flip one task's completion state.
    ToggleCompletion(TaskId),
    /// Flip one task's starred flag.
    ToggleStar(TaskId),
    /// Delete every completed task.
    DeleteCompleted,
    /// Mark every incomplete task completed.
    CompleteAll,
    /// Gracefully shut down the worker.
    Shutdown,
}

/// Events sent from the core worker to the TUI main loop.
#[derive(Debug)]
pub enum CoreEvent {
    /// A session became active (login, register, or restored at startup).
    SessionStarted(User),
    /// The session ended, whether by logout or credential expiry.
    SessionEnded,
    /// The canonical collection changed; a full snapshot for the UI.
    CollectionChanged(Vec<Task>),
    /// Whether a command is currently being processed.
    Busy(bool),
    /// An operation failed; the message is ready for display.
    Error(String),
}

/// Default capacity for the command/event channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Spawn the core worker task and return channel handles.
///
/// If the session store holds a persisted credential the worker starts
/// by validating it against the server: on success it emits
/// [`CoreEvent::SessionStarted`] and loads the task list; an
/// authorization failure is swallowed silently (the stale session is
/// already cleared by the gateway) and the UI starts at the login
/// screen. Other startup failures are surfaced as errors.
#[must_use]
pub fn spawn_worker(
    gateway: HttpGateway,
    channel_capacity: usize,
) -> (mpsc::Sender<CoreCommand>, mpsc::Receiver<CoreEvent>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<CoreCommand>(channel_capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<CoreEvent>(channel_capacity);

    tokio::spawn(async move {
        let mut worker = Worker {
            gateway,
            store: None,
            evt_tx,
        };
        worker.restore_session().await;
        worker.run(cmd_rx).await;
    });

    (cmd_tx, evt_rx)
}

/// Worker task state: the gateway plus, while a session is active, the
/// canonical task store for that user.
struct Worker {
    gateway: HttpGateway,
    store: Option<TaskStore<HttpGateway>>,
    evt_tx: mpsc::Sender<CoreEvent>,
}

impl Worker {
    /// Validate a persisted credential at startup, if there is one.
    async fn restore_session(&mut self) {
        if !self.gateway.session().is_active() {
            return;
        }
        match self.gateway.fetch_current_user().await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "persisted session restored");
                self.start_session(user).await;
            }
            Err(e) if e.is_auth() => {
                // Stale credential; the gateway already cleared it.
                tracing::info!("persisted session rejected by server");
            }
            Err(e) => {
                tracing::warn!(error = %e, "session restore failed");
                self.emit(CoreEvent::Error(e.to_string())).await;
            }
        }
    }

    async fn run(&mut self, mut cmd_rx: mpsc::Receiver<CoreCommand>) {
        while let Some(cmd) = cmd_rx.recv().await {
            if matches!(cmd, CoreCommand::Shutdown) {
                tracing::info!("core worker shutting down");
                break;
            }
            self.emit(CoreEvent::Busy(true)).await;
            self.handle(cmd).await;
            self.emit(CoreEvent::Busy(false)).await;
        }
    }

    async fn handle(&mut self, cmd: CoreCommand) {
        match cmd {
            CoreCommand::Login { email, password } => {
                match self.gateway.login(&email, &password).await {
                    Ok(auth) => self.start_session(auth.user).await,
                    Err(e) => self.emit(CoreEvent::Error(e.to_string())).await,
                }
            }
            CoreCommand::Register {
                email,
                password,
                name,
            } => {
                match self
                    .gateway
                    .register(&email, &password, name.as_deref())
                    .await
                {
                    Ok(auth) => self.start_session(auth.user).await,
                    Err(e) => self.emit(CoreEvent::Error(e.to_string())).await,
                }
            }
            CoreCommand::Logout => {
                self.gateway.logout();
                self.store = None;
                self.emit(CoreEvent::SessionEnded).await;
            }
            CoreCommand::Refresh => {
                let result = match self.store.as_mut() {
                    Some(store) => store.load().await,
                    None => return,
                };
                self.finish_mutation(result).await;
            }
            CoreCommand::Create(draft) => {
                let result = match self.store.as_mut() {
                    Some(store) => store.create(&draft).await.map(|_id| ()),
                    None => return,
                };
                self.finish_mutation(result).await;
            }
            CoreCommand::Edit { task_id, draft } => {
                let result = match self.store.as_mut() {
                    Some(store) => store.edit(task_id, &draft).await,
                    None => return,
                };
                self.finish_mutation(result).await;
            }
            CoreCommand::Delete(task_id) => {
                let result = match self.store.as_mut() {
                    Some(store) => store.delete(task_id).await,
                    None => return,
                };
                self.finish_mutation(result).await;
            }
            CoreCommand::ToggleCompletion(task_id) => {
                let result = match self.store.as_mut() {
                    Some(store) => store.toggle_completion(task_id).await,
                    None => return,
                };
                self.finish_mutation(result).await;
            }
            CoreCommand::ToggleStar(task_id) => {
                let result = match self.store.as_mut() {
                    Some(store) => store.toggle_star(task_id).await,
                    None => return,
                };
                self.finish_mutation(result).await;
            }
            CoreCommand::DeleteCompleted => {
                let result = match self.store.as_mut() {
                    Some(store) => store.delete_completed().await.map(|_n| ()),
                    None => return,
                };
                self.finish_mutation(result).await;
            }
            CoreCommand::CompleteAll => {
                let result = match self.store.as_mut() {
                    Some(store) => store.complete_all().await.map(|_n| ()),
                    None => return,
                };
                self.finish_mutation(result).await;
            }
            CoreCommand::Shutdown => {}
        }
    }

    /// Install the task store for a fresh session and run the first load.
    async fn start_session(&mut self, user: User) {
        let user_id = user.id;
        self.emit(CoreEvent::SessionStarted(user)).await;
        self.store = Some(TaskStore::new(self.gateway.clone(), user_id));
        let result = match self.store.as_mut() {
            Some(store) => store.load().await,
            None => return,
        };
        self.finish_mutation(result).await;
    }

    /// Publish the post-mutation collection and surface any error.
    ///
    /// The snapshot is sent even on failure: bulk operations and
    /// optimistic reverts change the collection before erroring, and
    /// the UI must render the real per-item outcomes.
    async fn finish_mutation(&mut self, result: Result<(), SyncError>) {
        if let Some(store) = &self.store {
            self.emit(CoreEvent::CollectionChanged(store.tasks().to_vec()))
                .await;
        }
        if let Err(e) = result {
            self.report(e).await;
        }
    }

    /// Surface a sync error, ending the session when credentials died.
    async fn report(&mut self, error: SyncError) {
        if matches!(error, SyncError::Auth(_)) {
            self.store = None;
            self.emit(CoreEvent::SessionEnded).await;
        }
        self.emit(CoreEvent::Error(error.to_string())).await;
    }

    async fn emit(&self, event: CoreEvent) {
        if self.evt_tx.send(event).await.is_err() {
            // TUI dropped; nothing left to notify.
            tracing::debug!("event receiver dropped");
        }
    }
}
