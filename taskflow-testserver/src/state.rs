//! In-memory backing store for the test server.
//!
//! Everything lives in process memory and is lost on shutdown. The
//! store is deliberately small: accounts, bearer tokens, and per-user
//! task lists in insertion order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::sync::RwLock;

use taskflow_proto::auth::User;
use taskflow_proto::task::{Task, TaskCreate, TaskId, TaskUpdate, UserId};

/// One registered account.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub password: String,
}

/// Shared server state.
pub struct ServerState {
    accounts: RwLock<HashMap<UserId, Account>>,
    /// Bearer token to user id.
    tokens: RwLock<HashMap<String, UserId>>,
    /// Per-user task lists in creation order.
    tasks: RwLock<HashMap<UserId, Vec<Task>>>,
    next_user_id: AtomicI64,
    next_task_id: AtomicI64,
    next_token: AtomicI64,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
            tasks: RwLock::new(HashMap::new()),
            next_user_id: AtomicI64::new(1),
            next_task_id: AtomicI64::new(1),
            next_token: AtomicI64::new(1),
        }
    }

    /// Register an account, or `None` when the email is taken.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Option<User> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.user.email == email) {
            return None;
        }
        let id = self.next_user_id.fetch_add(1, Ordering::Relaxed);
        let user = User {
            id,
            email: email.to_string(),
            name,
        };
        accounts.insert(
            id,
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        Some(user)
    }

    /// Check credentials and return the account's user record.
    pub async fn authenticate(&self, email: &str, password: &str) -> Option<User> {
        let accounts = self.accounts.read().await;
        accounts
            .values()
            .find(|a| a.user.email == email && a.password == password)
            .map(|a| a.user.clone())
    }

    /// Mint a bearer token for the user.
    pub async fn issue_token(&self, user_id: UserId) -> String {
        let seq = self.next_token.fetch_add(1, Ordering::Relaxed);
        let token = format!("tf-token-{user_id}-{seq}");
        self.tokens.write().await.insert(token.clone(), user_id);
        token
    }

    /// Resolve a bearer token to its user, if the token is live.
    pub async fn resolve_token(&self, token: &str) -> Option<User> {
        let user_id = *self.tokens.read().await.get(token)?;
        let accounts = self.accounts.read().await;
        accounts.get(&user_id).map(|a| a.user.clone())
    }

    /// Revoke every token issued to the user. Used by tests to force
    /// credential expiry mid-session.
    pub async fn revoke_tokens(&self, user_id: UserId) {
        self.tokens.write().await.retain(|_, uid| *uid != user_id);
    }

    /// The user's tasks in creation order.
    pub async fn list_tasks(&self, user_id: UserId) -> Vec<Task> {
        self.tasks
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Create a task from the request fields.
    pub async fn create_task(&self, user_id: UserId, fields: TaskCreate) -> Task {
        let id = self.next_task_id.fetch_add(1, Ordering::Relaxed);
        let now = now_rfc3339();
        let task = Task {
            id,
            title: fields.title,
            description: fields.description,
            completed: false,
            user_id,
            priority: fields.priority,
            starred: fields.starred,
            tags: fields.tags,
            due_date: fields.due_date,
            created_at: now.clone(),
            updated_at: now,
        };
        self.tasks
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push(task.clone());
        task
    }

    /// Apply a partial update to a task. `None` when the task does not
    /// exist for this user.
    pub async fn update_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
        fields: TaskUpdate,
    ) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&user_id)?
            .iter_mut()
            .find(|t| t.id == task_id)?;
        if let Some(title) = fields.title {
            task.title = title;
        }
        if fields.description.is_some() {
            task.description = fields.description;
        }
        if fields.priority.is_some() {
            task.priority = fields.priority;
        }
        if fields.starred.is_some() {
            task.starred = fields.starred;
        }
        if fields.tags.is_some() {
            task.tags = fields.tags;
        }
        if fields.due_date.is_some() {
            task.due_date = fields.due_date;
        }
        task.updated_at = now_rfc3339();
        Some(task.clone())
    }

    /// Set a task's completion state. `None` when the task is missing.
    pub async fn set_completion(
        &self,
        user_id: UserId,
        task_id: TaskId,
        completed: bool,
    ) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&user_id)?
            .iter_mut()
            .find(|t| t.id == task_id)?;
        task.completed = completed;
        task.updated_at = now_rfc3339();
        Some(task.clone())
    }

    /// Delete a task. Returns `true` when something was removed.
    pub async fn delete_task(&self, user_id: UserId, task_id: TaskId) -> bool {
        let mut tasks = self.tasks.write().await;
        let Some(list) = tasks.get_mut(&user_id) else {
            return false;
        };
        let before = list.len();
        list.retain(|t| t.id != task_id);
        list.len() != before
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
