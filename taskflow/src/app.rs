//! Application state and event handling.
//!
//! `App` is the synchronous side of the client: it owns the rendered
//! snapshot of the collection, the view parameters, and the input
//! modes. Key events turn into [`CoreCommand`]s for the worker;
//! [`CoreEvent`]s from the worker update the snapshot. The app never
//! talks to the network itself.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use taskflow_proto::auth::User;
use taskflow_proto::task::{Priority, Task, TaskId};

use crate::sync::{
    SortKey, StatusFilter, TaskDraft, TaskStats, ViewParams, compute_stats, derive_view,
};
use crate::worker::{CoreCommand, CoreEvent};

/// Which screen is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Sign-in / sign-up form.
    Login,
    /// The task list.
    Tasks,
}

/// Input mode within the tasks screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// List navigation and hotkeys.
    Normal,
    /// Typing into the search box.
    Search,
    /// The new/edit task form is open.
    Form,
    /// A yes/no confirmation prompt is open.
    Confirm,
}

/// Pending action behind a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Delete one task.
    DeleteTask(TaskId),
    /// Delete every completed task.
    DeleteCompleted,
}

impl ConfirmAction {
    /// Prompt text for the confirmation bar.
    #[must_use]
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::DeleteTask(_) => "Delete this task? (y/n)",
            Self::DeleteCompleted => "Delete all completed tasks? (y/n)",
        }
    }
}

/// A single-line text input with a character-indexed cursor.
#[derive(Debug, Clone, Default)]
pub struct Input {
    /// Current text.
    pub value: String,
    /// Cursor position as a character index.
    pub cursor: usize,
}

impl Input {
    fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn insert(&mut self, c: char) {
        let idx = self.byte_index();
        self.value.insert(idx, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index();
            self.value.remove(idx);
        }
    }

    fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Route a key into this input. Returns `true` if consumed.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.left(),
            KeyCode::Right => self.right(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.chars().count(),
            _ => return false,
        }
        true
    }
}

/// Field focus in the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
    /// Display name, only used in sign-up mode.
    Name,
}

/// The login / registration form.
#[derive(Debug, Default)]
pub struct LoginForm {
    /// Whether the form submits as registration.
    pub registering: bool,
    pub email: Input,
    pub password: Input,
    pub name: Input,
    pub focus: Option<LoginField>,
}

impl LoginForm {
    fn focus_or_default(&self) -> LoginField {
        self.focus.unwrap_or(LoginField::Email)
    }

    fn next_field(&mut self) {
        self.focus = Some(match self.focus_or_default() {
            LoginField::Email => LoginField::Password,
            LoginField::Password if self.registering => LoginField::Name,
            LoginField::Password | LoginField::Name => LoginField::Email,
        });
    }

    fn focused_input(&mut self) -> &mut Input {
        match self.focus_or_default() {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
            LoginField::Name => &mut self.name,
        }
    }

    fn submit(&self) -> Option<CoreCommand> {
        let email = self.email.value.trim().to_string();
        let password = self.password.value.clone();
        if email.is_empty() || password.is_empty() {
            return None;
        }
        if self.registering {
            let name = self.name.value.trim();
            Some(CoreCommand::Register {
                email,
                password,
                name: (!name.is_empty()).then(|| name.to_string()),
            })
        } else {
            Some(CoreCommand::Login { email, password })
        }
    }
}

/// Field focus in the task form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Tags,
    DueDate,
    Priority,
}

impl FormField {
    const fn next(self) -> Self {
        match self {
            Self::Title => Self::Description,
            Self::Description => Self::Tags,
            Self::Tags => Self::DueDate,
            Self::DueDate => Self::Priority,
            Self::Priority => Self::Title,
        }
    }
}

/// The new/edit task form.
#[derive(Debug)]
pub struct TaskForm {
    /// `Some` when editing an existing task.
    pub target: Option<TaskId>,
    pub title: Input,
    pub description: Input,
    /// Comma-separated tag entry.
    pub tags: Input,
    /// Due date entry, `YYYY-MM-DD` or blank.
    pub due_date: Input,
    pub priority: Priority,
    pub focus: FormField,
}

impl TaskForm {
    fn blank() -> Self {
        Self {
            target: None,
            title: Input::default(),
            description: Input::default(),
            tags: Input::default(),
            due_date: Input::default(),
            priority: Priority::default(),
            focus: FormField::Title,
        }
    }

    fn editing(task: &Task) -> Self {
        Self {
            target: Some(task.id),
            title: Input::with_value(&task.title),
            description: Input::with_value(task.description()),
            tags: Input::with_value(task.tags().join(", ")),
            due_date: Input::with_value(task.due_date.clone().unwrap_or_default()),
            priority: task.priority(),
            focus: FormField::Title,
        }
    }

    /// Build a draft from the form fields.
    ///
    /// Returns an error string for a malformed due date; the remaining
    /// validation (title, lengths) happens in the sync layer so the
    /// rules live in one place.
    fn to_draft(&self) -> Result<TaskDraft, String> {
        let due = self.due_date.value.trim();
        if !due.is_empty() && chrono::NaiveDate::parse_from_str(due, "%Y-%m-%d").is_err() {
            return Err(format!("Invalid due date: {due} (expected YYYY-MM-DD)"));
        }
        Ok(TaskDraft {
            title: self.title.value.clone(),
            description: self.description.value.clone(),
            priority: self.priority,
            tags: self
                .tags
                .value
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            due_date: (!due.is_empty()).then(|| due.to_string()),
        })
    }
}

/// Main application state.
pub struct App {
    /// Current screen.
    pub screen: Screen,
    /// Input mode on the tasks screen.
    pub mode: Mode,
    /// The login form.
    pub login: LoginForm,
    /// The task form, present while `mode == Mode::Form`.
    pub form: Option<TaskForm>,
    /// Pending confirmation, present while `mode == Mode::Confirm`.
    pub confirm: Option<ConfirmAction>,
    /// Signed-in user, if any.
    pub user: Option<User>,
    /// Snapshot of the canonical collection.
    pub tasks: Vec<Task>,
    /// Search, filter and sort parameters.
    pub view: ViewParams,
    /// Search box input (mirrors `view.query` while typing).
    pub search: Input,
    /// Selected row in the derived view.
    pub selected: usize,
    /// Whether the worker is processing a command.
    pub busy: bool,
    /// Last error, shown until the next key press.
    pub error: Option<String>,
    /// Chrono format string for rendering due dates.
    pub date_format: String,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl App {
    /// Create the initial state, starting at the login screen.
    #[must_use]
    pub fn new() -> Self {
        Self {
            screen: Screen::Login,
            mode: Mode::Normal,
            login: LoginForm::default(),
            form: None,
            confirm: None,
            user: None,
            tasks: Vec::new(),
            view: ViewParams::default(),
            search: Input::default(),
            selected: 0,
            busy: false,
            error: None,
            date_format: "%Y-%m-%d".to_string(),
            should_quit: false,
        }
    }

    /// The derived view over the current snapshot.
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<&Task> {
        derive_view(&self.tasks, &self.view)
    }

    /// Stats over the full collection, independent of the view.
    #[must_use]
    pub fn stats(&self) -> TaskStats {
        compute_stats(&self.tasks)
    }

    /// The task under the selection cursor, if any.
    #[must_use]
    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.visible_tasks().get(self.selected).map(|t| t.id)
    }

    /// Apply a worker event to the rendered state.
    pub fn apply_event(&mut self, event: CoreEvent) {
        match event {
            CoreEvent::SessionStarted(user) => {
                self.user = Some(user);
                self.screen = Screen::Tasks;
                self.mode = Mode::Normal;
                self.login = LoginForm::default();
            }
            CoreEvent::SessionEnded => {
                self.user = None;
                self.tasks.clear();
                self.screen = Screen::Login;
                self.mode = Mode::Normal;
                self.form = None;
                self.confirm = None;
                self.view = ViewParams::default();
                self.search.clear();
                self.selected = 0;
            }
            CoreEvent::CollectionChanged(tasks) => {
                self.tasks = tasks;
                self.clamp_selection();
            }
            CoreEvent::Busy(busy) => self.busy = busy,
            CoreEvent::Error(message) => self.error = Some(message),
        }
    }

    /// Handle a key event, possibly producing a command for the worker.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<CoreCommand> {
        // Any key press dismisses a stale error.
        self.error = None;

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Some(CoreCommand::Shutdown);
        }

        match self.screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Tasks => match self.mode {
                Mode::Normal => self.handle_normal_key(key),
                Mode::Search => self.handle_search_key(key),
                Mode::Form => self.handle_form_key(key),
                Mode::Confirm => self.handle_confirm_key(key),
            },
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> Option<CoreCommand> {
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                Some(CoreCommand::Shutdown)
            }
            KeyCode::Tab | KeyCode::Down => {
                self.login.next_field();
                None
            }
            KeyCode::Enter => self.login.submit(),
            // Toggle between sign-in and sign-up.
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.login.registering = !self.login.registering;
                None
            }
            _ => {
                self.login.focused_input().handle_key(key);
                None
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<CoreCommand> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Some(CoreCommand::Shutdown)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.visible_tasks().len().saturating_sub(1);
                if self.selected < last {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Char('n') => {
                self.form = Some(TaskForm::blank());
                self.mode = Mode::Form;
                None
            }
            KeyCode::Char('e') => {
                let id = self.selected_task_id()?;
                let task = self.tasks.iter().find(|t| t.id == id)?;
                self.form = Some(TaskForm::editing(task));
                self.mode = Mode::Form;
                None
            }
            KeyCode::Char('d') => {
                let id = self.selected_task_id()?;
                self.confirm = Some(ConfirmAction::DeleteTask(id));
                self.mode = Mode::Confirm;
                None
            }
            KeyCode::Char('D') => {
                if self.tasks.iter().any(|t| t.completed) {
                    self.confirm = Some(ConfirmAction::DeleteCompleted);
                    self.mode = Mode::Confirm;
                }
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.selected_task_id().map(CoreCommand::ToggleCompletion)
            }
            KeyCode::Char('s') => self.selected_task_id().map(CoreCommand::ToggleStar),
            KeyCode::Char('A') => Some(CoreCommand::CompleteAll),
            KeyCode::Char('/') => {
                self.search = Input::with_value(self.view.query.clone());
                self.mode = Mode::Search;
                None
            }
            KeyCode::Char('f') => {
                self.view.filter = self.view.filter.next();
                self.clamp_selection();
                None
            }
            KeyCode::Char('o') => {
                self.view.sort = self.view.sort.next();
                None
            }
            KeyCode::Char('r') => Some(CoreCommand::Refresh),
            KeyCode::Char('L') => Some(CoreCommand::Logout),
            KeyCode::Esc => {
                // Clear the active search.
                self.view.query.clear();
                self.search.clear();
                self.clamp_selection();
                None
            }
            _ => None,
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<CoreCommand> {
        match key.code {
            KeyCode::Enter => {
                self.mode = Mode::Normal;
            }
            KeyCode::Esc => {
                self.search.clear();
                self.view.query.clear();
                self.mode = Mode::Normal;
                self.clamp_selection();
            }
            _ => {
                if self.search.handle_key(key) {
                    // Live filtering: the view narrows as the query grows.
                    self.view.query = self.search.value.clone();
                    self.clamp_selection();
                }
            }
        }
        None
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<CoreCommand> {
        let form = self.form.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.form = None;
                self.mode = Mode::Normal;
                None
            }
            KeyCode::Tab | KeyCode::Down => {
                form.focus = form.focus.next();
                None
            }
            KeyCode::Enter => {
                let draft = match form.to_draft() {
                    Ok(draft) => draft,
                    Err(message) => {
                        self.error = Some(message);
                        return None;
                    }
                };
                let cmd = match form.target {
                    Some(task_id) => CoreCommand::Edit { task_id, draft },
                    None => CoreCommand::Create(draft),
                };
                self.form = None;
                self.mode = Mode::Normal;
                Some(cmd)
            }
            _ if form.focus == FormField::Priority => {
                // Space or arrows cycle the priority level.
                if matches!(
                    key.code,
                    KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right
                ) {
                    form.priority = form.priority.next();
                }
                None
            }
            _ => {
                match form.focus {
                    FormField::Title => form.title.handle_key(key),
                    FormField::Description => form.description.handle_key(key),
                    FormField::Tags => form.tags.handle_key(key),
                    FormField::DueDate => form.due_date.handle_key(key),
                    FormField::Priority => false,
                };
                None
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Option<CoreCommand> {
        let action = self.confirm?;
        match key.code {
            KeyCode::Char('y' | 'Y') => {
                self.confirm = None;
                self.mode = Mode::Normal;
                Some(match action {
                    ConfirmAction::DeleteTask(id) => CoreCommand::Delete(id),
                    ConfirmAction::DeleteCompleted => CoreCommand::DeleteCompleted,
                })
            }
            KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                self.confirm = None;
                self.mode = Mode::Normal;
                None
            }
            _ => None,
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
