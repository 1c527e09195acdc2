//! Command dispatch against the session and task store controllers.
//!
//! A front end turns user actions into `Command` values and hands them to
//! `TaskManager::dispatch`, then renders `TaskManager::state`.

use crate::api::TaskApi;
use crate::notification::Notification;
use crate::session::{Session, SessionController};
use crate::storage::ClientStorage;
use crate::store::{Confirmer, StoreError, TaskCache, TaskStoreController};
use crate::task::{TaskDraft, TaskId};
use tracing::{debug, warn};

pub const LOGIN_REQUIRED: &str = "Please login to continue";

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { username: String, password: String },
    Logout,
    Refresh,
    OpenAddForm,
    EditTask(TaskId),
    CancelForm,
    /// Adds or updates depending on which form is open.
    SubmitForm(TaskDraft),
    AddTask(TaskDraft),
    UpdateTask { id: TaskId, draft: TaskDraft },
    DeleteTask(TaskId),
    ToggleComplete(TaskId),
    DismissNotification,
}

impl Command {
    /// Short label for logs; never includes credentials.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::Refresh => "refresh",
            Command::OpenAddForm => "open_add_form",
            Command::EditTask(_) => "edit_task",
            Command::CancelForm => "cancel_form",
            Command::SubmitForm(_) => "submit_form",
            Command::AddTask(_) => "add_task",
            Command::UpdateTask { .. } => "update_task",
            Command::DeleteTask(_) => "delete_task",
            Command::ToggleComplete(_) => "toggle_complete",
            Command::DismissNotification => "dismiss_notification",
        }
    }
}

/// The add/edit form.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Form {
    #[default]
    Hidden,
    Adding(TaskDraft),
    Editing { id: TaskId, draft: TaskDraft },
}

/// Everything a front end needs to render.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AppState {
    session: Option<Session>,
    tasks: TaskCache,
    form: Form,
    notification: Option<Notification>,
    login_error: Option<String>,
}

impl AppState {
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn tasks(&self) -> &TaskCache {
        &self.tasks
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn login_error(&self) -> Option<&str> {
        self.login_error.as_deref()
    }
}

/// Owns the application state and applies commands to it one at a time.
pub struct TaskManager<API: TaskApi, STORAGE: ClientStorage, CONFIRM: Confirmer> {
    api: API,
    storage: STORAGE,
    confirmer: CONFIRM,
    state: AppState,
}

impl<API: TaskApi, STORAGE: ClientStorage, CONFIRM: Confirmer> TaskManager<API, STORAGE, CONFIRM> {
    /// Starts logged out, whatever the storage holds; see `resume`.
    pub fn new(api: API, storage: STORAGE, confirmer: CONFIRM) -> Self {
        Self {
            api,
            storage,
            confirmer,
            state: AppState::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn storage(&self) -> &STORAGE {
        &self.storage
    }

    /// Picks up a session persisted by an earlier run and fetches its tasks.
    ///
    /// The stored token is not validated; an expired one surfaces as a failed
    /// fetch. Returns whether a session was found.
    pub async fn resume(&mut self) -> bool {
        let restored = SessionController::new(&self.api, &self.storage).restore();
        match restored {
            Ok(Some(session)) => {
                debug!(username = session.username(), "Resuming stored session");
                self.state.session = Some(session.clone());
                self.refresh(&session).await;
                true
            }
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "Could not read stored session");
                false
            }
        }
    }

    pub async fn dispatch(&mut self, command: Command) {
        debug!(command = command.name(), "Dispatching");
        match command {
            Command::Login { username, password } => self.login(&username, &password).await,
            Command::Logout => self.logout(),
            Command::Refresh => {
                if let Some(session) = self.require_session() {
                    self.refresh(&session).await;
                }
            }
            Command::OpenAddForm => self.state.form = Form::Adding(TaskDraft::default()),
            Command::EditTask(id) => match self.state.tasks.get(&id) {
                Some(task) => {
                    let draft = TaskDraft::from(task);
                    self.state.form = Form::Editing { id, draft };
                }
                None => debug!(%id, "Ignoring edit of a task that is not cached"),
            },
            Command::CancelForm => self.state.form = Form::Hidden,
            Command::SubmitForm(draft) => self.submit_form(draft).await,
            Command::AddTask(draft) => self.add_task(draft).await,
            Command::UpdateTask { id, draft } => self.update_task(id, draft).await,
            Command::DeleteTask(id) => self.delete_task(id).await,
            Command::ToggleComplete(id) => self.toggle_complete(id).await,
            Command::DismissNotification => self.state.notification = None,
        }
    }

    async fn login(&mut self, username: &str, password: &str) {
        self.state.login_error = None;
        let result = SessionController::new(&self.api, &self.storage)
            .login(username, password)
            .await;
        match result {
            Ok(session) => {
                self.state.session = Some(session.clone());
                self.state.form = Form::Hidden;
                self.refresh(&session).await;
            }
            Err(err) => self.state.login_error = Some(err.to_string()),
        }
    }

    fn logout(&mut self) {
        if let Err(err) = SessionController::new(&self.api, &self.storage).logout() {
            warn!(error = %err, "Could not clear stored session");
        }
        self.state.session = None;
        self.state.tasks.clear();
        self.state.form = Form::Hidden;
        self.state.login_error = None;
    }

    fn require_session(&mut self) -> Option<Session> {
        if self.state.session.is_none() {
            self.state.notification = Some(Notification::error(LOGIN_REQUIRED));
        }
        self.state.session.clone()
    }

    async fn refresh(&mut self, session: &Session) {
        let result = TaskStoreController::new(&self.api, &mut self.state.tasks)
            .fetch(session)
            .await;
        if let Err(err) = result {
            self.state.notification = Some(Notification::error(err.to_string()));
        }
    }

    async fn submit_form(&mut self, draft: TaskDraft) {
        match self.state.form.clone() {
            Form::Hidden => debug!("Ignoring submit without an open form"),
            Form::Adding(_) => {
                self.state.form = Form::Adding(draft.clone());
                self.add_task(draft).await;
            }
            Form::Editing { id, .. } => {
                self.state.form = Form::Editing {
                    id: id.clone(),
                    draft: draft.clone(),
                };
                self.update_task(id, draft).await;
            }
        }
    }

    async fn add_task(&mut self, draft: TaskDraft) {
        let Some(session) = self.require_session() else {
            return;
        };
        let result = TaskStoreController::new(&self.api, &mut self.state.tasks)
            .add(&session, draft)
            .await;
        if self.settle(result) {
            self.state.form = Form::Hidden;
        }
    }

    async fn update_task(&mut self, id: TaskId, draft: TaskDraft) {
        let Some(session) = self.require_session() else {
            return;
        };
        let result = TaskStoreController::new(&self.api, &mut self.state.tasks)
            .update(&session, id, draft)
            .await;
        if self.settle(result) {
            self.state.form = Form::Hidden;
        }
    }

    async fn delete_task(&mut self, id: TaskId) {
        let Some(session) = self.require_session() else {
            return;
        };
        let result = TaskStoreController::new(&self.api, &mut self.state.tasks)
            .delete(&session, id, &self.confirmer)
            .await;
        self.settle(result);
    }

    async fn toggle_complete(&mut self, id: TaskId) {
        let Some(session) = self.require_session() else {
            return;
        };
        let result = TaskStoreController::new(&self.api, &mut self.state.tasks)
            .toggle_complete(&session, id)
            .await;
        self.settle(result);
    }

    /// Records the outcome of a mutation. Returns whether the backend
    /// accepted it.
    fn settle(&mut self, result: Result<Notification, StoreError>) -> bool {
        match result {
            Ok(notification) => {
                self.state.notification = Some(notification);
                true
            }
            Err(err) if err.is_silent() => {
                debug!(%err, "Operation skipped");
                false
            }
            Err(err) => {
                self.state.notification = Some(Notification::error(err.to_string()));
                false
            }
        }
    }
}
