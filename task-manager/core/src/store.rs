//! The cached task list and the operations that mutate it on the backend.
//!
//! Every mutation is followed by a full re-fetch; the cache is only ever
//! replaced wholesale with what the backend returned, never patched.

use crate::api::{ApiError, TaskApi};
use crate::notification::Notification;
use crate::session::Session;
use crate::task::{Task, TaskDraft, TaskFields, TaskId};
use mockall::automock;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

/// Asks the user to confirm a destructive action.
#[automock]
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Why a store operation did not go through. The `Display` text is what the
/// user is shown.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Task title cannot be empty")]
    BlankTitle,
    #[error("Deletion was not confirmed")]
    NotConfirmed,
    #[error("Task {0} is not in the task list")]
    UnknownTask(TaskId),
    #[error("{0}")]
    Failed(String),
}

impl StoreError {
    /// Local rejections that never reached the backend and are not worth a
    /// notification.
    pub fn is_silent(&self) -> bool {
        !matches!(self, StoreError::Failed(_))
    }
}

/// User-facing texts of one kind of operation.
struct Messages {
    success: &'static str,
    rejected: &'static str,
    network: &'static str,
}

const FETCH: Messages = Messages {
    success: "Tasks refreshed",
    rejected: "Failed to fetch tasks",
    network: "Network error while fetching tasks",
};

const ADD: Messages = Messages {
    success: "Task added successfully!",
    rejected: "Failed to add task",
    network: "Network error while adding task",
};

const UPDATE: Messages = Messages {
    success: "Task updated successfully!",
    rejected: "Failed to update task",
    network: "Network error while updating task",
};

const DELETE: Messages = Messages {
    success: "Task deleted successfully!",
    rejected: "Failed to delete task",
    network: "Network error while deleting task",
};

const TOGGLE: Messages = Messages {
    success: "Task status updated!",
    rejected: "Failed to update task",
    network: "Network error while updating task",
};

impl Messages {
    fn failure(&self, err: ApiError) -> StoreError {
        match err {
            ApiError::Rejected(message) => {
                StoreError::Failed(message.unwrap_or_else(|| self.rejected.to_string()))
            }
            _ => StoreError::Failed(self.network.to_string()),
        }
    }
}

/// Verbatim copy of the last successful fetch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TaskCache {
    tasks: Vec<Task>,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

impl From<Vec<Task>> for TaskCache {
    fn from(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

pub struct TaskStoreController<'a, API: TaskApi> {
    api: &'a API,
    cache: &'a mut TaskCache,
}

impl<'a, API: TaskApi> TaskStoreController<'a, API> {
    pub fn new(api: &'a API, cache: &'a mut TaskCache) -> Self {
        Self { api, cache }
    }

    /// Replaces the cache with the backend's list; empties it on failure.
    #[tracing::instrument(skip_all, fields(username = session.username()))]
    pub async fn fetch(&mut self, session: &Session) -> Result<usize, StoreError> {
        match self.api.list_tasks(session.token()).await {
            Ok(tasks) => {
                self.cache.replace(tasks);
                debug!(count = self.cache.len(), "{}", FETCH.success);
                Ok(self.cache.len())
            }
            Err(err) => {
                self.cache.clear();
                warn!(error = %err, "Fetching tasks failed");
                Err(FETCH.failure(err))
            }
        }
    }

    /// Blank titles are rejected before any request is made.
    #[tracing::instrument(skip(self, session))]
    pub async fn add(
        &mut self,
        session: &Session,
        draft: TaskDraft,
    ) -> Result<Notification, StoreError> {
        if draft.is_blank() {
            return Err(StoreError::BlankTitle);
        }
        self.api
            .create_task(session.token(), draft)
            .await
            .map_err(|err| ADD.failure(err))?;
        Ok(self.refresh(session, &ADD).await)
    }

    /// Submits full replacement fields. The cached completion flag is carried
    /// along so an edit does not reopen a finished task.
    #[tracing::instrument(skip(self, session))]
    pub async fn update(
        &mut self,
        session: &Session,
        id: TaskId,
        draft: TaskDraft,
    ) -> Result<Notification, StoreError> {
        if draft.is_blank() {
            return Err(StoreError::BlankTitle);
        }
        let completed = self.cache.get(&id).map(|task| task.completed);
        let fields = TaskFields::from_draft(draft, completed);
        self.api
            .update_task(session.token(), id, fields)
            .await
            .map_err(|err| UPDATE.failure(err))?;
        Ok(self.refresh(session, &UPDATE).await)
    }

    #[tracing::instrument(skip(self, session, confirmer))]
    pub async fn delete<C: Confirmer>(
        &mut self,
        session: &Session,
        id: TaskId,
        confirmer: &C,
    ) -> Result<Notification, StoreError> {
        if !confirmer.confirm(DELETE_PROMPT) {
            return Err(StoreError::NotConfirmed);
        }
        self.api
            .delete_task(session.token(), id)
            .await
            .map_err(|err| DELETE.failure(err))?;
        Ok(self.refresh(session, &DELETE).await)
    }

    /// Flips `completed` on a cached task, keeping its other fields.
    #[tracing::instrument(skip(self, session))]
    pub async fn toggle_complete(
        &mut self,
        session: &Session,
        id: TaskId,
    ) -> Result<Notification, StoreError> {
        let task = self
            .cache
            .get(&id)
            .ok_or_else(|| StoreError::UnknownTask(id.clone()))?;
        let fields = TaskFields::toggled(task);
        self.api
            .update_task(session.token(), id, fields)
            .await
            .map_err(|err| TOGGLE.failure(err))?;
        Ok(self.refresh(session, &TOGGLE).await)
    }

    /// Re-fetches after an accepted mutation. The fetch outcome arrives last,
    /// so its error wins over the mutation's success message.
    async fn refresh(&mut self, session: &Session, messages: &Messages) -> Notification {
        match self.fetch(session).await {
            Ok(_) => {
                info!("{}", messages.success);
                Notification::success(messages.success)
            }
            Err(err) => Notification::error(err.to_string()),
        }
    }
}
