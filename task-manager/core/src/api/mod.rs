//! Backend connectivity for the task manager.
//!
//! This module provides:
//! - The `TaskApi` trait describing the REST calls the client makes
//! - `ApiError`, which separates failed requests from rejected ones
//! - The `{success, data, message}` envelope every response is wrapped in
//!
//! `HttpTaskApi` implements the trait over HTTP with reqwest. Callers are
//! tested against the generated `MockTaskApi`.

use crate::task::{Task, TaskDraft, TaskFields, TaskId};
use mockall::automock;
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use thiserror::Error;

mod envelope;
mod http;

pub use envelope::{Envelope, LoginData, LoginUser, TaskList};
pub use http::HttpTaskApi;

/// Ways a backend call can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// No usable response: the request never completed or the body was unreadable.
    #[error("Request failed: {0}")]
    Network(String),
    /// The backend reported success but left out the payload.
    #[error("Response is missing its data")]
    MissingData,
    /// The backend answered with `success: false`.
    #[error("{}", .0.as_deref().unwrap_or("Request was rejected"))]
    Rejected(Option<String>),
}

/// Body of `POST /api/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The REST surface of the task backend.
///
/// Every call except `login` authenticates with a bearer token. A response
/// with `success: false` comes back as `ApiError::Rejected` carrying the
/// backend's message, whatever the HTTP status.
#[automock]
pub trait TaskApi {
    /// Exchanges credentials for a bearer token (`POST /api/login`).
    ///
    /// # Returns
    ///
    /// * `Result<LoginData, ApiError>` - The user and token on success, or the rejection
    async fn login(&self, credentials: Credentials) -> Result<LoginData, ApiError>;
    /// Fetches every task of the token's owner (`GET /api/items`).
    ///
    /// # Returns
    ///
    /// * `Result<Vec<Task>, ApiError>` - The full task list in backend order
    async fn list_tasks(&self, token: &str) -> Result<Vec<Task>, ApiError>;
    /// `POST /api/items`
    async fn create_task(&self, token: &str, draft: TaskDraft) -> Result<(), ApiError>;
    /// Replaces the fields of a task (`PUT /api/items/:id`).
    ///
    /// # Arguments
    ///
    /// * `id` - The task id, echoed verbatim into the path
    /// * `fields` - The full replacement fields; `completed` is sent only when set
    async fn update_task(
        &self,
        token: &str,
        id: TaskId,
        fields: TaskFields,
    ) -> Result<(), ApiError>;
    /// `DELETE /api/items/:id`
    async fn delete_task(&self, token: &str, id: TaskId) -> Result<(), ApiError>;
}
