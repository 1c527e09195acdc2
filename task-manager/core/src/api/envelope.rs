//! Response envelope and the payloads carried in its `data` field.

use crate::api::ApiError;
use crate::task::Task;
use serde::Deserialize;

/// The `{success, data, message}` wrapper every backend response uses.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwraps the payload of a successful response.
    ///
    /// A successful envelope without `data` is treated like an unreadable
    /// response rather than an application failure.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(non_empty(self.message)));
        }
        self.data.ok_or(ApiError::MissingData)
    }

    /// Checks a response whose payload the client does not use.
    pub fn into_ack(self) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(ApiError::Rejected(non_empty(self.message)))
        }
    }
}

fn non_empty(message: Option<String>) -> Option<String> {
    message.filter(|message| !message.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginUser {
    pub username: String,
}

/// `data` of a successful `POST /api/login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginData {
    pub user: LoginUser,
    pub token: String,
}

/// `data` of a successful `GET /api/items`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}
