//! Login/logout lifecycle and the bearer token.

use crate::api::{ApiError, Credentials, TaskApi};
use crate::storage::{ClientStorage, StorageError, TOKEN_KEY, USERNAME_KEY};
use std::fmt::{Debug, Formatter};
use thiserror::Error;
use tracing::{info, warn};

pub const LOGIN_FAILED: &str = "Login failed";

/// An authenticated identity and the bearer token that proves it.
///
/// Store operations take a `&Session` explicitly; nothing reads the token
/// from storage behind their back.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    username: String,
    token: String,
}

impl Session {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Why a login attempt did not produce a session. The `Display` text is
/// what the user is shown.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("{0}")]
    Rejected(String),
    #[error("Network error")]
    Network,
}

pub struct SessionController<'a, API: TaskApi, STORAGE: ClientStorage> {
    api: &'a API,
    storage: &'a STORAGE,
}

impl<'a, API: TaskApi, STORAGE: ClientStorage> SessionController<'a, API, STORAGE> {
    pub fn new(api: &'a API, storage: &'a STORAGE) -> Self {
        Self { api, storage }
    }

    /// Exchanges credentials for a session and persists its token.
    ///
    /// Storage is only written after the backend accepts the credentials.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, SessionError> {
        match self.api.login(Credentials::new(username, password)).await {
            Ok(data) => {
                let session = Session::new(data.user.username, data.token);
                self.persist(&session);
                info!(username = session.username(), "Logged in");
                Ok(session)
            }
            Err(ApiError::Rejected(message)) => {
                warn!(?message, "Login rejected");
                Err(SessionError::Rejected(
                    message.unwrap_or_else(|| LOGIN_FAILED.to_string()),
                ))
            }
            Err(err) => {
                warn!(error = %err, "Login request failed");
                Err(SessionError::Network)
            }
        }
    }

    fn persist(&self, session: &Session) {
        let result = self
            .storage
            .set(TOKEN_KEY, session.token())
            .and_then(|_| self.storage.set(USERNAME_KEY, session.username()));
        if let Err(err) = result {
            warn!(error = %err, "Could not persist session; it will not survive a restart");
        }
    }

    /// Forgets the persisted session. No backend call is made.
    #[tracing::instrument(skip(self))]
    pub fn logout(&self) -> Result<(), StorageError> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USERNAME_KEY)?;
        info!("Logged out");
        Ok(())
    }

    /// Rebuilds the session from a stored token without asking the backend
    /// whether it is still valid.
    pub fn restore(&self) -> Result<Option<Session>, StorageError> {
        let Some(token) = self.storage.get(TOKEN_KEY)? else {
            return Ok(None);
        };
        let username = self.storage.get(USERNAME_KEY)?.unwrap_or_default();
        Ok(Some(Session::new(username, token)))
    }
}
