//! The reqwest-backed `TaskApi`.
//!
//! Transport failures and undecodable bodies become `ApiError::Network`.

use crate::api::{ApiError, Credentials, Envelope, LoginData, TaskApi, TaskList};
use crate::task::{Task, TaskDraft, TaskFields, TaskId};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::debug;

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// `TaskApi` over HTTP.
///
/// Response bodies are read as envelopes whatever the status code; the
/// backend signals failure through `success: false`.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTaskApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn item_url(&self, id: &TaskId) -> String {
        self.url(&format!("/api/items/{}", id))
    }

    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Envelope<T>, ApiError> {
        debug!(status = %response.status(), url = %response.url(), "Received response");
        Ok(response.json::<Envelope<T>>().await?)
    }
}

impl TaskApi for HttpTaskApi {
    #[tracing::instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn login(&self, credentials: Credentials) -> Result<LoginData, ApiError> {
        let response = self
            .client
            .post(self.url("/api/login"))
            .json(&credentials)
            .send()
            .await?;
        Self::read_envelope::<LoginData>(response).await?.into_data()
    }

    #[tracing::instrument(skip_all)]
    async fn list_tasks(&self, token: &str) -> Result<Vec<Task>, ApiError> {
        let response = self
            .client
            .get(self.url("/api/items"))
            .bearer_auth(token)
            .send()
            .await?;
        let list = Self::read_envelope::<TaskList>(response).await?.into_data()?;
        Ok(list.tasks)
    }

    #[tracing::instrument(skip(self, token))]
    async fn create_task(&self, token: &str, draft: TaskDraft) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/items"))
            .bearer_auth(token)
            .json(&draft)
            .send()
            .await?;
        Self::read_envelope::<IgnoredAny>(response).await?.into_ack()
    }

    #[tracing::instrument(skip(self, token))]
    async fn update_task(
        &self,
        token: &str,
        id: TaskId,
        fields: TaskFields,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.item_url(&id))
            .bearer_auth(token)
            .json(&fields)
            .send()
            .await?;
        Self::read_envelope::<IgnoredAny>(response).await?.into_ack()
    }

    #[tracing::instrument(skip(self, token))]
    async fn delete_task(&self, token: &str, id: TaskId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.item_url(&id))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_envelope::<IgnoredAny>(response).await?.into_ack()
    }
}
