use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::models::job::JobUpdate;
use crate::models::status::{PublicStatus, SubmitResponse};
use crate::services::poller::{SourceError, StatusSource};

/// HTTP client for a running tracker's `/api/v1/jobs` endpoints.
pub struct JobApiClient {
    http: Client,
    base_url: String,
}

impl JobApiClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST /api/v1/jobs
    pub async fn submit(
        &self,
        parameters: &serde_json::Value,
    ) -> Result<SubmitResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/v1/jobs", self.base_url))
            .json(parameters)
            .send()
            .await?;

        Self::decode(response, None).await
    }

    /// GET /api/v1/jobs/{id}
    pub async fn status(&self, id: &str) -> Result<PublicStatus, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/v1/jobs/{}", self.base_url, id))
            .send()
            .await?;

        Self::decode(response, Some(id)).await
    }

    /// PATCH /api/v1/jobs/{id}
    pub async fn update(&self, id: &str, update: &JobUpdate) -> Result<PublicStatus, ClientError> {
        let response = self
            .http
            .patch(format!("{}/api/v1/jobs/{}", self.base_url, id))
            .json(update)
            .send()
            .await?;

        Self::decode(response, Some(id)).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        id: Option<&str>,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(ClientError::NotFound(id.to_string()));
            }
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(response.json::<T>().await?)
    }
}

impl StatusSource for JobApiClient {
    async fn status(&self, id: &str) -> Result<PublicStatus, SourceError> {
        JobApiClient::status(self, id).await.map_err(|e| match e {
            ClientError::NotFound(id) => SourceError::NotFound(id),
            other => SourceError::Unavailable(other.to_string()),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Unexpected response {status}: {body}")]
    Status { status: StatusCode, body: String },
}
