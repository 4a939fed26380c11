//! Client for the evaluator's own HTTP API.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Evaluator returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Response was not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Thin wrapper over the `/` and `/evaluate` endpoints.
pub struct EvaluatorClient {
    client: Client,
    base_url: String,
}

impl EvaluatorClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Liveness probe.
    pub async fn health(&self) -> Result<Value, ClientError> {
        let resp = self.client.get(format!("{}/", self.base_url)).send().await?;
        Self::json_or_error(resp).await
    }

    /// Submit a payload for evaluation. Non-2xx answers become
    /// `ClientError::Status` carrying the evaluator's error body.
    pub async fn evaluate(&self, payload: &Value) -> Result<Value, ClientError> {
        let resp = self
            .client
            .post(format!("{}/evaluate", self.base_url))
            .json(payload)
            .send()
            .await?;
        Self::json_or_error(resp).await
    }

    async fn json_or_error(resp: reqwest::Response) -> Result<Value, ClientError> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status { status, body: text });
        }

        Ok(serde_json::from_str(&text)?)
    }
}
