//! HTTP client for the remote decision engine.
//!
//! # Responsibilities
//! - POST evaluation requests as JSON
//! - Attach the configured bearer token
//! - Map transport, timeout, status and engine failures to `EngineError`
//!
//! # Design Decisions
//! - One attempt per call; a failure is reported, never retried here
//! - Timeouts are enforced by the reqwest client

use std::time::Duration;

use async_trait::async_trait;

use crate::config::EngineConfig;
use crate::engine::types::{EngineError, EngineResult, EvaluateDecisionRequest, RawDecisionResult};
use crate::engine::DecisionEngine;

/// Longest engine error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Decision engine reached over HTTP.
#[derive(Clone)]
pub struct HttpDecisionEngine {
    client: reqwest::Client,
    url: url::Url,
    auth_token: Option<String>,
    request_timeout_secs: u64,
}

impl HttpDecisionEngine {
    /// Create a new engine client.
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        let url: url::Url = config.url.parse().map_err(|e| {
            EngineError::Transport(format!("Invalid engine URL '{}': {}", config.url, e))
        })?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        tracing::info!(url = %url, "Decision engine client initialized");

        Ok(Self {
            client,
            url,
            auth_token: config.auth_token.clone(),
            request_timeout_secs: config.request_timeout_secs,
        })
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }

    fn map_send_error(&self, e: reqwest::Error) -> EngineError {
        if e.is_timeout() {
            EngineError::Timeout(self.request_timeout_secs)
        } else {
            EngineError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl DecisionEngine for HttpDecisionEngine {
    async fn evaluate_decision(
        &self,
        request: &EvaluateDecisionRequest,
    ) -> EngineResult<RawDecisionResult> {
        let mut builder = self.client.post(self.url.clone()).json(request);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            return Err(EngineError::Status {
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }

        let result: RawDecisionResult = serde_json::from_str(&text)
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        if let Some(message) = result.failure_message.as_deref().filter(|m| !m.is_empty()) {
            return Err(EngineError::Evaluation {
                decision_id: result.failed_decision_id.clone(),
                message: message.to_string(),
            });
        }

        Ok(result)
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
