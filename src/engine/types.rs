//! Decision engine wire types and error definitions.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Fixed (decision id, requirements id) pair naming the decision table to
/// evaluate. Configured per deployment, never derived from a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionIds {
    pub decision_id: String,
    pub decision_requirements_id: String,
}

impl DecisionIds {
    pub fn new(decision_id: impl Into<String>, requirements_id: impl Into<String>) -> Self {
        Self {
            decision_id: decision_id.into(),
            decision_requirements_id: requirements_id.into(),
        }
    }
}

/// Body of one evaluation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateDecisionRequest {
    pub decision_id: String,
    pub decision_requirements_id: String,
    pub variables: Map<String, Value>,
}

impl EvaluateDecisionRequest {
    pub fn new(ids: &DecisionIds, variables: Map<String, Value>) -> Self {
        Self {
            decision_id: ids.decision_id.clone(),
            decision_requirements_id: ids.decision_requirements_id.clone(),
            variables,
        }
    }
}

/// What the engine sends back. Every field is optional on the wire.
///
/// Metadata is passed through, so a field of an unexpected type never fails
/// the decode: numbers and booleans keep their text form, anything else is
/// treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDecisionResult {
    /// Usually a JSON-encoded string; some engines send structured JSON.
    pub decision_output: Option<Value>,
    #[serde(deserialize_with = "lenient_string")]
    pub decision_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub decision_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub decision_definition_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub decision_requirements_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub tenant_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub failed_decision_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub failure_message: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Errors from the remote evaluation call.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Request could not be sent or the connection broke.
    #[error("Decision engine request failed: {0}")]
    Transport(String),

    /// No response within the configured deadline.
    #[error("Decision engine timed out after {0} seconds")]
    Timeout(u64),

    /// Engine answered with a non-success status.
    #[error("Decision engine returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Engine answered but reported the evaluation as failed.
    #[error("Decision evaluation failed{}: {message}", decision_suffix(.decision_id))]
    Evaluation {
        decision_id: Option<String>,
        message: String,
    },

    /// Response body was not a decision result.
    #[error("Invalid response from decision engine: {0}")]
    InvalidResponse(String),
}

fn decision_suffix(decision_id: &Option<String>) -> String {
    decision_id
        .as_ref()
        .map(|id| format!(" for decision '{}'", id))
        .unwrap_or_default()
}

pub type EngineResult<T> = Result<T, EngineError>;
