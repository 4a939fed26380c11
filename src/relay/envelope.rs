//! Per-record result envelopes and the record-scoped error class.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{json, Value};
use thiserror::Error;

use crate::engine::EngineError;
use crate::payload::ValidationError;
use crate::relay::output::OutputParseError;

/// Placeholder for metadata the engine did not report.
pub const META_PLACEHOLDER: &str = "unknown";

/// Output reported when no rule matched.
pub fn no_match_sentinel() -> Value {
    json!({ "dmn_evaluation": "No matching rule" })
}

/// Failure confined to one record. Siblings keep processing.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    RemoteEvaluation(#[from] EngineError),

    #[error(transparent)]
    OutputParse(#[from] OutputParseError),
}

/// Machine-readable category of a record failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    RemoteEvaluation,
    OutputParse,
}

impl RecordError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecordError::Validation(_) => ErrorKind::Validation,
            RecordError::RemoteEvaluation(_) => ErrorKind::RemoteEvaluation,
            RecordError::OutputParse(_) => ErrorKind::OutputParse,
        }
    }

    fn detail(&self) -> Option<Value> {
        match self {
            RecordError::OutputParse(e) => Some(json!({ "raw": e.raw })),
            RecordError::RemoteEvaluation(EngineError::Status { status, .. }) => {
                Some(json!({ "status": status }))
            }
            RecordError::RemoteEvaluation(EngineError::Evaluation {
                decision_id: Some(id),
                ..
            }) => Some(json!({ "failed_decision_id": id })),
            _ => None,
        }
    }
}

/// Error description carried by a failed envelope.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl From<&RecordError> for ErrorBody {
    fn from(err: &RecordError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            detail: err.detail(),
        }
    }
}

/// Passthrough metadata about the evaluated decision.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DecisionMeta {
    pub decision_id: String,
    pub decision_name: String,
    pub decision_definition_id: String,
    pub decision_requirements_id: String,
    pub tenant_id: String,
    pub matched: bool,
    pub match_count: usize,
}

/// Outcome for one input record.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultEnvelope {
    Evaluated {
        input: Value,
        output: Value,
        meta: DecisionMeta,
    },
    Failed {
        input: Value,
        error: ErrorBody,
    },
}

impl ResultEnvelope {
    pub fn failed(input: Value, err: &RecordError) -> Self {
        ResultEnvelope::Failed {
            input,
            error: err.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ResultEnvelope::Evaluated { .. })
    }

    pub fn input(&self) -> &Value {
        match self {
            ResultEnvelope::Evaluated { input, .. } | ResultEnvelope::Failed { input, .. } => input,
        }
    }
}

impl Serialize for ResultEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResultEnvelope::Evaluated {
                input,
                output,
                meta,
            } => {
                let mut s = serializer.serialize_struct("ResultEnvelope", 4)?;
                s.serialize_field("ok", &true)?;
                s.serialize_field("input", input)?;
                s.serialize_field("output", output)?;
                s.serialize_field("meta", meta)?;
                s.end()
            }
            ResultEnvelope::Failed { input, error } => {
                let mut s = serializer.serialize_struct("ResultEnvelope", 3)?;
                s.serialize_field("ok", &false)?;
                s.serialize_field("input", input)?;
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}
