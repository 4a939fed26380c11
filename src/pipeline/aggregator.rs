//! Drives candidates through the relay and assembles the response.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::{stream, FutureExt, StreamExt};
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::observability::metrics;
use crate::payload::{normalize, Candidate};
use crate::relay::{DecisionRelay, RecordError, ResultEnvelope};

/// Message for a body with nothing to evaluate.
pub const NO_CANDIDATES_MESSAGE: &str = "No emails found in request body";

/// Failure of the whole request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{}", NO_CANDIDATES_MESSAGE)]
    ExtractionEmpty,

    #[error("Unhandled pipeline fault: {0}")]
    Unhandled(String),
}

/// Response of a processed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    #[serde(serialize_with = "iso_millis")]
    pub evaluated_at: DateTime<Utc>,
    pub results: Vec<ResultEnvelope>,
}

fn iso_millis<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Normalizer and relay composed for one deployment.
#[derive(Clone)]
pub struct Pipeline {
    relay: DecisionRelay,
    concurrency: usize,
}

impl Pipeline {
    /// `concurrency` bounds the engine calls in flight per request; 1 runs
    /// records strictly one after another.
    pub fn new(relay: DecisionRelay, concurrency: usize) -> Self {
        Self {
            relay,
            concurrency: concurrency.max(1),
        }
    }

    pub fn relay(&self) -> &DecisionRelay {
        &self.relay
    }

    /// Evaluate a request body.
    pub async fn evaluate(&self, payload: &Value) -> Result<EvaluationReport, PipelineError> {
        AssertUnwindSafe(self.run(payload))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                let message = panic_message(panic.as_ref());
                tracing::error!(error = %message, "Pipeline panicked");
                Err(PipelineError::Unhandled(message))
            })
    }

    async fn run(&self, payload: &Value) -> Result<EvaluationReport, PipelineError> {
        let candidates = normalize(payload);
        if candidates.is_empty() {
            tracing::warn!("No candidates found in request body");
            return Err(PipelineError::ExtractionEmpty);
        }

        tracing::info!(
            candidates = candidates.len(),
            valid = candidates.iter().filter(|c| c.is_valid()).count(),
            "Payload normalized"
        );

        let results: Vec<ResultEnvelope> = stream::iter(candidates.into_iter().enumerate())
            .map(|(index, candidate)| self.process(index, candidate))
            .buffered(self.concurrency)
            .collect()
            .await;

        Ok(EvaluationReport {
            evaluated_at: Utc::now(),
            results,
        })
    }

    async fn process(&self, index: usize, candidate: Candidate) -> ResultEnvelope {
        let envelope = match candidate.outcome {
            Err(err) => {
                tracing::warn!(index, error = %err, "Skipping invalid candidate");
                ResultEnvelope::failed(candidate.raw, &RecordError::from(err))
            }
            Ok(record) => {
                tracing::debug!(index, kind = record.kind(), "Relaying record");
                self.relay.relay(&record).await
            }
        };

        metrics::record_outcome(outcome_label(&envelope));
        envelope
    }
}

fn outcome_label(envelope: &ResultEnvelope) -> &'static str {
    match envelope {
        ResultEnvelope::Evaluated { .. } => "ok",
        ResultEnvelope::Failed { error, .. } => match error.kind {
            crate::relay::ErrorKind::Validation => "validation",
            crate::relay::ErrorKind::RemoteEvaluation => "remote_evaluation",
            crate::relay::ErrorKind::OutputParse => "output_parse",
        },
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
