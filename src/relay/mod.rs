//! Decision relay subsystem.
//!
//! # Data Flow
//! ```text
//! CanonicalRecord
//!     → to_variables()
//!     → DecisionEngine::evaluate_decision (one remote call, fixed ids)
//!     → output.rs (decode decisionOutput)
//!     → envelope.rs (ResultEnvelope: ok + output + meta, or error)
//! ```
//!
//! # Design Decisions
//! - Stateless between calls; the engine handle and ids are read-only
//! - Remote failures and local decode failures stay distinct
//! - No match is a successful outcome, not an error

pub mod envelope;
pub mod output;

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::engine::{DecisionEngine, DecisionIds, EvaluateDecisionRequest, RawDecisionResult};
use crate::observability::metrics;
use crate::payload::CanonicalRecord;

pub use envelope::{
    no_match_sentinel, DecisionMeta, ErrorBody, ErrorKind, RecordError, ResultEnvelope,
    META_PLACEHOLDER,
};
pub use output::{parse_decision_output, DecisionOutput, NoMatchReason, OutputParseError};

/// Sends canonical records to the decision engine and shapes the answers.
#[derive(Clone)]
pub struct DecisionRelay {
    engine: Arc<dyn DecisionEngine>,
    ids: DecisionIds,
}

impl DecisionRelay {
    pub fn new(engine: Arc<dyn DecisionEngine>, ids: DecisionIds) -> Self {
        Self { engine, ids }
    }

    pub fn ids(&self) -> &DecisionIds {
        &self.ids
    }

    /// Evaluate one record and wrap the outcome. Never fails: errors become a
    /// failed envelope that keeps the input.
    pub async fn relay(&self, record: &CanonicalRecord) -> ResultEnvelope {
        let variables = record.to_variables();
        let request = EvaluateDecisionRequest::new(&self.ids, variables);
        let input = Value::Object(request.variables.clone());

        match self.evaluate(&request).await {
            Ok((output, raw)) => {
                let (output, matched, match_count) = match output {
                    DecisionOutput::Matched { value, match_count } => (value, true, match_count),
                    DecisionOutput::NoMatch(reason) => {
                        tracing::info!(
                            decision_id = %self.ids.decision_id,
                            reason = reason.as_str(),
                            "No matching rule"
                        );
                        (no_match_sentinel(), false, 0)
                    }
                };
                ResultEnvelope::Evaluated {
                    input,
                    output,
                    meta: self.meta(&raw, matched, match_count),
                }
            }
            Err(err) => {
                tracing::warn!(
                    decision_id = %self.ids.decision_id,
                    kind = ?err.kind(),
                    error = %err,
                    "Decision relay failed"
                );
                ResultEnvelope::failed(input, &err)
            }
        }
    }

    /// One remote call followed by output decoding.
    pub async fn evaluate(
        &self,
        request: &EvaluateDecisionRequest,
    ) -> Result<(DecisionOutput, RawDecisionResult), RecordError> {
        let start = Instant::now();
        let raw = match self.engine.evaluate_decision(request).await {
            Ok(raw) => {
                metrics::record_engine_call("ok", start);
                raw
            }
            Err(e) => {
                metrics::record_engine_call("error", start);
                return Err(e.into());
            }
        };

        tracing::debug!(
            decision_id = %self.ids.decision_id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Decision evaluation completed"
        );

        let output = parse_decision_output(raw.decision_output.as_ref())?;
        Ok((output, raw))
    }

    fn meta(&self, raw: &RawDecisionResult, matched: bool, match_count: usize) -> DecisionMeta {
        let or_placeholder = |value: &Option<String>| {
            value
                .clone()
                .unwrap_or_else(|| META_PLACEHOLDER.to_string())
        };
        DecisionMeta {
            decision_id: or_placeholder(&raw.decision_id),
            decision_name: or_placeholder(&raw.decision_name),
            decision_definition_id: or_placeholder(&raw.decision_definition_id),
            decision_requirements_id: or_placeholder(&raw.decision_requirements_id),
            tenant_id: or_placeholder(&raw.tenant_id),
            matched,
            match_count,
        }
    }
}
