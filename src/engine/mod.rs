//! Decision engine capability.
//!
//! The engine itself (DMN table evaluation) is an external service. This
//! module defines the one operation the evaluator needs from it and the HTTP
//! client that provides it in production. Tests substitute their own
//! `DecisionEngine`.

pub mod client;
pub mod types;

use async_trait::async_trait;

pub use client::HttpDecisionEngine;
pub use types::{DecisionIds, EngineError, EngineResult, EvaluateDecisionRequest, RawDecisionResult};

/// Evaluates a named decision against a set of input variables.
#[async_trait]
pub trait DecisionEngine: Send + Sync {
    async fn evaluate_decision(
        &self,
        request: &EvaluateDecisionRequest,
    ) -> EngineResult<RawDecisionResult>;
}
