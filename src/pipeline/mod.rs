//! Request pipeline: normalize, relay, aggregate.
//!
//! # Data Flow
//! ```text
//! Request body
//!     → payload::normalize (candidates, in order)
//!     → zero candidates? → PipelineError::ExtractionEmpty
//!     → per candidate: invalid → validation envelope
//!                      valid   → DecisionRelay::relay
//!     → EvaluationReport { evaluated_at, results }
//! ```
//!
//! # Design Decisions
//! - Two error classes: `PipelineError` fails the request, `RecordError`
//!   fails only its record
//! - Records may run concurrently; results keep input order
//! - Panics are caught here and never reach the transport layer

pub mod aggregator;

pub use aggregator::{EvaluationReport, Pipeline, PipelineError};
