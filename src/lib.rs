//! DMN email routing evaluator.

pub mod client;
pub mod config;
pub mod engine;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod payload;
pub mod pipeline;
pub mod relay;

pub use config::EvaluatorConfig;
pub use engine::{DecisionEngine, HttpDecisionEngine};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{EvaluationReport, Pipeline, PipelineError};
