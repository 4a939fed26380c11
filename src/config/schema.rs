//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the evaluator.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::engine::DecisionIds;

/// Root configuration for the evaluator service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Which decision table every request is evaluated against.
    pub decision: DecisionConfig,

    /// Remote decision engine endpoint.
    pub engine: EngineConfig,

    /// Per-request record dispatch.
    pub dispatch: DispatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request limits.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Fixed decision identifiers for this deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Decision id inside the DMN model.
    pub decision_id: String,

    /// Id of the decision requirements graph (DRG) the decision lives in.
    pub requirements_id: String,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            decision_id: "dec_email_routing".to_string(),
            requirements_id: "defs_email_routing".to_string(),
        }
    }
}

impl DecisionConfig {
    pub fn ids(&self) -> DecisionIds {
        DecisionIds::new(&self.decision_id, &self.requirements_id)
    }
}

/// Decision engine client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Full URL of the decision evaluation endpoint.
    pub url: String,

    /// Optional bearer token sent with every evaluation.
    pub auth_token: Option<String>,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total time allowed for one evaluation call in seconds.
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/v2/decision-definitions/evaluation".to_string(),
            auth_token: None,
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
        }
    }
}

/// Record dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum engine calls in flight for one request (1 = sequential).
    pub concurrency: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: EvaluatorConfig = toml::from_str(
            r#"
            [decision]
            decision_id = "dec_triage"

            [dispatch]
            concurrency = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.decision.decision_id, "dec_triage");
        assert_eq!(config.decision.requirements_id, "defs_email_routing");
        assert_eq!(config.dispatch.concurrency, 1);
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn log_format_is_snake_case() {
        let config: EvaluatorConfig = toml::from_str(
            r#"
            [observability]
            log_format = "compact"
            "#,
        )
        .unwrap();
        assert_eq!(config.observability.log_format, LogFormat::Compact);
    }
}
