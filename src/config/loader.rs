//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::EvaluatorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply process environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<EvaluatorConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => EvaluatorConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<EvaluatorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment variables onto a loaded configuration.
///
/// Recognised variables: `DMN_DECISION_ID`, `DMN_REQUIREMENTS_ID`,
/// `DMN_ENGINE_URL`, `DMN_ENGINE_TOKEN`, `DMN_LOG_LEVEL` and `PORT` (replaces
/// the port of `listener.bind_address`).
pub fn apply_env_overrides<F>(config: &mut EvaluatorConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(id) = get("DMN_DECISION_ID") {
        config.decision.decision_id = id;
    }
    if let Some(id) = get("DMN_REQUIREMENTS_ID") {
        config.decision.requirements_id = id;
    }
    if let Some(url) = get("DMN_ENGINE_URL") {
        config.engine.url = url;
    }
    if let Some(token) = get("DMN_ENGINE_TOKEN") {
        config.engine.auth_token = Some(token);
    }
    if let Some(level) = get("DMN_LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(port) = get("PORT") {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::Env {
            var: "PORT",
            message: format!("'{}' is not a port number", port),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn env_overrides_decision_and_port() {
        let mut config = EvaluatorConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("DMN_DECISION_ID", "dec_other"),
                ("DMN_ENGINE_TOKEN", "secret"),
                ("PORT", "8099"),
            ]),
        )
        .unwrap();

        assert_eq!(config.decision.decision_id, "dec_other");
        assert_eq!(config.decision.requirements_id, "defs_email_routing");
        assert_eq!(config.engine.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.listener.bind_address, "0.0.0.0:8099");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = EvaluatorConfig::default();
        apply_env_overrides(&mut config, env(&[("DMN_DECISION_ID", "  ")])).unwrap();
        assert_eq!(config.decision.decision_id, "dec_email_routing");
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut config = EvaluatorConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = parse_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
