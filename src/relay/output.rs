//! Decoding of the engine's `decisionOutput`.

use serde_json::Value;
use thiserror::Error;

/// Why a successful evaluation produced nothing to route on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatchReason {
    /// The engine returned no output at all (or `null`).
    NoOutput,
    /// The engine returned an empty result list (collect hit policy).
    EmptyResult,
}

impl NoMatchReason {
    pub fn as_str(self) -> &'static str {
        match self {
            NoMatchReason::NoOutput => "no_output",
            NoMatchReason::EmptyResult => "empty_result",
        }
    }
}

/// A decoded decision output.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionOutput {
    /// `value` is the first matching entry; `match_count` is how many the
    /// engine returned.
    Matched { value: Value, match_count: usize },
    NoMatch(NoMatchReason),
}

/// `decisionOutput` was a string that is not valid JSON.
#[derive(Debug, Error)]
#[error("Failed to parse decision output: {source}")]
pub struct OutputParseError {
    /// The undecoded text, verbatim.
    pub raw: String,
    #[source]
    pub source: serde_json::Error,
}

/// Decode a `decisionOutput` field.
///
/// Strings are JSON-decoded; structured values are used as they are. A list
/// collapses to its first entry.
pub fn parse_decision_output(output: Option<&Value>) -> Result<DecisionOutput, OutputParseError> {
    let decoded = match output {
        None | Some(Value::Null) => return Ok(DecisionOutput::NoMatch(NoMatchReason::NoOutput)),
        Some(Value::String(raw)) if raw.trim().is_empty() => {
            return Ok(DecisionOutput::NoMatch(NoMatchReason::NoOutput))
        }
        Some(Value::String(raw)) => {
            serde_json::from_str::<Value>(raw).map_err(|source| OutputParseError {
                raw: raw.clone(),
                source,
            })?
        }
        Some(structured) => structured.clone(),
    };

    Ok(match decoded {
        Value::Null => DecisionOutput::NoMatch(NoMatchReason::NoOutput),
        Value::Array(mut entries) => {
            let match_count = entries.len();
            if entries.is_empty() {
                DecisionOutput::NoMatch(NoMatchReason::EmptyResult)
            } else {
                DecisionOutput::Matched {
                    value: entries.swap_remove(0),
                    match_count,
                }
            }
        }
        value => DecisionOutput::Matched {
            value,
            match_count: 1,
        },
    })
}
