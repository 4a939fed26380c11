//! Turns a raw request body into an ordered list of validated candidates.

use serde_json::Value;

use crate::payload::record::{
    CanonicalRecord, ClassificationRecord, EmailRecord, ValidationError,
};
use crate::payload::shape::{unwrap_element, PayloadShape};

/// One extracted candidate. Invalid candidates are kept so the caller can
/// report them individually.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The candidate as the client sent it.
    pub raw: Value,
    pub outcome: Result<CanonicalRecord, ValidationError>,
}

impl Candidate {
    fn email(raw: &Value) -> Self {
        Self {
            raw: raw.clone(),
            outcome: EmailRecord::from_value(raw).map(CanonicalRecord::Email),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Extract and validate every candidate in `payload`, preserving order.
///
/// Pure: the same payload always yields the same candidates.
pub fn normalize(payload: &Value) -> Vec<Candidate> {
    match PayloadShape::classify(payload) {
        PayloadShape::Sequence(items) => items
            .iter()
            .map(|item| Candidate::email(unwrap_element(item)))
            .collect(),
        PayloadShape::EmailsWrapper(items) => items.iter().map(Candidate::email).collect(),
        PayloadShape::EmailWrapper(email) | PayloadShape::BareEmail(email) => {
            vec![Candidate::email(email)]
        }
        PayloadShape::ScalarRoute { key, value } => {
            let record = ClassificationRecord::from_scalar(key, value);
            let mut raw = serde_json::Map::new();
            raw.insert(key.as_str().to_string(), value.clone());
            vec![Candidate {
                raw: Value::Object(raw),
                outcome: record.map(CanonicalRecord::Classification),
            }]
        }
        PayloadShape::Unrecognized => Vec::new(),
    }
}
