//! Canonical decision input records.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::payload::shape::{non_empty_str, resolve_sender, resolve_subject, ClassificationKey};

/// A candidate failed validation and will not be sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: email.from.email / email.from_ / email.fromEmail or email.subject")]
    MissingEmailFields,

    #[error("Missing required field: {0} must be a non-empty string")]
    InvalidClassification(&'static str),
}

/// Canonical email input (variables for the email routing decision).
#[derive(Debug, Clone, PartialEq)]
pub struct EmailRecord {
    pub from: String,
    pub subject: String,
    pub body_text: String,
    pub attachments: Vec<Value>,
    pub headers: Map<String, Value>,
    pub to: Vec<Value>,
    pub cc: Vec<Value>,
    pub bcc: Vec<Value>,
    pub message_id: Option<String>,
    pub internet_message_id: Option<String>,
}

impl EmailRecord {
    /// Build the canonical form of an email candidate. Fails when the subject
    /// or sender cannot be resolved; every optional field falls back to its
    /// empty default.
    pub fn from_value(email: &Value) -> Result<Self, ValidationError> {
        let (Some(from), Some(subject)) = (resolve_sender(email), resolve_subject(email)) else {
            return Err(ValidationError::MissingEmailFields);
        };

        let body_text = ["body_text", "body"]
            .into_iter()
            .find_map(|field| email.get(field).and_then(non_empty_str))
            .unwrap_or_default();

        Ok(Self {
            from: from.to_string(),
            subject: subject.to_string(),
            body_text: body_text.to_string(),
            attachments: sequence(email.get("attachments")),
            headers: match email.get("headers") {
                Some(Value::Object(headers)) => headers.clone(),
                _ => Map::new(),
            },
            to: sequence(email.get("to")),
            cc: sequence(email.get("cc")),
            bcc: sequence(email.get("bcc")),
            message_id: optional_string(email.get("message_id")),
            internet_message_id: optional_string(email.get("internet_message_id")),
        })
    }
}

impl EmailRecord {
    /// Decision variables for the email routing decision. Every field is
    /// present, optional ones as `null`.
    pub fn to_variables(&self) -> Map<String, Value> {
        let optional = |value: &Option<String>| value.clone().map_or(Value::Null, Value::String);
        Map::from_iter([
            ("from".to_string(), Value::String(self.from.clone())),
            ("subject".to_string(), Value::String(self.subject.clone())),
            ("body_text".to_string(), Value::String(self.body_text.clone())),
            ("attachments".to_string(), Value::Array(self.attachments.clone())),
            ("headers".to_string(), Value::Object(self.headers.clone())),
            ("to".to_string(), Value::Array(self.to.clone())),
            ("cc".to_string(), Value::Array(self.cc.clone())),
            ("bcc".to_string(), Value::Array(self.bcc.clone())),
            ("message_id".to_string(), optional(&self.message_id)),
            (
                "internet_message_id".to_string(),
                optional(&self.internet_message_id),
            ),
        ])
    }
}

/// A sequence stays as-is, a lone non-empty string becomes a one-element
/// sequence, anything else is empty.
fn sequence(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(s)) if !s.is_empty() => vec![Value::String(s.clone())],
        _ => Vec::new(),
    }
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    value.and_then(non_empty_str).map(str::to_string)
}

/// Canonical routing classification input: exactly one of `route` or
/// `classification`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRecord {
    pub key: ClassificationKey,
    pub value: String,
}

impl ClassificationRecord {
    pub fn from_scalar(key: ClassificationKey, value: &Value) -> Result<Self, ValidationError> {
        non_empty_str(value)
            .map(|value| Self {
                key,
                value: value.to_string(),
            })
            .ok_or(ValidationError::InvalidClassification(key.as_str()))
    }
}

/// A validated record, ready to be sent to the decision engine.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalRecord {
    Email(EmailRecord),
    Classification(ClassificationRecord),
}

impl CanonicalRecord {
    /// The decision input variables for this record.
    pub fn to_variables(&self) -> Map<String, Value> {
        match self {
            CanonicalRecord::Email(email) => email.to_variables(),
            CanonicalRecord::Classification(record) => {
                let mut vars = Map::new();
                vars.insert(
                    record.key.as_str().to_string(),
                    Value::String(record.value.clone()),
                );
                vars
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CanonicalRecord::Email(_) => "email",
            CanonicalRecord::Classification(_) => "classification",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_defaults() {
        let record = EmailRecord::from_value(&json!({
            "subject": "Invoice",
            "from": {"email": "a@x.com", "name": "A"}
        }))
        .unwrap();

        let vars = CanonicalRecord::Email(record).to_variables();
        assert_eq!(
            Value::Object(vars),
            json!({
                "from": "a@x.com",
                "subject": "Invoice",
                "body_text": "",
                "attachments": [],
                "headers": {},
                "to": [],
                "cc": [],
                "bcc": [],
                "message_id": null,
                "internet_message_id": null
            })
        );
    }

    #[test]
    fn optional_ids_are_carried_when_present() {
        let record = EmailRecord::from_value(&json!({
            "subject": "S",
            "fromEmail": "a@x.com",
            "message_id": "<m1@x.com>",
            "internet_message_id": "<i1@x.com>"
        }))
        .unwrap();
        let vars = record.to_variables();
        assert_eq!(vars.len(), 10);
        assert_eq!(vars["from"], json!("a@x.com"));
        assert_eq!(vars["message_id"], json!("<m1@x.com>"));
        assert_eq!(vars["internet_message_id"], json!("<i1@x.com>"));
    }

    #[test]
    fn body_falls_back_to_body_field() {
        let record = EmailRecord::from_value(&json!({
            "subject": "S",
            "fromEmail": "a@x.com",
            "body_text": "",
            "body": "plain text"
        }))
        .unwrap();
        assert_eq!(record.body_text, "plain text");
    }

    #[test]
    fn recipients_are_lenient() {
        let record = EmailRecord::from_value(&json!({
            "subject": "S",
            "fromEmail": "a@x.com",
            "to": "b@x.com",
            "cc": [{"email": "c@x.com"}],
            "bcc": 7,
            "message_id": "<m1@x.com>",
            "headers": ["not", "a", "map"]
        }))
        .unwrap();
        assert_eq!(record.to, vec![json!("b@x.com")]);
        assert_eq!(record.cc, vec![json!({"email": "c@x.com"})]);
        assert!(record.bcc.is_empty());
        assert!(record.headers.is_empty());
        assert_eq!(record.message_id.as_deref(), Some("<m1@x.com>"));
    }

    #[test]
    fn missing_sender_fails() {
        let err = EmailRecord::from_value(&json!({"subject": "B"})).unwrap_err();
        assert_eq!(err, ValidationError::MissingEmailFields);
    }

    #[test]
    fn classification_keeps_its_key() {
        let record =
            ClassificationRecord::from_scalar(ClassificationKey::Classification, &json!("spam"))
                .unwrap();
        let vars = CanonicalRecord::Classification(record).to_variables();
        assert_eq!(Value::Object(vars), json!({"classification": "spam"}));
    }

    #[test]
    fn classification_must_be_non_empty_string() {
        for value in [json!(""), json!(42), json!(true)] {
            let err = ClassificationRecord::from_scalar(ClassificationKey::Route, &value).unwrap_err();
            assert_eq!(err, ValidationError::InvalidClassification("route"));
        }
    }
}
