//! Request body shape detection.
//!
//! Clients post several ad-hoc shapes. `PayloadShape::classify` is the one
//! place that decides which shape a body is; everything downstream matches on
//! the result instead of sniffing fields again.

use serde_json::{Map, Value};

/// Which of the two classification labels a client used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationKey {
    Route,
    Classification,
}

impl ClassificationKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassificationKey::Route => "route",
            ClassificationKey::Classification => "classification",
        }
    }
}

/// The recognised shapes of a request body, borrowed from it.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadShape<'a> {
    /// `[ {...}, {...} ]`
    Sequence(&'a [Value]),
    /// `{ "emails": [ ... ] }`
    EmailsWrapper(&'a [Value]),
    /// `{ "email": { ... } }`
    EmailWrapper(&'a Value),
    /// `{ "route": "billing" }` and its `variables` / `{value: ..}` variants.
    ScalarRoute {
        key: ClassificationKey,
        value: &'a Value,
    },
    /// The body itself is a single email.
    BareEmail(&'a Value),
    Unrecognized,
}

impl<'a> PayloadShape<'a> {
    /// Classify a body. Checks run in a fixed order and the first match wins.
    pub fn classify(payload: &'a Value) -> Self {
        if let Value::Array(items) = payload {
            return PayloadShape::Sequence(items);
        }

        let Value::Object(obj) = payload else {
            return PayloadShape::Unrecognized;
        };

        if let Some(Value::Array(emails)) = obj.get("emails") {
            return PayloadShape::EmailsWrapper(emails);
        }

        if let Some(email @ Value::Object(_)) = obj.get("email") {
            return PayloadShape::EmailWrapper(email);
        }

        if let Some((key, value)) = find_classification(obj) {
            return PayloadShape::ScalarRoute { key, value };
        }

        if looks_like_email(payload) {
            return PayloadShape::BareEmail(payload);
        }

        PayloadShape::Unrecognized
    }

    /// Number of candidates this shape yields.
    pub fn candidate_count(&self) -> usize {
        match self {
            PayloadShape::Sequence(items) | PayloadShape::EmailsWrapper(items) => items.len(),
            PayloadShape::EmailWrapper(_)
            | PayloadShape::ScalarRoute { .. }
            | PayloadShape::BareEmail(_) => 1,
            PayloadShape::Unrecognized => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PayloadShape::Sequence(_) => "sequence",
            PayloadShape::EmailsWrapper(_) => "emails_wrapper",
            PayloadShape::EmailWrapper(_) => "email_wrapper",
            PayloadShape::ScalarRoute { .. } => "scalar_route",
            PayloadShape::BareEmail(_) => "bare_email",
            PayloadShape::Unrecognized => "unrecognized",
        }
    }
}

/// Unwrap an element of a top-level sequence: a nested `email` object, else a
/// nested `body` object, else the element itself.
pub fn unwrap_element(element: &Value) -> &Value {
    match element.get("email") {
        Some(inner @ Value::Object(_)) => inner,
        _ => match element.get("body") {
            Some(inner @ Value::Object(_)) => inner,
            _ => element,
        },
    }
}

/// Resolve the sender address: `from.email`, then `from_.email`, then
/// `fromEmail`. Only non-empty strings count.
pub fn resolve_sender(email: &Value) -> Option<&str> {
    let nested = move |field: &str| email.get(field).and_then(|f| f.get("email"));

    [nested("from"), nested("from_"), email.get("fromEmail")]
        .into_iter()
        .flatten()
        .find_map(non_empty_str)
}

/// Subject of an email candidate, if it is a non-empty string.
pub fn resolve_subject(email: &Value) -> Option<&str> {
    email.get("subject").and_then(non_empty_str)
}

pub(crate) fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

fn looks_like_email(payload: &Value) -> bool {
    resolve_subject(payload).is_some() && resolve_sender(payload).is_some()
}

/// Look for a scalar route/classification at the top level, then under
/// `variables`.
fn find_classification(obj: &Map<String, Value>) -> Option<(ClassificationKey, &Value)> {
    scalar_label(obj).or_else(|| match obj.get("variables") {
        Some(Value::Object(vars)) => scalar_label(vars),
        _ => None,
    })
}

fn scalar_label(obj: &Map<String, Value>) -> Option<(ClassificationKey, &Value)> {
    [ClassificationKey::Route, ClassificationKey::Classification]
        .into_iter()
        .find_map(|key| {
            let value = obj.get(key.as_str())?;
            let value = match value {
                Value::Object(wrapper) => wrapper.get("value")?,
                other => other,
            };
            is_scalar(value).then_some((key, value))
        })
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}
