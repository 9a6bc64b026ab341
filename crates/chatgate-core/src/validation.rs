//! Boundary validation for loosely typed request fields.
//!
//! Request bodies and query strings arrive as JSON values (or strings) so
//! that a malformed field yields a precise message instead of a generic
//! deserialization failure. Every function here is pure and runs before any
//! I/O.

use serde_json::Value;
use thiserror::Error;

use chatgate_types::conversation::MAX_TITLE_LEN;
use chatgate_types::llm::{ChatMessage, MAX_TEMPERATURE, MessageRole};

/// A single failed validation, carrying the caller-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Require `value` to be a positive integer id.
///
/// Accepts JSON integers, integral floats (`5.0`) and decimal strings
/// (`"5"`), since query strings only ever carry strings.
pub fn positive_id(field: &str, value: Option<&Value>) -> Result<i64, ValidationError> {
    let value = match value {
        None | Some(Value::Null) => {
            return Err(ValidationError::new(format!("{field} is required")));
        }
        Some(v) => v,
    };

    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match parsed {
        Some(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::new(format!(
            "{field} must be a positive integer"
        ))),
    }
}

/// Same as [`positive_id`] for a raw query-string value.
pub fn positive_id_param(field: &str, value: Option<&str>) -> Result<i64, ValidationError> {
    let value = value.map(|s| Value::String(s.to_string()));
    positive_id(field, value.as_ref())
}

/// Normalise an optional title: must be a string of at most
/// [`MAX_TITLE_LEN`] characters; blank-after-trim becomes `None`.
pub fn optional_title(value: Option<&Value>) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            if s.chars().count() > MAX_TITLE_LEN {
                return Err(ValidationError::new(format!(
                    "title must be at most {MAX_TITLE_LEN} characters"
                )));
            }
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(_) => Err(ValidationError::new("title must be a string")),
    }
}

/// Metadata must be a JSON object or null.
pub fn optional_metadata(value: Option<&Value>) -> Result<Option<Value>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v @ Value::Object(_)) => Ok(Some(v.clone())),
        Some(_) => Err(ValidationError::new("metadata must be a JSON object")),
    }
}

/// Messages must be a non-empty array of `{role, content}` objects with a
/// known role and string content. Order is preserved.
pub fn chat_messages(value: Option<&Value>) -> Result<Vec<ChatMessage>, ValidationError> {
    let items = match value {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(ValidationError::new("messages must be a non-empty array")),
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let Value::Object(fields) = item else {
                return Err(ValidationError::new(format!("messages[{i}] must be an object")));
            };

            let role = fields
                .get("role")
                .and_then(Value::as_str)
                .and_then(|r| r.parse::<MessageRole>().ok())
                .ok_or_else(|| {
                    ValidationError::new(format!(
                        "messages[{i}].role must be one of {}",
                        MessageRole::ALL.join(", ")
                    ))
                })?;

            let content = fields
                .get("content")
                .and_then(Value::as_str)
                .ok_or_else(|| ValidationError::new(format!("messages[{i}].content must be a string")))?;

            Ok(ChatMessage::new(role, content))
        })
        .collect()
}

/// An optional name (provider, model): a string when present. Blank after
/// trimming counts as absent.
pub fn optional_name(field: &str, value: Option<&Value>) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(_) => Err(ValidationError::new(format!("{field} must be a string"))),
    }
}

/// Temperature, when present, is a number in `[0, MAX_TEMPERATURE]`.
pub fn optional_temperature(value: Option<&Value>) -> Result<Option<f64>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(t) if (0.0..=MAX_TEMPERATURE).contains(&t) => Ok(Some(t)),
            _ => Err(temperature_error()),
        },
        Some(_) => Err(temperature_error()),
    }
}

fn temperature_error() -> ValidationError {
    ValidationError::new(format!(
        "temperature must be a number between 0 and {MAX_TEMPERATURE}"
    ))
}

/// `maxTokens`, when present, is a positive integer that fits in `u32`.
pub fn optional_max_tokens(value: Option<&Value>) -> Result<Option<u32>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .filter(|v| *v > 0)
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| ValidationError::new("maxTokens must be a positive integer")),
        Some(_) => Err(ValidationError::new("maxTokens must be a positive integer")),
    }
}
