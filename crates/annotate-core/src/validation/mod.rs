//! Field validation: turn raw submitted strings into typed values.
//!
//! [`FieldValidator`] is the seam between the state machine and the type
//! system. [`TypeValidator`] is the built-in implementation covering every
//! [`FieldType`].

mod schema;

pub(crate) use schema::compile_schema;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::signature::FieldType;

/// Message for absent or blank submissions.
pub const FIELD_REQUIRED: &str = "field required";

/// What a renderer needs to know about a field type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldMetadata {
    /// Render as a radio group
    pub is_enumeration: bool,

    /// Allowed values (empty unless `is_enumeration`)
    pub allowed_values: Vec<String>,

    /// Human-readable type title
    pub title: String,

    /// JSON-Schema-like description of the type
    pub json_schema: Value,
}

/// Validates raw submitted values and describes field types.
///
/// Implementations are called while the server lock is held and must be
/// fast and non-blocking.
pub trait FieldValidator: Send + Sync {
    /// Parse a raw submitted value. `None` means the form did not carry the
    /// field at all. Errors are human-readable messages.
    fn validate(&self, field_type: &FieldType, raw: Option<&str>) -> Result<Value, String>;

    /// Rendering metadata for a field type.
    fn describe(&self, field_type: &FieldType) -> FieldMetadata;
}

/// Default validator for the built-in [`FieldType`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeValidator;

impl TypeValidator {
    pub fn new() -> Self {
        Self
    }
}

impl FieldValidator for TypeValidator {
    fn validate(&self, field_type: &FieldType, raw: Option<&str>) -> Result<Value, String> {
        let raw = match raw {
            Some(r) if !r.trim().is_empty() => r,
            _ => return Err(FIELD_REQUIRED.to_string()),
        };

        match field_type {
            FieldType::String => Ok(Value::String(
                decode_string_literal(raw).unwrap_or_else(|| raw.to_string()),
            )),

            FieldType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| "not a valid integer".to_string()),

            FieldType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| "not a valid number".to_string()),

            FieldType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err("not a valid boolean".to_string()),
            },

            FieldType::Enum { values } => {
                // Exact text wins over the decoded or trimmed forms.
                let candidates = [
                    Some(raw.to_string()),
                    decode_string_literal(raw),
                    Some(raw.trim().to_string()),
                ];
                candidates
                    .into_iter()
                    .flatten()
                    .find(|candidate| values.contains(candidate))
                    .map(Value::String)
                    .ok_or_else(|| format!("must be one of: {}", values.join(", ")))
            }

            FieldType::Json { schema } => {
                let value: Value = serde_json::from_str(raw)
                    .map_err(|e| format!("not valid JSON: {}", e))?;
                schema::check_against_schema(schema, &value)?;
                Ok(value)
            }
        }
    }

    fn describe(&self, field_type: &FieldType) -> FieldMetadata {
        let (allowed_values, json_schema) = match field_type {
            FieldType::String => (vec![], serde_json::json!({ "type": "string" })),
            FieldType::Integer => (vec![], serde_json::json!({ "type": "integer" })),
            FieldType::Float => (vec![], serde_json::json!({ "type": "number" })),
            FieldType::Boolean => (vec![], serde_json::json!({ "type": "boolean" })),
            FieldType::Enum { values } => (values.clone(), serde_json::json!({ "enum": values })),
            FieldType::Json { schema } => (vec![], schema.clone()),
        };

        FieldMetadata {
            is_enumeration: matches!(field_type, FieldType::Enum { .. }),
            allowed_values,
            title: field_type.title().to_string(),
            json_schema,
        }
    }
}

/// Decode `raw` if it is exactly one JSON string literal (`"B"`).
///
/// Clients that JSON-encode every form value send strings quoted.
fn decode_string_literal(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        serde_json::from_str::<String>(trimmed).ok()
    } else {
        None
    }
}
