//! Field descriptors: a name, an optional description and a semantic type.

use serde::{Deserialize, Serialize};

/// Semantic type of a field.
///
/// The set is closed on purpose so that rendering and validation can match
/// exhaustively. Arbitrary structured values go through [`FieldType::Json`],
/// which carries its own JSON Schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    /// Free text
    String,

    /// Signed 64-bit integer
    Integer,

    /// Finite floating point number
    Float,

    /// true / false
    Boolean,

    /// One of a fixed list of string values
    Enum { values: Vec<String> },

    /// Any JSON value accepted by `schema`
    Json { schema: serde_json::Value },
}

impl FieldType {
    /// Build an enumeration type from anything string-like.
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldType::Enum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a JSON type constrained by a schema.
    pub fn json(schema: serde_json::Value) -> Self {
        FieldType::Json { schema }
    }

    /// Short human-readable name of the type.
    pub fn title(&self) -> &'static str {
        match self {
            FieldType::String => "Text",
            FieldType::Integer => "Integer",
            FieldType::Float => "Number",
            FieldType::Boolean => "Boolean",
            FieldType::Enum { .. } => "Choice",
            FieldType::Json { .. } => "JSON",
        }
    }
}

/// A named, typed field of a signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    /// Identifier used as the form field name
    pub name: String,

    /// Shown to the human instead of the name when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Semantic type
    #[serde(flatten)]
    pub field_type: FieldType,
}

impl Field {
    /// Create a field without description.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            description: None,
            field_type,
        }
    }

    /// Attach a description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Label shown to the human: the description, falling back to the name.
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }
}
