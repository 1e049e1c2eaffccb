//! Signature definition and parsing from YAML/JSON.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::field::{Field, FieldType};
use crate::validation::compile_schema;

lazy_static! {
    /// Field names double as HTML form field names and map keys.
    static ref FIELD_NAME_PATTERN: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Errors that can occur when defining or parsing signatures.
#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("Failed to read signature file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field name: '{0}'")]
    InvalidFieldName(String),

    #[error("Duplicate field name: '{0}'")]
    DuplicateField(String),

    #[error("Enum field '{field}' is invalid: {reason}")]
    InvalidEnum { field: String, reason: String },

    #[error("JSON schema of field '{field}' does not compile: {reason}")]
    InvalidSchema { field: String, reason: String },
}

/// What a question asks for and what shape the answer must take.
///
/// Inputs are shown to the human read-only, outputs are filled in.
/// Field order is preserved for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signature {
    /// Human-readable name
    pub name: String,

    /// Optional instructions shown above the form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// Fields bound to concrete values when a question is asked
    #[serde(default)]
    pub inputs: Vec<Field>,

    /// Fields the human must fill in
    #[serde(default)]
    pub outputs: Vec<Field>,
}

impl Signature {
    /// Start an empty signature.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Set the instructions.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Append an input field.
    pub fn input(mut self, field: Field) -> Self {
        self.inputs.push(field);
        self
    }

    /// Append an output field.
    pub fn output(mut self, field: Field) -> Self {
        self.outputs.push(field);
        self
    }

    /// Finish building, checking the same rules as the parsers.
    pub fn build(self) -> Result<Self, SignatureError> {
        self.validate()?;
        Ok(self)
    }

    /// Parse a signature from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SignatureError> {
        let signature: Signature = serde_yaml::from_str(yaml)?;
        signature.build()
    }

    /// Parse a signature from JSON string.
    pub fn from_json(json: &str) -> Result<Self, SignatureError> {
        let signature: Signature = serde_json::from_str(json)?;
        signature.build()
    }

    /// Parse a signature from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, SignatureError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a signature from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SignatureError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Look up an input field by name.
    pub fn input_field(&self, name: &str) -> Option<&Field> {
        self.inputs.iter().find(|f| f.name == name)
    }

    /// Look up an output field by name.
    pub fn output_field(&self, name: &str) -> Option<&Field> {
        self.outputs.iter().find(|f| f.name == name)
    }

    /// Names of the output fields, in declaration order.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|f| f.name.as_str())
    }

    /// Validate the signature structure.
    fn validate(&self) -> Result<(), SignatureError> {
        if self.name.trim().is_empty() {
            return Err(SignatureError::MissingField("name".to_string()));
        }

        if self.outputs.is_empty() {
            return Err(SignatureError::MissingField("outputs".to_string()));
        }

        let mut seen = HashSet::new();
        for field in self.inputs.iter().chain(self.outputs.iter()) {
            if !FIELD_NAME_PATTERN.is_match(&field.name) {
                return Err(SignatureError::InvalidFieldName(field.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SignatureError::DuplicateField(field.name.clone()));
            }
            Self::validate_type(field)?;
        }

        Ok(())
    }

    fn validate_type(field: &Field) -> Result<(), SignatureError> {
        match &field.field_type {
            FieldType::Enum { values } => {
                if values.is_empty() {
                    return Err(SignatureError::InvalidEnum {
                        field: field.name.clone(),
                        reason: "no allowed values".to_string(),
                    });
                }
                let mut seen = HashSet::new();
                for value in values {
                    if value.trim().is_empty() {
                        return Err(SignatureError::InvalidEnum {
                            field: field.name.clone(),
                            reason: "blank value".to_string(),
                        });
                    }
                    if !seen.insert(value) {
                        return Err(SignatureError::InvalidEnum {
                            field: field.name.clone(),
                            reason: format!("duplicate value '{}'", value),
                        });
                    }
                }
                Ok(())
            }
            FieldType::Json { schema } => compile_schema(schema)
                .map(|_| ())
                .map_err(|reason| SignatureError::InvalidSchema {
                    field: field.name.clone(),
                    reason,
                }),
            _ => Ok(()),
        }
    }
}
