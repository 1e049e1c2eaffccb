//! A signature bound to concrete input values.

use std::sync::Arc;
use thiserror::Error;

use crate::signature::Signature;
use crate::types::InputValues;

/// Errors constructing a question.
///
/// These are raised before any page is shown and are the only errors that
/// reach the caller of `ask`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("Missing input field '{0}' in data")]
    MissingInput(String),
}

/// One outstanding question: a signature plus a value for every input.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    signature: Arc<Signature>,
    inputs: InputValues,
}

impl Question {
    /// Bind input values to a signature.
    ///
    /// Every declared input field must be present. Extra values are kept
    /// but never displayed.
    pub fn new(signature: Arc<Signature>, inputs: InputValues) -> Result<Self, QuestionError> {
        if let Some(missing) = signature.inputs.iter().find(|f| !inputs.contains(&f.name)) {
            return Err(QuestionError::MissingInput(missing.name.clone()));
        }

        Ok(Self { signature, inputs })
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn inputs(&self) -> &InputValues {
        &self.inputs
    }
}
