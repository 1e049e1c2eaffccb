//! Predictors: anything that fills a signature's output fields.

use std::sync::Arc;

use annotate_core::{InputValues, Prediction, QuestionError, Signature};

use crate::server::AnnotationServer;

/// The prediction-module calling convention.
///
/// A model-backed predictor and a human answerer are interchangeable
/// behind this trait.
pub trait Predictor: Send + Sync {
    /// The contract this predictor answers.
    fn signature(&self) -> &Signature;

    /// Fill the output fields for one set of inputs.
    fn predict(&self, inputs: InputValues) -> Result<Prediction, QuestionError>;
}

/// A predictor backed by a human answering through the annotation page.
///
/// Blocks in [`predict`](Predictor::predict) until the human submits.
#[derive(Clone)]
pub struct HumanAnswerer {
    signature: Arc<Signature>,
    server: Arc<AnnotationServer>,
}

impl HumanAnswerer {
    pub fn new(signature: Arc<Signature>, server: Arc<AnnotationServer>) -> Self {
        Self { signature, server }
    }

    /// Ask the human; same as [`Predictor::predict`].
    pub fn answer(&self, inputs: InputValues) -> Result<Prediction, QuestionError> {
        let answer = self.server.ask(Arc::clone(&self.signature), inputs)?;
        Ok(Prediction::from_completions(
            answer.into_completions(),
            &self.signature,
        ))
    }
}

impl Predictor for HumanAnswerer {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn predict(&self, inputs: InputValues) -> Result<Prediction, QuestionError> {
        self.answer(inputs)
    }
}
