//! # annotate-core
//!
//! Deterministic core for letting a human stand in for a prediction model.
//!
//! A [`Signature`] declares input fields (shown to the human) and output
//! fields (filled in by the human). A [`Question`] binds input values to a
//! signature. The [`QuestionState`] machine decides what the single shared
//! form page shows and what a submission means.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: rendering is a pure function of the state
//! 2. **No I/O, no threads**: waiting for the human lives in `annotate-runtime`
//! 3. **Lossless re-prompt**: a failed submission keeps what the human typed
//! 4. **All errors at once**: every output field is validated per submission
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use annotate_core::{
//!     DraftAnswer, Field, FieldType, FormContext, InputValues, Question, QuestionState,
//!     Signature,
//! };
//!
//! let signature = Signature::new("Rate Topic")
//!     .input(Field::new("topic", FieldType::String))
//!     .output(Field::new("rating", FieldType::one_of(["A", "B", "C"])))
//!     .build()?;
//!
//! let question = Question::new(Arc::new(signature), InputValues::new().with("topic", "cats"))?;
//! let ctx = FormContext::default();
//!
//! let transition = QuestionState::awaiting(question)
//!     .submit(DraftAnswer::new().with("rating", "B"), &ctx);
//! assert!(transition.released());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod form;
pub mod question;
pub mod signature;
pub mod state;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use form::{
    ControlKind, FieldControl, FormRenderer, FormView, InputDisplay, Page, PageBody, RadioOption,
    WAITING_MESSAGE,
};
pub use question::{Question, QuestionError};
pub use signature::{Field, FieldType, Signature, SignatureError};
pub use state::{FormContext, QuestionState, Transition};
pub use types::{DraftAnswer, FieldErrors, InputValues, Prediction, ValidatedAnswer};
pub use validation::{FieldMetadata, FieldValidator, TypeValidator, FIELD_REQUIRED};
