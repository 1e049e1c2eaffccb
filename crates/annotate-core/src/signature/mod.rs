//! Signatures: the typed question/answer contract.
//!
//! A signature names the input fields shown to the human and the output
//! fields the human must fill in. Signatures are immutable once built and
//! can be written in code or loaded from YAML/JSON.

mod field;
mod parser;

pub use field::{Field, FieldType};
pub use parser::{Signature, SignatureError};
