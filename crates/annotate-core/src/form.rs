//! Form rendering: a pure projection of a question into a page description.
//!
//! The page description is structured data, not markup. Transports turn it
//! into whatever the human looks at (the runtime renders HTML).
//!
//! ## Guarantees
//!
//! 1. **Pure**: same question, draft and errors always give the same page
//! 2. **Complete**: every declared input is displayed, every output gets
//!    exactly one control
//! 3. **Lossless re-prompt**: draft values are carried back into controls

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::question::Question;
use crate::types::{DraftAnswer, FieldErrors};
use crate::validation::FieldValidator;

/// Shown whenever no question is outstanding.
pub const WAITING_MESSAGE: &str = "Annotation submitted. Waiting for next request...";

/// Heading of every question form.
pub const FORM_HEADING: &str = "Annotation Request";

/// Prompt above the output controls.
pub const FORM_PROMPT: &str = "Please provide the following information:";

/// A displayable page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// Document title
    pub title: String,

    /// What the page shows
    pub body: PageBody,
}

/// Body of a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageBody {
    /// Nothing to answer
    Waiting { message: String },

    /// A question to answer
    Form(FormView),
}

/// A question form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormView {
    pub heading: String,
    pub instructions: Option<String>,
    pub inputs: Vec<InputDisplay>,
    pub prompt: String,
    pub controls: Vec<FieldControl>,
    pub submit_target: String,
}

/// A read-only input value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputDisplay {
    pub name: String,
    pub label: String,
    pub value: String,
}

/// An editable control for one output field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldControl {
    /// Form field name
    pub name: String,

    /// Visible label
    pub label: String,

    /// Type hint shown next to the label
    pub hint: String,

    pub kind: ControlKind,

    /// Error from the last submission, if this field failed
    pub error: Option<String>,
}

/// Kind of control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum ControlKind {
    /// One radio button per allowed value
    Radio { options: Vec<RadioOption> },

    /// Free text seeded with the draft value
    TextArea { value: String },
}

/// One radio button.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RadioOption {
    pub value: String,
    pub selected: bool,
}

/// Builds page descriptions. Holds only presentation settings.
#[derive(Debug, Clone)]
pub struct FormRenderer {
    page_title: String,
    submit_target: String,
}

impl Default for FormRenderer {
    fn default() -> Self {
        Self::new("Human Annotation", "/")
    }
}

impl FormRenderer {
    pub fn new(page_title: impl Into<String>, submit_target: impl Into<String>) -> Self {
        Self {
            page_title: page_title.into(),
            submit_target: submit_target.into(),
        }
    }

    pub fn page_title(&self) -> &str {
        &self.page_title
    }

    /// The waiting placeholder.
    pub fn waiting(&self) -> Page {
        Page {
            title: self.page_title.clone(),
            body: PageBody::Waiting {
                message: WAITING_MESSAGE.to_string(),
            },
        }
    }

    /// Assemble a form page from already-built parts.
    pub fn render(
        &self,
        instructions: Option<String>,
        inputs: Vec<InputDisplay>,
        controls: Vec<FieldControl>,
    ) -> Page {
        Page {
            title: self.page_title.clone(),
            body: PageBody::Form(FormView {
                heading: FORM_HEADING.to_string(),
                instructions,
                inputs,
                prompt: FORM_PROMPT.to_string(),
                controls,
                submit_target: self.submit_target.clone(),
            }),
        }
    }

    /// Render a question with the current draft and errors.
    pub fn question_form(
        &self,
        question: &Question,
        draft: &DraftAnswer,
        errors: &FieldErrors,
        validator: &dyn FieldValidator,
    ) -> Page {
        let signature = question.signature();

        let inputs = signature
            .inputs
            .iter()
            .map(|field| InputDisplay {
                name: field.name.clone(),
                label: field.label().to_string(),
                value: question
                    .inputs()
                    .get(&field.name)
                    .map(display_value)
                    .unwrap_or_default(),
            })
            .collect();

        let controls = signature
            .outputs
            .iter()
            .map(|field| {
                let meta = validator.describe(&field.field_type);
                let current = draft.get(&field.name).unwrap_or("");

                let (kind, hint) = if meta.is_enumeration {
                    let chosen = selected_option(current, &meta.allowed_values);
                    let options = meta
                        .allowed_values
                        .iter()
                        .map(|v| RadioOption {
                            value: v.clone(),
                            selected: chosen == Some(v.as_str()),
                        })
                        .collect();
                    (ControlKind::Radio { options }, meta.title)
                } else {
                    let kind = ControlKind::TextArea {
                        value: current.to_string(),
                    };
                    (kind, type_hint(&meta.title, &meta.json_schema))
                };

                FieldControl {
                    name: field.name.clone(),
                    label: field.label().to_string(),
                    hint,
                    kind,
                    error: errors.get(&field.name).map(str::to_string),
                }
            })
            .collect();

        self.render(signature.instructions.clone(), inputs, controls)
    }
}

/// Strings are shown bare, everything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The option a draft selects: exact text first, then JSON-quoted (`"B"`),
/// then trimmed. At most one option is selected.
fn selected_option<'a>(draft: &str, options: &'a [String]) -> Option<&'a str> {
    let find = |candidate: &str| options.iter().find(|o| *o == candidate).map(String::as_str);
    find(draft)
        .or_else(|| {
            serde_json::from_str::<String>(draft)
                .ok()
                .and_then(|d| find(&d))
        })
        .or_else(|| find(draft.trim()))
}

/// Scalars get their title, `json` fields also show their schema.
fn type_hint(title: &str, schema: &Value) -> String {
    match schema.as_object() {
        Some(obj) if obj.len() > 1 || !obj.contains_key("type") => format!("{}: {}", title, schema),
        _ => title.to_string(),
    }
}
