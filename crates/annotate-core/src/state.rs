//! The question state machine.
//!
//! One state describes what the single shared page shows and what a
//! submission means:
//!
//! ```text
//!            ask                 valid submit          caller reads
//!   Idle ──────────▶ AwaitingAnswer ──────────▶ Answered ──────────▶ Idle
//!                     │        ▲
//!                     └────────┘ invalid submit (draft + errors kept)
//! ```
//!
//! Transitions are plain functions over an owned state. Locking and waking
//! the caller belong to the runtime.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::form::{FormRenderer, Page};
use crate::question::Question;
use crate::types::{DraftAnswer, FieldErrors, ValidatedAnswer};
use crate::validation::{FieldValidator, TypeValidator};

/// What the shared page currently represents.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionState {
    /// No question pending
    Idle,

    /// A question is outstanding. Draft and errors come from the most recent
    /// failed submission and are empty on first display.
    AwaitingAnswer {
        question: Question,
        draft: DraftAnswer,
        errors: FieldErrors,
    },

    /// Answered; held only until the waiting caller takes it
    Answered(ValidatedAnswer),
}

/// Collaborators needed to render and validate.
#[derive(Clone)]
pub struct FormContext {
    pub renderer: FormRenderer,
    pub validator: Arc<dyn FieldValidator>,
}

impl FormContext {
    pub fn new(renderer: FormRenderer, validator: Arc<dyn FieldValidator>) -> Self {
        Self { renderer, validator }
    }
}

impl Default for FormContext {
    fn default() -> Self {
        Self::new(FormRenderer::default(), Arc::new(TypeValidator))
    }
}

impl std::fmt::Debug for FormContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormContext")
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

/// Result of a submission: the next state and the page to respond with.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: QuestionState,
    pub page: Page,
}

impl Transition {
    /// Whether the submission completed the question.
    pub fn released(&self) -> bool {
        self.state.is_answered()
    }
}

impl QuestionState {
    /// A freshly posted question with empty draft and errors.
    pub fn awaiting(question: Question) -> Self {
        QuestionState::AwaitingAnswer {
            question,
            draft: DraftAnswer::new(),
            errors: FieldErrors::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, QuestionState::Idle)
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self, QuestionState::AwaitingAnswer { .. })
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, QuestionState::Answered(_))
    }

    /// Project the state into a page. No side effects.
    pub fn render(&self, ctx: &FormContext) -> Page {
        match self {
            QuestionState::Idle | QuestionState::Answered(_) => ctx.renderer.waiting(),
            QuestionState::AwaitingAnswer {
                question,
                draft,
                errors,
            } => ctx
                .renderer
                .question_form(question, draft, errors, ctx.validator.as_ref()),
        }
    }

    /// Apply a submission.
    ///
    /// Only an outstanding question reacts; any other state is returned
    /// unchanged with its own render (stale tab, double click).
    ///
    /// Every output field is validated before deciding, so one submission
    /// reports every failing field at once.
    pub fn submit(self, draft: DraftAnswer, ctx: &FormContext) -> Transition {
        let question = match self {
            QuestionState::AwaitingAnswer { question, .. } => question,
            other => {
                let page = other.render(ctx);
                return Transition { state: other, page };
            }
        };

        let mut parsed = BTreeMap::new();
        let mut errors = FieldErrors::new();

        for field in &question.signature().outputs {
            match ctx
                .validator
                .validate(&field.field_type, draft.get(&field.name))
            {
                Ok(value) => {
                    parsed.insert(field.name.clone(), value);
                }
                Err(message) => errors.insert(field.name.clone(), message),
            }
        }

        let state = if errors.is_empty() {
            QuestionState::Answered(ValidatedAnswer::new(parsed))
        } else {
            QuestionState::AwaitingAnswer {
                question,
                draft,
                errors,
            }
        };

        let page = state.render(ctx);
        Transition { state, page }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{ControlKind, PageBody};
    use crate::signature::{Field, FieldType, Signature};
    use crate::types::InputValues;
    use proptest::prelude::*;
    use serde_json::json;

    fn rating_question() -> Question {
        let signature = Signature::new("Rate")
            .input(Field::new("topic", FieldType::String))
            .output(Field::new("rating", FieldType::one_of(["A", "B", "C"])));
        Question::new(Arc::new(signature), InputValues::new().with("topic", "cats")).unwrap()
    }

    fn two_field_question() -> Question {
        let signature = Signature::new("Count")
            .input(Field::new("topic", FieldType::String))
            .output(Field::new("count", FieldType::Integer))
            .output(Field::new("note", FieldType::String));
        Question::new(Arc::new(signature), InputValues::new().with("topic", "cats")).unwrap()
    }

    #[test]
    fn test_idle_and_answered_render_waiting() {
        let ctx = FormContext::default();
        let waiting = ctx.renderer.waiting();

        assert_eq!(QuestionState::Idle.render(&ctx), waiting);

        let answered = QuestionState::awaiting(rating_question())
            .submit(DraftAnswer::new().with("rating", "A"), &ctx)
            .state;
        assert!(answered.is_answered());
        assert_eq!(answered.render(&ctx), waiting);
    }

    #[test]
    fn test_valid_submission_answers() {
        let ctx = FormContext::default();
        let transition = QuestionState::awaiting(rating_question())
            .submit(DraftAnswer::new().with("rating", "B"), &ctx);

        assert!(transition.released());
        assert_eq!(transition.page, ctx.renderer.waiting());
        let QuestionState::Answered(answer) = transition.state else {
            panic!("expected answered");
        };
        assert_eq!(answer.len(), 1);
        assert_eq!(answer.get("rating"), Some(&json!("B")));
    }

    #[test]
    fn test_every_rendered_option_is_accepted() {
        let ctx = FormContext::default();
        let signature = Signature::new("Odd")
            .output(Field::new("pick", FieldType::one_of([" A", "\"x\"", "y"])))
            .build()
            .unwrap();
        let state = QuestionState::awaiting(
            Question::new(Arc::new(signature), InputValues::new()).unwrap(),
        );

        let PageBody::Form(view) = state.render(&ctx).body else {
            panic!("expected form");
        };
        let ControlKind::Radio { options } = &view.controls[0].kind else {
            panic!("expected radio");
        };
        for option in options {
            let transition = state
                .clone()
                .submit(DraftAnswer::new().with("pick", option.value.clone()), &ctx);
            assert!(transition.released(), "option {:?} rejected", option.value);
            let QuestionState::Answered(answer) = transition.state else {
                panic!("expected answered");
            };
            assert_eq!(answer.get("pick"), Some(&json!(option.value)));
        }
    }

    #[test]
    fn test_invalid_submission_keeps_question_draft_and_errors() {
        let ctx = FormContext::default();
        let question = two_field_question();
        let draft = DraftAnswer::new().with("count", "abc").with("note", "kept");

        let transition = QuestionState::awaiting(question.clone()).submit(draft.clone(), &ctx);
        assert!(!transition.released());

        let QuestionState::AwaitingAnswer {
            question: kept,
            draft: kept_draft,
            errors,
        } = &transition.state
        else {
            panic!("expected awaiting");
        };
        assert_eq!(kept, &question);
        assert_eq!(kept_draft, &draft);
        assert_eq!(errors.get("count"), Some("not a valid integer"));
        assert_eq!(errors.get("note"), None);

        // The re-prompt shows both the typed values and the error
        let PageBody::Form(view) = &transition.page.body else {
            panic!("expected form");
        };
        assert_eq!(view.controls[0].error.as_deref(), Some("not a valid integer"));
        assert_eq!(
            view.controls[1].kind,
            ControlKind::TextArea {
                value: "kept".to_string()
            }
        );
        assert_eq!(view.controls[1].error, None);
    }

    #[test]
    fn test_all_errors_reported_together() {
        let ctx = FormContext::default();
        let transition =
            QuestionState::awaiting(two_field_question()).submit(DraftAnswer::new(), &ctx);

        let QuestionState::AwaitingAnswer { errors, .. } = transition.state else {
            panic!("expected awaiting");
        };
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_retry_after_failure_answers() {
        let ctx = FormContext::default();
        let first = QuestionState::awaiting(two_field_question())
            .submit(DraftAnswer::new().with("count", "abc").with("note", "n"), &ctx);
        let second = first
            .state
            .submit(DraftAnswer::new().with("count", "5").with("note", "n"), &ctx);

        let QuestionState::Answered(answer) = second.state else {
            panic!("expected answered");
        };
        assert_eq!(answer.get("count"), Some(&json!(5)));
    }

    #[test]
    fn test_stray_submission_is_noop() {
        let ctx = FormContext::default();

        let idle = QuestionState::Idle.submit(DraftAnswer::new().with("rating", "A"), &ctx);
        assert!(idle.state.is_idle());
        assert_eq!(idle.page, ctx.renderer.waiting());

        let answered = QuestionState::awaiting(rating_question())
            .submit(DraftAnswer::new().with("rating", "A"), &ctx)
            .state;
        let again = answered
            .clone()
            .submit(DraftAnswer::new().with("rating", "C"), &ctx);
        assert_eq!(again.state, answered);
        assert_eq!(again.page, ctx.renderer.waiting());
    }

    proptest! {
        #[test]
        fn prop_render_is_idempotent(draft in "[ -~]{0,12}", error in proptest::option::of("[a-z ]{1,20}")) {
            let ctx = FormContext::default();
            let mut errors = FieldErrors::new();
            if let Some(message) = error {
                errors.insert("count", message);
            }
            let state = QuestionState::AwaitingAnswer {
                question: two_field_question(),
                draft: DraftAnswer::new().with("count", draft),
                errors,
            };

            prop_assert_eq!(state.render(&ctx), state.render(&ctx));
        }
    }
}
