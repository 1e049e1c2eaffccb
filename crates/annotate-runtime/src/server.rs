//! The annotation server: one shared question slot, one gate, one lock.
//!
//! `ask` posts a question and blocks its caller until a submission
//! validates. HTTP handlers call `render_current_page` and
//! `handle_submission`. All state reads and writes happen under a single
//! lock; rendering and validation run inside it.
//!
//! # Ordering
//! - `ask` sets `AwaitingAnswer` and arms the gate in one critical section,
//!   so any page rendered afterwards shows the question.
//! - A submission that answers the question stores `Answered` and signals
//!   the gate in one critical section, so the caller never sees `Answered`
//!   without the signal, and the signal is never lost.
//! - Concurrent `ask` calls queue on a second lock held from posting to
//!   returning; only one question is ever visible.

use parking_lot::Mutex;
use std::mem;
use std::sync::Arc;
use tracing::{debug, info, warn};

use annotate_core::{
    DraftAnswer, FormContext, InputValues, Page, Question, QuestionError, QuestionState, Signature,
    ValidatedAnswer,
};

use crate::gate::{GateLatch, SynchronizationGate};

/// Everything guarded by the server lock.
#[derive(Debug)]
struct Shared {
    state: QuestionState,
    latch: GateLatch,
}

impl AsRef<GateLatch> for Shared {
    fn as_ref(&self) -> &GateLatch {
        &self.latch
    }
}

/// Snapshot of the shared state, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionStatus {
    Idle,
    AwaitingAnswer {
        /// Signature name of the outstanding question
        signature: String,
        /// Fields that failed the last submission
        error_count: usize,
    },
    Answered,
}

/// Serves one question at a time to a human and hands answers back to
/// blocked callers.
pub struct AnnotationServer {
    shared: Mutex<Shared>,
    gate: SynchronizationGate,
    /// Held for the whole of each `ask` so callers take turns
    turn: Mutex<()>,
    form: FormContext,
}

impl Default for AnnotationServer {
    fn default() -> Self {
        Self::new(FormContext::default())
    }
}

impl AnnotationServer {
    /// Create an idle server.
    pub fn new(form: FormContext) -> Self {
        Self {
            shared: Mutex::new(Shared {
                state: QuestionState::Idle,
                latch: GateLatch::default(),
            }),
            gate: SynchronizationGate::new(),
            turn: Mutex::new(()),
            form,
        }
    }

    /// Ask the human and block until they submit a valid answer.
    ///
    /// Fails only if `inputs` misses a declared input field; that check
    /// runs before the shared state is touched. Otherwise blocks with no
    /// timeout.
    pub fn ask(
        &self,
        signature: Arc<Signature>,
        inputs: InputValues,
    ) -> Result<ValidatedAnswer, QuestionError> {
        let question = Question::new(signature, inputs)?;
        let signature_name = question.signature().name.clone();

        let _turn = self.turn.lock();
        let mut shared = self.shared.lock();

        shared.state = QuestionState::awaiting(question);
        self.gate.arm(&mut shared.latch);
        info!(signature = %signature_name, "Question posted, waiting for human answer");

        loop {
            self.gate.wait(&mut shared);

            match mem::replace(&mut shared.state, QuestionState::Idle) {
                QuestionState::Answered(answer) => {
                    self.gate.arm(&mut shared.latch);
                    info!(signature = %signature_name, fields = answer.len(), "Answer received");
                    return Ok(answer);
                }
                other => {
                    // Only a validated submission signals; keep waiting.
                    shared.state = other;
                    self.gate.arm(&mut shared.latch);
                    warn!(signature = %signature_name, "Gate released without an answer");
                }
            }
        }
    }

    /// The page for the current state.
    pub fn render_current_page(&self) -> Page {
        let shared = self.shared.lock();
        shared.state.render(&self.form)
    }

    /// Apply a form submission and return the page to respond with.
    ///
    /// Invalid answers re-prompt; stray submissions re-render. Neither is an
    /// error.
    pub fn handle_submission(&self, draft: DraftAnswer) -> Page {
        let mut shared = self.shared.lock();

        if !shared.state.is_awaiting() {
            debug!("Submission with no outstanding question ignored");
        }

        let state = mem::replace(&mut shared.state, QuestionState::Idle);
        let transition = state.submit(draft, &self.form);
        let released = transition.released();
        shared.state = transition.state;

        if released {
            self.gate.signal(&mut shared.latch);
            info!("Submission accepted, releasing caller");
        } else if let QuestionState::AwaitingAnswer { errors, .. } = &shared.state {
            info!(error_count = errors.len(), "Submission rejected, re-prompting");
        }

        transition.page
    }

    /// Snapshot of the current state.
    pub fn status(&self) -> QuestionStatus {
        let shared = self.shared.lock();
        match &shared.state {
            QuestionState::Idle => QuestionStatus::Idle,
            QuestionState::AwaitingAnswer {
                question, errors, ..
            } => QuestionStatus::AwaitingAnswer {
                signature: question.signature().name.clone(),
                error_count: errors.len(),
            },
            QuestionState::Answered(_) => QuestionStatus::Answered,
        }
    }

    /// Renderer and validator in use.
    pub fn form(&self) -> &FormContext {
        &self.form
    }
}
