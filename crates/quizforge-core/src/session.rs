//! Attempt session state machine.
//!
//! ```text
//! Idle -> FetchingMeta -> Generating -> Validating -> Ready -> Answering -> Scored
//!              |               |             |
//!              +---------------+-------------+--> Error
//! ```
//!
//! The session performs no I/O. It hands out tickets describing the request to
//! make and accepts results tagged with the epoch the ticket was issued
//! under. Results carrying any other epoch are discarded untouched.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::builder::build_questions;
use crate::error::{AttemptError, GenerationRequestError, MetadataFetchError};
use crate::model::{CanonicalQuestion, QuestionReview, QuizMeta, Recommendation};
use crate::normalizer::normalize;
use crate::scoring::{self, SelectedAnswers};
use crate::traits::{GeneratedContent, GenerationRequest, DEFAULT_CONTENT_TYPE};

/// Per-session token used to discard results that belong to another session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Epoch(Uuid);

impl Epoch {
    fn fresh() -> Self {
        Epoch(Uuid::new_v4())
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    FetchingMeta,
    Generating,
    Validating,
    Ready,
    Answering,
    Scored {
        score: u32,
        recommendation: Recommendation,
    },
    Error(AttemptError),
}

impl AttemptState {
    pub fn name(&self) -> &'static str {
        match self {
            AttemptState::Idle => "idle",
            AttemptState::FetchingMeta => "fetching-meta",
            AttemptState::Generating => "generating",
            AttemptState::Validating => "validating",
            AttemptState::Ready => "ready",
            AttemptState::Answering => "answering",
            AttemptState::Scored { .. } => "scored",
            AttemptState::Error(_) => "error",
        }
    }

    /// `Scored` and `Error` end the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Scored { .. } | AttemptState::Error(_))
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One-shot latch guarding the generation request.
#[derive(Debug, Default)]
pub struct GenerationLatch(AtomicBool);

impl GenerationLatch {
    /// Set the latch; returns `true` only for the caller that set it first.
    pub fn try_acquire(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What happened to an asynchronous result handed to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The result was applied and the session moved on.
    Accepted,
    /// The result was stale or unexpected; the session is unchanged.
    Discarded,
}

/// Metadata request issued by [`AttemptSession::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTicket {
    pub epoch: Epoch,
    pub quiz_id: String,
}

/// Generation request issued by [`AttemptSession::dispatch_generation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    pub epoch: Epoch,
    pub request: GenerationRequest,
}

/// A single attempt at an AI-generated quiz.
#[derive(Debug)]
pub struct AttemptSession {
    epoch: Epoch,
    quiz_id: String,
    content_type: String,
    meta: Option<QuizMeta>,
    raw_response: Option<String>,
    questions: Vec<CanonicalQuestion>,
    selected_answers: SelectedAnswers,
    score_history: Vec<u32>,
    state: AttemptState,
    generation_latch: GenerationLatch,
}

impl AttemptSession {
    /// Create a session for a quiz with a fresh epoch.
    pub fn new(quiz_id: impl Into<String>) -> Self {
        Self {
            epoch: Epoch::fresh(),
            quiz_id: quiz_id.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            meta: None,
            raw_response: None,
            questions: Vec::new(),
            selected_answers: SelectedAnswers::new(),
            score_history: Vec::new(),
            state: AttemptState::Idle,
            generation_latch: GenerationLatch::default(),
        }
    }

    /// Override the content type sent to the generative service.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// A brand-new, independent session for the same quiz.
    pub fn restart(&self) -> Self {
        Self::new(self.quiz_id.clone()).with_content_type(self.content_type.clone())
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn state(&self) -> &AttemptState {
        &self.state
    }

    pub fn meta(&self) -> Option<&QuizMeta> {
        self.meta.as_ref()
    }

    /// The raw generation text, kept for diagnostics.
    pub fn raw_response(&self) -> Option<&str> {
        self.raw_response.as_deref()
    }

    /// Validated questions; empty until the session is Ready.
    pub fn questions(&self) -> &[CanonicalQuestion] {
        &self.questions
    }

    pub fn selected_answers(&self) -> &SelectedAnswers {
        &self.selected_answers
    }

    pub fn score_history(&self) -> &[u32] {
        &self.score_history
    }

    pub fn score(&self) -> Option<u32> {
        match self.state {
            AttemptState::Scored { score, .. } => Some(score),
            _ => None,
        }
    }

    pub fn recommendation(&self) -> Option<Recommendation> {
        match self.state {
            AttemptState::Scored { recommendation, .. } => Some(recommendation),
            _ => None,
        }
    }

    /// Whether the generation request has been dispatched.
    pub fn generation_dispatched(&self) -> bool {
        self.generation_latch.is_set()
    }

    /// Idle -> FetchingMeta.
    pub fn begin(&mut self) -> Result<MetaTicket, AttemptError> {
        self.expect_state(AttemptState::Idle, "begin")?;
        self.state = AttemptState::FetchingMeta;
        Ok(MetaTicket {
            epoch: self.epoch,
            quiz_id: self.quiz_id.clone(),
        })
    }

    /// FetchingMeta -> Generating, or Error on failure.
    pub fn apply_meta(
        &mut self,
        epoch: Epoch,
        result: Result<QuizMeta, MetadataFetchError>,
    ) -> Applied {
        if !self.accepts(epoch, &AttemptState::FetchingMeta, "metadata") {
            return Applied::Discarded;
        }
        match result {
            Ok(meta) => {
                tracing::debug!(quiz_id = %meta.id, title = %meta.title, "quiz metadata received");
                self.meta = Some(meta);
                self.state = AttemptState::Generating;
            }
            Err(err) => self.fail(err.into()),
        }
        Applied::Accepted
    }

    /// Claim the single generation request of this session.
    ///
    /// Returns `None` outside `Generating` or once the request has been
    /// dispatched.
    pub fn dispatch_generation(&mut self) -> Option<GenerationTicket> {
        if self.state != AttemptState::Generating {
            return None;
        }
        let meta = self.meta.as_ref()?;
        if !self.generation_latch.try_acquire() {
            tracing::debug!(epoch = %self.epoch, "generation already dispatched");
            return None;
        }
        Some(GenerationTicket {
            epoch: self.epoch,
            request: GenerationRequest::for_quiz(meta, &self.content_type),
        })
    }

    /// Generating -> Validating -> Ready, or Error.
    pub fn apply_generation(
        &mut self,
        epoch: Epoch,
        result: Result<GeneratedContent, GenerationRequestError>,
    ) -> Applied {
        if !self.accepts(epoch, &AttemptState::Generating, "generation") {
            return Applied::Discarded;
        }
        if !self.generation_latch.is_set() {
            tracing::warn!(epoch = %epoch, "generation result arrived before dispatch");
            return Applied::Discarded;
        }

        let content = match result {
            Ok(content) => content,
            Err(err) => {
                self.fail(err.into());
                return Applied::Accepted;
            }
        };

        self.state = AttemptState::Validating;
        let payload = normalize(&content.generated_content);
        let questions = build_questions(&payload);
        self.raw_response = Some(content.generated_content);

        if questions.is_empty() {
            tracing::warn!(
                entries = payload.questions.len(),
                "generated content has no usable question"
            );
            self.fail(AttemptError::GenerationContentInvalid);
        } else {
            tracing::info!(
                quiz_id = %self.quiz_id,
                questions = questions.len(),
                dropped = payload.questions.len() - questions.len(),
                "quiz ready"
            );
            self.questions = questions;
            self.state = AttemptState::Ready;
        }
        Applied::Accepted
    }

    /// Record the option chosen for one question, replacing any earlier choice.
    pub fn select_answer(
        &mut self,
        position: usize,
        option_text: impl Into<String>,
    ) -> Result<(), AttemptError> {
        if !matches!(self.state, AttemptState::Ready | AttemptState::Answering) {
            return Err(self.invalid("select an answer"));
        }
        if position >= self.questions.len() {
            return Err(AttemptError::QuestionOutOfRange {
                position,
                total: self.questions.len(),
            });
        }
        self.selected_answers.insert(position, option_text.into());
        self.state = AttemptState::Answering;
        Ok(())
    }

    /// Score the attempt. Accepted from Answering, and from Ready for a
    /// submit that arrives before any selection (e.g. a timeout).
    pub fn submit(&mut self) -> Result<u32, AttemptError> {
        if !matches!(self.state, AttemptState::Ready | AttemptState::Answering) {
            return Err(self.invalid("submit"));
        }
        let score = scoring::score(&self.questions, &self.selected_answers);
        let recommendation = scoring::recommend(score, self.questions.len());
        self.score_history.push(score);
        self.state = AttemptState::Scored {
            score,
            recommendation,
        };
        tracing::info!(
            quiz_id = %self.quiz_id,
            score,
            total = self.questions.len(),
            %recommendation,
            "attempt scored"
        );
        Ok(score)
    }

    /// Per-question review of the current selections.
    pub fn review(&self) -> Vec<QuestionReview> {
        scoring::review(&self.questions, &self.selected_answers)
    }

    fn accepts(&self, epoch: Epoch, expected: &AttemptState, what: &str) -> bool {
        if epoch != self.epoch {
            tracing::warn!(
                result_epoch = %epoch,
                session_epoch = %self.epoch,
                "discarding stale {what} result"
            );
            return false;
        }
        if &self.state != expected {
            tracing::warn!(state = %self.state, "discarding unexpected {what} result");
            return false;
        }
        true
    }

    fn expect_state(&self, expected: AttemptState, event: &'static str) -> Result<(), AttemptError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.invalid(event))
        }
    }

    fn invalid(&self, event: &'static str) -> AttemptError {
        AttemptError::InvalidTransition {
            state: self.state.name(),
            event,
        }
    }

    fn fail(&mut self, err: AttemptError) {
        tracing::info!(quiz_id = %self.quiz_id, from = %self.state, error = %err, "attempt failed");
        self.state = AttemptState::Error(err);
    }
}
